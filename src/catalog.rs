use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

const EMBEDDED_CATALOG: &str = include_str!("../assets/tricks.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Flatground,
    Rails,
    Gap,
    Ledges,
    Manuals,
    Transition,
    Freestyle,
}

impl Area {
    pub const ALL: [Area; 7] = [
        Area::Flatground,
        Area::Rails,
        Area::Gap,
        Area::Ledges,
        Area::Manuals,
        Area::Transition,
        Area::Freestyle,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Area::Flatground => "Flatground",
            Area::Rails => "Rails",
            Area::Gap => "Gap",
            Area::Ledges => "Ledges",
            Area::Manuals => "Manuals",
            Area::Transition => "Transition",
            Area::Freestyle => "Freestyle",
        }
    }
}

/// Rider orientation. Declaration order is the canonical stance order used
/// when a trick is expanded into combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Regular,
    Fakie,
    Nollie,
    Switch,
}

impl Stance {
    pub const ALL: [Stance; 4] = [Stance::Regular, Stance::Fakie, Stance::Nollie, Stance::Switch];

    pub fn label(self) -> &'static str {
        match self {
            Stance::Regular => "Regular",
            Stance::Fakie => "Fakie",
            Stance::Nollie => "Nollie",
            Stance::Switch => "Switch",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Xhard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Xhard,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Xhard => "XHard",
        }
    }

    /// easy = 0 through xhard = 3.
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(usize::from(rank)).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fundamental,
    Advanced,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Fundamental => "Fundamental",
            Category::Advanced => "Advanced",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_via_label!(Area, Stance, Difficulty, Category);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demo {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub category: Category,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<Demo>,
}

impl Variation {
    pub fn new(category: Category, difficulty: Difficulty) -> Self {
        Self {
            category,
            difficulty,
            demo: None,
        }
    }

    pub fn with_demo(mut self, title: impl Into<String>, url: impl Into<String>) -> Self {
        self.demo = Some(Demo {
            title: title.into(),
            url: url.into(),
        });
        self
    }
}

/// One variation per stance; a `Trick` cannot be built without all four.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variations([Variation; 4]);

impl Variations {
    pub fn get(&self, stance: Stance) -> &Variation {
        &self.0[stance.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stance, &Variation)> + '_ {
        Stance::ALL
            .into_iter()
            .map(move |stance| (stance, self.get(stance)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trick {
    pub name: String,
    pub area: Area,
    pub variations: Variations,
}

impl Trick {
    pub fn new(
        name: impl Into<String>,
        area: Area,
        variations: impl IntoIterator<Item = (Stance, Variation)>,
    ) -> Result<Self, CatalogError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::EmptyName { area });
        }

        let mut by_stance: BTreeMap<Stance, Variation> = variations.into_iter().collect();
        let mut take = |stance: Stance| {
            by_stance
                .remove(&stance)
                .ok_or_else(|| CatalogError::MissingStance {
                    trick: name.clone(),
                    stance,
                })
        };
        let variations = Variations([
            take(Stance::Regular)?,
            take(Stance::Fakie)?,
            take(Stance::Nollie)?,
            take(Stance::Switch)?,
        ]);

        Ok(Self {
            name,
            area,
            variations,
        })
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("trick catalog is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("trick '{trick}' is missing its {stance} variation")]
    MissingStance { trick: String, stance: Stance },

    #[error("a trick listed under {area} has an empty name")]
    EmptyName { area: Area },
}

#[derive(Deserialize)]
struct RawTrick {
    name: String,
    area: Area,
    variations: BTreeMap<Stance, Variation>,
}

/// Static trick lists keyed by area. Built once and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    areas: BTreeMap<Area, Vec<Trick>>,
}

impl Catalog {
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<Area, Vec<RawTrick>> = serde_json::from_str(text)?;

        let mut areas = BTreeMap::new();
        for (area, raw_tricks) in raw {
            let tricks = raw_tricks
                .into_iter()
                .map(|raw| Trick::new(raw.name, raw.area, raw.variations))
                .collect::<Result<Vec<_>, _>>()?;
            areas.insert(area, tricks);
        }

        Ok(Self { areas })
    }

    pub fn from_areas(areas: impl IntoIterator<Item = (Area, Vec<Trick>)>) -> Self {
        Self {
            areas: areas.into_iter().collect(),
        }
    }

    /// Tricks listed under `area`; areas without entries yield an empty slice.
    pub fn tricks(&self, area: Area) -> &[Trick] {
        self.areas.get(&area).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn trick_count(&self) -> usize {
        self.areas.values().map(Vec::len).sum()
    }
}
