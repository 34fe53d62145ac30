use crate::catalog::{Area, Catalog, Category, Demo, Difficulty, Stance, Trick, Variation};
use crate::settings::UserSettings;

/// A trick materialised for one stance; the unit shown on a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrickCombination {
    pub name: String,
    pub stance: Stance,
    pub areas: Vec<Area>,
    pub difficulty: Difficulty,
    pub category: Category,
    pub demo: Option<Demo>,
}

impl TrickCombination {
    pub fn new(trick: &Trick, stance: Stance, variation: &Variation) -> Self {
        Self {
            name: format!("{} {}", stance.label(), trick.name),
            stance,
            areas: vec![trick.area],
            difficulty: variation.difficulty,
            category: variation.category,
            demo: variation.demo.clone(),
        }
    }
}

/// All four stance combinations of a trick, in canonical stance order.
pub fn combinations(trick: &Trick) -> impl Iterator<Item = TrickCombination> + '_ {
    trick
        .variations
        .iter()
        .map(move |(stance, variation)| TrickCombination::new(trick, stance, variation))
}

pub fn matches(settings: &UserSettings, combination: &TrickCombination) -> bool {
    let difficulty = if settings.include_easier_tricks {
        combination.difficulty.rank() <= settings.level.rank()
    } else {
        combination.difficulty == settings.level
    };

    difficulty
        && settings.stances.contains(&combination.stance)
        && combination
            .areas
            .iter()
            .any(|area| settings.areas.contains(area))
}

pub fn expand<'a>(
    tricks: impl IntoIterator<Item = &'a Trick>,
    settings: &UserSettings,
) -> Vec<TrickCombination> {
    tricks
        .into_iter()
        .flat_map(combinations)
        .filter(|combination| matches(settings, combination))
        .collect()
}

/// Concatenation of the trick lists of every selected area.
pub fn catalog_subset<'a>(catalog: &'a Catalog, settings: &UserSettings) -> Vec<&'a Trick> {
    settings
        .areas
        .iter()
        .flat_map(|&area| catalog.tricks(area))
        .collect()
}

pub fn derive_trick_list(catalog: &Catalog, settings: &UserSettings) -> Vec<TrickCombination> {
    expand(catalog_subset(catalog, settings), settings)
}
