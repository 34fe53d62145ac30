use crate::catalog::Catalog;
use crate::combination::{derive_trick_list, TrickCombination};
use crate::settings::{LocalSettingsStore, SettingsStore, UserSettings};
use crate::shuffle::shuffle;
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Completed,
}

/// Queue of cards still to review plus the completed/cancelled ledgers.
///
/// Every transition takes `&mut self`, so the queue and both ledgers always
/// change together. Settings are read from `store` on creation and written
/// back to it whenever they change.
#[derive(Debug, Clone)]
pub struct Session<R = StdRng, S = LocalSettingsStore> {
    rng: R,
    store: S,
    settings: UserSettings,
    trick_list: Vec<TrickCombination>,
    queue: VecDeque<TrickCombination>,
    completed: Vec<TrickCombination>,
    cancelled: Vec<TrickCombination>,
}

impl<R: Rng, S: SettingsStore> Session<R, S> {
    pub fn new(catalog: &Catalog, store: S, rng: R) -> Self {
        let settings = store.read();
        let trick_list = derive_trick_list(catalog, &settings);
        let mut session = Self {
            rng,
            store,
            settings,
            trick_list,
            queue: VecDeque::new(),
            completed: Vec::new(),
            cancelled: Vec::new(),
        };
        session.restart();
        session
    }

    pub fn state(&self) -> SessionState {
        if self.queue.is_empty() {
            SessionState::Completed
        } else {
            SessionState::Active
        }
    }

    pub fn current(&self) -> Option<&TrickCombination> {
        self.queue.front()
    }

    /// The head of the queue followed by up to `count - 1` cards behind it.
    pub fn upcoming(&self, count: usize) -> impl Iterator<Item = &TrickCombination> + '_ {
        self.queue.iter().take(count)
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn total(&self) -> usize {
        self.trick_list.len()
    }

    pub fn completed(&self) -> &[TrickCombination] {
        &self.completed
    }

    pub fn cancelled(&self) -> &[TrickCombination] {
        &self.cancelled
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    /// Moves the head of the queue into the ledger chosen by `vote`.
    /// Returns `None` when there is nothing left to vote on.
    pub fn vote(&mut self, vote: Vote) -> Option<&TrickCombination> {
        let Some(combination) = self.queue.pop_front() else {
            debug!("Ignoring {:?} vote on a completed session", vote);
            return None;
        };

        debug!("{:?} {}", vote, combination.name);
        let ledger = match vote {
            Vote::Accept => &mut self.completed,
            Vote::Reject => &mut self.cancelled,
        };
        ledger.push(combination);
        ledger.last()
    }

    pub fn restart(&mut self) {
        self.completed.clear();
        self.cancelled.clear();
        self.queue = shuffle(&self.trick_list, &mut self.rng).into();
        debug!("Session restarted with {} tricks", self.queue.len());
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persists `settings`, then rebuilds the list and restarts.
    pub fn settings_changed(&mut self, catalog: &Catalog, settings: UserSettings) {
        self.store.write(&settings);
        self.trick_list = derive_trick_list(catalog, &settings);
        self.settings = settings;
        self.restart();
    }
}
