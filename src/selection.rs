//! No-repeat tip selection
//!
//! Every eligible tip is shown once per cycle before any repeats. The cycle
//! is the `shown` set: once it covers the whole eligible set, the next
//! request clears it and starts over. Indices that stop being eligible
//! stay in `shown` until that reset and are never picked.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SelectError;
use crate::tips::{TipDatabase, TipEntry};
use crate::version::{AppVersion, is_eligible};

/// Tips already presented in the current cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    #[serde(default)]
    pub shown: BTreeSet<usize>,

    /// Most recent pick, for re-displaying without advancing the cycle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_shown: Option<usize>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_shown(&self, index: usize) -> bool {
        self.shown.contains(&index)
    }

    /// Start a new cycle, forgetting the last pick as well
    pub fn reset(&mut self) {
        self.shown.clear();
        self.last_shown = None;
    }

    /// Drop indices that no longer exist in a database of `len` entries
    pub fn prune(&mut self, len: usize) {
        self.shown.retain(|&i| i < len);
        if self.last_shown.is_some_and(|i| i >= len) {
            self.last_shown = None;
        }
    }
}

/// A selected tip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick<'a> {
    pub index: usize,
    pub entry: &'a TipEntry,
    /// True when this pick opened a new cycle
    pub cycle_restarted: bool,
}

/// Positions of every tip the running version may show
pub fn eligible_indices(database: &TipDatabase, running: &AppVersion) -> Vec<usize> {
    database
        .iter()
        .filter(|(_, entry)| is_eligible(entry, running))
        .map(|(index, _)| index)
        .collect()
}

/// Pick the next tip and record it in `state`
///
/// `state` is left untouched when nothing can be shown.
pub fn next_tip<'a, R: Rng + ?Sized>(
    database: &'a TipDatabase,
    running: &AppVersion,
    state: &mut SelectionState,
    rng: &mut R,
) -> Result<Pick<'a>, SelectError> {
    if database.is_empty() {
        return Err(SelectError::EmptyDatabase);
    }

    let eligible = eligible_indices(database, running);
    if eligible.is_empty() {
        info!(running = %running, tips = database.len(), "No tip is eligible for running version");
        return Err(SelectError::NoEligibleTip { running: running.to_string() });
    }

    let mut candidates: Vec<usize> = eligible
        .iter()
        .copied()
        .filter(|i| !state.has_shown(*i))
        .collect();

    let cycle_restarted = candidates.is_empty();
    if cycle_restarted {
        debug!(eligible = eligible.len(), "All eligible tips shown, starting a new cycle");
        state.shown.clear();
        candidates = eligible;
    }

    let index = candidates[rng.gen_range(0..candidates.len())];
    state.shown.insert(index);
    state.last_shown = Some(index);

    debug!(index, remaining = candidates.len() - 1, "Selected tip");

    // eligible_indices only yields positions inside the database
    let entry = &database.entries()[index];
    Ok(Pick { index, entry, cycle_restarted })
}

/// The last tip shown, if it still exists
pub fn current_tip<'a>(database: &'a TipDatabase, state: &SelectionState) -> Option<Pick<'a>> {
    let index = state.last_shown?;
    database.get(index).map(|entry| Pick {
        index,
        entry,
        cycle_restarted: false,
    })
}
