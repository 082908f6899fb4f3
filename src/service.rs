//! Facade a host drives: load once, then ask for tips
//!
//! Nothing here is fatal to the host. An unreadable resource becomes an
//! empty database and a failed state write only costs the no-repeat memory
//! of this run.

use rand::Rng;
use tracing::warn;

use crate::error::{Diagnostic, SelectError};
use crate::persistence::{SessionRecord, SessionStore, restore_state};
use crate::selection::{Pick, SelectionState, current_tip, next_tip};
use crate::tips::{TipDatabase, TipEntry, TipSource};
use crate::version::{self, AppVersion, Gate};

pub struct TipService<S: SessionStore, R: Rng> {
    database: TipDatabase,
    diagnostics: Vec<Diagnostic>,
    /// False when the resource could not be read at all
    available: bool,
    running: AppVersion,
    store: S,
    state: SelectionState,
    rng: R,
}

impl<S: SessionStore, R: Rng> TipService<S, R> {
    /// Load the database from `source`, degrading to no tips if it is unreadable
    pub fn open(source: &TipSource, running: AppVersion, store: S, rng: R) -> Self {
        match TipDatabase::load(source) {
            Ok((database, diagnostics)) => Self::new(database, diagnostics, running, store, rng),
            Err(e) => {
                warn!(error = %e, "Tip resource unavailable, no tips will be shown");
                let mut service = Self::new(TipDatabase::empty(), Vec::new(), running, store, rng);
                service.available = false;
                service
            }
        }
    }

    pub fn new(
        database: TipDatabase,
        mut diagnostics: Vec<Diagnostic>,
        running: AppVersion,
        store: S,
        rng: R,
    ) -> Self {
        diagnostics.extend(version::audit(&database));
        let state = restore_state(&store, &database);
        Self {
            database,
            diagnostics,
            available: true,
            running,
            store,
            state,
            rng,
        }
    }

    pub fn database(&self) -> &TipDatabase {
        &self.database
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Records dropped while parsing the resource
    pub fn skipped(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_parse_skip()).count()
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn running_version(&self) -> &AppVersion {
        &self.running
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Pick the next tip of the cycle and persist the new state
    pub fn next(&mut self) -> Result<Pick<'_>, SelectError> {
        let pick = next_tip(&self.database, &self.running, &mut self.state, &mut self.rng)?;

        let record = SessionRecord::new(&self.database, self.state.clone());
        if let Err(e) = self.store.write(&record) {
            warn!(error = %e, "Failed to save session state");
        }
        Ok(pick)
    }

    /// Last shown tip without advancing the cycle
    pub fn current(&self) -> Option<Pick<'_>> {
        current_tip(&self.database, &self.state)
    }

    /// Forget this cycle, both in memory and in the store
    pub fn reset(&mut self) -> crate::error::Result<()> {
        self.state.reset();
        self.store.clear()
    }

    /// Every entry with its gate under the running version
    pub fn gates(&self) -> impl Iterator<Item = (usize, &TipEntry, Gate)> {
        self.database
            .iter()
            .map(|(index, entry)| (index, entry, version::gate(entry.min_version.as_deref(), &self.running)))
    }

    pub fn eligible_count(&self) -> usize {
        self.gates().filter(|(_, _, gate)| gate.is_eligible()).count()
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{JsonFileStore, MemoryStore};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;
    use std::collections::HashSet;
    use std::io::Write;

    const TIPS: &str = "\
# test tips
tip=one
tip=two
cmd=echo two
tip=three
version=2.0
tip=four
version=abc
";

    fn service(store: MemoryStore, version: &str) -> TipService<MemoryStore, StepRng> {
        let (database, diagnostics) = TipDatabase::parse(TIPS);
        TipService::new(database, diagnostics, AppVersion::new(version), store, StepRng::new(0, 0))
    }

    #[test]
    fn test_state_survives_restart() {
        let mut first = service(MemoryStore::default(), "1.0");
        assert_eq!(first.next().unwrap().index, 0);
        assert_eq!(first.next().unwrap().index, 1);
        let store = first.into_store();

        let mut second = service(store, "1.0");
        assert_eq!(second.state().shown.len(), 2);
        assert_eq!(second.current().map(|p| p.index), Some(1));
        assert_eq!(second.next().unwrap().index, 3);

        // Cycle exhausted for 1.0 (tip three is gated)
        let pick = second.next().unwrap();
        assert!(pick.cycle_restarted);
        assert_eq!(pick.index, 0);
    }

    #[test]
    fn test_file_backed_cycle_across_processes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let (database, _) = TipDatabase::parse(TIPS);

        let mut seen = HashSet::new();
        for seed in 0..3 {
            let mut service = TipService::new(
                database.clone(),
                Vec::new(),
                AppVersion::new("3.0"),
                JsonFileStore::new(&path),
                StdRng::seed_from_u64(seed),
            );
            seen.insert(service.next().unwrap().index);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_changed_resource_resets_cycle() {
        let mut first = service(MemoryStore::default(), "1.0");
        first.next().unwrap();
        let store = first.into_store();

        let (database, _) = TipDatabase::parse("tip=entirely new");
        let second = TipService::new(database, Vec::new(), AppVersion::new("1.0"), store, StepRng::new(0, 0));
        assert_eq!(second.state(), &SelectionState::new());
    }

    #[test]
    fn test_diagnostics_include_version_fallbacks() {
        let service = service(MemoryStore::default(), "1.0");
        assert_eq!(
            service.diagnostics(),
            &[Diagnostic::VersionParseFallback { index: 3, version: "abc".to_string() }]
        );
        assert_eq!(service.eligible_count(), 3);
        assert_eq!(service.skipped(), 0);
        let gates: Vec<Gate> = service.gates().map(|(_, _, g)| g).collect();
        assert_eq!(gates, vec![Gate::Open, Gate::Open, Gate::TooOld, Gate::MinVersionFallback]);
    }

    #[test]
    fn test_skipped_counts_only_dropped_records() {
        let (database, diagnostics) = TipDatabase::parse("tip=\ncmd=orphan\ntip=kept\nversion=abc\ntip=  ");
        let service = TipService::new(database, diagnostics, AppVersion::new("1.0"), MemoryStore::default(), StepRng::new(0, 0));

        assert_eq!(service.database().len(), 1);
        assert_eq!(service.skipped(), 2);
        assert_eq!(service.diagnostics().len(), 3);
    }

    #[test]
    fn test_unavailable_resource_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let source = TipSource::File(dir.path().join("nope.txt"));
        let mut service = TipService::open(&source, AppVersion::new("1.0"), MemoryStore::default(), StepRng::new(0, 0));

        assert!(!service.is_available());
        assert!(service.database().is_empty());
        assert_eq!(service.next(), Err(SelectError::EmptyDatabase));
    }

    #[test]
    fn test_open_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{TIPS}").unwrap();
        let source = TipSource::File(file.path().to_path_buf());

        let service = TipService::open(&source, AppVersion::new("2.0"), MemoryStore::default(), StepRng::new(0, 0));
        assert!(service.is_available());
        assert_eq!(service.database().len(), 4);
        assert_eq!(service.eligible_count(), 4);
    }

    #[test]
    fn test_no_eligible_tip_leaves_store_untouched() {
        let (database, _) = TipDatabase::parse("tip=later\nversion=5");
        let mut service = TipService::new(database, Vec::new(), AppVersion::new("1.0"), MemoryStore::default(), StepRng::new(0, 0));

        assert!(matches!(service.next(), Err(SelectError::NoEligibleTip { .. })));
        assert_eq!(service.into_store().record, None);
    }

    #[test]
    fn test_reset() {
        let mut service = service(MemoryStore::default(), "1.0");
        service.next().unwrap();
        service.reset().unwrap();

        assert_eq!(service.state(), &SelectionState::new());
        assert_eq!(service.current(), None);
        assert_eq!(service.into_store().record, None);
    }
}
