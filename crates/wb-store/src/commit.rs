use crate::error::StoreError;
use crate::storage::PersistedStorage;
use java_surgeon_core::{difference_interval, TextEdit};
use std::marker::PhantomData;
use tracing::{info, warn};

/// Observer of commits from an editor into its storage.
pub trait CommitListener {
    /// Fired before anything is written.
    fn about_to_commit(&mut self) {}

    /// Asked only when there is something to write.
    fn can_edit_base_file(&mut self) -> bool {
        true
    }

    /// Fired after every commit attempt, whether or not text was written.
    fn commit_done(&mut self) {}
}

/// What a commit did to the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Editor text equals the last committed text.
    Unchanged,
    /// The difference interval was written into storage.
    Written(TextEdit),
    /// The listener refused the write.
    Rejected,
}

// ── Typestate markers ──────────────────────────────────────────────

/// Created, listener not notified yet.
pub struct Pending;

/// `about_to_commit` has been fired.
pub struct Announced;

/// Storage is up to date (or the write was skipped).
pub struct Written;

// ── Commit ─────────────────────────────────────────────────────────

pub struct Commit<'a, State = Pending> {
    storage: &'a mut dyn PersistedStorage,
    listener: Option<&'a mut dyn CommitListener>,
    committed: &'a str,
    text: &'a str,
    outcome: CommitOutcome,
    _state: PhantomData<State>,
}

impl<'a> Commit<'a, Pending> {
    /// `committed` is the editor text at the last commit, `text` the
    /// current editor text.
    pub fn new(
        storage: &'a mut dyn PersistedStorage,
        listener: Option<&'a mut dyn CommitListener>,
        committed: &'a str,
        text: &'a str,
    ) -> Self {
        Commit {
            storage,
            listener,
            committed,
            text,
            outcome: CommitOutcome::Unchanged,
            _state: PhantomData,
        }
    }

    pub fn announce(mut self) -> Commit<'a, Announced> {
        if let Some(listener) = self.listener.as_deref_mut() {
            listener.about_to_commit();
        }
        Commit {
            storage: self.storage,
            listener: self.listener,
            committed: self.committed,
            text: self.text,
            outcome: self.outcome,
            _state: PhantomData,
        }
    }
}

impl<'a> Commit<'a, Announced> {
    /// Replace the difference interval between the last committed text and
    /// the current text inside the storage buffer.
    ///
    /// On error the commit is handed back so `commit_done` can still fire.
    #[allow(clippy::result_large_err)]
    pub fn write(mut self) -> Result<Commit<'a, Written>, (Commit<'a, Written>, StoreError)> {
        let result = self.write_difference();
        let done = Commit {
            storage: self.storage,
            listener: self.listener,
            committed: self.committed,
            text: self.text,
            outcome: self.outcome,
            _state: PhantomData,
        };
        match result {
            Ok(outcome) => Ok(Commit { outcome, ..done }),
            Err(StoreError::Rejected) => Ok(Commit {
                outcome: CommitOutcome::Rejected,
                ..done
            }),
            Err(e) => Err((done, e)),
        }
    }

    fn write_difference(&mut self) -> Result<CommitOutcome, StoreError> {
        let Some(edit) = difference_interval(self.committed, self.text) else {
            return Ok(CommitOutcome::Unchanged);
        };
        if let Some(listener) = self.listener.as_deref_mut() {
            if !listener.can_edit_base_file() {
                warn!("commit listener refused to edit the base file");
                return Err(StoreError::Rejected);
            }
        }
        self.storage.replace(&edit)?;
        info!(
            start = edit.start,
            end = edit.end,
            inserted = edit.replacement.len(),
            "committed changes"
        );
        Ok(CommitOutcome::Written(edit))
    }
}

impl<'a> Commit<'a, Written> {
    pub fn outcome(&self) -> &CommitOutcome {
        &self.outcome
    }

    /// Fire `commit_done` and report the outcome.
    pub fn finish(mut self) -> CommitOutcome {
        if let Some(listener) = self.listener.as_deref_mut() {
            listener.commit_done();
        }
        self.outcome
    }
}

/// Run the full commit protocol.
pub fn commit_changes(
    storage: &mut dyn PersistedStorage,
    listener: Option<&mut dyn CommitListener>,
    committed: &str,
    text: &str,
) -> Result<CommitOutcome, StoreError> {
    let listener = listener.map(|l| l as &mut dyn CommitListener);
    match Commit::new(storage, listener, committed, text).announce().write() {
        Ok(written) => Ok(written.finish()),
        Err((written, e)) => {
            written.finish();
            Err(e)
        }
    }
}

/// Commit, then save the storage when forced or when no other editor owns it.
pub fn save_changes(
    storage: &mut dyn PersistedStorage,
    listener: Option<&mut dyn CommitListener>,
    committed: &str,
    text: &str,
    force: bool,
) -> Result<CommitOutcome, StoreError> {
    let outcome = commit_changes(storage, listener, committed, text)?;
    if force || !storage.is_working_copy() {
        storage.save()?;
        info!(force, "saved storage");
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[derive(Default)]
    struct Recorder {
        events: Vec<&'static str>,
        allow: bool,
    }

    impl CommitListener for Recorder {
        fn about_to_commit(&mut self) {
            self.events.push("about");
        }

        fn can_edit_base_file(&mut self) -> bool {
            self.events.push("can_edit");
            self.allow
        }

        fn commit_done(&mut self) {
            self.events.push("done");
        }
    }

    #[test]
    fn test_commit_without_changes_keeps_storage_consistent() {
        let mut storage = MemoryStorage::new("class Test {}");
        let outcome = commit_changes(&mut storage, None, "class Test {}", "class Test {}").unwrap();
        assert_eq!(outcome, CommitOutcome::Unchanged);
        assert!(storage.is_consistent_with_memory());
    }

    #[test]
    fn test_listener_not_asked_without_changes() {
        let mut storage = MemoryStorage::new("class Test {}");
        let mut recorder = Recorder {
            allow: true,
            ..Default::default()
        };
        commit_changes(&mut storage, Some(&mut recorder), "class Test {}", "class Test {}").unwrap();
        assert_eq!(recorder.events, vec!["about", "done"]);
    }

    #[test]
    fn test_listener_allows_write() {
        let mut storage = MemoryStorage::new("class Test {}");
        let mut recorder = Recorder {
            allow: true,
            ..Default::default()
        };
        let outcome = commit_changes(
            &mut storage,
            Some(&mut recorder),
            "class Test {}",
            "class Test { int a; }",
        )
        .unwrap();
        assert!(matches!(outcome, CommitOutcome::Written(_)));
        assert_eq!(recorder.events, vec!["about", "can_edit", "done"]);
        assert_eq!(storage.current_text().unwrap(), "class Test { int a; }");
    }

    #[test]
    fn test_listener_rejects_write() {
        let mut storage = MemoryStorage::new("class Test {}");
        let mut recorder = Recorder::default();
        let outcome = commit_changes(
            &mut storage,
            Some(&mut recorder),
            "class Test {}",
            "class Test { int a; }",
        )
        .unwrap();
        assert_eq!(outcome, CommitOutcome::Rejected);
        assert_eq!(recorder.events, vec!["about", "can_edit", "done"]);
        assert_eq!(storage.current_text().unwrap(), "class Test {}");
    }

    #[test]
    fn test_listener_asked_for_any_storage() {
        let mut storage = MemoryStorage::new("a").as_working_copy();
        let mut recorder = Recorder::default();
        let outcome = commit_changes(&mut storage, Some(&mut recorder), "a", "b").unwrap();
        assert_eq!(outcome, CommitOutcome::Rejected);
        assert_eq!(recorder.events, vec!["about", "can_edit", "done"]);
        assert_eq!(storage.current_text().unwrap(), "a");
    }

    #[test]
    fn test_save_skips_working_copy() {
        let mut storage = MemoryStorage::new("a").as_working_copy();
        save_changes(&mut storage, None, "a", "b", false).unwrap();
        assert_eq!(storage.current_text().unwrap(), "b");
        assert_eq!(storage.saved_text(), "a");

        save_changes(&mut storage, None, "b", "b", true).unwrap();
        assert_eq!(storage.saved_text(), "b");
    }
}
