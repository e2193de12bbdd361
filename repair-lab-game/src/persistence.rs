//! Snapshot persistence helpers and the in-memory storage slot.
use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use thiserror::Error;

use crate::StateStorage;
use crate::state::PlayerState;

/// Non-fatal persistence problems. The engine keeps running on defaults.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("could not restore previous progress: {0}")]
    Malformed(String),
    #[error("snapshot storage failed: {0}")]
    Storage(String),
    #[error("snapshot serialization failed: {0}")]
    Serialize(String),
}

/// Outcome of reading the persisted slot.
#[derive(Debug)]
pub struct Restored {
    pub state: PlayerState,
    pub warning: Option<PersistenceError>,
}

/// Load the persisted state, falling back to defaults when the slot is
/// empty, unreadable or malformed.
pub fn restore_state<S: StateStorage>(storage: &S) -> Restored {
    let raw = match storage.load_snapshot() {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            return Restored {
                state: PlayerState::default(),
                warning: None,
            };
        }
        Err(err) => {
            log::warn!("snapshot read failed: {err}");
            return Restored {
                state: PlayerState::default(),
                warning: Some(PersistenceError::Storage(err.to_string())),
            };
        }
    };

    match PlayerState::from_snapshot(&raw) {
        Ok(mut state) => {
            state.sanitize();
            Restored {
                state,
                warning: None,
            }
        }
        Err(err) => {
            log::warn!("snapshot malformed, starting fresh: {err}");
            Restored {
                state: PlayerState::default(),
                warning: Some(PersistenceError::Malformed(err.to_string())),
            }
        }
    }
}

/// Rewrite the full snapshot.
///
/// # Errors
///
/// Returns an error if the state cannot be serialized or stored.
pub fn persist_state<S: StateStorage>(
    storage: &S,
    state: &PlayerState,
) -> Result<(), PersistenceError> {
    let json = state
        .to_snapshot()
        .map_err(|err| PersistenceError::Serialize(err.to_string()))?;
    storage
        .save_snapshot(&json)
        .map_err(|err| PersistenceError::Storage(err.to_string()))
}

/// Single-slot storage kept in memory; clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryStorage {
    /// Storage pre-filled with a raw snapshot string.
    #[must_use]
    pub fn with_snapshot(raw: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(raw.into()))),
        }
    }

    /// Current raw contents of the slot.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl StateStorage for MemoryStorage {
    type Error = Infallible;

    fn load_snapshot(&self) -> Result<Option<String>, Self::Error> {
        Ok(self.slot.borrow().clone())
    }

    fn save_snapshot(&self, snapshot: &str) -> Result<(), Self::Error> {
        *self.slot.borrow_mut() = Some(snapshot.to_string());
        Ok(())
    }

    fn clear_snapshot(&self) -> Result<(), Self::Error> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("disk on fire")]
    struct Broken;

    struct BrokenStorage;

    impl StateStorage for BrokenStorage {
        type Error = Broken;

        fn load_snapshot(&self) -> Result<Option<String>, Self::Error> {
            Err(Broken)
        }

        fn save_snapshot(&self, _snapshot: &str) -> Result<(), Self::Error> {
            Err(Broken)
        }

        fn clear_snapshot(&self) -> Result<(), Self::Error> {
            Err(Broken)
        }
    }

    #[test]
    fn empty_slot_restores_defaults_silently() {
        let restored = restore_state(&MemoryStorage::default());
        assert_eq!(restored.state, PlayerState::default());
        assert!(restored.warning.is_none());
    }

    #[test]
    fn malformed_slot_restores_defaults_with_warning() {
        let restored = restore_state(&MemoryStorage::with_snapshot("{oops"));
        assert_eq!(restored.state, PlayerState::default());
        assert!(matches!(restored.warning, Some(PersistenceError::Malformed(_))));
    }

    #[test]
    fn storage_failures_are_non_fatal() {
        let restored = restore_state(&BrokenStorage);
        assert_eq!(restored.state, PlayerState::default());
        assert_eq!(
            restored.warning,
            Some(PersistenceError::Storage("disk on fire".to_string()))
        );
        assert!(persist_state(&BrokenStorage, &PlayerState::default()).is_err());
    }

    #[test]
    fn persisted_state_is_readable_back() {
        let storage = MemoryStorage::default();
        let state = PlayerState {
            score: 321,
            streak: 2,
            ..PlayerState::default()
        };
        persist_state(&storage, &state).unwrap();
        let shared = storage.clone();
        assert_eq!(restore_state(&shared).state, state);
        shared.clear_snapshot().unwrap();
        assert!(storage.raw().is_none());
    }

    #[test]
    fn restored_state_is_sanitized() {
        let storage = MemoryStorage::with_snapshot(r#"{"energy": 400, "comboMultiplier": 0.5}"#);
        let restored = restore_state(&storage);
        assert_eq!(restored.state.energy, 100);
        assert!((restored.state.combo_multiplier - 1.0).abs() < f64::EPSILON);
    }
}
