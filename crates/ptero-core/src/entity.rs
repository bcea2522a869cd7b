//! Local state holder shared by entity wrappers.

use serde::Serialize;
use serde_json::Value;
use std::sync::{PoisonError, RwLock};

use crate::error::{Error, Result};

/// Whether a wrapper currently holds panel data.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityState<A> {
    /// No attributes loaded (or the entity was deleted)
    Unloaded,
    /// Last attributes received from the panel
    Loaded(A),
}

impl<A> EntityState<A> {
    /// Borrow the attributes if loaded.
    pub fn as_loaded(&self) -> Option<&A> {
        match self {
            Self::Loaded(attributes) => Some(attributes),
            Self::Unloaded => None,
        }
    }
}

/// Entities that expose their panel identifier.
pub trait Identified {
    /// Numeric panel id.
    fn id(&self) -> u64;
}

/// Interior-mutable attribute storage for an entity wrapper.
///
/// Cloning deep-copies the current state; the clone never observes later
/// changes to the original.
#[derive(Debug)]
pub struct EntityCell<A> {
    state: RwLock<EntityState<A>>,
}

impl<A: Clone> Clone for EntityCell<A> {
    fn clone(&self) -> Self {
        Self {
            state: RwLock::new(self.snapshot()),
        }
    }
}

impl<A: Clone> EntityCell<A> {
    /// Cell holding freshly received attributes.
    pub fn loaded(attributes: A) -> Self {
        Self {
            state: RwLock::new(EntityState::Loaded(attributes)),
        }
    }

    /// Empty cell.
    pub fn unloaded() -> Self {
        Self {
            state: RwLock::new(EntityState::Unloaded),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> EntityState<A> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Copy of the attributes if loaded.
    pub fn attributes(&self) -> Option<A> {
        self.read(Clone::clone)
    }

    /// Project something out of the loaded attributes.
    pub fn read<R>(&self, f: impl FnOnce(&A) -> R) -> Option<R> {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_loaded().map(f)
    }

    /// Replace the state with new attributes.
    pub fn replace(&self, attributes: A) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) =
            EntityState::Loaded(attributes);
    }

    /// Reset to [`EntityState::Unloaded`].
    pub fn clear(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = EntityState::Unloaded;
    }

    /// Mutate loaded attributes in place; no-op when unloaded.
    pub fn update(&self, f: impl FnOnce(&mut A)) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let EntityState::Loaded(attributes) = &mut *guard {
            f(attributes);
        }
    }

    /// Whether attributes are loaded.
    pub fn is_loaded(&self) -> bool {
        self.read(|_| ()).is_some()
    }
}

/// Resolve the wrapper's id or fail with a validation error.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the cell is unloaded.
pub fn require_id<A: Identified + Clone>(cell: &EntityCell<A>, resource: &str) -> Result<u64> {
    cell.read(Identified::id)
        .ok_or_else(|| Error::validation(format!("{resource} has no loaded id")))
}

/// Serialize a partial update, rejecting empty change sets.
///
/// # Errors
///
/// Returns [`Error::Validation`] when no fields are set.
pub fn update_payload<T: Serialize + ?Sized>(changes: &T) -> Result<Value> {
    let value = serde_json::to_value(changes)?;
    let empty = match &value {
        Value::Object(map) => map.is_empty(),
        Value::Null => true,
        _ => false,
    };
    if empty {
        return Err(Error::validation("No update fields provided"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Attrs {
        id: u64,
        name: String,
    }

    impl Identified for Attrs {
        fn id(&self) -> u64 {
            self.id
        }
    }

    #[derive(Serialize, Default)]
    struct Changes {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    }

    fn attrs() -> Attrs {
        Attrs {
            id: 4,
            name: "node-a".to_string(),
        }
    }

    #[test]
    fn clone_is_independent() {
        let cell = EntityCell::loaded(attrs());
        let copy = cell.clone();
        cell.update(|a| a.name = "changed".to_string());

        assert_eq!(copy.read(|a| a.name.clone()).unwrap(), "node-a");
        assert_eq!(cell.read(|a| a.name.clone()).unwrap(), "changed");
    }

    #[test]
    fn clear_unloads() {
        let cell = EntityCell::loaded(attrs());
        cell.clear();
        assert_eq!(cell.snapshot(), EntityState::Unloaded);
        assert!(!cell.is_loaded());
    }

    #[test]
    fn update_on_unloaded_is_noop() {
        let cell: EntityCell<Attrs> = EntityCell::unloaded();
        cell.update(|a| a.id = 9);
        assert!(cell.attributes().is_none());
    }

    #[test]
    fn require_id_needs_loaded_state() {
        let cell = EntityCell::loaded(attrs());
        assert_eq!(require_id(&cell, "Node").unwrap(), 4);

        cell.clear();
        let err = require_id(&cell, "Node").unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn empty_update_is_rejected() {
        let err = update_payload(&Changes::default()).unwrap_err();
        assert_eq!(err, Error::validation("No update fields provided"));

        let payload = update_payload(&Changes {
            name: Some("x".to_string()),
        })
        .unwrap();
        assert_eq!(payload, json!({ "name": "x" }));
    }
}
