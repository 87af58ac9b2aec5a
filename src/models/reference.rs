//! Deferred container references
//!
//! Fields can be built before the record that owns them, and records before
//! the schema that owns them. Such orphaned items hold a [`ContainerRef`]
//! that is filled in place once the container takes ownership. The cell is
//! shared between clones, so every copy handed out before attachment sees the
//! container afterwards.

use super::error::{ConstructionError, ItemKind, Result, SchemaError};
use std::sync::{Arc, OnceLock};

/// Placeholder id reported by a reference that has not been attached yet
pub const UNATTACHED: &str = "None";

/// Shared, write-once reference to the id of an owning container
#[derive(Debug, Clone, Default)]
pub struct ContainerRef {
    cell: Arc<OnceLock<String>>,
}

impl ContainerRef {
    /// Create a reference that is not attached to any container
    pub fn detached() -> Self {
        Self::default()
    }

    /// Create a reference already attached to `container_id`
    pub fn attached_to(container_id: impl Into<String>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(container_id.into());
        Self {
            cell: Arc::new(cell),
        }
    }

    /// Attach the reference to `container_id`.
    ///
    /// Attaching again to the same container is a no-op; attaching to a
    /// different one fails, since the child is already owned elsewhere.
    pub fn attach(&self, container_id: &str, kind: ItemKind, child_id: &str) -> Result<()> {
        let current = self.cell.get_or_init(|| container_id.to_string());
        if current != container_id {
            return Err(already_attached(current, container_id, kind, child_id));
        }
        Ok(())
    }

    /// Whether [`attach`](Self::attach) would succeed, without attaching
    pub fn check_attach(&self, container_id: &str, kind: ItemKind, child_id: &str) -> Result<()> {
        match self.get() {
            Some(current) if current != container_id => {
                Err(already_attached(current, container_id, kind, child_id))
            }
            _ => Ok(()),
        }
    }

    /// Container id, if attached
    pub fn get(&self) -> Option<&str> {
        self.cell.get().map(String::as_str)
    }

    /// Container id, or [`UNATTACHED`] before attachment
    pub fn id(&self) -> &str {
        self.get().unwrap_or(UNATTACHED)
    }

    pub fn is_attached(&self) -> bool {
        self.cell.get().is_some()
    }
}

fn already_attached(
    attached: &str,
    requested: &str,
    kind: ItemKind,
    child_id: &str,
) -> SchemaError {
    ConstructionError::AlreadyAttached {
        kind,
        id: child_id.to_string(),
        attached: attached.to_string(),
        requested: requested.to_string(),
    }
    .into()
}
