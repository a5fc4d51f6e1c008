//! Owned references to engine resources.

use crate::engine::Engine;
use crate::error::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Engine shared by every handle opened through it.
pub type SharedEngine = Arc<dyn Engine>;

/// Raw engine resource identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of resource behind a handle or path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    File,
    Group,
    /// A committed (named) datatype, or a transient one behind a handle.
    UserDataType,
    DataSpace,
    Dataset,
    Attribute,
    Other,
}

impl ObjectKind {
    /// Get the string name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::File => "file",
            ObjectKind::Group => "group",
            ObjectKind::UserDataType => "datatype",
            ObjectKind::DataSpace => "dataspace",
            ObjectKind::Dataset => "dataset",
            ObjectKind::Attribute => "attribute",
            ObjectKind::Other => "other",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An owned reference to an open engine resource.
///
/// Dropping a `Handle` releases exactly one engine reference. Use
/// [`Handle::try_clone`] to take an additional, independent reference.
pub struct Handle {
    engine: SharedEngine,
    id: HandleId,
    kind: ObjectKind,
}

impl Handle {
    /// Take ownership of one reference to `id`.
    pub(crate) fn from_raw(engine: SharedEngine, id: HandleId, kind: ObjectKind) -> Self {
        Self { engine, id, kind }
    }

    /// Take ownership of `id`, asking the engine for its kind.
    ///
    /// The reference is released even if the kind query fails.
    pub(crate) fn adopt(engine: SharedEngine, id: HandleId) -> Result<Self> {
        let mut handle = Self::from_raw(engine, id, ObjectKind::Other);
        handle.kind = handle
            .engine
            .kind_of(id)
            .map_err(|f| Error::from_fault(ErrorKind::Resource, format!("kind of {}", id), f))?;
        Ok(handle)
    }

    /// The raw identifier.
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// The kind recorded when the handle was obtained.
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// The engine this handle belongs to.
    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    /// Number of live references to the underlying id.
    pub fn ref_count(&self) -> Result<usize> {
        self.engine
            .ref_count(self.id)
            .map_err(|f| Error::from_fault(ErrorKind::Resource, format!("ref count of {}", self.id), f))
    }

    /// Take another reference to the same resource.
    pub fn try_clone(&self) -> Result<Self> {
        self.engine
            .inc_ref(self.id)
            .map_err(|f| Error::from_fault(ErrorKind::Resource, format!("inc ref of {}", self.id), f))?;
        Ok(Self::from_raw(Arc::clone(&self.engine), self.id, self.kind))
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if let Err(fault) = self.engine.close(self.id) {
            tracing::warn!(id = %self.id, kind = %self.kind, %fault, "failed to close handle");
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FaultCode;
    use crate::memory::MemoryEngine;
    use crate::props::GroupCreateProps;

    fn engine() -> SharedEngine {
        Arc::new(MemoryEngine::new())
    }

    #[test]
    fn test_clone_and_drop_track_ref_count() {
        let engine = engine();
        let id = engine
            .file_create("h.h5", false, &GroupCreateProps::default())
            .unwrap();
        let handle = Handle::adopt(Arc::clone(&engine), id).unwrap();
        assert_eq!(handle.kind(), ObjectKind::File);
        assert_eq!(handle.ref_count().unwrap(), 1);

        let copy = handle.try_clone().unwrap();
        assert_eq!(copy.id(), handle.id());
        assert_eq!(handle.ref_count().unwrap(), 2);

        drop(copy);
        assert_eq!(handle.ref_count().unwrap(), 1);

        drop(handle);
        let err = engine.ref_count(id).unwrap_err();
        assert_eq!(err.code, FaultCode::InvalidHandle);
    }

    #[test]
    fn test_adopt_invalid_id_fails() {
        let err = Handle::adopt(engine(), HandleId(9999)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ObjectKind::UserDataType.to_string(), "datatype");
        assert_eq!(ObjectKind::Dataset.as_str(), "dataset");
    }
}
