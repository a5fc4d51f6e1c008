//! The storage engine interface consumed by the node layer.
//!
//! [`Engine`] is shaped like a handle-based C API: every call takes raw
//! [`HandleId`]s and path strings, and failures come back as a raw
//! [`Fault`] rather than a typed error. The node layer translates faults
//! into [`crate::Error`] at the point of the call.
//!
//! Implementations are responsible for handle reference counting, path
//! resolution and link storage. [`crate::MemoryEngine`] is the in-process
//! implementation shipped with this crate.

use crate::handle::{HandleId, ObjectKind};
use crate::props::{
    CharEncoding, DataSetAccessProps, DataSetCreateProps, DataTypeAccessProps, GroupCreateProps,
    LinkAccessProps, LinkCreateProps,
};
use crate::types::TypeDescriptor;
use std::fmt;
use thiserror::Error;

/// Raw failure codes reported by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCode {
    /// A path, file, link or attribute does not exist.
    NotFound,
    /// A link or file with the requested name already exists.
    AlreadyExists,
    /// The call itself is malformed (bad name, bad option, out of range).
    InvalidArgument,
    /// The handle id is closed or unknown.
    InvalidHandle,
    /// The handle or path refers to the wrong kind of object.
    WrongKind,
    /// Mutation attempted through a read-only file.
    ReadOnly,
    /// Underlying storage failure.
    Io,
}

impl FaultCode {
    /// Get the string name of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultCode::NotFound => "not_found",
            FaultCode::AlreadyExists => "already_exists",
            FaultCode::InvalidArgument => "invalid_argument",
            FaultCode::InvalidHandle => "invalid_handle",
            FaultCode::WrongKind => "wrong_kind",
            FaultCode::ReadOnly => "read_only",
            FaultCode::Io => "io",
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw engine failure: a code plus a human-readable message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({code})")]
pub struct Fault {
    pub code: FaultCode,
    pub message: String,
}

impl Fault {
    /// Create a new fault.
    pub fn new(code: FaultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Result type for raw engine calls.
pub type EngineResult<T> = std::result::Result<T, Fault>;

/// Link type as stored by the engine.
///
/// `Error` is the sentinel an engine reports when it cannot classify a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawLinkType {
    Error,
    Hard,
    Soft,
    External,
    /// A registered user-defined link class.
    UserDefined(i32),
}

/// Metadata about a single link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub link_type: RawLinkType,
    /// Position in the owning group's creation order, if tracked.
    pub creation_order: Option<u64>,
    pub char_encoding: CharEncoding,
    /// Size of the stored link value (target path bytes for soft and
    /// external links, zero for hard links).
    pub value_size: usize,
}

/// Index used to order link traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexType {
    /// Ascending bytewise order of link names.
    #[default]
    ByName,
    /// Order in which links were added to the group.
    ByCreationOrder,
}

/// Direction of a link traversal over the chosen index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IterOrder {
    #[default]
    Increasing,
    Decreasing,
    /// Whatever order is cheapest for the engine.
    Native,
}

/// Returned by a [`LinkVisitor`] to continue or stop a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterControl {
    Continue,
    Stop,
}

/// Callback driven by [`Engine::link_iterate`] once per link.
pub trait LinkVisitor {
    fn visit(&mut self, name: &str, info: &LinkInfo) -> IterControl;
}

impl<F> LinkVisitor for F
where
    F: FnMut(&str, &LinkInfo) -> IterControl,
{
    fn visit(&mut self, name: &str, info: &LinkInfo) -> IterControl {
        self(name, info)
    }
}

/// Token returned by [`Engine::suppress_error_reporting`].
///
/// Carries the reporting state that must be put back by
/// [`Engine::restore_error_reporting`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "reporting stays suppressed until the token is restored"]
pub struct ReportingToken {
    was_enabled: bool,
}

impl ReportingToken {
    /// Create a token recording the previous reporting state.
    pub fn new(was_enabled: bool) -> Self {
        Self { was_enabled }
    }

    /// Whether reporting was enabled when the token was taken.
    pub fn was_enabled(&self) -> bool {
        self.was_enabled
    }
}

/// Handle-based storage engine.
///
/// Every successful call that returns a [`HandleId`] transfers one
/// reference to the caller, who must eventually pass it to
/// [`Engine::close`].
pub trait Engine: Send + Sync + fmt::Debug {
    // -----------------------------------------------------------------
    // Files
    // -----------------------------------------------------------------

    /// Create a file. Fails with `AlreadyExists` unless `truncate` is set.
    fn file_create(
        &self,
        name: &str,
        truncate: bool,
        root_props: &GroupCreateProps,
    ) -> EngineResult<HandleId>;

    /// Open an existing file.
    fn file_open(&self, name: &str, read_only: bool) -> EngineResult<HandleId>;

    /// Whether a file with this name is known to the engine.
    fn file_exists(&self, name: &str) -> bool;

    /// Name of the file a handle belongs to.
    fn file_name(&self, id: HandleId) -> EngineResult<String>;

    // -----------------------------------------------------------------
    // Handle lifecycle
    // -----------------------------------------------------------------

    /// Release one reference to `id`.
    fn close(&self, id: HandleId) -> EngineResult<()>;

    /// Add one reference to `id`.
    fn inc_ref(&self, id: HandleId) -> EngineResult<()>;

    /// Current reference count of `id`.
    fn ref_count(&self, id: HandleId) -> EngineResult<usize>;

    /// Kind of resource `id` refers to.
    fn kind_of(&self, id: HandleId) -> EngineResult<ObjectKind>;

    // -----------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------

    fn group_create(
        &self,
        loc: HandleId,
        name: &str,
        lcpl: &LinkCreateProps,
        gcpl: &GroupCreateProps,
    ) -> EngineResult<HandleId>;

    fn group_open(&self, loc: HandleId, name: &str, lapl: &LinkAccessProps)
    -> EngineResult<HandleId>;

    /// Number of links held directly by the group at `loc`.
    fn num_links(&self, loc: HandleId) -> EngineResult<u64>;

    // -----------------------------------------------------------------
    // Datatypes and dataspaces
    // -----------------------------------------------------------------

    /// Create a transient datatype.
    fn type_create(&self, descriptor: &TypeDescriptor) -> EngineResult<HandleId>;

    fn type_describe(&self, id: HandleId) -> EngineResult<TypeDescriptor>;

    /// Store a datatype in the file under `name`.
    fn type_commit(
        &self,
        loc: HandleId,
        name: &str,
        type_id: HandleId,
        lcpl: &LinkCreateProps,
    ) -> EngineResult<()>;

    fn type_open(
        &self,
        loc: HandleId,
        name: &str,
        tapl: &DataTypeAccessProps,
    ) -> EngineResult<HandleId>;

    /// Create a simple dataspace. An empty `dims` is a scalar space.
    fn space_create(&self, dims: &[u64]) -> EngineResult<HandleId>;

    fn space_dims(&self, id: HandleId) -> EngineResult<Vec<u64>>;

    // -----------------------------------------------------------------
    // Datasets
    // -----------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn dataset_create(
        &self,
        loc: HandleId,
        name: &str,
        type_id: HandleId,
        space_id: HandleId,
        lcpl: &LinkCreateProps,
        dcpl: &DataSetCreateProps,
        dapl: &DataSetAccessProps,
    ) -> EngineResult<HandleId>;

    fn dataset_open(
        &self,
        loc: HandleId,
        name: &str,
        dapl: &DataSetAccessProps,
    ) -> EngineResult<HandleId>;

    /// Datatype of a dataset, as a new transient type handle.
    fn dataset_type(&self, id: HandleId) -> EngineResult<HandleId>;

    /// Dataspace of a dataset, as a new dataspace handle.
    fn dataset_space(&self, id: HandleId) -> EngineResult<HandleId>;

    /// Replace the full contents of a dataset.
    fn dataset_write(&self, id: HandleId, mem_type: HandleId, data: &[u8]) -> EngineResult<()>;

    /// Read the full contents of a dataset.
    fn dataset_read(&self, id: HandleId, mem_type: HandleId) -> EngineResult<Vec<u8>>;

    // -----------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------

    fn attribute_create(
        &self,
        obj: HandleId,
        name: &str,
        type_id: HandleId,
        space_id: HandleId,
    ) -> EngineResult<HandleId>;

    fn attribute_open(&self, obj: HandleId, name: &str) -> EngineResult<HandleId>;

    // -----------------------------------------------------------------
    // Links
    // -----------------------------------------------------------------

    /// Link `name` (relative to `loc`) to the object at `target_path`
    /// relative to `target`.
    fn link_create_hard(
        &self,
        target: HandleId,
        target_path: &str,
        loc: HandleId,
        name: &str,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
    ) -> EngineResult<()>;

    /// Store a symbolic link. The target is not resolved.
    fn link_create_soft(
        &self,
        target_path: &str,
        loc: HandleId,
        name: &str,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
    ) -> EngineResult<()>;

    /// Store a link into another file. Neither file nor path is resolved.
    #[allow(clippy::too_many_arguments)]
    fn link_create_external(
        &self,
        file_name: &str,
        obj_path: &str,
        loc: HandleId,
        name: &str,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
    ) -> EngineResult<()>;

    fn link_delete(&self, loc: HandleId, path: &str, lapl: &LinkAccessProps) -> EngineResult<()>;

    fn link_move(
        &self,
        src_loc: HandleId,
        src: &str,
        dst_loc: HandleId,
        dst: &str,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
    ) -> EngineResult<()>;

    /// Whether the final link of `path` exists.
    ///
    /// A missing final segment is `Ok(false)`; a missing intermediate
    /// segment is a `NotFound` fault. The final link is not resolved, so a
    /// dangling soft link exists.
    fn link_exists(&self, loc: HandleId, path: &str, lapl: &LinkAccessProps)
    -> EngineResult<bool>;

    fn link_info(&self, loc: HandleId, path: &str, lapl: &LinkAccessProps)
    -> EngineResult<LinkInfo>;

    /// Visit the links of the group at `loc`, starting at position `start`
    /// of the chosen index. Returns the position after the last visited link.
    fn link_iterate(
        &self,
        loc: HandleId,
        index: IndexType,
        order: IterOrder,
        start: u64,
        visitor: &mut dyn LinkVisitor,
    ) -> EngineResult<u64>;

    /// Copy the name of the `n`-th link of the group at `group_path` into
    /// `buf`, truncating if `buf` is short. Returns the full name length in
    /// bytes, so callers can query with an empty buffer first.
    #[allow(clippy::too_many_arguments)]
    fn link_name_by_index(
        &self,
        loc: HandleId,
        group_path: &str,
        index: IndexType,
        order: IterOrder,
        n: u64,
        buf: &mut [u8],
        lapl: &LinkAccessProps,
    ) -> EngineResult<usize>;

    // -----------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------

    /// Open whatever object `path` resolves to, following every link.
    fn object_open(&self, loc: HandleId, path: &str, lapl: &LinkAccessProps)
    -> EngineResult<HandleId>;

    // -----------------------------------------------------------------
    // Error reporting side channel
    // -----------------------------------------------------------------

    /// Stop reporting faults until the token is restored.
    fn suppress_error_reporting(&self) -> ReportingToken;

    /// Put reporting back to the state recorded in `token`.
    fn restore_error_reporting(&self, token: ReportingToken);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_display_includes_code() {
        let fault = Fault::new(FaultCode::NotFound, "component 'a' not found");
        assert_eq!(fault.to_string(), "component 'a' not found (not_found)");
    }

    #[test]
    fn test_closure_visitor() {
        let info = LinkInfo {
            link_type: RawLinkType::Hard,
            creation_order: Some(0),
            char_encoding: CharEncoding::Ascii,
            value_size: 0,
        };
        let mut seen = Vec::new();
        let mut visitor = |name: &str, _: &LinkInfo| {
            seen.push(name.to_string());
            IterControl::Stop
        };
        assert_eq!(visitor.visit("x", &info), IterControl::Stop);
        assert_eq!(seen, vec!["x"]);
    }
}
