//! # Nodal Core
//!
//! Hierarchical node management over a handle-based storage engine, in the
//! style of HDF5 groups and links.
//!
//! A container file holds a tree of named links. Links point at groups,
//! datasets and committed datatypes, either directly (hard links), by path
//! (soft links) or by path into another file (external links). This crate
//! layers typed, path-addressed operations over an [`Engine`] that only
//! speaks raw handle ids and fault codes.
//!
//! ## Features
//!
//! - One node surface ([`NodeTraits`]) shared by files and groups
//! - Hard, soft and external links with optional parent creation
//! - Existence checks that never report noise for missing paths
//! - Listing children by name or by creation order
//! - An in-memory engine with JSON images for persistence
//!
//! ## Example
//!
//! ```no_run
//! use nodal_core::{
//!     DataSetAccessProps, DataSetCreateProps, File, FileMode, IndexType, MemoryEngine,
//!     NodeTraits,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Arc::new(MemoryEngine::new());
//! let file = File::open(engine.clone(), "data.h5", FileMode::Create)?;
//!
//! // Create a dataset, creating missing groups on the way
//! let values = vec![1.0f64, 2.0, 3.0];
//! file.create_dataset_with(
//!     "runs/first/values",
//!     &values,
//!     &DataSetCreateProps::default(),
//!     &DataSetAccessProps::default(),
//!     true,
//! )?;
//!
//! assert!(file.exist("runs/first/values")?);
//! println!("{:?}", file.list_object_names(IndexType::ByName)?);
//!
//! // Persist the file
//! engine.save_image("data.h5", std::path::Path::new("data.json"))?;
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod handle;
mod image;
mod iterate;
mod link;
mod memory;
mod node;
mod object;
mod path;
mod props;
mod silence;
mod types;

pub use engine::{
    Engine, EngineResult, Fault, FaultCode, IndexType, IterControl, IterOrder, LinkInfo,
    LinkVisitor, RawLinkType, ReportingToken,
};
pub use error::{Error, ErrorKind, Result};
pub use handle::{Handle, HandleId, ObjectKind, SharedEngine};
pub use image::IMAGE_VERSION;
pub use iterate::NameCollector;
pub use link::{
    LinkKind, create_external_link, create_hard_link, create_soft_link, delete_link, link_exists,
    link_kind, move_link, object_kind,
};
pub use memory::{DEFAULT_DIAGNOSTICS_LIMIT, MAX_DATA_BYTES, MemoryEngine};
pub use node::{Container, NodeTraits};
pub use object::{Annotate, Attribute, DataSet, DataSpace, DataType, File, Group, Object};
pub use path::{ROOT, SEPARATOR, is_absolute, is_multi_segment, is_root, needs_intermediate_creation};
pub use props::{
    CharEncoding, ChunkCache, DataSetAccessProps, DataSetCreateProps, DataTypeAccessProps,
    DEFAULT_MAX_SOFT_LINKS, FileMode, GroupCreateProps, LinkAccessProps, LinkCreateProps,
    LinkCreationOrder,
};
pub use silence::SilenceReports;
pub use types::{DataValue, H5Type, TypeDescriptor, element_count};
