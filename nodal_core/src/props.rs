//! Property lists: option bundles passed to engine calls.
//!
//! Each list is a plain value built with chained setters. The node layer
//! never mutates a list it is handed; when it needs to add an option it
//! works on a local copy.

use serde::{Deserialize, Serialize};

/// Default limit on soft and external link traversals per lookup.
pub const DEFAULT_MAX_SOFT_LINKS: usize = 16;

/// Character encoding recorded for link names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CharEncoding {
    #[default]
    Ascii,
    Utf8,
}

/// Link creation properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkCreateProps {
    /// Create missing groups along the link path.
    pub create_intermediate_group: bool,
    /// Encoding recorded for the new link's name.
    pub char_encoding: CharEncoding,
}

impl LinkCreateProps {
    /// Create default link creation properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request (or stop requesting) creation of missing intermediate groups.
    pub fn create_intermediate_group(mut self, enabled: bool) -> Self {
        self.create_intermediate_group = enabled;
        self
    }

    /// Set the character encoding of link names.
    pub fn char_encoding(mut self, encoding: CharEncoding) -> Self {
        self.char_encoding = encoding;
        self
    }
}

/// Link access properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAccessProps {
    /// Maximum soft/external links followed while resolving one path.
    pub max_soft_links: usize,
    /// Directory prefix tried first when resolving external link files.
    pub external_link_prefix: Option<String>,
}

impl Default for LinkAccessProps {
    fn default() -> Self {
        Self {
            max_soft_links: DEFAULT_MAX_SOFT_LINKS,
            external_link_prefix: None,
        }
    }
}

impl LinkAccessProps {
    /// Create default link access properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the soft link traversal limit.
    pub fn max_soft_links(mut self, limit: usize) -> Self {
        self.max_soft_links = limit;
        self
    }

    /// Set the external link file prefix.
    pub fn external_link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.external_link_prefix = Some(prefix.into());
        self
    }
}

/// Creation order tracking for a group's links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCreationOrder {
    /// Record the creation order of each link.
    pub tracked: bool,
    /// Allow traversal by creation order. Requires `tracked`.
    pub indexed: bool,
}

impl Default for LinkCreationOrder {
    fn default() -> Self {
        Self {
            tracked: true,
            indexed: true,
        }
    }
}

/// Group creation properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupCreateProps {
    pub creation_order: LinkCreationOrder,
}

impl GroupCreateProps {
    /// Create default group creation properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set creation order tracking and indexing.
    pub fn creation_order(mut self, tracked: bool, indexed: bool) -> Self {
        self.creation_order = LinkCreationOrder { tracked, indexed };
        self
    }
}

/// Dataset creation properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSetCreateProps {
    /// Chunk dimensions (enables chunked storage).
    pub chunk_dims: Option<Vec<u64>>,
    /// Deflate compression level (0-9).
    pub deflate_level: Option<u32>,
}

impl DataSetCreateProps {
    /// Create default dataset creation properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set chunk dimensions.
    pub fn chunk(mut self, dims: &[u64]) -> Self {
        self.chunk_dims = Some(dims.to_vec());
        self
    }

    /// Set deflate compression level (0-9).
    pub fn deflate(mut self, level: u32) -> Self {
        self.deflate_level = Some(level);
        self
    }
}

/// Raw chunk cache parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkCache {
    pub slots: usize,
    pub bytes: usize,
    /// Preemption policy in `[0, 1]`.
    pub w0: f64,
}

/// Dataset access properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSetAccessProps {
    pub link: LinkAccessProps,
    pub chunk_cache: Option<ChunkCache>,
}

impl DataSetAccessProps {
    /// Create default dataset access properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the link access properties used to reach the dataset.
    pub fn link(mut self, link: LinkAccessProps) -> Self {
        self.link = link;
        self
    }

    /// Configure the raw data chunk cache.
    pub fn chunk_cache(mut self, slots: usize, bytes: usize, w0: f64) -> Self {
        self.chunk_cache = Some(ChunkCache { slots, bytes, w0 });
        self
    }
}

/// Named datatype access properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTypeAccessProps {
    pub link: LinkAccessProps,
}

impl DataTypeAccessProps {
    /// Create default datatype access properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the link access properties used to reach the datatype.
    pub fn link(mut self, link: LinkAccessProps) -> Self {
        self.link = link;
        self
    }
}

/// How [`crate::File::open`] treats the named file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Create a new file; fail if it exists.
    Create,
    /// Create a new file, replacing any existing one.
    Truncate,
    /// Open an existing file for reading only.
    ReadOnly,
    /// Open an existing file for reading and writing.
    ReadWrite,
    /// Open for reading and writing, creating the file if missing.
    OpenOrCreate,
}
