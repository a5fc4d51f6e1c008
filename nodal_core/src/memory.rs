//! In-memory storage engine.
//!
//! [`MemoryEngine`] keeps every file as an arena of objects addressed by
//! number, with groups holding ordered link tables. All state lives behind
//! one `Mutex`; calls are short and never re-enter the engine while the lock
//! is held, so link iteration callbacks run after the lock is released.
//!
//! Objects are reclaimed once their last hard link is removed and no open
//! handle refers to them.

use crate::engine::{
    Engine, EngineResult, Fault, FaultCode, IndexType, IterControl, IterOrder, LinkInfo,
    LinkVisitor, RawLinkType, ReportingToken,
};
use crate::handle::{HandleId, ObjectKind};
use crate::path;
use crate::props::{
    CharEncoding, DataSetAccessProps, DataSetCreateProps, DataTypeAccessProps, GroupCreateProps,
    LinkAccessProps, LinkCreateProps, LinkCreationOrder,
};
use crate::types::{TypeDescriptor, byte_len};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, warn};

/// Number of fault reports kept by default.
pub const DEFAULT_DIAGNOSTICS_LIMIT: usize = 64;

/// Largest element buffer a dataset or attribute may hold.
pub const MAX_DATA_BYTES: usize = 1 << 32;

pub(crate) type Addr = u64;

/// What a stored link points to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum LinkValue {
    Hard(Addr),
    Soft(String),
    External { file: String, path: String },
}

impl LinkValue {
    fn raw_type(&self) -> RawLinkType {
        match self {
            LinkValue::Hard(_) => RawLinkType::Hard,
            LinkValue::Soft(_) => RawLinkType::Soft,
            LinkValue::External { .. } => RawLinkType::External,
        }
    }

    fn value_size(&self) -> usize {
        match self {
            LinkValue::Hard(_) => 0,
            LinkValue::Soft(target) => target.len() + 1,
            LinkValue::External { file, path } => file.len() + path.len() + 2,
        }
    }

    fn hard_target(&self) -> Option<Addr> {
        match self {
            LinkValue::Hard(addr) => Some(*addr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LinkEntry {
    pub name: String,
    pub value: LinkValue,
    pub creation_order: u64,
    pub char_encoding: CharEncoding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GroupNode {
    pub links: Vec<LinkEntry>,
    pub next_order: u64,
    pub creation_order: LinkCreationOrder,
}

impl GroupNode {
    fn new(creation_order: LinkCreationOrder) -> Self {
        Self {
            links: Vec::new(),
            next_order: 0,
            creation_order,
        }
    }

    fn find(&self, name: &str) -> Option<&LinkEntry> {
        self.links.iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DatasetNode {
    pub dtype: TypeDescriptor,
    pub dims: Vec<u64>,
    pub chunk_dims: Option<Vec<u64>>,
    pub deflate_level: Option<u32>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AttributeNode {
    pub dtype: TypeDescriptor,
    pub dims: Vec<u64>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum NodeBody {
    Group(GroupNode),
    Dataset(DatasetNode),
    Datatype(TypeDescriptor),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredObject {
    pub body: NodeBody,
    pub attributes: BTreeMap<String, AttributeNode>,
    pub hard_links: usize,
}

impl StoredObject {
    fn new(body: NodeBody) -> Self {
        Self {
            body,
            attributes: BTreeMap::new(),
            hard_links: 0,
        }
    }

    fn kind(&self) -> ObjectKind {
        match self.body {
            NodeBody::Group(_) => ObjectKind::Group,
            NodeBody::Dataset(_) => ObjectKind::Dataset,
            NodeBody::Datatype(_) => ObjectKind::UserDataType,
        }
    }
}

/// One file: an object arena plus the address of its root group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FileImage {
    pub root: Addr,
    pub next_addr: Addr,
    pub objects: BTreeMap<Addr, StoredObject>,
}

impl FileImage {
    fn new(creation_order: LinkCreationOrder) -> Self {
        let mut root = StoredObject::new(NodeBody::Group(GroupNode::new(creation_order)));
        // The root is never reclaimed.
        root.hard_links = 1;
        Self {
            root: 0,
            next_addr: 1,
            objects: BTreeMap::from([(0, root)]),
        }
    }

    fn alloc(&mut self, body: NodeBody) -> Addr {
        let addr = self.next_addr;
        self.next_addr += 1;
        self.objects.insert(addr, StoredObject::new(body));
        addr
    }

    fn get(&self, addr: Addr) -> EngineResult<&StoredObject> {
        self.objects
            .get(&addr)
            .ok_or_else(|| Fault::new(FaultCode::Io, format!("dangling object address {}", addr)))
    }

    fn get_mut(&mut self, addr: Addr) -> EngineResult<&mut StoredObject> {
        self.objects
            .get_mut(&addr)
            .ok_or_else(|| Fault::new(FaultCode::Io, format!("dangling object address {}", addr)))
    }

    fn group_mut(&mut self, addr: Addr) -> EngineResult<&mut GroupNode> {
        match &mut self.get_mut(addr)?.body {
            NodeBody::Group(group) => Ok(group),
            _ => Err(Fault::new(FaultCode::WrongKind, "object is not a group")),
        }
    }
}

/// A stored object: file name plus address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ObjRef {
    file: String,
    addr: Addr,
}

/// Where a new link will go, resolved before any group is created.
struct ParentPlan {
    /// Deepest group on the path that already exists.
    existing: ObjRef,
    /// Groups still to be created below `existing`, outermost first.
    missing: Vec<String>,
    last: String,
}

#[derive(Debug, Clone)]
enum Target {
    File { file: String, read_only: bool },
    Object { obj: ObjRef, read_only: bool },
    Attribute { obj: ObjRef },
    Type(TypeDescriptor),
    Space(Vec<u64>),
}

impl Target {
    fn file(&self) -> Option<&str> {
        match self {
            Target::File { file, .. } => Some(file.as_str()),
            Target::Object { obj, .. } | Target::Attribute { obj, .. } => Some(obj.file.as_str()),
            Target::Type(_) | Target::Space(_) => None,
        }
    }

    fn object(&self) -> Option<&ObjRef> {
        match self {
            Target::Object { obj, .. } | Target::Attribute { obj, .. } => Some(obj),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Slot {
    target: Target,
    refs: usize,
}

/// Split a path into the segments the engine walks. `.` is a no-op.
fn split(path: &str) -> Vec<&str> {
    path::segments(path).filter(|s| *s != ".").collect()
}

/// Bytes needed to store `dims` elements of `dtype`.
pub(crate) fn data_size(dims: &[u64], dtype: &TypeDescriptor) -> EngineResult<usize> {
    byte_len(dims, dtype.size())
        .filter(|&bytes| bytes <= MAX_DATA_BYTES)
        .ok_or_else(|| {
            Fault::new(
                FaultCode::InvalidArgument,
                format!("dataspace {:?} of {} is too large", dims, dtype.name()),
            )
        })
}

fn validate_link_name(name: &str) -> EngineResult<()> {
    if name.is_empty() || name == "." || name.contains(path::SEPARATOR) {
        return Err(Fault::new(
            FaultCode::InvalidArgument,
            format!("invalid link name '{}'", name),
        ));
    }
    Ok(())
}

fn validate_dcpl(dims: &[u64], dcpl: &DataSetCreateProps) -> EngineResult<()> {
    if let Some(chunk) = &dcpl.chunk_dims {
        if dims.is_empty() {
            return Err(Fault::new(
                FaultCode::InvalidArgument,
                "chunked layout requires a non-scalar dataspace",
            ));
        }
        if chunk.len() != dims.len() {
            return Err(Fault::new(
                FaultCode::InvalidArgument,
                format!(
                    "chunk rank {} does not match dataspace rank {}",
                    chunk.len(),
                    dims.len()
                ),
            ));
        }
        if chunk.contains(&0) {
            return Err(Fault::new(
                FaultCode::InvalidArgument,
                "chunk dimensions must be positive",
            ));
        }
    }
    if let Some(level) = dcpl.deflate_level {
        if level > 9 {
            return Err(Fault::new(
                FaultCode::InvalidArgument,
                format!("deflate level {} out of range 0-9", level),
            ));
        }
        if dcpl.chunk_dims.is_none() {
            return Err(Fault::new(
                FaultCode::InvalidArgument,
                "filters require chunked layout",
            ));
        }
    }
    Ok(())
}

fn validate_dapl(dapl: &DataSetAccessProps) -> EngineResult<()> {
    if let Some(cache) = &dapl.chunk_cache
        && !(0.0..=1.0).contains(&cache.w0)
    {
        return Err(Fault::new(
            FaultCode::InvalidArgument,
            format!("chunk cache w0 {} out of range [0, 1]", cache.w0),
        ));
    }
    Ok(())
}

/// Engine state guarded by the engine's mutex.
#[derive(Debug)]
pub(crate) struct State {
    pub(crate) files: HashMap<String, FileImage>,
    handles: HashMap<HandleId, Slot>,
    next_handle: u64,
    reporting: bool,
    diagnostics: VecDeque<String>,
    diagnostics_limit: usize,
}

impl State {
    fn new(diagnostics_limit: usize) -> Self {
        Self {
            files: HashMap::new(),
            handles: HashMap::new(),
            next_handle: 1,
            reporting: true,
            diagnostics: VecDeque::new(),
            diagnostics_limit,
        }
    }

    /// Send a failed result through the error reporting side channel.
    fn report<T>(&mut self, result: EngineResult<T>) -> EngineResult<T> {
        if let Err(fault) = &result
            && self.reporting
        {
            warn!(code = %fault.code, "engine fault: {}", fault.message);
            if self.diagnostics_limit > 0 {
                if self.diagnostics.len() == self.diagnostics_limit {
                    self.diagnostics.pop_front();
                }
                self.diagnostics.push_back(fault.to_string());
            }
        }
        result
    }

    // -----------------------------------------------------------------
    // Handles
    // -----------------------------------------------------------------

    fn open_handle(&mut self, target: Target) -> HandleId {
        let id = HandleId(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(id, Slot { target, refs: 1 });
        id
    }

    fn slot_mut(&mut self, id: HandleId) -> EngineResult<&mut Slot> {
        self.handles.get_mut(&id).ok_or_else(|| invalid_handle(id))
    }

    fn target(&self, id: HandleId) -> EngineResult<&Target> {
        self.handles
            .get(&id)
            .map(|slot| &slot.target)
            .ok_or_else(|| invalid_handle(id))
    }

    /// Object a handle addresses paths from, and whether it is read-only.
    fn location(&self, id: HandleId) -> EngineResult<(ObjRef, bool)> {
        match self.target(id)? {
            Target::File { file, read_only } => Ok((self.root_of(file)?, *read_only)),
            Target::Object { obj, read_only } => Ok((obj.clone(), *read_only)),
            _ => Err(Fault::new(
                FaultCode::WrongKind,
                format!("handle {} is not a file or object", id),
            )),
        }
    }

    fn writable(&self, id: HandleId) -> EngineResult<ObjRef> {
        let (obj, read_only) = self.location(id)?;
        if read_only {
            return Err(read_only_fault(&obj.file));
        }
        Ok(obj)
    }

    pub(crate) fn file_in_use(&self, name: &str) -> bool {
        self.handles
            .values()
            .any(|slot| slot.target.file() == Some(name))
    }

    fn is_open(&self, obj: &ObjRef) -> bool {
        self.handles
            .values()
            .any(|slot| slot.target.object() == Some(obj))
    }

    // -----------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------

    fn file(&self, name: &str) -> EngineResult<&FileImage> {
        self.files
            .get(name)
            .ok_or_else(|| Fault::new(FaultCode::NotFound, format!("file '{}' not found", name)))
    }

    fn file_mut(&mut self, name: &str) -> EngineResult<&mut FileImage> {
        self.files
            .get_mut(name)
            .ok_or_else(|| Fault::new(FaultCode::NotFound, format!("file '{}' not found", name)))
    }

    fn root_of(&self, file: &str) -> EngineResult<ObjRef> {
        Ok(ObjRef {
            file: file.to_string(),
            addr: self.file(file)?.root,
        })
    }

    fn object(&self, obj: &ObjRef) -> EngineResult<&StoredObject> {
        self.file(&obj.file)?.get(obj.addr)
    }

    fn object_mut(&mut self, obj: &ObjRef) -> EngineResult<&mut StoredObject> {
        self.file_mut(&obj.file)?.get_mut(obj.addr)
    }

    fn group(&self, obj: &ObjRef) -> EngineResult<&GroupNode> {
        match &self.object(obj)?.body {
            NodeBody::Group(group) => Ok(group),
            _ => Err(Fault::new(FaultCode::WrongKind, "object is not a group")),
        }
    }

    fn dataset(&self, id: HandleId) -> EngineResult<(ObjRef, bool, &DatasetNode)> {
        if let Target::Object { obj, read_only } = self.target(id)?
            && let NodeBody::Dataset(node) = &self.object(obj)?.body
        {
            return Ok((obj.clone(), *read_only, node));
        }
        Err(Fault::new(
            FaultCode::WrongKind,
            format!("handle {} is not a dataset", id),
        ))
    }

    fn describe_type(&self, id: HandleId) -> EngineResult<TypeDescriptor> {
        match self.target(id)? {
            Target::Type(descriptor) => Ok(*descriptor),
            Target::Object { obj, .. } => match &self.object(obj)?.body {
                NodeBody::Datatype(descriptor) => Ok(*descriptor),
                _ => Err(not_a_type(id)),
            },
            _ => Err(not_a_type(id)),
        }
    }

    fn dims_of(&self, id: HandleId) -> EngineResult<Vec<u64>> {
        match self.target(id)? {
            Target::Space(dims) => Ok(dims.clone()),
            _ => Err(Fault::new(
                FaultCode::WrongKind,
                format!("handle {} is not a dataspace", id),
            )),
        }
    }

    // -----------------------------------------------------------------
    // Path resolution
    // -----------------------------------------------------------------

    fn base(&self, start: &ObjRef, path: &str) -> EngineResult<ObjRef> {
        if path::is_absolute(path) {
            self.root_of(&start.file)
        } else {
            Ok(start.clone())
        }
    }

    /// Follow `segs` from `cur`, resolving every link on the way.
    fn walk(
        &self,
        mut cur: ObjRef,
        path: &str,
        segs: &[&str],
        lapl: &LinkAccessProps,
        hops: &mut usize,
    ) -> EngineResult<ObjRef> {
        for seg in segs {
            let entry = self.group(&cur)?.find(seg).ok_or_else(|| {
                Fault::new(
                    FaultCode::NotFound,
                    format!("component '{}' of '{}' does not exist", seg, path),
                )
            })?;
            cur = self.follow(&cur, &entry.value, lapl, hops)?;
        }
        Ok(cur)
    }

    /// Resolve `value`, a link stored in group `holder`.
    fn follow(
        &self,
        holder: &ObjRef,
        value: &LinkValue,
        lapl: &LinkAccessProps,
        hops: &mut usize,
    ) -> EngineResult<ObjRef> {
        match value {
            LinkValue::Hard(addr) => Ok(ObjRef {
                file: holder.file.clone(),
                addr: *addr,
            }),
            LinkValue::Soft(target) => {
                count_hop(lapl, hops, target)?;
                self.resolve(holder, target, lapl, hops)
            }
            LinkValue::External { file, path } => {
                count_hop(lapl, hops, path)?;
                let file = self.external_file(file, lapl)?;
                let root = self.root_of(&file)?;
                self.resolve(&root, path, lapl, hops)
            }
        }
    }

    fn resolve(
        &self,
        start: &ObjRef,
        path: &str,
        lapl: &LinkAccessProps,
        hops: &mut usize,
    ) -> EngineResult<ObjRef> {
        let base = self.base(start, path)?;
        self.walk(base, path, &split(path), lapl, hops)
    }

    fn external_file(&self, name: &str, lapl: &LinkAccessProps) -> EngineResult<String> {
        if let Some(prefix) = &lapl.external_link_prefix {
            let candidate = path::join(prefix, name);
            if self.files.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
        if self.files.contains_key(name) {
            return Ok(name.to_string());
        }
        Err(Fault::new(
            FaultCode::NotFound,
            format!("external file '{}' not found", name),
        ))
    }

    /// Resolve everything but the final segment of `path`.
    fn lookup_parent(
        &self,
        start: &ObjRef,
        path: &str,
        lapl: &LinkAccessProps,
    ) -> EngineResult<(ObjRef, String)> {
        let segs = split(path);
        let (last, parents) = segs.split_last().ok_or_else(|| no_final_link(path))?;
        let base = self.base(start, path)?;
        let parent = self.walk(base, path, parents, lapl, &mut 0)?;
        self.group(&parent)?;
        Ok((parent, last.to_string()))
    }

    /// Resolve the parent of `path` without changing anything. Missing
    /// groups are allowed only when `lcpl` asks for intermediate creation.
    fn plan_parent(
        &self,
        start: &ObjRef,
        path: &str,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
    ) -> EngineResult<ParentPlan> {
        let segs = split(path);
        let (last, parents) = segs.split_last().ok_or_else(|| no_final_link(path))?;
        let mut cur = self.base(start, path)?;
        let mut hops = 0;
        let mut missing = Vec::new();
        for seg in parents {
            if !missing.is_empty() {
                missing.push(seg.to_string());
                continue;
            }
            let existing = self.group(&cur)?.find(seg).map(|e| e.value.clone());
            match existing {
                Some(value) => cur = self.follow(&cur, &value, lapl, &mut hops)?,
                None if lcpl.create_intermediate_group => missing.push(seg.to_string()),
                None => {
                    return Err(Fault::new(
                        FaultCode::NotFound,
                        format!("component '{}' of '{}' does not exist", seg, path),
                    ));
                }
            }
        }
        self.group(&cur)?;
        validate_link_name(last)?;
        Ok(ParentPlan {
            existing: cur,
            missing,
            last: last.to_string(),
        })
    }

    /// Create the groups a plan is missing and return the final parent.
    fn build_parent(
        &mut self,
        plan: ParentPlan,
        lcpl: &LinkCreateProps,
    ) -> EngineResult<(ObjRef, String)> {
        let mut cur = plan.existing;
        for seg in &plan.missing {
            let body = NodeBody::Group(GroupNode::new(LinkCreationOrder::default()));
            let addr = self.file_mut(&cur.file)?.alloc(body);
            self.insert_link(&cur, seg, LinkValue::Hard(addr), lcpl.char_encoding)?;
            debug!(file = %cur.file, group = %seg, "created intermediate group");
            cur = ObjRef {
                file: cur.file.clone(),
                addr,
            };
        }
        Ok((cur, plan.last))
    }

    /// Like [`State::lookup_parent`], creating missing groups when `lcpl`
    /// asks for it.
    fn prepare_parent(
        &mut self,
        start: &ObjRef,
        path: &str,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
    ) -> EngineResult<(ObjRef, String)> {
        let plan = self.plan_parent(start, path, lcpl, lapl)?;
        self.build_parent(plan, lcpl)
    }

    // -----------------------------------------------------------------
    // Link tables
    // -----------------------------------------------------------------

    /// Append a link without touching hard link counts.
    fn push_link(
        &mut self,
        parent: &ObjRef,
        name: &str,
        value: LinkValue,
        char_encoding: CharEncoding,
    ) -> EngineResult<()> {
        validate_link_name(name)?;
        let group = self.file_mut(&parent.file)?.group_mut(parent.addr)?;
        if group.find(name).is_some() {
            return Err(Fault::new(
                FaultCode::AlreadyExists,
                format!("link '{}' already exists", name),
            ));
        }
        let creation_order = group.next_order;
        group.next_order += 1;
        group.links.push(LinkEntry {
            name: name.to_string(),
            value,
            creation_order,
            char_encoding,
        });
        Ok(())
    }

    fn insert_link(
        &mut self,
        parent: &ObjRef,
        name: &str,
        value: LinkValue,
        char_encoding: CharEncoding,
    ) -> EngineResult<()> {
        let hard = value.hard_target();
        if let Some(addr) = hard {
            self.file(&parent.file)?.get(addr)?;
        }
        self.push_link(parent, name, value, char_encoding)?;
        if let Some(addr) = hard {
            self.file_mut(&parent.file)?.get_mut(addr)?.hard_links += 1;
        }
        Ok(())
    }

    fn remove_link(&mut self, parent: &ObjRef, name: &str) -> EngineResult<LinkEntry> {
        let group = self.file_mut(&parent.file)?.group_mut(parent.addr)?;
        let pos = group
            .links
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| {
                Fault::new(FaultCode::NotFound, format!("link '{}' does not exist", name))
            })?;
        Ok(group.links.remove(pos))
    }

    /// Drop a removed link's hard reference, reclaiming what became unreachable.
    fn release_link(&mut self, parent: &ObjRef, entry: &LinkEntry) {
        if let Some(addr) = entry.value.hard_target() {
            if let Ok(obj) = self.file_mut(&parent.file).and_then(|f| f.get_mut(addr)) {
                obj.hard_links = obj.hard_links.saturating_sub(1);
            }
            self.release_if_orphaned(ObjRef {
                file: parent.file.clone(),
                addr,
            });
        }
    }

    fn release_if_orphaned(&mut self, obj: ObjRef) {
        let mut pending = vec![obj];
        while let Some(obj) = pending.pop() {
            if self.is_open(&obj) {
                continue;
            }
            let Some(file) = self.files.get_mut(&obj.file) else {
                continue;
            };
            let orphaned = obj.addr != file.root
                && file
                    .objects
                    .get(&obj.addr)
                    .is_some_and(|o| o.hard_links == 0);
            if !orphaned {
                continue;
            }
            let Some(removed) = file.objects.remove(&obj.addr) else {
                continue;
            };
            trace!(file = %obj.file, addr = obj.addr, "reclaimed object");
            if let NodeBody::Group(group) = removed.body {
                for addr in group.links.iter().filter_map(|e| e.value.hard_target()) {
                    if let Some(child) = file.objects.get_mut(&addr) {
                        child.hard_links = child.hard_links.saturating_sub(1);
                    }
                    pending.push(ObjRef {
                        file: obj.file.clone(),
                        addr,
                    });
                }
            }
        }
    }

    /// True if `to` is `from` or reachable from it through hard links.
    fn reaches(&self, from: &ObjRef, to: &ObjRef) -> bool {
        if from.file != to.file {
            return false;
        }
        let Some(file) = self.files.get(&from.file) else {
            return false;
        };
        let mut seen = HashSet::new();
        let mut stack = vec![from.addr];
        while let Some(addr) = stack.pop() {
            if addr == to.addr {
                return true;
            }
            if !seen.insert(addr) {
                continue;
            }
            if let Some(StoredObject {
                body: NodeBody::Group(group),
                ..
            }) = file.objects.get(&addr)
            {
                stack.extend(group.links.iter().filter_map(|e| e.value.hard_target()));
            }
        }
        false
    }

    fn sorted_links(
        &self,
        obj: &ObjRef,
        index: IndexType,
        order: IterOrder,
    ) -> EngineResult<Vec<(String, LinkInfo)>> {
        let group = self.group(obj)?;
        let mut entries: Vec<&LinkEntry> = group.links.iter().collect();
        match index {
            IndexType::ByName => entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes())),
            IndexType::ByCreationOrder => {
                if !(group.creation_order.tracked && group.creation_order.indexed) {
                    return Err(Fault::new(
                        FaultCode::InvalidArgument,
                        "creation order is not indexed for this group",
                    ));
                }
                entries.sort_by_key(|e| e.creation_order);
            }
        }
        if order == IterOrder::Decreasing {
            entries.reverse();
        }
        let tracked = group.creation_order.tracked;
        Ok(entries
            .into_iter()
            .map(|e| (e.name.clone(), link_info(e, tracked)))
            .collect())
    }

    fn create_object(
        &mut self,
        loc: HandleId,
        name: &str,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
        body: NodeBody,
    ) -> EngineResult<ObjRef> {
        let start = self.writable(loc)?;
        let (parent, last) = self.prepare_parent(&start, name, lcpl, lapl)?;
        if self.group(&parent)?.find(&last).is_some() {
            return Err(Fault::new(
                FaultCode::AlreadyExists,
                format!("link '{}' already exists", name),
            ));
        }
        let addr = self.file_mut(&parent.file)?.alloc(body);
        let obj = ObjRef {
            file: parent.file.clone(),
            addr,
        };
        if let Err(fault) = self.insert_link(&parent, &last, LinkValue::Hard(addr), lcpl.char_encoding)
        {
            self.release_if_orphaned(obj);
            return Err(fault);
        }
        debug!(file = %obj.file, path = %name, addr, "created object");
        Ok(obj)
    }

    fn open_path(
        &self,
        loc: HandleId,
        path: &str,
        lapl: &LinkAccessProps,
    ) -> EngineResult<(ObjRef, bool)> {
        if path.is_empty() {
            return Err(Fault::new(FaultCode::InvalidArgument, "empty path"));
        }
        let (start, read_only) = self.location(loc)?;
        let obj = self.resolve(&start, path, lapl, &mut 0)?;
        self.object(&obj)?;
        Ok((obj, read_only))
    }

    fn open_kind(
        &mut self,
        loc: HandleId,
        path: &str,
        lapl: &LinkAccessProps,
        kind: ObjectKind,
    ) -> EngineResult<HandleId> {
        let (obj, read_only) = self.open_path(loc, path, lapl)?;
        let found = self.object(&obj)?.kind();
        if found != kind {
            return Err(Fault::new(
                FaultCode::WrongKind,
                format!("'{}' is a {}, not a {}", path, found, kind),
            ));
        }
        Ok(self.open_handle(Target::Object { obj, read_only }))
    }

    /// Object that attributes of `id` hang off.
    fn attribute_holder(&self, id: HandleId) -> EngineResult<(ObjRef, bool)> {
        match self.target(id)? {
            Target::Attribute { .. } => Err(Fault::new(
                FaultCode::WrongKind,
                "attributes cannot carry attributes",
            )),
            _ => self.location(id),
        }
    }
}

fn invalid_handle(id: HandleId) -> Fault {
    Fault::new(
        FaultCode::InvalidHandle,
        format!("handle {} is not open", id),
    )
}

fn not_a_type(id: HandleId) -> Fault {
    Fault::new(
        FaultCode::WrongKind,
        format!("handle {} is not a datatype", id),
    )
}

fn read_only_fault(file: &str) -> Fault {
    Fault::new(
        FaultCode::ReadOnly,
        format!("file '{}' is open read-only", file),
    )
}

fn no_final_link(path: &str) -> Fault {
    Fault::new(
        FaultCode::InvalidArgument,
        format!("path '{}' names no link", path),
    )
}

fn count_hop(lapl: &LinkAccessProps, hops: &mut usize, target: &str) -> EngineResult<()> {
    *hops += 1;
    if *hops > lapl.max_soft_links {
        return Err(Fault::new(
            FaultCode::InvalidArgument,
            format!(
                "too many links ({}) while resolving '{}'",
                lapl.max_soft_links, target
            ),
        ));
    }
    Ok(())
}

fn link_info(entry: &LinkEntry, tracked: bool) -> LinkInfo {
    LinkInfo {
        link_type: entry.value.raw_type(),
        creation_order: tracked.then_some(entry.creation_order),
        char_encoding: entry.char_encoding,
        value_size: entry.value.value_size(),
    }
}

/// A storage engine that keeps every file in process memory.
///
/// Files survive for the life of the engine regardless of open handles, and
/// can be written to or read from disk with
/// [`MemoryEngine::save_image`]/[`MemoryEngine::load_image`].
#[derive(Debug)]
pub struct MemoryEngine {
    state: Mutex<State>,
}

impl MemoryEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::with_diagnostics_limit(DEFAULT_DIAGNOSTICS_LIMIT)
    }

    /// Create an empty engine keeping at most `limit` fault reports.
    pub fn with_diagnostics_limit(limit: usize) -> Self {
        Self {
            state: Mutex::new(State::new(limit)),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with<T>(&self, op: impl FnOnce(&mut State) -> EngineResult<T>) -> EngineResult<T> {
        let mut state = self.lock();
        let result = op(&mut state);
        state.report(result)
    }

    /// Whether faults are currently reported.
    pub fn reporting_enabled(&self) -> bool {
        self.lock().reporting
    }

    /// Faults reported so far, oldest first.
    pub fn diagnostics(&self) -> Vec<String> {
        self.lock().diagnostics.iter().cloned().collect()
    }

    /// Forget all reported faults.
    pub fn clear_diagnostics(&self) {
        self.lock().diagnostics.clear();
    }

    /// Names of all files known to the engine, sorted.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().files.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of open handle ids.
    pub fn open_handles(&self) -> usize {
        self.lock().handles.len()
    }

    /// Number of stored objects in `file`, including its root group.
    pub fn object_count(&self, file: &str) -> Option<usize> {
        self.lock().files.get(file).map(|f| f.objects.len())
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for MemoryEngine {
    fn file_create(
        &self,
        name: &str,
        truncate: bool,
        root_props: &GroupCreateProps,
    ) -> EngineResult<HandleId> {
        self.with(|st| {
            if name.is_empty() {
                return Err(Fault::new(FaultCode::InvalidArgument, "empty file name"));
            }
            if st.files.contains_key(name) {
                if !truncate {
                    return Err(Fault::new(
                        FaultCode::AlreadyExists,
                        format!("file '{}' already exists", name),
                    ));
                }
                if st.file_in_use(name) {
                    return Err(Fault::new(
                        FaultCode::InvalidArgument,
                        format!("file '{}' is open and cannot be truncated", name),
                    ));
                }
            }
            st.files
                .insert(name.to_string(), FileImage::new(root_props.creation_order));
            debug!(file = %name, truncate, "created file");
            Ok(st.open_handle(Target::File {
                file: name.to_string(),
                read_only: false,
            }))
        })
    }

    fn file_open(&self, name: &str, read_only: bool) -> EngineResult<HandleId> {
        self.with(|st| {
            st.file(name)?;
            Ok(st.open_handle(Target::File {
                file: name.to_string(),
                read_only,
            }))
        })
    }

    fn file_exists(&self, name: &str) -> bool {
        self.lock().files.contains_key(name)
    }

    fn file_name(&self, id: HandleId) -> EngineResult<String> {
        self.with(|st| {
            st.target(id)?
                .file()
                .map(str::to_string)
                .ok_or_else(|| Fault::new(FaultCode::WrongKind, format!("handle {} has no file", id)))
        })
    }

    fn close(&self, id: HandleId) -> EngineResult<()> {
        self.with(|st| {
            let slot = st.slot_mut(id)?;
            slot.refs -= 1;
            if slot.refs > 0 {
                return Ok(());
            }
            if let Some(slot) = st.handles.remove(&id)
                && let Some(obj) = slot.target.object()
            {
                st.release_if_orphaned(obj.clone());
            }
            trace!(%id, "closed handle");
            Ok(())
        })
    }

    fn inc_ref(&self, id: HandleId) -> EngineResult<()> {
        self.with(|st| {
            st.slot_mut(id)?.refs += 1;
            Ok(())
        })
    }

    fn ref_count(&self, id: HandleId) -> EngineResult<usize> {
        self.with(|st| Ok(st.slot_mut(id)?.refs))
    }

    fn kind_of(&self, id: HandleId) -> EngineResult<ObjectKind> {
        self.with(|st| match st.target(id)? {
            Target::File { .. } => Ok(ObjectKind::File),
            Target::Object { obj, .. } => Ok(st.object(obj)?.kind()),
            Target::Attribute { .. } => Ok(ObjectKind::Attribute),
            Target::Type(_) => Ok(ObjectKind::UserDataType),
            Target::Space(_) => Ok(ObjectKind::DataSpace),
        })
    }

    fn group_create(
        &self,
        loc: HandleId,
        name: &str,
        lcpl: &LinkCreateProps,
        gcpl: &GroupCreateProps,
    ) -> EngineResult<HandleId> {
        self.with(|st| {
            let body = NodeBody::Group(GroupNode::new(gcpl.creation_order));
            let obj = st.create_object(loc, name, lcpl, &LinkAccessProps::default(), body)?;
            Ok(st.open_handle(Target::Object {
                obj,
                read_only: false,
            }))
        })
    }

    fn group_open(
        &self,
        loc: HandleId,
        name: &str,
        lapl: &LinkAccessProps,
    ) -> EngineResult<HandleId> {
        self.with(|st| st.open_kind(loc, name, lapl, ObjectKind::Group))
    }

    fn num_links(&self, loc: HandleId) -> EngineResult<u64> {
        self.with(|st| {
            let (obj, _) = st.location(loc)?;
            Ok(st.group(&obj)?.links.len() as u64)
        })
    }

    fn type_create(&self, descriptor: &TypeDescriptor) -> EngineResult<HandleId> {
        self.with(|st| Ok(st.open_handle(Target::Type(*descriptor))))
    }

    fn type_describe(&self, id: HandleId) -> EngineResult<TypeDescriptor> {
        self.with(|st| st.describe_type(id))
    }

    fn type_commit(
        &self,
        loc: HandleId,
        name: &str,
        type_id: HandleId,
        lcpl: &LinkCreateProps,
    ) -> EngineResult<()> {
        self.with(|st| {
            let descriptor = st.describe_type(type_id)?;
            st.create_object(
                loc,
                name,
                lcpl,
                &LinkAccessProps::default(),
                NodeBody::Datatype(descriptor),
            )?;
            Ok(())
        })
    }

    fn type_open(
        &self,
        loc: HandleId,
        name: &str,
        tapl: &DataTypeAccessProps,
    ) -> EngineResult<HandleId> {
        self.with(|st| st.open_kind(loc, name, &tapl.link, ObjectKind::UserDataType))
    }

    fn space_create(&self, dims: &[u64]) -> EngineResult<HandleId> {
        self.with(|st| Ok(st.open_handle(Target::Space(dims.to_vec()))))
    }

    fn space_dims(&self, id: HandleId) -> EngineResult<Vec<u64>> {
        self.with(|st| st.dims_of(id))
    }

    fn dataset_create(
        &self,
        loc: HandleId,
        name: &str,
        type_id: HandleId,
        space_id: HandleId,
        lcpl: &LinkCreateProps,
        dcpl: &DataSetCreateProps,
        dapl: &DataSetAccessProps,
    ) -> EngineResult<HandleId> {
        self.with(|st| {
            let dtype = st.describe_type(type_id)?;
            let dims = st.dims_of(space_id)?;
            validate_dcpl(&dims, dcpl)?;
            validate_dapl(dapl)?;
            let size = data_size(&dims, &dtype)?;
            let body = NodeBody::Dataset(DatasetNode {
                dtype,
                dims,
                chunk_dims: dcpl.chunk_dims.clone(),
                deflate_level: dcpl.deflate_level,
                data: vec![0; size],
            });
            let obj = st.create_object(loc, name, lcpl, &dapl.link, body)?;
            Ok(st.open_handle(Target::Object {
                obj,
                read_only: false,
            }))
        })
    }

    fn dataset_open(
        &self,
        loc: HandleId,
        name: &str,
        dapl: &DataSetAccessProps,
    ) -> EngineResult<HandleId> {
        self.with(|st| {
            validate_dapl(dapl)?;
            st.open_kind(loc, name, &dapl.link, ObjectKind::Dataset)
        })
    }

    fn dataset_type(&self, id: HandleId) -> EngineResult<HandleId> {
        self.with(|st| {
            let dtype = st.dataset(id)?.2.dtype;
            Ok(st.open_handle(Target::Type(dtype)))
        })
    }

    fn dataset_space(&self, id: HandleId) -> EngineResult<HandleId> {
        self.with(|st| {
            let dims = st.dataset(id)?.2.dims.clone();
            Ok(st.open_handle(Target::Space(dims)))
        })
    }

    fn dataset_write(&self, id: HandleId, mem_type: HandleId, data: &[u8]) -> EngineResult<()> {
        self.with(|st| {
            let mem = st.describe_type(mem_type)?;
            let (obj, read_only, node) = st.dataset(id)?;
            if read_only {
                return Err(read_only_fault(&obj.file));
            }
            if mem != node.dtype {
                return Err(Fault::new(
                    FaultCode::WrongKind,
                    format!(
                        "conversion from {} to {} is not supported",
                        mem.name(),
                        node.dtype.name()
                    ),
                ));
            }
            if data.len() != node.data.len() {
                return Err(Fault::new(
                    FaultCode::InvalidArgument,
                    format!(
                        "buffer holds {} bytes, dataset needs {}",
                        data.len(),
                        node.data.len()
                    ),
                ));
            }
            if let NodeBody::Dataset(node) = &mut st.object_mut(&obj)?.body {
                node.data.copy_from_slice(data);
            }
            trace!(%id, bytes = data.len(), "wrote dataset");
            Ok(())
        })
    }

    fn dataset_read(&self, id: HandleId, mem_type: HandleId) -> EngineResult<Vec<u8>> {
        self.with(|st| {
            let mem = st.describe_type(mem_type)?;
            let (_, _, node) = st.dataset(id)?;
            if mem != node.dtype {
                return Err(Fault::new(
                    FaultCode::WrongKind,
                    format!(
                        "conversion from {} to {} is not supported",
                        node.dtype.name(),
                        mem.name()
                    ),
                ));
            }
            Ok(node.data.clone())
        })
    }

    fn attribute_create(
        &self,
        obj: HandleId,
        name: &str,
        type_id: HandleId,
        space_id: HandleId,
    ) -> EngineResult<HandleId> {
        self.with(|st| {
            let (holder, read_only) = st.attribute_holder(obj)?;
            if read_only {
                return Err(read_only_fault(&holder.file));
            }
            if name.is_empty() {
                return Err(Fault::new(FaultCode::InvalidArgument, "empty attribute name"));
            }
            let dtype = st.describe_type(type_id)?;
            let dims = st.dims_of(space_id)?;
            let size = data_size(&dims, &dtype)?;
            let stored = st.object_mut(&holder)?;
            if stored.attributes.contains_key(name) {
                return Err(Fault::new(
                    FaultCode::AlreadyExists,
                    format!("attribute '{}' already exists", name),
                ));
            }
            stored.attributes.insert(
                name.to_string(),
                AttributeNode {
                    dtype,
                    dims,
                    data: vec![0; size],
                },
            );
            Ok(st.open_handle(Target::Attribute { obj: holder }))
        })
    }

    fn attribute_open(&self, obj: HandleId, name: &str) -> EngineResult<HandleId> {
        self.with(|st| {
            let (holder, _) = st.attribute_holder(obj)?;
            if !st.object(&holder)?.attributes.contains_key(name) {
                return Err(Fault::new(
                    FaultCode::NotFound,
                    format!("attribute '{}' does not exist", name),
                ));
            }
            Ok(st.open_handle(Target::Attribute { obj: holder }))
        })
    }

    fn link_create_hard(
        &self,
        target: HandleId,
        target_path: &str,
        loc: HandleId,
        name: &str,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
    ) -> EngineResult<()> {
        self.with(|st| {
            if let Target::Attribute { .. } = st.target(target)? {
                return Err(Fault::new(
                    FaultCode::WrongKind,
                    "attributes cannot be hard link targets",
                ));
            }
            let (target_start, _) = st.location(target)?;
            let target_obj = st.resolve(&target_start, target_path, lapl, &mut 0)?;
            let start = st.writable(loc)?;
            if start.file != target_obj.file {
                return Err(cross_file_hard_link());
            }
            let plan = st.plan_parent(&start, name, lcpl, lapl)?;
            if plan.existing.file != target_obj.file {
                return Err(cross_file_hard_link());
            }
            let (parent, last) = st.build_parent(plan, lcpl)?;
            st.insert_link(&parent, &last, LinkValue::Hard(target_obj.addr), lcpl.char_encoding)?;
            debug!(file = %parent.file, link = %name, addr = target_obj.addr, "created hard link");
            Ok(())
        })
    }

    fn link_create_soft(
        &self,
        target_path: &str,
        loc: HandleId,
        name: &str,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
    ) -> EngineResult<()> {
        self.with(|st| {
            if target_path.is_empty() {
                return Err(Fault::new(FaultCode::InvalidArgument, "empty soft link target"));
            }
            let start = st.writable(loc)?;
            let (parent, last) = st.prepare_parent(&start, name, lcpl, lapl)?;
            st.insert_link(
                &parent,
                &last,
                LinkValue::Soft(target_path.to_string()),
                lcpl.char_encoding,
            )?;
            debug!(file = %parent.file, link = %name, target = %target_path, "created soft link");
            Ok(())
        })
    }

    fn link_create_external(
        &self,
        file_name: &str,
        obj_path: &str,
        loc: HandleId,
        name: &str,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
    ) -> EngineResult<()> {
        self.with(|st| {
            if file_name.is_empty() || obj_path.is_empty() {
                return Err(Fault::new(
                    FaultCode::InvalidArgument,
                    "external link needs a file name and an object path",
                ));
            }
            let start = st.writable(loc)?;
            let (parent, last) = st.prepare_parent(&start, name, lcpl, lapl)?;
            st.insert_link(
                &parent,
                &last,
                LinkValue::External {
                    file: file_name.to_string(),
                    path: obj_path.to_string(),
                },
                lcpl.char_encoding,
            )?;
            debug!(
                file = %parent.file,
                link = %name,
                target_file = %file_name,
                target = %obj_path,
                "created external link"
            );
            Ok(())
        })
    }

    fn link_delete(&self, loc: HandleId, path: &str, lapl: &LinkAccessProps) -> EngineResult<()> {
        self.with(|st| {
            let start = st.writable(loc)?;
            let (parent, last) = st.lookup_parent(&start, path, lapl)?;
            let entry = st.remove_link(&parent, &last)?;
            st.release_link(&parent, &entry);
            debug!(file = %parent.file, link = %path, "deleted link");
            Ok(())
        })
    }

    fn link_move(
        &self,
        src_loc: HandleId,
        src: &str,
        dst_loc: HandleId,
        dst: &str,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
    ) -> EngineResult<()> {
        self.with(|st| {
            let src_start = st.writable(src_loc)?;
            let dst_start = st.writable(dst_loc)?;
            let (src_parent, src_name) = st.lookup_parent(&src_start, src, lapl)?;
            let moved = st
                .group(&src_parent)?
                .find(&src_name)
                .map(|e| e.value.clone())
                .ok_or_else(|| {
                    Fault::new(FaultCode::NotFound, format!("link '{}' does not exist", src))
                })?;
            let plan = st.plan_parent(&dst_start, dst, lcpl, lapl)?;
            if src_parent.file != plan.existing.file {
                return Err(Fault::new(
                    FaultCode::InvalidArgument,
                    "links cannot be moved across files",
                ));
            }
            if plan.missing.is_empty() {
                if src_parent == plan.existing && src_name == plan.last {
                    return Ok(());
                }
                if st.group(&plan.existing)?.find(&plan.last).is_some() {
                    return Err(Fault::new(
                        FaultCode::AlreadyExists,
                        format!("link '{}' already exists", dst),
                    ));
                }
            }
            // Groups still to be created would sit below `plan.existing`.
            if let Some(addr) = moved.hard_target() {
                let moved_obj = ObjRef {
                    file: src_parent.file.clone(),
                    addr,
                };
                if st.reaches(&moved_obj, &plan.existing) {
                    return Err(Fault::new(
                        FaultCode::InvalidArgument,
                        format!("cannot move '{}' into itself", src),
                    ));
                }
            }
            let (dst_parent, dst_name) = st.build_parent(plan, lcpl)?;
            let entry = st.remove_link(&src_parent, &src_name)?;
            st.push_link(&dst_parent, &dst_name, entry.value, lcpl.char_encoding)?;
            debug!(file = %dst_parent.file, from = %src, to = %dst, "moved link");
            Ok(())
        })
    }

    fn link_exists(
        &self,
        loc: HandleId,
        path: &str,
        lapl: &LinkAccessProps,
    ) -> EngineResult<bool> {
        self.with(|st| {
            let (start, _) = st.location(loc)?;
            if path.is_empty() {
                return Err(Fault::new(FaultCode::InvalidArgument, "empty path"));
            }
            if split(path).is_empty() {
                return Ok(true);
            }
            let (parent, last) = st.lookup_parent(&start, path, lapl)?;
            let exists = st.group(&parent)?.find(&last).is_some();
            trace!(path = %path, exists, "probed link");
            Ok(exists)
        })
    }

    fn link_info(
        &self,
        loc: HandleId,
        path: &str,
        lapl: &LinkAccessProps,
    ) -> EngineResult<LinkInfo> {
        self.with(|st| {
            let (start, _) = st.location(loc)?;
            let (parent, last) = st.lookup_parent(&start, path, lapl)?;
            let group = st.group(&parent)?;
            let entry = group.find(&last).ok_or_else(|| {
                Fault::new(FaultCode::NotFound, format!("link '{}' does not exist", path))
            })?;
            Ok(link_info(entry, group.creation_order.tracked))
        })
    }

    fn link_iterate(
        &self,
        loc: HandleId,
        index: IndexType,
        order: IterOrder,
        start: u64,
        visitor: &mut dyn LinkVisitor,
    ) -> EngineResult<u64> {
        let links = self.with(|st| {
            let (obj, _) = st.location(loc)?;
            let links = st.sorted_links(&obj, index, order)?;
            if start as usize > links.len() {
                return Err(Fault::new(
                    FaultCode::InvalidArgument,
                    format!("start index {} out of range for {} links", start, links.len()),
                ));
            }
            Ok(links)
        })?;
        let mut next = start;
        for (name, info) in links.iter().skip(start as usize) {
            next += 1;
            if visitor.visit(name, info) == IterControl::Stop {
                break;
            }
        }
        Ok(next)
    }

    fn link_name_by_index(
        &self,
        loc: HandleId,
        group_path: &str,
        index: IndexType,
        order: IterOrder,
        n: u64,
        buf: &mut [u8],
        lapl: &LinkAccessProps,
    ) -> EngineResult<usize> {
        self.with(|st| {
            let (start, _) = st.location(loc)?;
            let group = st.resolve(&start, group_path, lapl, &mut 0)?;
            let links = st.sorted_links(&group, index, order)?;
            let (name, _) = links.get(n as usize).ok_or_else(|| {
                Fault::new(
                    FaultCode::InvalidArgument,
                    format!("index {} out of range for {} links", n, links.len()),
                )
            })?;
            let bytes = name.as_bytes();
            let copied = bytes.len().min(buf.len());
            buf[..copied].copy_from_slice(&bytes[..copied]);
            Ok(bytes.len())
        })
    }

    fn object_open(
        &self,
        loc: HandleId,
        path: &str,
        lapl: &LinkAccessProps,
    ) -> EngineResult<HandleId> {
        self.with(|st| {
            let (obj, read_only) = st.open_path(loc, path, lapl)?;
            Ok(st.open_handle(Target::Object { obj, read_only }))
        })
    }

    fn suppress_error_reporting(&self) -> ReportingToken {
        let mut state = self.lock();
        let token = ReportingToken::new(state.reporting);
        state.reporting = false;
        token
    }

    fn restore_error_reporting(&self, token: ReportingToken) {
        self.lock().reporting = token.was_enabled();
    }
}

fn cross_file_hard_link() -> Fault {
    Fault::new(
        FaultCode::InvalidArgument,
        "hard links cannot span files",
    )
}
