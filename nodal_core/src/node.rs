//! Node operations shared by every container.
//!
//! [`NodeTraits`] is implemented once, for any type that is a
//! [`Container`]: both [`File`] (through its root group) and [`Group`] get
//! the same create/open/list/link surface. All addressing is by path
//! relative to the container.
//!
//! Two operations report failure by value instead of by error:
//! [`NodeTraits::exist`] answers `false` for anything that cannot be
//! reached, and [`NodeTraits::rename`] answers `false` when the move is
//! refused. Everything else returns an [`Error`].

use crate::engine::{IndexType, IterOrder};
use crate::error::{Error, ErrorKind, Result};
use crate::handle::{Handle, HandleId, ObjectKind};
use crate::iterate;
use crate::link::{self, LinkKind};
use crate::object::{DataSet, DataSpace, DataType, File, Group, Object};
use crate::path;
use crate::props::{
    DataSetAccessProps, DataSetCreateProps, DataTypeAccessProps, GroupCreateProps,
    LinkAccessProps, LinkCreateProps,
};
use crate::types::{DataValue, H5Type};
use std::sync::Arc;
use tracing::debug;

/// An object that holds named links to other objects.
pub trait Container: Object {}

impl Container for File {}
impl Container for Group {}

/// `lcpl` with intermediate group creation switched on when `auto_parents`
/// is set and `path` has groups above its final link. The caller's value is
/// left untouched.
fn with_parents(lcpl: &LinkCreateProps, path: &str, auto_parents: bool) -> LinkCreateProps {
    let mut lcpl = lcpl.clone();
    if path::needs_intermediate_creation(path, auto_parents) {
        lcpl.create_intermediate_group = true;
    }
    lcpl
}

fn adopt<T>(
    container: &(impl Container + ?Sized),
    id: HandleId,
    kind: ObjectKind,
    wrap: fn(Handle) -> T,
) -> T {
    wrap(Handle::from_raw(Arc::clone(container.engine()), id, kind))
}

/// Create, open, list and link the children of a container.
pub trait NodeTraits: Container {
    /// Create an empty dataset `name` with the given shape and element type.
    ///
    /// With `auto_parents`, missing groups along `name` are created.
    fn create_dataset(
        &self,
        name: &str,
        space: &DataSpace,
        dtype: &DataType,
        dcpl: &DataSetCreateProps,
        dapl: &DataSetAccessProps,
        auto_parents: bool,
    ) -> Result<DataSet> {
        let lcpl = with_parents(&LinkCreateProps::default(), name, auto_parents);
        let id = self
            .engine()
            .dataset_create(self.id(), name, dtype.id(), space.id(), &lcpl, dcpl, dapl)
            .map_err(|f| {
                Error::from_fault(
                    ErrorKind::Resource,
                    format!("Unable to create the dataset \"{}\"", name),
                    f,
                )
            })?;
        debug!(name, auto_parents, "created dataset");
        Ok(adopt(self, id, ObjectKind::Dataset, DataSet::from_handle))
    }

    /// Create an empty dataset whose element type is the Rust scalar `T`.
    fn create_dataset_for<T: H5Type>(
        &self,
        name: &str,
        space: &DataSpace,
        dcpl: &DataSetCreateProps,
        dapl: &DataSetAccessProps,
        auto_parents: bool,
    ) -> Result<DataSet> {
        let dtype = DataType::of::<T>(Arc::clone(self.engine()))?;
        self.create_dataset(name, space, &dtype, dcpl, dapl, auto_parents)
    }

    /// Create a dataset shaped like `value` and write `value` into it.
    ///
    /// If the write fails the dataset stays in the file.
    fn create_dataset_with<V: DataValue>(
        &self,
        name: &str,
        value: &V,
        dcpl: &DataSetCreateProps,
        dapl: &DataSetAccessProps,
        auto_parents: bool,
    ) -> Result<DataSet> {
        let space = DataSpace::for_value(Arc::clone(self.engine()), value)?;
        let dataset = self.create_dataset_for::<V::Element>(name, &space, dcpl, dapl, auto_parents)?;
        dataset.write(value)?;
        Ok(dataset)
    }

    /// Open the existing dataset `name`.
    fn dataset(&self, name: &str, dapl: &DataSetAccessProps) -> Result<DataSet> {
        let id = self
            .engine()
            .dataset_open(self.id(), name, dapl)
            .map_err(|f| Error::from_open_fault(format!("Unable to open the dataset \"{}\"", name), f))?;
        Ok(adopt(self, id, ObjectKind::Dataset, DataSet::from_handle))
    }

    /// Create the group `name`.
    fn create_group(&self, name: &str, auto_parents: bool) -> Result<Group> {
        self.create_group_with(name, &GroupCreateProps::default(), auto_parents)
    }

    /// Create the group `name` with explicit group creation properties.
    fn create_group_with(
        &self,
        name: &str,
        gcpl: &GroupCreateProps,
        auto_parents: bool,
    ) -> Result<Group> {
        let lcpl = with_parents(&LinkCreateProps::default(), name, auto_parents);
        let id = self
            .engine()
            .group_create(self.id(), name, &lcpl, gcpl)
            .map_err(|f| {
                Error::from_fault(
                    ErrorKind::Resource,
                    format!("Unable to create the group \"{}\"", name),
                    f,
                )
            })?;
        debug!(name, auto_parents, "created group");
        Ok(adopt(self, id, ObjectKind::Group, Group::from_handle))
    }

    /// Open the existing group `name`.
    fn group(&self, name: &str) -> Result<Group> {
        let id = self
            .engine()
            .group_open(self.id(), name, &LinkAccessProps::default())
            .map_err(|f| Error::from_open_fault(format!("Unable to open the group \"{}\"", name), f))?;
        Ok(adopt(self, id, ObjectKind::Group, Group::from_handle))
    }

    /// Open the committed datatype `name`.
    fn datatype(&self, name: &str, tapl: &DataTypeAccessProps) -> Result<DataType> {
        let id = self
            .engine()
            .type_open(self.id(), name, tapl)
            .map_err(|f| {
                Error::from_open_fault(format!("Unable to open the datatype \"{}\"", name), f)
            })?;
        Ok(adopt(self, id, ObjectKind::UserDataType, DataType::from_handle))
    }

    /// Store `dtype` in the file under `name`.
    fn commit_datatype(&self, name: &str, dtype: &DataType) -> Result<()> {
        self.engine()
            .type_commit(self.id(), name, dtype.id(), &LinkCreateProps::default())
            .map_err(|f| {
                Error::from_fault(
                    ErrorKind::Resource,
                    format!("Unable to commit the datatype \"{}\"", name),
                    f,
                )
            })?;
        debug!(name, "committed datatype");
        Ok(())
    }

    /// Number of links directly under this container.
    fn num_objects(&self) -> Result<u64> {
        self.engine().num_links(self.id()).map_err(|f| {
            Error::from_fault(
                ErrorKind::Resource,
                "Unable to count objects in existing group or file",
                f,
            )
        })
    }

    /// Name of the `index`-th child in ascending name order.
    fn object_name(&self, index: u64) -> Result<String> {
        let lapl = LinkAccessProps::default();
        let query = |buf: &mut [u8]| {
            self.engine()
                .link_name_by_index(
                    self.id(),
                    ".",
                    IndexType::ByName,
                    IterOrder::Increasing,
                    index,
                    buf,
                    &lapl,
                )
                .map_err(|f| {
                    Error::from_fault(
                        ErrorKind::Resource,
                        format!("Unable to get name of object #{}", index),
                        f,
                    )
                })
        };
        let len = query(&mut [0u8; 0])?;
        let mut buf = vec![0u8; len];
        query(&mut buf)?;
        String::from_utf8(buf).map_err(|e| {
            Error::resource(format!("Name of object #{} is not valid UTF-8: {}", index, e))
        })
    }

    /// Move the link `src` to `dst`. Returns `false` if the move is refused.
    fn rename(&self, src: &str, dst: &str, auto_parents: bool) -> bool {
        let lcpl = with_parents(&LinkCreateProps::default(), dst, auto_parents);
        match link::move_link(self.handle(), src, dst, &lcpl) {
            Ok(()) => true,
            Err(err) => {
                debug!(src, dst, %err, "rename refused");
                false
            }
        }
    }

    /// Names of the direct children, in increasing `index` order.
    fn list_object_names(&self, index: IndexType) -> Result<Vec<String>> {
        let hint = self.num_objects()? as usize;
        iterate::collect_names(self.handle(), index, hint)
    }

    /// Whether `path` names an existing link.
    ///
    /// For a path with a separator the container itself is checked first,
    /// then the path is probed and any failure counts as `false`, so a
    /// missing intermediate group and a missing leaf look the same. A
    /// single name is probed directly, and only an engine failure is an
    /// error.
    fn exist(&self, path: &str) -> Result<bool> {
        if path::is_multi_segment(path) {
            link::link_exists(self.handle(), path::ROOT)?;
            if path::is_root(path) {
                return Ok(true);
            }
            return Ok(link::link_exists(self.handle(), path).unwrap_or(false));
        }
        link::link_exists(self.handle(), path)
    }

    /// Remove the link `path`.
    fn unlink(&self, path: &str) -> Result<()> {
        link::delete_link(self.handle(), path)
    }

    /// Type of the link `path`.
    fn link_type(&self, path: &str) -> Result<LinkKind> {
        link::link_kind(self.handle(), path)
    }

    /// Kind of the object `path` resolves to.
    fn object_type(&self, path: &str) -> Result<ObjectKind> {
        link::object_kind(self.handle(), path)
    }

    /// Create a soft link `link_name` to `target_path`.
    fn create_soft_link(
        &self,
        link_name: &str,
        target_path: &str,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
        auto_parents: bool,
    ) -> Result<()> {
        let lcpl = with_parents(lcpl, link_name, auto_parents);
        link::create_soft_link(self.handle(), link_name, target_path, &lcpl, lapl)
    }

    /// Create an external link `link_name` to `obj_path` in `file_name`.
    fn create_external_link(
        &self,
        link_name: &str,
        file_name: &str,
        obj_path: &str,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
        auto_parents: bool,
    ) -> Result<()> {
        let lcpl = with_parents(lcpl, link_name, auto_parents);
        link::create_external_link(self.handle(), link_name, file_name, obj_path, &lcpl, lapl)
    }

    /// Create a hard link `link_name` to `target`.
    fn create_hard_link<O: Object>(
        &self,
        link_name: &str,
        target: &O,
        lcpl: &LinkCreateProps,
        lapl: &LinkAccessProps,
        auto_parents: bool,
    ) -> Result<()> {
        let lcpl = with_parents(lcpl, link_name, auto_parents);
        link::create_hard_link(self.handle(), link_name, target.handle(), &lcpl, lapl)
    }
}

impl<C: Container> NodeTraits for C {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEngine;
    use crate::object::Annotate;
    use crate::props::FileMode;

    struct Fixture {
        memory: Arc<MemoryEngine>,
        file: File,
    }

    fn fixture() -> Fixture {
        let memory = Arc::new(MemoryEngine::new());
        let file = File::open(memory.clone(), "node.h5", FileMode::Create).unwrap();
        Fixture { memory, file }
    }

    fn dcpl() -> DataSetCreateProps {
        DataSetCreateProps::default()
    }

    fn dapl() -> DataSetAccessProps {
        DataSetAccessProps::default()
    }

    #[test]
    fn test_exist_follows_create_and_unlink() {
        let fx = fixture();
        assert!(!fx.file.exist("g").unwrap());
        fx.file.create_group("g", false).unwrap();
        assert!(fx.file.exist("g").unwrap());
        fx.file.unlink("g").unwrap();
        assert!(!fx.file.exist("g").unwrap());
    }

    #[test]
    fn test_exist_root_and_missing_intermediate() {
        let fx = fixture();
        assert!(fx.file.exist("/").unwrap());
        assert!(!fx.file.exist("missing/leaf").unwrap());
        assert!(!fx.file.exist("/missing/leaf").unwrap());
        assert!(fx.memory.diagnostics().is_empty());
    }

    #[test]
    fn test_exist_from_group() {
        let fx = fixture();
        let g = fx.file.create_group("g", false).unwrap();
        g.create_group("inner", false).unwrap();
        assert!(g.exist("inner").unwrap());
        assert!(g.exist("/g/inner").unwrap());
        assert!(g.exist("/").unwrap());
    }

    #[test]
    fn test_create_group_with_parents() {
        let fx = fixture();
        let err = fx.file.create_group("a/b/c", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);
        assert!(!fx.file.exist("a").unwrap());

        fx.file.create_group("a/b/c", true).unwrap();
        for path in ["a", "a/b", "a/b/c"] {
            assert!(fx.file.exist(path).unwrap(), "{} should exist", path);
        }
    }

    #[test]
    fn test_create_existing_group_fails() {
        let fx = fixture();
        fx.file.create_group("g", false).unwrap();
        assert!(fx.file.create_group("g", false).is_err());
    }

    #[test]
    fn test_dataset_round_trip() {
        let fx = fixture();
        let value = vec![vec![1.0f64, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let created = fx
            .file
            .create_dataset_with("grid", &value, &dcpl(), &dapl(), false)
            .unwrap();
        assert_eq!(created.dims().unwrap(), vec![2, 3]);
        drop(created);

        let opened = fx.file.dataset("grid", &dapl()).unwrap();
        assert_eq!(opened.read::<Vec<Vec<f64>>>().unwrap(), value);
        assert_eq!(opened.datatype().unwrap().descriptor().unwrap().name(), "f64");
    }

    #[test]
    fn test_scalar_dataset_with_parents() {
        let fx = fixture();
        fx.file
            .create_dataset_with("deep/nested/answer", &42i32, &dcpl(), &dapl(), true)
            .unwrap();
        let ds = fx.file.dataset("deep/nested/answer", &dapl()).unwrap();
        assert_eq!(ds.read::<i32>().unwrap(), 42);
    }

    #[test]
    fn test_create_dataset_for_type() {
        let fx = fixture();
        let space = DataSpace::new(Arc::clone(fx.file.engine()), &[4]).unwrap();
        let ds = fx
            .file
            .create_dataset_for::<u8>("bytes", &space, &dcpl(), &dapl(), false)
            .unwrap();
        assert_eq!(ds.read::<Vec<u8>>().unwrap(), vec![0; 4]);
        ds.write(&vec![1u8, 2, 3, 4]).unwrap();
        assert_eq!(ds.read::<[u8; 4]>().unwrap(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_failed_write_keeps_dataset() {
        let fx = fixture();
        let ds = fx
            .file
            .create_dataset_with("v", &vec![1i64, 2], &dcpl(), &dapl(), false)
            .unwrap();
        let err = ds.write(&vec![1i64, 2, 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);
        let err = ds.write(&vec![1.0f64, 2.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);
        assert!(fx.file.exist("v").unwrap());
    }

    #[test]
    fn test_open_missing_is_object_not_found() {
        let fx = fixture();
        let err = fx.file.dataset("nope", &dapl()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ObjectNotFound);
        let err = fx.file.group("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ObjectNotFound);
    }

    #[test]
    fn test_open_wrong_kind_is_resource_error() {
        let fx = fixture();
        fx.file.create_group("g", false).unwrap();
        let err = fx.file.dataset("g", &dapl()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);
    }

    #[test]
    fn test_committed_datatype() {
        let fx = fixture();
        let ty = DataType::of::<i16>(Arc::clone(fx.file.engine())).unwrap();
        fx.file.commit_datatype("short", &ty).unwrap();
        let opened = fx
            .file
            .datatype("short", &DataTypeAccessProps::default())
            .unwrap();
        assert_eq!(opened.size().unwrap(), 2);
        assert_eq!(fx.file.object_type("short").unwrap(), ObjectKind::UserDataType);
    }

    #[test]
    fn test_object_names_by_index() {
        let fx = fixture();
        for name in ["gamma", "alpha", "a_much_longer_name_than_any_default_buffer"] {
            fx.file.create_group(name, false).unwrap();
        }
        assert_eq!(fx.file.num_objects().unwrap(), 3);
        assert_eq!(
            fx.file.object_name(0).unwrap(),
            "a_much_longer_name_than_any_default_buffer"
        );
        assert_eq!(fx.file.object_name(2).unwrap(), "gamma");
        assert!(fx.file.object_name(3).is_err());
    }

    #[test]
    fn test_list_object_names_orders() {
        let fx = fixture();
        for name in ["zeta", "alpha", "mid"] {
            fx.file.create_group(name, false).unwrap();
        }
        let by_name = fx.file.list_object_names(IndexType::ByName).unwrap();
        assert_eq!(by_name, vec!["alpha", "mid", "zeta"]);
        let by_order = fx.file.list_object_names(IndexType::ByCreationOrder).unwrap();
        assert_eq!(by_order, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_list_by_creation_order_needs_index() {
        let fx = fixture();
        let gcpl = GroupCreateProps::new().creation_order(false, false);
        let g = fx.file.create_group_with("plain", &gcpl, false).unwrap();
        g.create_group("x", false).unwrap();
        assert_eq!(g.list_object_names(IndexType::ByName).unwrap(), vec!["x"]);
        assert!(g.list_object_names(IndexType::ByCreationOrder).is_err());
    }

    #[test]
    fn test_rename() {
        let fx = fixture();
        fx.file.create_group("src", false).unwrap();
        assert!(!fx.file.rename("src", "missing/dst", false));
        assert!(fx.file.exist("src").unwrap());

        assert!(fx.file.rename("src", "missing/dst", true));
        assert!(fx.file.exist("missing/dst").unwrap());
        assert!(!fx.file.exist("src").unwrap());

        assert!(!fx.file.rename("src", "again", false));
    }

    #[test]
    fn test_refused_rename_creates_no_groups() {
        let fx = fixture();
        fx.file.create_group("a", false).unwrap();
        assert!(!fx.file.rename("a", "a/x/y", true));
        assert!(!fx.file.exist("a/x").unwrap());
        assert_eq!(fx.file.group("a").unwrap().num_objects().unwrap(), 0);

        let other = File::open(fx.memory.clone(), "other.h5", FileMode::Create).unwrap();
        fx.file
            .create_external_link(
                "ext",
                "other.h5",
                "/",
                &LinkCreateProps::default(),
                &LinkAccessProps::default(),
                false,
            )
            .unwrap();
        assert!(!fx.file.rename("a", "ext/new/a", true));
        assert_eq!(other.num_objects().unwrap(), 0);
        assert!(fx.file.exist("a").unwrap());

        let group = fx.file.group("a").unwrap();
        let err = fx
            .file
            .create_hard_link(
                "ext/new/link",
                &group,
                &LinkCreateProps::default(),
                &LinkAccessProps::default(),
                true,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Link);
        assert_eq!(other.num_objects().unwrap(), 0);
    }

    #[test]
    fn test_oversized_dataspace_is_resource_error() {
        let fx = fixture();
        for dims in [vec![u64::MAX, 2], vec![1 << 40]] {
            let space = DataSpace::new(Arc::clone(fx.file.engine()), &dims).unwrap();
            let err = fx
                .file
                .create_dataset_for::<u8>("big", &space, &dcpl(), &dapl(), false)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Resource);
            assert!(err.to_string().contains("too large"));
            assert!(!fx.file.exist("big").unwrap());
        }
        let space = DataSpace::new(Arc::clone(fx.file.engine()), &[u64::MAX, 2]).unwrap();
        assert_eq!(space.element_count().unwrap_err().kind(), ErrorKind::Resource);
    }

    #[test]
    fn test_exist_after_single_name_links() {
        let fx = fixture();
        let lcpl = LinkCreateProps::default();
        let lapl = LinkAccessProps::default();
        let target = fx.file.create_group("target", false).unwrap();

        assert!(!fx.file.exist("hard").unwrap());
        fx.file
            .create_hard_link("hard", &target, &lcpl, &lapl, false)
            .unwrap();
        assert!(fx.file.exist("hard").unwrap());

        assert!(!fx.file.exist("soft").unwrap());
        fx.file
            .create_soft_link("soft", "/target", &lcpl, &lapl, false)
            .unwrap();
        assert!(fx.file.exist("soft").unwrap());

        fx.file.unlink("hard").unwrap();
        assert!(!fx.file.exist("hard").unwrap());
        assert!(fx.file.exist("target").unwrap());
    }

    #[test]
    fn test_with_parents_only_for_nested_paths() {
        let base = LinkCreateProps::default();
        assert!(!with_parents(&base, "leaf", true).create_intermediate_group);
        assert!(!with_parents(&base, "/leaf", true).create_intermediate_group);
        assert!(with_parents(&base, "a/leaf", true).create_intermediate_group);
        assert!(!with_parents(&base, "a/leaf", false).create_intermediate_group);

        let explicit = LinkCreateProps::new().create_intermediate_group(true);
        assert!(with_parents(&explicit, "leaf", false).create_intermediate_group);
    }

    #[test]
    fn test_hard_link_to_attribute_is_link_error() {
        let fx = fixture();
        let engine = Arc::clone(fx.file.engine());
        let ty = DataType::of::<u8>(Arc::clone(&engine)).unwrap();
        let space = DataSpace::scalar(engine).unwrap();
        let attr = fx.file.create_attribute("a", &ty, &space).unwrap();
        let err = fx
            .file
            .create_hard_link(
                "to_attr",
                &attr,
                &LinkCreateProps::default(),
                &LinkAccessProps::default(),
                false,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Link);
    }

    #[test]
    fn test_hard_link_keeps_dataset_alive() {
        let fx = fixture();
        let ds = fx
            .file
            .create_dataset_with("orig", &vec![7u32, 8], &dcpl(), &dapl(), false)
            .unwrap();
        fx.file
            .create_hard_link(
                "links/copy",
                &ds,
                &LinkCreateProps::default(),
                &LinkAccessProps::default(),
                true,
            )
            .unwrap();
        drop(ds);
        fx.file.unlink("orig").unwrap();
        let copy = fx.file.dataset("links/copy", &dapl()).unwrap();
        assert_eq!(copy.read::<Vec<u32>>().unwrap(), vec![7, 8]);
        assert_eq!(fx.file.link_type("links/copy").unwrap(), LinkKind::Hard);
    }

    #[test]
    fn test_soft_link_is_lazy() {
        let fx = fixture();
        fx.file
            .create_soft_link(
                "alias",
                "/later/target",
                &LinkCreateProps::default(),
                &LinkAccessProps::default(),
                false,
            )
            .unwrap();
        assert!(fx.file.exist("alias").unwrap());
        assert_eq!(fx.file.link_type("alias").unwrap(), LinkKind::Soft);
        let err = fx.file.object_type("alias").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ObjectNotFound);

        fx.file.create_group("later/target", true).unwrap();
        assert_eq!(fx.file.object_type("alias").unwrap(), ObjectKind::Group);
    }

    #[test]
    fn test_external_link_is_lazy() {
        let fx = fixture();
        fx.file
            .create_external_link(
                "ext",
                "other.h5",
                "/payload",
                &LinkCreateProps::default(),
                &LinkAccessProps::default(),
                false,
            )
            .unwrap();
        let err = fx.file.object_type("ext").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ObjectNotFound);

        let other = File::open(fx.memory.clone(), "other.h5", FileMode::Create).unwrap();
        other
            .create_dataset_with("payload", &1.5f32, &dcpl(), &dapl(), false)
            .unwrap();
        assert_eq!(fx.file.object_type("ext").unwrap(), ObjectKind::Dataset);
        assert_eq!(fx.file.link_type("ext").unwrap(), LinkKind::External);
    }

    #[test]
    fn test_auto_parents_leaves_caller_props_alone() {
        let fx = fixture();
        let lcpl = LinkCreateProps::default();
        fx.file
            .create_soft_link("a/b/link", "/x", &lcpl, &LinkAccessProps::default(), true)
            .unwrap();
        assert_eq!(lcpl, LinkCreateProps::default());
        assert!(fx.file.exist("a/b/link").unwrap());

        let err = fx
            .file
            .create_soft_link("c/link", "/x", &lcpl, &LinkAccessProps::default(), false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Link);
    }

    #[test]
    fn test_read_only_file_rejects_creation() {
        let fx = fixture();
        fx.file.create_group("g", false).unwrap();
        let ro = File::open(fx.memory.clone(), "node.h5", FileMode::ReadOnly).unwrap();
        assert!(ro.exist("g").unwrap());
        assert!(ro.create_group("h", false).is_err());
        assert!(!ro.rename("g", "h", false));
    }

    #[test]
    fn test_unlink_missing_is_link_error() {
        let fx = fixture();
        let err = fx.file.unlink("ghost").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Link);
    }

    use proptest::prelude::*;

    fn arb_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,11}"
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property 1: a name exists exactly between its creation and its unlink.
        #[test]
        fn prop_exist_tracks_lifecycle(name in arb_name()) {
            let fx = fixture();
            prop_assert!(!fx.file.exist(&name).unwrap());
            fx.file.create_group(&name, false).unwrap();
            prop_assert!(fx.file.exist(&name).unwrap());
            fx.file.unlink(&name).unwrap();
            prop_assert!(!fx.file.exist(&name).unwrap());
        }

        /// Property 2: multi-segment paths under a missing group never raise.
        #[test]
        fn prop_missing_intermediate_is_false(
            segs in prop::collection::vec(arb_name(), 2..5),
            absolute in any::<bool>(),
        ) {
            let fx = fixture();
            let joined = segs.join("/");
            let path = if absolute { format!("/{}", joined) } else { joined };
            prop_assert!(!fx.file.exist(&path).unwrap());
        }

        /// Property 3: listings agree with num_objects and each other.
        #[test]
        fn prop_listing_orders(names in prop::collection::btree_set(arb_name(), 0..12)) {
            let fx = fixture();
            let mut created: Vec<String> = names.into_iter().collect();
            created.reverse();
            for name in &created {
                fx.file.create_group(name, false).unwrap();
            }

            let by_name = fx.file.list_object_names(IndexType::ByName).unwrap();
            prop_assert_eq!(by_name.len() as u64, fx.file.num_objects().unwrap());
            let mut sorted = created.clone();
            sorted.sort();
            prop_assert_eq!(&by_name, &sorted);

            let by_order = fx.file.list_object_names(IndexType::ByCreationOrder).unwrap();
            prop_assert_eq!(&by_order, &created);

            for (i, name) in by_name.iter().enumerate() {
                prop_assert_eq!(&fx.file.object_name(i as u64).unwrap(), name);
            }
        }
    }
}
