//! Typed wrappers over engine handles.
//!
//! Every wrapper owns exactly one [`Handle`]. Wrappers keep no reference to
//! the container they were opened from; everything below a container is
//! addressed by path.

use crate::engine::Fault;
use crate::error::{Error, ErrorKind, Result};
use crate::handle::{Handle, HandleId, ObjectKind, SharedEngine};
use crate::props::{FileMode, GroupCreateProps};
use crate::types::{DataValue, H5Type, TypeDescriptor, element_count};
use std::sync::Arc;
use tracing::debug;

/// Anything backed by an engine handle.
pub trait Object {
    fn handle(&self) -> &Handle;

    /// Raw engine id.
    fn id(&self) -> HandleId {
        self.handle().id()
    }

    /// Kind of the underlying resource.
    fn object_kind(&self) -> ObjectKind {
        self.handle().kind()
    }

    /// Engine the object lives in.
    fn engine(&self) -> &SharedEngine {
        self.handle().engine()
    }
}

fn resource_fault(context: impl std::fmt::Display) -> impl FnOnce(Fault) -> Error {
    move |f| Error::from_fault(ErrorKind::Resource, context, f)
}

macro_rules! handle_object {
    ($ty:ident) => {
        impl Object for $ty {
            fn handle(&self) -> &Handle {
                &self.handle
            }
        }

        impl $ty {
            pub(crate) fn from_handle(handle: Handle) -> Self {
                Self { handle }
            }

            /// Take another reference to the same object.
            pub fn try_clone(&self) -> Result<Self> {
                Ok(Self::from_handle(self.handle.try_clone()?))
            }
        }
    };
}

/// A container file, and the root group inside it.
#[derive(Debug)]
pub struct File {
    handle: Handle,
    name: String,
}

impl File {
    /// Open or create the file `name` in `engine`.
    pub fn open(engine: SharedEngine, name: &str, mode: FileMode) -> Result<Self> {
        Self::open_with(engine, name, mode, &GroupCreateProps::default())
    }

    /// Like [`File::open`], with explicit properties for a newly created
    /// root group.
    pub fn open_with(
        engine: SharedEngine,
        name: &str,
        mode: FileMode,
        root_props: &GroupCreateProps,
    ) -> Result<Self> {
        let id = match mode {
            FileMode::Create => engine.file_create(name, false, root_props),
            FileMode::Truncate => engine.file_create(name, true, root_props),
            FileMode::ReadOnly => engine.file_open(name, true),
            FileMode::ReadWrite => engine.file_open(name, false),
            FileMode::OpenOrCreate if engine.file_exists(name) => engine.file_open(name, false),
            FileMode::OpenOrCreate => engine.file_create(name, false, root_props),
        }
        .map_err(|f| Error::from_open_fault(format!("Unable to open file \"{}\"", name), f))?;
        debug!(file = name, ?mode, "opened file");
        Ok(Self {
            handle: Handle::from_raw(engine, id, ObjectKind::File),
            name: name.to_string(),
        })
    }

    /// Name the file was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Take another reference to the same file.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            handle: self.handle.try_clone()?,
            name: self.name.clone(),
        })
    }
}

impl Object for File {
    fn handle(&self) -> &Handle {
        &self.handle
    }
}

/// A group inside a file.
#[derive(Debug)]
pub struct Group {
    handle: Handle,
}

handle_object!(Group);

/// A typed, shaped array stored in a file.
#[derive(Debug)]
pub struct DataSet {
    handle: Handle,
}

handle_object!(DataSet);

impl DataSet {
    /// Element type of the dataset.
    pub fn datatype(&self) -> Result<DataType> {
        let id = self
            .engine()
            .dataset_type(self.id())
            .map_err(resource_fault("Unable to get dataset type"))?;
        Ok(DataType::from_handle(Handle::from_raw(
            Arc::clone(self.engine()),
            id,
            ObjectKind::UserDataType,
        )))
    }

    /// Dataspace of the dataset.
    pub fn space(&self) -> Result<DataSpace> {
        let id = self
            .engine()
            .dataset_space(self.id())
            .map_err(resource_fault("Unable to get dataset space"))?;
        Ok(DataSpace::from_handle(Handle::from_raw(
            Arc::clone(self.engine()),
            id,
            ObjectKind::DataSpace,
        )))
    }

    /// Dimensions of the dataset.
    pub fn dims(&self) -> Result<Vec<u64>> {
        self.space()?.dims()
    }

    /// Replace the dataset contents with `value`.
    ///
    /// The value's shape must match the dataset exactly, and its element
    /// type must be the stored type.
    pub fn write<V: DataValue>(&self, value: &V) -> Result<()> {
        let shape = value.shape()?;
        let dims = self.dims()?;
        if shape != dims {
            return Err(Error::resource(format!(
                "Shape mismatch writing dataset: value {:?}, dataset {:?}",
                shape, dims
            )));
        }
        let mem_type = DataType::of::<V::Element>(Arc::clone(self.engine()))?;
        self.engine()
            .dataset_write(self.id(), mem_type.id(), &value.encode())
            .map_err(resource_fault("Unable to write dataset"))
    }

    /// Read the whole dataset into a value of type `V`.
    pub fn read<V: DataValue>(&self) -> Result<V> {
        let dims = self.dims()?;
        let mem_type = DataType::of::<V::Element>(Arc::clone(self.engine()))?;
        let bytes = self
            .engine()
            .dataset_read(self.id(), mem_type.id())
            .map_err(resource_fault("Unable to read dataset"))?;
        V::decode(&dims, &bytes)
    }
}

/// An element type: transient, or committed to a file under a name.
#[derive(Debug)]
pub struct DataType {
    handle: Handle,
}

handle_object!(DataType);

impl DataType {
    /// Create a transient datatype.
    pub fn new(engine: SharedEngine, descriptor: &TypeDescriptor) -> Result<Self> {
        let id = engine
            .type_create(descriptor)
            .map_err(resource_fault(format!("Unable to create datatype {}", descriptor.name())))?;
        Ok(Self::from_handle(Handle::from_raw(
            engine,
            id,
            ObjectKind::UserDataType,
        )))
    }

    /// The datatype matching the Rust scalar `T`.
    pub fn of<T: H5Type>(engine: SharedEngine) -> Result<Self> {
        Self::new(engine, &T::type_descriptor())
    }

    pub fn descriptor(&self) -> Result<TypeDescriptor> {
        self.engine()
            .type_describe(self.id())
            .map_err(resource_fault("Unable to describe datatype"))
    }

    /// Element size in bytes.
    pub fn size(&self) -> Result<usize> {
        Ok(self.descriptor()?.size())
    }
}

/// Dimensions of a dataset or attribute.
#[derive(Debug)]
pub struct DataSpace {
    handle: Handle,
}

handle_object!(DataSpace);

impl DataSpace {
    /// Create a simple dataspace with the given dimensions.
    pub fn new(engine: SharedEngine, dims: &[u64]) -> Result<Self> {
        let id = engine
            .space_create(dims)
            .map_err(resource_fault(format!("Unable to create dataspace {:?}", dims)))?;
        Ok(Self::from_handle(Handle::from_raw(engine, id, ObjectKind::DataSpace)))
    }

    /// A rank-0 dataspace holding one element.
    pub fn scalar(engine: SharedEngine) -> Result<Self> {
        Self::new(engine, &[])
    }

    /// The dataspace matching the shape of `value`.
    pub fn for_value<V: DataValue>(engine: SharedEngine, value: &V) -> Result<Self> {
        Self::new(engine, &value.shape()?)
    }

    pub fn dims(&self) -> Result<Vec<u64>> {
        self.engine()
            .space_dims(self.id())
            .map_err(resource_fault("Unable to get dataspace dimensions"))
    }

    /// Total number of elements.
    pub fn element_count(&self) -> Result<u64> {
        let dims = self.dims()?;
        element_count(&dims).ok_or_else(|| {
            Error::resource(format!("Element count of dataspace {:?} overflows", dims))
        })
    }
}

/// A small named value attached to an object.
#[derive(Debug)]
pub struct Attribute {
    handle: Handle,
    name: String,
}

impl Attribute {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Object for Attribute {
    fn handle(&self) -> &Handle {
        &self.handle
    }
}

/// Objects that can carry attributes.
pub trait Annotate: Object {
    /// Create the attribute `name` on this object.
    fn create_attribute(&self, name: &str, dtype: &DataType, space: &DataSpace) -> Result<Attribute> {
        let id = self
            .engine()
            .attribute_create(self.id(), name, dtype.id(), space.id())
            .map_err(resource_fault(format!("Unable to create attribute \"{}\"", name)))?;
        debug!(name, "created attribute");
        Ok(Attribute {
            handle: Handle::from_raw(Arc::clone(self.engine()), id, ObjectKind::Attribute),
            name: name.to_string(),
        })
    }

    /// Open the existing attribute `name`.
    fn attribute(&self, name: &str) -> Result<Attribute> {
        let id = self
            .engine()
            .attribute_open(self.id(), name)
            .map_err(|f| Error::from_open_fault(format!("Unable to open attribute \"{}\"", name), f))?;
        Ok(Attribute {
            handle: Handle::from_raw(Arc::clone(self.engine()), id, ObjectKind::Attribute),
            name: name.to_string(),
        })
    }
}

impl Annotate for File {}
impl Annotate for Group {}
impl Annotate for DataSet {}
impl Annotate for DataType {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEngine;

    fn engine() -> SharedEngine {
        Arc::new(MemoryEngine::new())
    }

    #[test]
    fn test_file_modes() {
        let engine = engine();
        let err = File::open(Arc::clone(&engine), "f.h5", FileMode::ReadOnly).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ObjectNotFound);

        let file = File::open(Arc::clone(&engine), "f.h5", FileMode::Create).unwrap();
        assert_eq!(file.name(), "f.h5");
        assert_eq!(file.object_kind(), ObjectKind::File);
        assert!(File::open(Arc::clone(&engine), "f.h5", FileMode::Create).is_err());
        assert!(File::open(Arc::clone(&engine), "f.h5", FileMode::OpenOrCreate).is_ok());
        assert!(File::open(Arc::clone(&engine), "new.h5", FileMode::OpenOrCreate).is_ok());
    }

    #[test]
    fn test_try_clone_shares_id() {
        let engine = engine();
        let file = File::open(engine, "f.h5", FileMode::Create).unwrap();
        let copy = file.try_clone().unwrap();
        assert_eq!(copy.id(), file.id());
        assert_eq!(file.handle().ref_count().unwrap(), 2);
        drop(copy);
        assert_eq!(file.handle().ref_count().unwrap(), 1);
    }

    #[test]
    fn test_datatype_and_space() {
        let engine = engine();
        let ty = DataType::of::<u16>(Arc::clone(&engine)).unwrap();
        assert_eq!(ty.size().unwrap(), 2);
        assert_eq!(ty.descriptor().unwrap().name(), "u16");

        let space = DataSpace::new(Arc::clone(&engine), &[3, 4]).unwrap();
        assert_eq!(space.dims().unwrap(), vec![3, 4]);
        assert_eq!(space.element_count().unwrap(), 12);

        let scalar = DataSpace::scalar(engine).unwrap();
        assert_eq!(scalar.element_count().unwrap(), 1);
    }

    #[test]
    fn test_attributes() {
        let engine = engine();
        let file = File::open(Arc::clone(&engine), "f.h5", FileMode::Create).unwrap();
        let ty = DataType::of::<f32>(Arc::clone(&engine)).unwrap();
        let space = DataSpace::scalar(Arc::clone(&engine)).unwrap();

        let attr = file.create_attribute("scale", &ty, &space).unwrap();
        assert_eq!(attr.name(), "scale");
        assert_eq!(attr.object_kind(), ObjectKind::Attribute);
        assert!(file.create_attribute("scale", &ty, &space).is_err());

        assert!(file.attribute("scale").is_ok());
        let err = file.attribute("offset").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ObjectNotFound);
    }
}
