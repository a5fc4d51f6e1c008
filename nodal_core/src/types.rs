//! Element types and in-memory values.
//!
//! [`H5Type`] maps a Rust scalar to the [`TypeDescriptor`] stored by the
//! engine. [`DataValue`] lets a whole in-memory value (a scalar, a vector,
//! an array or a rectangular nested vector) describe its own shape and
//! element type, so a dataset can be created and filled in one call.
//!
//! Element bytes are little-endian.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Description of a dataset element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDescriptor {
    Integer { size: usize, signed: bool },
    Float { size: usize },
    Boolean,
}

impl TypeDescriptor {
    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            TypeDescriptor::Integer { size, .. } | TypeDescriptor::Float { size } => *size,
            TypeDescriptor::Boolean => 1,
        }
    }

    /// Short human-readable name, e.g. `i32` or `f64`.
    pub fn name(&self) -> String {
        match self {
            TypeDescriptor::Integer { size, signed: true } => format!("i{}", size * 8),
            TypeDescriptor::Integer {
                size,
                signed: false,
            } => format!("u{}", size * 8),
            TypeDescriptor::Float { size } => format!("f{}", size * 8),
            TypeDescriptor::Boolean => "bool".to_string(),
        }
    }
}

/// A scalar that can be stored as a dataset element.
pub trait H5Type: Copy {
    fn type_descriptor() -> TypeDescriptor;

    /// Append the little-endian encoding of `self` to `out`.
    fn encode_into(&self, out: &mut Vec<u8>);

    /// Decode one element. `bytes` has exactly `type_descriptor().size()` bytes.
    fn decode_from(bytes: &[u8]) -> Self;
}

macro_rules! impl_h5type_number {
    ($ty:ty, $desc:expr) => {
        impl H5Type for $ty {
            fn type_descriptor() -> TypeDescriptor {
                $desc
            }

            fn encode_into(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn decode_from(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                <$ty>::from_le_bytes(buf)
            }
        }
    };
}

impl_h5type_number!(i8, TypeDescriptor::Integer { size: 1, signed: true });
impl_h5type_number!(i16, TypeDescriptor::Integer { size: 2, signed: true });
impl_h5type_number!(i32, TypeDescriptor::Integer { size: 4, signed: true });
impl_h5type_number!(i64, TypeDescriptor::Integer { size: 8, signed: true });
impl_h5type_number!(u8, TypeDescriptor::Integer { size: 1, signed: false });
impl_h5type_number!(u16, TypeDescriptor::Integer { size: 2, signed: false });
impl_h5type_number!(u32, TypeDescriptor::Integer { size: 4, signed: false });
impl_h5type_number!(u64, TypeDescriptor::Integer { size: 8, signed: false });
impl_h5type_number!(f32, TypeDescriptor::Float { size: 4 });
impl_h5type_number!(f64, TypeDescriptor::Float { size: 8 });

impl H5Type for bool {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Boolean
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }

    fn decode_from(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// An in-memory value that knows its own shape and element type.
pub trait DataValue: Sized {
    type Element: H5Type;

    /// Dimensions of the value. Scalars have no dimensions.
    fn shape(&self) -> Result<Vec<u64>>;

    /// Encode every element in row-major order.
    fn encode(&self) -> Vec<u8>;

    /// Rebuild a value from its dimensions and row-major bytes.
    fn decode(dims: &[u64], bytes: &[u8]) -> Result<Self>;
}

/// Number of elements described by `dims`, or `None` if it overflows.
pub fn element_count(dims: &[u64]) -> Option<u64> {
    dims.iter().try_fold(1u64, |acc, &d| acc.checked_mul(d))
}

/// Bytes taken by `dims` elements of `size` bytes each, or `None` if that
/// does not fit in memory addressing.
pub(crate) fn byte_len(dims: &[u64], size: usize) -> Option<usize> {
    element_count(dims)
        .and_then(|n| usize::try_from(n).ok())
        .and_then(|n| n.checked_mul(size))
}

fn decode_elements<T: H5Type>(dims: &[u64], bytes: &[u8]) -> Result<Vec<T>> {
    let size = T::type_descriptor().size();
    let expected = byte_len(dims, size).ok_or_else(|| {
        Error::resource(format!("Shape {:?} is too large to decode", dims))
    })?;
    if bytes.len() != expected {
        return Err(Error::resource(format!(
            "Buffer length mismatch: expected {} bytes for shape {:?}, got {}",
            expected,
            dims,
            bytes.len()
        )));
    }
    Ok(bytes.chunks_exact(size).map(T::decode_from).collect())
}

fn check_rank(dims: &[u64], rank: usize) -> Result<()> {
    if dims.len() != rank {
        return Err(Error::resource(format!(
            "Rank mismatch: value has rank {}, dataset shape is {:?}",
            rank, dims
        )));
    }
    Ok(())
}

macro_rules! impl_datavalue_scalar {
    ($($ty:ty),*) => {
        $(
            impl DataValue for $ty {
                type Element = $ty;

                fn shape(&self) -> Result<Vec<u64>> {
                    Ok(Vec::new())
                }

                fn encode(&self) -> Vec<u8> {
                    let mut out = Vec::with_capacity(<$ty as H5Type>::type_descriptor().size());
                    self.encode_into(&mut out);
                    out
                }

                fn decode(dims: &[u64], bytes: &[u8]) -> Result<Self> {
                    check_rank(dims, 0)?;
                    let mut elements = decode_elements::<$ty>(dims, bytes)?;
                    elements
                        .pop()
                        .ok_or_else(|| Error::resource("Scalar dataset holds no element"))
                }
            }
        )*
    };
}

impl_datavalue_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, bool);

impl<T: H5Type> DataValue for Vec<T> {
    type Element = T;

    fn shape(&self) -> Result<Vec<u64>> {
        Ok(vec![self.len() as u64])
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() * T::type_descriptor().size());
        for value in self {
            value.encode_into(&mut out);
        }
        out
    }

    fn decode(dims: &[u64], bytes: &[u8]) -> Result<Self> {
        check_rank(dims, 1)?;
        decode_elements(dims, bytes)
    }
}

impl<T: H5Type, const N: usize> DataValue for [T; N] {
    type Element = T;

    fn shape(&self) -> Result<Vec<u64>> {
        Ok(vec![N as u64])
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(N * T::type_descriptor().size());
        for value in self {
            value.encode_into(&mut out);
        }
        out
    }

    fn decode(dims: &[u64], bytes: &[u8]) -> Result<Self> {
        check_rank(dims, 1)?;
        let elements: Vec<T> = decode_elements(dims, bytes)?;
        let len = elements.len();
        elements.try_into().map_err(|_| {
            Error::resource(format!("Length mismatch: expected {} elements, got {}", N, len))
        })
    }
}

impl<T: H5Type> DataValue for Vec<Vec<T>> {
    type Element = T;

    /// Rows must all have the same length.
    fn shape(&self) -> Result<Vec<u64>> {
        let cols = self.first().map_or(0, Vec::len);
        if let Some(row) = self.iter().position(|r| r.len() != cols) {
            return Err(Error::resource(format!(
                "Ragged nested vector: row {} has {} elements, expected {}",
                row,
                self[row].len(),
                cols
            )));
        }
        Ok(vec![self.len() as u64, cols as u64])
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for value in self.iter().flatten() {
            value.encode_into(&mut out);
        }
        out
    }

    fn decode(dims: &[u64], bytes: &[u8]) -> Result<Self> {
        check_rank(dims, 2)?;
        let cols = dims[1] as usize;
        let flat: Vec<T> = decode_elements(dims, bytes)?;
        if cols == 0 {
            return Ok(vec![Vec::new(); dims[0] as usize]);
        }
        Ok(flat.chunks(cols).map(<[T]>::to_vec).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_names_and_sizes() {
        assert_eq!(i32::type_descriptor().name(), "i32");
        assert_eq!(u8::type_descriptor().name(), "u8");
        assert_eq!(f64::type_descriptor().size(), 8);
        assert_eq!(bool::type_descriptor(), TypeDescriptor::Boolean);
    }

    #[test]
    fn test_shapes() {
        assert_eq!(3.5f64.shape().unwrap(), Vec::<u64>::new());
        assert_eq!(vec![1i32, 2, 3].shape().unwrap(), vec![3]);
        assert_eq!([0u16; 4].shape().unwrap(), vec![4]);
        assert_eq!(vec![vec![1u8, 2], vec![3, 4], vec![5, 6]].shape().unwrap(), vec![3, 2]);
    }

    #[test]
    fn test_ragged_rejected() {
        let ragged = vec![vec![1i64, 2], vec![3]];
        assert!(ragged.shape().is_err());
    }

    #[test]
    fn test_nested_decode_restores_rows() {
        let value = vec![vec![1.5f32, 2.5, 3.5], vec![4.5, 5.5, 6.5]];
        let dims = value.shape().unwrap();
        let decoded = Vec::<Vec<f32>>::decode(&dims, &value.encode()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let err = Vec::<i32>::decode(&[3], &[0u8; 8]).unwrap_err();
        assert!(err.to_string().contains("expected 12 bytes"));
    }

    #[test]
    fn test_decode_rejects_wrong_rank() {
        assert!(i32::decode(&[1], &[0u8; 4]).is_err());
        assert!(<[u8; 2]>::decode(&[3], &[0u8; 3]).is_err());
    }

    #[test]
    fn test_element_count() {
        assert_eq!(element_count(&[]), Some(1));
        assert_eq!(element_count(&[2, 3, 4]), Some(24));
        assert_eq!(element_count(&[5, 0]), Some(0));
        assert_eq!(element_count(&[u64::MAX, 2]), None);
        assert_eq!(element_count(&[u64::MAX, 0]), Some(0));
    }

    #[test]
    fn test_byte_len_overflow() {
        assert_eq!(byte_len(&[3, 4], 8), Some(96));
        assert_eq!(byte_len(&[u64::MAX], 2), None);
    }

    #[test]
    fn test_decode_rejects_oversized_shape() {
        let err = Vec::<Vec<u8>>::decode(&[u64::MAX, 2], &[]).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
