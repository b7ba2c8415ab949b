use std::fmt;

/// Element type of a served array.
///
/// All multi-byte types are stored little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl DataType {
    /// Size of a single element in bytes.
    pub const fn size(&self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// The NumPy array-protocol type string used by Zarr v2 `.zarray` documents.
    ///
    /// Single-byte types carry the `|` (not applicable) byte order marker.
    pub const fn numpy_str(&self) -> &'static str {
        match self {
            Self::Bool => "|b1",
            Self::Int8 => "|i1",
            Self::Int16 => "<i2",
            Self::Int32 => "<i4",
            Self::Int64 => "<i8",
            Self::UInt8 => "|u1",
            Self::UInt16 => "<u2",
            Self::UInt32 => "<u4",
            Self::UInt64 => "<u8",
            Self::Float32 => "<f4",
            Self::Float64 => "<f8",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        };
        f.write_str(name)
    }
}

/// A Rust type that can be stored as an element of a served array.
pub trait Element: Copy + Send + Sync + 'static {
    const DATA_TYPE: DataType;

    /// Append the little-endian bytes of this element to `out`.
    fn write_le(&self, out: &mut Vec<u8>);
}

macro_rules! impl_element {
    ($t:ty, $dt:ident) => {
        impl Element for $t {
            const DATA_TYPE: DataType = DataType::$dt;

            fn write_le(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        }
    };
}

impl_element!(i8, Int8);
impl_element!(i16, Int16);
impl_element!(i32, Int32);
impl_element!(i64, Int64);
impl_element!(u8, UInt8);
impl_element!(u16, UInt16);
impl_element!(u32, UInt32);
impl_element!(u64, UInt64);
impl_element!(f32, Float32);
impl_element!(f64, Float64);

impl Element for bool {
    const DATA_TYPE: DataType = DataType::Bool;

    fn write_le(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_element_bytes() {
        fn encoded_len<T: Element + Default>() -> usize {
            let mut out = Vec::new();
            T::default().write_le(&mut out);
            out.len()
        }
        assert_eq!(encoded_len::<bool>(), DataType::Bool.size());
        assert_eq!(encoded_len::<i16>(), DataType::Int16.size());
        assert_eq!(encoded_len::<u32>(), DataType::UInt32.size());
        assert_eq!(encoded_len::<f32>(), DataType::Float32.size());
        assert_eq!(encoded_len::<f64>(), DataType::Float64.size());
    }

    #[test]
    fn numpy_strings() {
        assert_eq!(DataType::Float32.numpy_str(), "<f4");
        assert_eq!(DataType::Int64.numpy_str(), "<i8");
        assert_eq!(DataType::UInt8.numpy_str(), "|u1");
        assert!(DataType::Float64.is_float());
        assert!(!DataType::Int32.is_float());
    }

    #[test]
    fn little_endian() {
        let mut out = Vec::new();
        1.0f32.write_le(&mut out);
        assert_eq!(out, vec![0x00, 0x00, 0x80, 0x3f]);
    }
}
