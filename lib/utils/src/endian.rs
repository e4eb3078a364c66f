//! ## Endianness Module
//! This module provides some structs to better resolve the data in specific endianness rules
//!
//! All the types declared here implements [EndianData<T>],
//! which defines [EndianData<T>::value] function to parse the data into the endianness of the current arch.
//!
//! The wrappers are `#[repr(transparent)]`, but device-tree blobs are not
//! guaranteed to be aligned for them, so decoding from raw bytes goes through
//! [BigEndian32::from_bytes] and friends instead of pointer casts.

///[u32] in Big Endianness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct BigEndian32(u32);

///[u64] in Big Endianness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct BigEndian64(u64);

/// This trait defines a packed data in memory with some specific endianness.
pub trait EndianData<T>: Copy + Clone {
    /// Width of the encoded value in bytes.
    const WIDTH: usize;
    /// Parse the value into the endianness of the current architecture.
    fn value(&self) -> T;
    /// Decode from the first [Self::WIDTH] bytes of `bytes`, if there are enough.
    fn from_bytes(bytes: &[u8]) -> Option<Self>;
}

/// Implement an [EndianData<T>] for a specific type, and explain the data in big endianess
macro_rules! impl_converter_big {
    ($type: tt, $tval: tt) => {
        impl EndianData<$tval> for $type {
            const WIDTH: usize = size_of::<$tval>();

            #[inline(always)]
            fn value(&self) -> $tval {
                $tval::from_be(self.0)
            }

            fn from_bytes(bytes: &[u8]) -> Option<Self> {
                let raw = bytes.get(..Self::WIDTH)?.try_into().ok()?;
                Some($type($tval::from_ne_bytes(raw)))
            }
        }
    };
}

impl_converter_big!(BigEndian32, u32);
impl_converter_big!(BigEndian64, u64);
