use alloc::{boxed::Box, vec::Vec};
use core::{fmt, str};
use utils::endian::{BigEndian32, EndianData};

pub struct Property {
    pub name: Box<str>,
    pub data: Box<[u8]>,
}

impl Property {
    pub fn new(name: impl AsRef<str>, data: impl Into<Box<[u8]>>) -> Property {
        Property {
            name: Box::from(name.as_ref()),
            data: data.into(),
        }
    }
}

impl Property {
    /// Read a single byte value.
    ///
    /// Accepts both a `/bits/ 8` encoded property (one byte) and a regular
    /// 32-bit cell whose value fits into a byte; anything else is rejected.
    pub fn value_as_u8(&self) -> Result<u8, PropertyError> {
        match self.data.len() {
            0 => Err(PropertyError::InvalidPropFormat),
            1..=3 => Ok(self.data[0]),
            _ => u8::try_from(self.value_as_u32()?).map_err(|_| PropertyError::InvalidPropFormat),
        }
    }
    pub fn value_as_u32(&self) -> Result<u32, PropertyError> {
        BigEndian32::from_bytes(&self.data)
            .map(|v| v.value())
            .ok_or(PropertyError::InvalidPropFormat)
    }
    pub fn value_as_strlist(&self) -> Result<Vec<&str>, PropertyError> {
        let data = self.data.strip_suffix(&[0]).unwrap_or(&self.data);
        if data.is_empty() {
            return Ok(Vec::new());
        }
        data.split(|b| *b == 0)
            .map(|s| str::from_utf8(s).map_err(|_| PropertyError::InvalidPropFormat))
            .collect()
    }
    /// Decode the whole property as a list of 32-bit cells.
    pub fn value_as_cells(&self) -> Result<Vec<u32>, PropertyError> {
        if self.data.len() % 4 != 0 {
            return Err(PropertyError::InvalidPropFormat);
        }
        Ok(self
            .data
            .chunks_exact(4)
            .filter_map(BigEndian32::from_bytes)
            .map(|v| v.value())
            .collect())
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}[{} bytes]", self.name, self.data.len()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyError {
    InvalidPropFormat,
    PropNotFound,
    DanglingHandle,
    DuplicatedHandle { phandle: u32 },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyError::InvalidPropFormat => f.write_str("invalid property format"),
            PropertyError::PropNotFound => f.write_str("property not found"),
            PropertyError::DanglingHandle => f.write_str("phandle does not refer to any node"),
            PropertyError::DuplicatedHandle { phandle } => {
                f.write_fmt(format_args!("phandle {:#x} is used by more than one node", phandle))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_values_from_either_encoding() {
        assert_eq!(Property::new("a", [2u8]).value_as_u8(), Ok(2));
        assert_eq!(Property::new("b", [0, 0, 0, 7u8]).value_as_u8(), Ok(7));
        assert_eq!(
            Property::new("c", [0, 0, 1, 0u8]).value_as_u8(),
            Err(PropertyError::InvalidPropFormat)
        );
        assert_eq!(
            Property::new("d", Vec::<u8>::new()).value_as_u8(),
            Err(PropertyError::InvalidPropFormat)
        );
    }

    #[test]
    fn cells_and_strings() {
        let reg = Property::new("reg", [0, 0, 0, 1, 0, 0, 0x10, 0u8]);
        assert_eq!(reg.value_as_cells().unwrap(), vec![1, 0x1000]);
        assert_eq!(reg.value_as_u32(), Ok(1));
        assert_eq!(
            Property::new("odd", [0, 0, 1u8]).value_as_cells(),
            Err(PropertyError::InvalidPropFormat)
        );

        let names = Property::new("reset-names", *b"core\0bus\0");
        assert_eq!(names.value_as_strlist().unwrap(), vec!["core", "bus"]);
        assert!(Property::new("empty", *b"\0").value_as_strlist().unwrap().is_empty());
    }
}
