//! Data element tags and payload decoding for level 5 MAT-files.
//!
//! Every value in a MAT-file is a data element: an 8-byte tag (type code and
//! byte count) followed by the payload, padded to an 8-byte boundary. Payloads
//! of at most four bytes may use the small element format, where the type and
//! byte count share the first four bytes and the payload fills the other four.
//! Compressed elements are not padded.

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;

use super::MatError;

/// Byte order of a MAT-file, taken from the header's endian indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Indicator bytes read as `IM`
    #[default]
    Little,
    /// Indicator bytes read as `MI`
    Big,
}

impl Endian {
    /// Read a `u16` in this byte order. `bytes` must hold at least 2 bytes.
    pub(crate) fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            Endian::Little => LittleEndian::read_u16(bytes),
            Endian::Big => BigEndian::read_u16(bytes),
        }
    }

    /// Read a `u32` in this byte order. `bytes` must hold at least 4 bytes.
    pub(crate) fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            Endian::Little => LittleEndian::read_u32(bytes),
            Endian::Big => BigEndian::read_u32(bytes),
        }
    }
}

/// Data element type codes (`miINT8` .. `miUTF32`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Single,
    Double,
    Int64,
    UInt64,
    Matrix,
    Compressed,
    Utf8,
    Utf16,
    Utf32,
}

impl DataType {
    /// Map a tag type code to a data type
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(DataType::Int8),
            2 => Some(DataType::UInt8),
            3 => Some(DataType::Int16),
            4 => Some(DataType::UInt16),
            5 => Some(DataType::Int32),
            6 => Some(DataType::UInt32),
            7 => Some(DataType::Single),
            9 => Some(DataType::Double),
            12 => Some(DataType::Int64),
            13 => Some(DataType::UInt64),
            14 => Some(DataType::Matrix),
            15 => Some(DataType::Compressed),
            16 => Some(DataType::Utf8),
            17 => Some(DataType::Utf16),
            18 => Some(DataType::Utf32),
            _ => None,
        }
    }

    /// Tag type code written to disk
    pub fn code(self) -> u32 {
        match self {
            DataType::Int8 => 1,
            DataType::UInt8 => 2,
            DataType::Int16 => 3,
            DataType::UInt16 => 4,
            DataType::Int32 => 5,
            DataType::UInt32 => 6,
            DataType::Single => 7,
            DataType::Double => 9,
            DataType::Int64 => 12,
            DataType::UInt64 => 13,
            DataType::Matrix => 14,
            DataType::Compressed => 15,
            DataType::Utf8 => 16,
            DataType::Utf16 => 17,
            DataType::Utf32 => 18,
        }
    }

    /// Bytes per value for numeric and text storage types
    pub fn byte_size(self) -> Option<usize> {
        match self {
            DataType::Int8 | DataType::UInt8 | DataType::Utf8 => Some(1),
            DataType::Int16 | DataType::UInt16 | DataType::Utf16 => Some(2),
            DataType::Int32 | DataType::UInt32 | DataType::Single | DataType::Utf32 => Some(4),
            DataType::Double | DataType::Int64 | DataType::UInt64 => Some(8),
            DataType::Matrix | DataType::Compressed => None,
        }
    }
}

/// A data element borrowed from its enclosing buffer
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawElement<'a> {
    pub data_type: DataType,
    pub payload: &'a [u8],
}

/// Sequential reader over the data elements in a buffer
pub(crate) struct ElementReader<'a> {
    buf: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ElementReader<'a> {
    pub fn new(buf: &'a [u8], endian: Endian) -> Self {
        Self { buf, pos: 0, endian }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Read the next element, or `None` once the buffer is exhausted
    pub fn next_element(&mut self) -> Result<Option<RawElement<'a>>, MatError> {
        let remaining = self.buf.len().saturating_sub(self.pos);
        if remaining == 0 {
            return Ok(None);
        }
        if remaining < 8 {
            return Err(MatError::Truncated {
                offset: self.pos,
                needed: 8,
                available: remaining,
            });
        }

        let tag = &self.buf[self.pos..self.pos + 8];
        let word = self.endian.read_u32(&tag[..4]);

        // Small element: byte count lives in the upper half of the first word
        if word >> 16 != 0 {
            let nbytes = (word >> 16) as usize;
            let data_type = Self::data_type(word & 0xFFFF)?;
            if nbytes > 4 {
                return Err(MatError::InvalidStructure(format!(
                    "small data element claims {} bytes",
                    nbytes
                )));
            }
            self.pos += 8;
            return Ok(Some(RawElement {
                data_type,
                payload: &tag[4..4 + nbytes],
            }));
        }

        let data_type = Self::data_type(word)?;
        let nbytes = self.endian.read_u32(&tag[4..8]) as usize;
        let start = self.pos + 8;
        let available = self.buf.len() - start;
        if nbytes > available {
            return Err(MatError::Truncated {
                offset: self.pos,
                needed: nbytes,
                available,
            });
        }

        let payload = &self.buf[start..start + nbytes];
        let advance = if data_type == DataType::Compressed {
            nbytes
        } else {
            padded_len(nbytes)
        };
        self.pos = (start + advance).min(self.buf.len());

        Ok(Some(RawElement { data_type, payload }))
    }

    /// Read the next element, failing if the buffer is exhausted
    pub fn expect_element(&mut self, what: &str) -> Result<RawElement<'a>, MatError> {
        self.next_element()?
            .ok_or_else(|| MatError::InvalidStructure(format!("missing {} sub-element", what)))
    }

    fn data_type(code: u32) -> Result<DataType, MatError> {
        DataType::from_code(code).ok_or(MatError::UnknownDataType(code))
    }
}

/// Payload length rounded up to the 8-byte element boundary
pub(crate) fn padded_len(nbytes: usize) -> usize {
    (nbytes + 7) / 8 * 8
}

/// Inflate the zlib stream of a `miCOMPRESSED` element
pub(crate) fn inflate(payload: &[u8]) -> Result<Vec<u8>, MatError> {
    let mut decoder = ZlibDecoder::new(payload);
    let mut inflated = Vec::new();
    decoder.read_to_end(&mut inflated)?;
    Ok(inflated)
}

/// Decode a numeric payload into `f64` values, widening as needed
pub(crate) fn decode_numeric(
    data_type: DataType,
    bytes: &[u8],
    endian: Endian,
) -> Result<Vec<f64>, MatError> {
    match endian {
        Endian::Little => decode_values::<LittleEndian>(data_type, bytes),
        Endian::Big => decode_values::<BigEndian>(data_type, bytes),
    }
}

fn decode_values<B: ByteOrder>(data_type: DataType, bytes: &[u8]) -> Result<Vec<f64>, MatError> {
    let byte_size = match data_type {
        DataType::Matrix | DataType::Compressed | DataType::Utf8 | DataType::Utf16 | DataType::Utf32 => {
            return Err(MatError::InvalidStructure(format!(
                "{:?} element cannot hold numeric data",
                data_type
            )))
        }
        other => other.byte_size().unwrap_or(8),
    };

    if bytes.len() % byte_size != 0 {
        return Err(MatError::InvalidLength {
            expected: bytes.len() / byte_size * byte_size,
            actual: bytes.len(),
        });
    }

    let count = bytes.len() / byte_size;
    let mut values = Vec::with_capacity(count);
    let mut cursor = Cursor::new(bytes);

    for _ in 0..count {
        let value = match data_type {
            DataType::Int8 => cursor.read_i8()? as f64,
            DataType::UInt8 => cursor.read_u8()? as f64,
            DataType::Int16 => cursor.read_i16::<B>()? as f64,
            DataType::UInt16 => cursor.read_u16::<B>()? as f64,
            DataType::Int32 => cursor.read_i32::<B>()? as f64,
            DataType::UInt32 => cursor.read_u32::<B>()? as f64,
            DataType::Single => cursor.read_f32::<B>()? as f64,
            DataType::Double => cursor.read_f64::<B>()?,
            DataType::Int64 => cursor.read_i64::<B>()? as f64,
            DataType::UInt64 => cursor.read_u64::<B>()? as f64,
            other => {
                return Err(MatError::InvalidStructure(format!(
                    "{:?} element cannot hold numeric data",
                    other
                )))
            }
        };
        values.push(value);
    }

    Ok(values)
}

/// Decode an `Int32` payload (dimensions, field name length)
pub(crate) fn decode_i32s(element: RawElement<'_>, endian: Endian) -> Result<Vec<i32>, MatError> {
    if element.data_type != DataType::Int32 {
        return Err(MatError::InvalidStructure(format!(
            "expected Int32 element, found {:?}",
            element.data_type
        )));
    }
    if element.payload.len() % 4 != 0 {
        return Err(MatError::InvalidLength {
            expected: element.payload.len() / 4 * 4,
            actual: element.payload.len(),
        });
    }
    let mut values = vec![0i32; element.payload.len() / 4];
    match endian {
        Endian::Little => LittleEndian::read_i32_into(element.payload, &mut values),
        Endian::Big => BigEndian::read_i32_into(element.payload, &mut values),
    }
    Ok(values)
}

/// Decode text code units (UTF-8/16/32 or 8/16-bit integer storage)
pub(crate) fn decode_code_units(element: RawElement<'_>, endian: Endian) -> Result<Vec<u32>, MatError> {
    let payload = element.payload;
    let units = match element.data_type {
        DataType::Utf8 | DataType::UInt8 | DataType::Int8 => {
            return Ok(String::from_utf8_lossy(payload).chars().map(u32::from).collect())
        }
        DataType::Utf16 | DataType::UInt16 => {
            if payload.len() % 2 != 0 {
                return Err(MatError::InvalidLength {
                    expected: payload.len() / 2 * 2,
                    actual: payload.len(),
                });
            }
            payload.chunks_exact(2).map(|c| u32::from(endian.read_u16(c))).collect()
        }
        DataType::Utf32 | DataType::UInt32 => {
            if payload.len() % 4 != 0 {
                return Err(MatError::InvalidLength {
                    expected: payload.len() / 4 * 4,
                    actual: payload.len(),
                });
            }
            payload.chunks_exact(4).map(|c| endian.read_u32(c)).collect()
        }
        other => {
            return Err(MatError::InvalidStructure(format!(
                "{:?} element cannot hold character data",
                other
            )))
        }
    };
    Ok(units)
}
