//! NumPy `.npy` array encoding
//!
//! Layout: `\x93NUMPY` | major | minor | header length | header dict | data.
//! Version 1.0 uses a `u16` header length, 2.0 a `u32`. The header is a Python
//! dict literal padded with spaces and a newline to a 64-byte boundary.
//!
//! Arrays are always written as little-endian `f64` in C order. Reading also
//! accepts integer, boolean and `f4` payloads and Fortran-ordered data, so
//! archives produced by NumPy itself load too.

use std::io::{Cursor, Read, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

use super::NpzError;
use crate::layout::{column_major_to_row_major, element_count};
use crate::record::{FieldValue, NdArray};

const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// magic + version + u16 header length
const PREFIX_LEN_V1: usize = 10;

/// Element type parsed from a `descr` string such as `<f8`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Dtype {
    kind: char,
    size: usize,
    big_endian: bool,
}

impl Dtype {
    fn parse(descr: &str) -> Result<Self, NpzError> {
        let unsupported = || NpzError::UnsupportedDtype(descr.to_string());
        let mut chars = descr.chars();
        let order = chars.next().ok_or_else(unsupported)?;
        let kind = chars.next().ok_or_else(unsupported)?;
        let size: usize = chars.as_str().parse().map_err(|_| unsupported())?;

        let big_endian = match order {
            '<' | '|' | '=' => false,
            '>' => true,
            _ => return Err(unsupported()),
        };

        let supported = matches!(
            (kind, size),
            ('f', 4) | ('f', 8) | ('i', 1) | ('i', 2) | ('i', 4) | ('i', 8) | ('u', 1) | ('u', 2)
                | ('u', 4) | ('u', 8) | ('b', 1)
        );
        if !supported {
            return Err(unsupported());
        }

        Ok(Self {
            kind,
            size,
            big_endian,
        })
    }

    fn decode(self, bytes: &[u8]) -> Result<Vec<f64>, NpzError> {
        if self.big_endian {
            self.decode_with::<BigEndian>(bytes)
        } else {
            self.decode_with::<LittleEndian>(bytes)
        }
    }

    fn decode_with<B: ByteOrder>(self, bytes: &[u8]) -> Result<Vec<f64>, NpzError> {
        let count = bytes.len() / self.size;
        let mut values = Vec::with_capacity(count);
        let mut cursor = Cursor::new(bytes);
        for _ in 0..count {
            let value = match (self.kind, self.size) {
                ('f', 8) => cursor.read_f64::<B>()?,
                ('f', 4) => cursor.read_f32::<B>()? as f64,
                ('i', 1) => cursor.read_i8()? as f64,
                ('i', 2) => cursor.read_i16::<B>()? as f64,
                ('i', 4) => cursor.read_i32::<B>()? as f64,
                ('i', 8) => cursor.read_i64::<B>()? as f64,
                ('u', 1) | ('b', 1) => cursor.read_u8()? as f64,
                ('u', 2) => cursor.read_u16::<B>()? as f64,
                ('u', 4) => cursor.read_u32::<B>()? as f64,
                ('u', 8) => cursor.read_u64::<B>()? as f64,
                _ => return Err(NpzError::UnsupportedDtype(format!("{}{}", self.kind, self.size))),
            };
            values.push(value);
        }
        Ok(values)
    }
}

/// Encode a field value as a `.npy` v1.0 array
pub fn write_value<W: Write>(writer: &mut W, value: &FieldValue) -> Result<(), NpzError> {
    let (shape, data): (&[usize], &[f64]) = match value {
        FieldValue::Scalar(v) => (&[], std::slice::from_ref(v)),
        FieldValue::Array(array) => (array.shape(), array.data()),
    };

    let header_dict = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': {}, }}",
        format_shape(shape)
    );
    // Pad so the data starts on a 64-byte boundary; the header ends in '\n'
    let unpadded = PREFIX_LEN_V1 + header_dict.len() + 1;
    let padding = (64 - unpadded % 64) % 64;
    let header = format!("{}{}\n", header_dict, " ".repeat(padding));
    let header_len = u16::try_from(header.len())
        .map_err(|_| NpzError::InvalidHeader(format!("header of {} bytes too long", header.len())))?;

    writer.write_all(MAGIC)?;
    writer.write_all(&[1u8, 0u8])?;
    writer.write_u16::<LittleEndian>(header_len)?;
    writer.write_all(header.as_bytes())?;
    for &v in data {
        writer.write_f64::<LittleEndian>(v)?;
    }
    Ok(())
}

/// Encode a field value into a fresh buffer
pub fn to_bytes(value: &FieldValue) -> Result<Vec<u8>, NpzError> {
    let mut bytes = Vec::with_capacity(128 + value.shape().iter().product::<usize>() * 8);
    write_value(&mut bytes, value)?;
    Ok(bytes)
}

/// Decode a `.npy` array. Shape `()` loads as a scalar.
pub fn read_value<R: Read>(reader: &mut R) -> Result<FieldValue, NpzError> {
    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(NpzError::InvalidHeader("missing NUMPY magic".to_string()));
    }

    let mut version = [0u8; 2];
    reader.read_exact(&mut version)?;
    let header_len = match version[0] {
        1 => reader.read_u16::<LittleEndian>()? as usize,
        2 | 3 => reader.read_u32::<LittleEndian>()? as usize,
        major => {
            return Err(NpzError::InvalidHeader(format!(
                "unsupported npy version {}.{}",
                major, version[1]
            )))
        }
    };

    let mut header_bytes = Vec::new();
    reader.by_ref().take(header_len as u64).read_to_end(&mut header_bytes)?;
    if header_bytes.len() != header_len {
        return Err(NpzError::InvalidHeader(format!(
            "header of {} bytes is truncated at {}",
            header_len,
            header_bytes.len()
        )));
    }
    let header = std::str::from_utf8(&header_bytes)
        .map_err(|e| NpzError::InvalidHeader(format!("header is not UTF-8: {}", e)))?;

    let dtype = Dtype::parse(header_field(header, "descr")?.trim_matches('\''))?;
    let fortran_order = match header_field(header, "fortran_order")? {
        "True" => true,
        "False" => false,
        other => {
            return Err(NpzError::InvalidHeader(format!(
                "fortran_order must be True or False, found {}",
                other
            )))
        }
    };
    let shape = parse_shape(header_field(header, "shape")?)?;

    let count = element_count(&shape)
        .ok_or_else(|| NpzError::InvalidHeader(format!("shape {:?} overflows", shape)))?;
    let byte_len = count
        .checked_mul(dtype.size)
        .ok_or_else(|| NpzError::InvalidHeader(format!("shape {:?} overflows", shape)))?;
    let mut data = Vec::new();
    reader.take(byte_len as u64).read_to_end(&mut data)?;
    if data.len() != byte_len {
        return Err(NpzError::InvalidHeader(format!(
            "expected {} data bytes, found {}",
            byte_len,
            data.len()
        )));
    }

    let mut values = dtype.decode(&data)?;
    if fortran_order {
        values = column_major_to_row_major(&shape, &values);
    }

    if shape.is_empty() {
        return Ok(FieldValue::Scalar(values[0]));
    }
    Ok(FieldValue::Array(NdArray::new(shape, values)?))
}

/// Raw text of `key`'s value in the header dict
fn header_field<'a>(header: &'a str, key: &str) -> Result<&'a str, NpzError> {
    let quoted = format!("'{}'", key);
    let start = header
        .find(&quoted)
        .ok_or_else(|| NpzError::InvalidHeader(format!("missing {}", key)))?;
    let rest = header[start + quoted.len()..].trim_start();
    let rest = rest
        .strip_prefix(':')
        .ok_or_else(|| NpzError::InvalidHeader(format!("malformed {}", key)))?
        .trim_start();

    // Tuples contain commas, so they end at the closing parenthesis
    let end = if rest.starts_with('(') {
        rest.find(')').map(|i| i + 1)
    } else {
        rest.find(|c| c == ',' || c == '}')
    }
    .ok_or_else(|| NpzError::InvalidHeader(format!("unterminated {}", key)))?;

    Ok(rest[..end].trim())
}

fn parse_shape(text: &str) -> Result<Vec<usize>, NpzError> {
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| NpzError::InvalidHeader(format!("shape is not a tuple: {}", text)))?;

    inner
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.trim_end_matches('L')
                .parse()
                .map_err(|_| NpzError::InvalidHeader(format!("bad shape entry '{}'", part)))
        })
        .collect()
}

fn format_shape(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [n] => format!("({},)", n),
        dims => {
            let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
            format!("({})", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_header_layout() {
        let bytes = to_bytes(&FieldValue::Scalar(3.0)).unwrap();
        assert_eq!(&bytes[..6], MAGIC);
        assert_eq!(&bytes[6..8], &[1, 0]);
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((PREFIX_LEN_V1 + header_len) % 64, 0);

        let header = std::str::from_utf8(&bytes[10..10 + header_len]).unwrap();
        assert!(header.starts_with("{'descr': '<f8', 'fortran_order': False, 'shape': (), }"));
        assert!(header.ends_with('\n'));
        assert_eq!(bytes.len(), PREFIX_LEN_V1 + header_len + 8);
    }

    #[test]
    fn test_format_shape() {
        assert_eq!(format_shape(&[]), "()");
        assert_eq!(format_shape(&[5]), "(5,)");
        assert_eq!(format_shape(&[2, 3]), "(2, 3)");
    }

    #[test]
    fn test_parse_shape() {
        assert_eq!(parse_shape("()").unwrap(), Vec::<usize>::new());
        assert_eq!(parse_shape("(5,)").unwrap(), vec![5]);
        assert_eq!(parse_shape("(2, 3)").unwrap(), vec![2, 3]);
        assert!(parse_shape("[2, 3]").is_err());
    }

    #[test]
    fn test_scalar_and_array_decode() {
        let scalar = FieldValue::Scalar(-1.5);
        let bytes = to_bytes(&scalar).unwrap();
        assert_eq!(read_value(&mut bytes.as_slice()).unwrap(), scalar);

        let array = FieldValue::Array(NdArray::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap());
        let bytes = to_bytes(&array).unwrap();
        assert_eq!(read_value(&mut bytes.as_slice()).unwrap(), array);
    }

    /// Build a `.npy` buffer with an arbitrary header and payload
    fn raw_npy(header_dict: &str, data: &[u8]) -> Vec<u8> {
        let mut header = header_dict.to_string();
        header.push('\n');
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[1, 0]);
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(data);
        bytes
    }

    #[test]
    fn test_decode_int32_fortran_order() {
        // [[1, 2, 3], [4, 5, 6]] stored column-major
        let data: Vec<u8> = [1i32, 4, 2, 5, 3, 6].iter().flat_map(|v| v.to_le_bytes()).collect();
        let bytes = raw_npy("{'descr': '<i4', 'fortran_order': True, 'shape': (2, 3), }", &data);

        let value = read_value(&mut bytes.as_slice()).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.shape(), &[2, 3]);
        assert_eq!(array.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_decode_big_endian_and_bool() {
        let data = 2.5f64.to_be_bytes();
        let bytes = raw_npy("{'descr': '>f8', 'fortran_order': False, 'shape': (1,), }", &data);
        let value = read_value(&mut bytes.as_slice()).unwrap();
        assert_eq!(value.as_array().unwrap().data(), &[2.5]);

        let bytes = raw_npy("{'descr': '|b1', 'fortran_order': False, 'shape': (2,), }", &[1, 0]);
        let value = read_value(&mut bytes.as_slice()).unwrap();
        assert_eq!(value.as_array().unwrap().data(), &[1.0, 0.0]);
    }

    #[test]
    fn test_rejects_object_dtype_and_short_data() {
        let bytes = raw_npy("{'descr': '|O', 'fortran_order': False, 'shape': (), }", &[]);
        assert!(matches!(
            read_value(&mut bytes.as_slice()),
            Err(NpzError::UnsupportedDtype(_))
        ));

        let bytes = raw_npy("{'descr': '<f8', 'fortran_order': False, 'shape': (2,), }", &[0; 8]);
        assert!(matches!(
            read_value(&mut bytes.as_slice()),
            Err(NpzError::InvalidHeader(_))
        ));

        assert!(matches!(
            read_value(&mut &b"NOTNPY...."[..]),
            Err(NpzError::InvalidHeader(_))
        ));
    }
}
