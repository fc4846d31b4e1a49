//! Level 5 MAT-file reader

use std::path::Path;

use log::{debug, warn};

use super::array::{MatArray, MatClass, MatData};
use super::element::{
    decode_code_units, decode_i32s, decode_numeric, inflate, DataType, ElementReader, Endian,
    RawElement,
};
use super::{MatError, HEADER_LEN, LEVEL5_VERSION};
use crate::layout::{column_major_to_row_major, element_count};

/// Array flag bits (second byte of the flags word)
const FLAG_COMPLEX: u32 = 0x08;
const FLAG_LOGICAL: u32 = 0x02;

/// Deepest cell/struct nesting accepted below a top-level variable
pub(crate) const MAX_NESTING_DEPTH: usize = 64;

/// Descriptive header of a MAT-file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatHeader {
    /// Human-readable header text, trailing padding removed
    pub text: String,
    /// Format version (0x0100 for level 5)
    pub version: u16,
    /// Byte order of every element in the file
    pub endian: Endian,
}

impl MatHeader {
    /// Parse the fixed 128-byte header
    pub fn parse(bytes: &[u8]) -> Result<Self, MatError> {
        if bytes.len() < HEADER_LEN {
            return Err(MatError::InvalidHeader(format!(
                "file is {} bytes, header needs {}",
                bytes.len(),
                HEADER_LEN
            )));
        }

        let text = String::from_utf8_lossy(&bytes[..116])
            .trim_end_matches(|c: char| c == ' ' || c == '\0')
            .to_string();

        if text.starts_with("MATLAB 7.3") {
            return Err(MatError::UnsupportedVersion(
                "7.3 (HDF5-based) files are not supported".to_string(),
            ));
        }

        let endian = match &bytes[126..128] {
            b"IM" => Endian::Little,
            b"MI" => Endian::Big,
            other => {
                return Err(MatError::InvalidHeader(format!(
                    "unrecognised endian indicator {:?}",
                    String::from_utf8_lossy(other)
                )))
            }
        };

        let version = endian.read_u16(&bytes[124..126]);
        if version != LEVEL5_VERSION {
            return Err(MatError::UnsupportedVersion(format!("0x{:04x}", version)));
        }

        Ok(Self {
            text,
            version,
            endian,
        })
    }
}

/// A fully decoded MAT-file
#[derive(Debug, Clone)]
pub struct MatFile {
    header: MatHeader,
    variables: Vec<MatArray>,
}

impl MatFile {
    /// Read and decode a MAT-file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MatError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Self::from_bytes(&bytes)
    }

    /// Decode a MAT-file held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MatError> {
        let header = MatHeader::parse(bytes)?;
        let mut reader = ElementReader::new(&bytes[HEADER_LEN..], header.endian);
        let mut variables = Vec::new();

        while let Some(element) = reader.next_element()? {
            match element.data_type {
                DataType::Matrix | DataType::Compressed => {
                    let array = decode_matrix_element(element, reader.endian(), 0)?;
                    debug!(
                        "Decoded variable '{}' ({} {:?})",
                        array.name(),
                        array.class(),
                        array.dims()
                    );
                    variables.push(array);
                }
                other => warn!("Skipping top-level {:?} element", other),
            }
        }

        Ok(Self { header, variables })
    }

    pub fn header(&self) -> &MatHeader {
        &self.header
    }

    /// Look up a top-level variable by name
    pub fn get(&self, name: &str) -> Option<&MatArray> {
        self.variables.iter().find(|v| v.name() == name)
    }

    /// Top-level variables in file order
    pub fn variables(&self) -> impl Iterator<Item = &MatArray> {
        self.variables.iter()
    }

    /// Number of top-level variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Decode a `miMATRIX` element, inflating it first when compressed
fn decode_matrix_element(element: RawElement<'_>, endian: Endian, depth: usize) -> Result<MatArray, MatError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(MatError::InvalidStructure(format!(
            "nesting deeper than {}",
            MAX_NESTING_DEPTH
        )));
    }
    match element.data_type {
        DataType::Matrix => parse_matrix(element.payload, endian, depth),
        DataType::Compressed => {
            let inflated = inflate(element.payload)?;
            let mut inner = ElementReader::new(&inflated, endian);
            let element = inner.expect_element("compressed matrix")?;
            if element.data_type != DataType::Matrix {
                return Err(MatError::InvalidStructure(format!(
                    "compressed element wraps {:?}, expected Matrix",
                    element.data_type
                )));
            }
            parse_matrix(element.payload, endian, depth)
        }
        other => Err(MatError::InvalidStructure(format!(
            "expected Matrix element, found {:?}",
            other
        ))),
    }
}

/// Decode the sub-elements of a `miMATRIX` payload
fn parse_matrix(payload: &[u8], endian: Endian, depth: usize) -> Result<MatArray, MatError> {
    if payload.is_empty() {
        return Ok(MatArray::empty(""));
    }

    let mut reader = ElementReader::new(payload, endian);

    let flags = reader.expect_element("array flags")?;
    if flags.data_type != DataType::UInt32 || flags.payload.len() < 4 {
        return Err(MatError::InvalidStructure(
            "array flags must be a UInt32 element".to_string(),
        ));
    }
    let flags_word = endian.read_u32(&flags.payload[..4]);
    let class_code = (flags_word & 0xFF) as u8;
    let flag_bits = (flags_word >> 8) & 0xFF;
    let class = MatClass::from_code(class_code)
        .ok_or_else(|| MatError::UnsupportedClass(format!("class code {}", class_code)))?;

    let dims = decode_dims(reader.expect_element("dimensions")?, endian)?;
    let numel = element_count(&dims)
        .ok_or_else(|| MatError::InvalidStructure(format!("dimensions {:?} overflow", dims)))?;

    let name_element = reader.expect_element("array name")?;
    let name = String::from_utf8_lossy(name_element.payload).into_owned();

    let data = match class {
        MatClass::Sparse | MatClass::Object => {
            return Err(MatError::UnsupportedClass(format!("{} ('{}')", class, name)))
        }
        _ if flag_bits & FLAG_COMPLEX != 0 => {
            return Err(MatError::UnsupportedClass(format!("complex {} ('{}')", class, name)))
        }
        MatClass::Char => parse_char(&mut reader, &dims, numel, endian)?,
        MatClass::Cell => {
            let mut items = Vec::new();
            for _ in 0..numel {
                let item = reader.expect_element("cell item")?;
                items.push(decode_matrix_element(item, endian, depth + 1)?);
            }
            MatData::Cell(items)
        }
        MatClass::Struct => parse_struct(&mut reader, numel, endian, depth)?,
        _ => {
            let real = reader.expect_element("real part")?;
            let values = decode_numeric(real.data_type, real.payload, endian)?;
            if values.len() != numel {
                return Err(MatError::InvalidLength {
                    expected: numel,
                    actual: values.len(),
                });
            }
            MatData::Numeric {
                class,
                logical: flag_bits & FLAG_LOGICAL != 0,
                values: column_major_to_row_major(&dims, &values),
            }
        }
    };

    Ok(MatArray::new(name, dims, data))
}

fn decode_dims(element: RawElement<'_>, endian: Endian) -> Result<Vec<usize>, MatError> {
    let raw = decode_i32s(element, endian)?;
    if raw.len() < 2 {
        return Err(MatError::InvalidStructure(format!(
            "arrays need at least two dimensions, found {}",
            raw.len()
        )));
    }
    raw.into_iter()
        .map(|d| {
            usize::try_from(d)
                .map_err(|_| MatError::InvalidStructure(format!("negative dimension {}", d)))
        })
        .collect()
}

fn parse_char(
    reader: &mut ElementReader<'_>,
    dims: &[usize],
    numel: usize,
    endian: Endian,
) -> Result<MatData, MatError> {
    let element = match reader.next_element()? {
        Some(element) => element,
        None if numel == 0 => return Ok(MatData::Char(String::new())),
        None => return Err(MatError::InvalidStructure("missing char data".to_string())),
    };

    let units = decode_code_units(element, endian)?;
    // UTF-8 payloads may hold fewer code points than elements; keep stored order then
    let ordered = if units.len() == numel {
        column_major_to_row_major(dims, &units)
    } else {
        units
    };

    let text = match element.data_type {
        DataType::Utf16 | DataType::UInt16 => {
            let wide: Vec<u16> = ordered.iter().map(|&u| u as u16).collect();
            String::from_utf16_lossy(&wide)
        }
        _ => ordered
            .into_iter()
            .map(|u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
    };
    Ok(MatData::Char(text))
}

fn parse_struct(
    reader: &mut ElementReader<'_>,
    numel: usize,
    endian: Endian,
    depth: usize,
) -> Result<MatData, MatError> {
    let name_len = decode_i32s(reader.expect_element("field name length")?, endian)?;
    let name_len = match name_len.first() {
        Some(&len) if len > 0 => len as usize,
        _ => {
            return Err(MatError::InvalidStructure(
                "field name length must be positive".to_string(),
            ))
        }
    };

    let names = reader.expect_element("field names")?;
    if names.payload.len() % name_len != 0 {
        return Err(MatError::InvalidStructure(format!(
            "field names block of {} bytes is not a multiple of {}",
            names.payload.len(),
            name_len
        )));
    }
    let field_names: Vec<String> = names
        .payload
        .chunks(name_len)
        .map(|chunk| {
            let end = chunk.iter().position(|&b| b == 0).unwrap_or(chunk.len());
            String::from_utf8_lossy(&chunk[..end]).into_owned()
        })
        .collect();

    // Without fields there is nothing stored per element.
    let mut elements = Vec::new();
    let stored = if field_names.is_empty() { 0 } else { numel };
    for _ in 0..stored {
        let mut values = Vec::with_capacity(field_names.len());
        for field in &field_names {
            let element = reader.expect_element(&format!("field '{}'", field))?;
            // Field values are stored without names; give them the field's
            values.push(decode_matrix_element(element, endian, depth + 1)?.renamed(field.clone()));
        }
        elements.push(values);
    }

    Ok(MatData::Struct {
        field_names,
        elements,
    })
}
