//! Level 5 MAT-file writer (little-endian)
//!
//! Writes the subset of the format the reader decodes: numeric, char, cell
//! and struct arrays. Numeric data is always stored as `miDOUBLE` whatever the
//! declared class, which the format permits. Each top-level variable can be
//! wrapped in a `miCOMPRESSED` element.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::array::{MatArray, MatData};
use super::element::{padded_len, DataType};
use super::{MatError, HEADER_LEN, LEVEL5_VERSION};
use crate::layout::{element_count, row_major_to_column_major};

/// MATLAB's limit on field name length, including the terminating NUL
const MAX_FIELD_NAME_LEN: usize = 64;

/// Writer configuration for MAT-files
#[derive(Debug, Clone)]
pub struct MatWriter {
    compress: bool,
    description: String,
}

impl Default for MatWriter {
    fn default() -> Self {
        Self {
            compress: false,
            description: format!("MATLAB 5.0 MAT-file, Created by: matflat {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl MatWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap each variable in a zlib-compressed element
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Write `variables` to a new file at `path`
    pub fn write_file<P: AsRef<Path>>(&self, path: P, variables: &[MatArray]) -> Result<(), MatError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, variables)?;
        writer.flush()?;
        Ok(())
    }

    /// Encode `variables` into an in-memory MAT-file
    pub fn to_bytes(&self, variables: &[MatArray]) -> Result<Vec<u8>, MatError> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes, variables)?;
        Ok(bytes)
    }

    /// Write the header and every variable to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W, variables: &[MatArray]) -> Result<(), MatError> {
        writer.write_all(&self.header())?;

        for variable in variables {
            let mut element = Vec::new();
            write_element(&mut element, DataType::Matrix, &encode_matrix(variable, variable.name())?)?;

            if self.compress {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&element)?;
                let compressed = encoder.finish()?;
                writer.write_u32::<LittleEndian>(DataType::Compressed.code())?;
                writer.write_u32::<LittleEndian>(payload_len(compressed.len())?)?;
                writer.write_all(&compressed)?;
            } else {
                writer.write_all(&element)?;
            }
        }

        Ok(())
    }

    fn header(&self) -> [u8; HEADER_LEN] {
        let mut header = [b' '; HEADER_LEN];
        let text = self.description.as_bytes();
        let len = text.len().min(116);
        header[..len].copy_from_slice(&text[..len]);
        // Subsystem data offset: unused
        header[116..124].fill(0);
        header[124..126].copy_from_slice(&LEVEL5_VERSION.to_le_bytes());
        header[126..128].copy_from_slice(b"IM");
        header
    }
}

fn payload_len(len: usize) -> Result<u32, MatError> {
    u32::try_from(len)
        .map_err(|_| MatError::InvalidStructure(format!("element of {} bytes exceeds 4 GiB", len)))
}

/// Append one data element, using the small format for payloads up to 4 bytes
fn write_element(out: &mut Vec<u8>, data_type: DataType, payload: &[u8]) -> Result<(), MatError> {
    if payload.len() <= 4 && data_type != DataType::Matrix && !payload.is_empty() {
        let word = ((payload.len() as u32) << 16) | data_type.code();
        out.write_u32::<LittleEndian>(word)?;
        out.extend_from_slice(payload);
        out.resize(out.len() + 4 - payload.len(), 0);
        return Ok(());
    }

    out.write_u32::<LittleEndian>(data_type.code())?;
    out.write_u32::<LittleEndian>(payload_len(payload.len())?)?;
    out.extend_from_slice(payload);
    out.resize(out.len() + padded_len(payload.len()) - payload.len(), 0);
    Ok(())
}

/// Encode the sub-elements of a `miMATRIX` payload under `name`
fn encode_matrix(array: &MatArray, name: &str) -> Result<Vec<u8>, MatError> {
    let numel = element_count(array.dims())
        .ok_or_else(|| MatError::InvalidStructure(format!("dimensions {:?} overflow", array.dims())))?;

    let mut body = Vec::new();

    let (class, logical) = match array.data() {
        MatData::Numeric { class, logical, .. } => (*class, *logical),
        _ => (array.class(), false),
    };
    let flag_bits: u32 = if logical { 0x02 } else { 0 };
    let mut flags = Vec::with_capacity(8);
    flags.write_u32::<LittleEndian>(u32::from(class.code()) | (flag_bits << 8))?;
    flags.write_u32::<LittleEndian>(0)?;
    write_element(&mut body, DataType::UInt32, &flags)?;

    if array.dims().len() < 2 {
        return Err(MatError::InvalidStructure(format!(
            "arrays need at least two dimensions, found {}",
            array.dims().len()
        )));
    }
    let mut dims = Vec::with_capacity(array.dims().len() * 4);
    for &d in array.dims() {
        let d = i32::try_from(d)
            .map_err(|_| MatError::InvalidStructure(format!("dimension {} exceeds i32", d)))?;
        dims.write_i32::<LittleEndian>(d)?;
    }
    write_element(&mut body, DataType::Int32, &dims)?;

    write_element(&mut body, DataType::Int8, name.as_bytes())?;

    match array.data() {
        MatData::Numeric { values, .. } => {
            check_len(numel, values.len())?;
            let mut real = Vec::with_capacity(values.len() * 8);
            for value in row_major_to_column_major(array.dims(), values) {
                real.write_f64::<LittleEndian>(value)?;
            }
            write_element(&mut body, DataType::Double, &real)?;
        }
        MatData::Char(text) => {
            let units: Vec<u16> = text.encode_utf16().collect();
            check_len(numel, units.len())?;
            let mut data = Vec::with_capacity(units.len() * 2);
            for unit in row_major_to_column_major(array.dims(), &units) {
                data.write_u16::<LittleEndian>(unit)?;
            }
            write_element(&mut body, DataType::UInt16, &data)?;
        }
        MatData::Cell(items) => {
            check_len(numel, items.len())?;
            for item in items {
                write_element(&mut body, DataType::Matrix, &encode_matrix(item, "")?)?;
            }
        }
        MatData::Struct {
            field_names,
            elements,
        } => {
            if !field_names.is_empty() {
                check_len(numel, elements.len())?;
            }
            encode_struct(&mut body, field_names, elements)?;
        }
    }

    Ok(body)
}

fn encode_struct(
    body: &mut Vec<u8>,
    field_names: &[String],
    elements: &[Vec<MatArray>],
) -> Result<(), MatError> {
    let longest = field_names.iter().map(|name| name.len()).max().unwrap_or(0);
    if longest >= MAX_FIELD_NAME_LEN {
        return Err(MatError::InvalidStructure(format!(
            "field names are limited to {} bytes",
            MAX_FIELD_NAME_LEN - 1
        )));
    }
    // Name slots are padded to a multiple of 8 with at least one NUL
    let name_len = padded_len(longest + 1);

    let mut len_bytes = Vec::with_capacity(4);
    len_bytes.write_i32::<LittleEndian>(name_len as i32)?;
    write_element(body, DataType::Int32, &len_bytes)?;

    let mut names = vec![0u8; name_len * field_names.len()];
    for (slot, name) in names.chunks_mut(name_len).zip(field_names) {
        slot[..name.len()].copy_from_slice(name.as_bytes());
    }
    write_element(body, DataType::Int8, &names)?;

    for values in elements {
        if values.len() != field_names.len() {
            return Err(MatError::InvalidLength {
                expected: field_names.len(),
                actual: values.len(),
            });
        }
        for value in values {
            // Field values carry no name of their own
            write_element(body, DataType::Matrix, &encode_matrix(value, "")?)?;
        }
    }

    Ok(())
}

fn check_len(expected: usize, actual: usize) -> Result<(), MatError> {
    if expected != actual {
        return Err(MatError::InvalidLength { expected, actual });
    }
    Ok(())
}
