use log::debug;

use super::error::ExtractError;
use super::schema::{Normalize, RecordSchema};
use super::value::{FieldValue, FlatMapping, NdArray};
use crate::mat::{MatArray, MatData, MatFile};

/// Dimensions of the shell every legacy record is stored in
const RECORD_SHELL: [usize; 2] = [1, 1];

/// Look up the schema's record variable in `file` and flatten it
pub fn extract_from_file(file: &MatFile, schema: &RecordSchema) -> Result<FlatMapping, ExtractError> {
    let record = file
        .get(schema.variable())
        .ok_or_else(|| ExtractError::KeyNotFound(schema.variable().to_string()))?;
    extract(record, schema)
}

/// Flatten a 1×1 struct record into a field name → value mapping.
///
/// Fields are visited in declaration order. A field with exactly one element
/// becomes a bare scalar; any other field keeps its stored shape, except the
/// fields the schema marks [`Normalize::Flatten`], which always come out
/// one-dimensional.
///
/// # Errors
///
/// - [`ExtractError::KeyNotFound`] if a field named by a schema rule is not
///   declared by the record, or a declared field has no value
/// - [`ExtractError::ShapeMismatch`] if the record is not exactly 1×1
/// - [`ExtractError::NotARecord`] / [`ExtractError::UnsupportedValue`] for
///   non-struct records and non-numeric fields
pub fn extract(record: &MatArray, schema: &RecordSchema) -> Result<FlatMapping, ExtractError> {
    let (field_names, elements) = match record.data() {
        MatData::Struct {
            field_names,
            elements,
        } => (field_names, elements),
        _ => {
            return Err(ExtractError::NotARecord {
                name: record.name().to_string(),
                class: record.class().to_string(),
            })
        }
    };

    let shell_mismatch = || ExtractError::ShapeMismatch {
        expected: RECORD_SHELL.to_vec(),
        actual: record.dims().to_vec(),
    };
    if record.dims() != RECORD_SHELL {
        return Err(shell_mismatch());
    }
    let values = elements.first().map(Vec::as_slice).unwrap_or_default();

    for rule in schema.rules() {
        if !field_names.contains(&rule.name) {
            return Err(ExtractError::KeyNotFound(rule.name.clone()));
        }
    }

    let mut mapping = FlatMapping::new();
    for (index, name) in field_names.iter().enumerate() {
        let value = values
            .get(index)
            .ok_or_else(|| ExtractError::KeyNotFound(name.clone()))?;
        let field = normalize(name, value, schema.rule_for(name))?;
        debug!("  {} {:?} -> {:?}", name, value.dims(), field.shape());
        mapping.insert(name.clone(), field);
    }

    Ok(mapping)
}

fn normalize(name: &str, value: &MatArray, rule: Normalize) -> Result<FieldValue, ExtractError> {
    let values = value
        .numeric_values()
        .ok_or_else(|| ExtractError::UnsupportedValue {
            field: name.to_string(),
            class: value.class().to_string(),
        })?;

    let field = match rule {
        Normalize::Flatten => FieldValue::Array(NdArray::vector(values.to_vec())),
        Normalize::Generic if values.len() == 1 => FieldValue::Scalar(values[0]),
        Normalize::Generic => FieldValue::Array(NdArray::new(value.dims().to_vec(), values.to_vec())?),
    };
    Ok(field)
}
