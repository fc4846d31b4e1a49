//! Property-based tests for record flattening and archive encoding

use matflat::mat::{MatArray, MatFile, MatWriter};
use matflat::npz::{self, NpzOptions};
use matflat::record::{extract, FieldValue, FlatMapping, NdArray, RecordSchema};
use proptest::prelude::*;
use std::io::Cursor;

fn finite() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |v| v.is_finite())
}

/// Dims with two to four axes of length 1..5, as MAT-files store them
fn dims() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..5, 2..=4)
}

fn numeric_field() -> impl Strategy<Value = MatArray> {
    dims().prop_flat_map(|dims| {
        let len = dims.iter().product::<usize>();
        prop::collection::vec(finite(), len).prop_map(move |values| MatArray::numeric("", dims.clone(), values))
    })
}

proptest! {
    /// Output keys are exactly the record's field names
    #[test]
    fn test_key_set_matches_fields(fields in prop::collection::btree_map("[a-z][a-z0-9_]{0,10}", numeric_field(), 1..8)) {
        let names: Vec<String> = fields.keys().cloned().collect();
        let record = MatArray::record("data", fields.into_iter().collect());
        let schema = RecordSchema::new("data").with_flatten_fields(Vec::<String>::new());

        let mapping = extract(&record, &schema).unwrap();
        let keys: Vec<&str> = mapping.keys().collect();
        prop_assert_eq!(keys, names.iter().map(String::as_str).collect::<Vec<_>>());
    }

    /// Single-element fields become scalars, others keep their values
    #[test]
    fn test_scalar_iff_single_element(field in numeric_field()) {
        let numel = field.numel();
        let values = field.numeric_values().unwrap().to_vec();
        let record = MatArray::record("data", vec![("x", field)]);
        let schema = RecordSchema::new("data").with_flatten_fields(Vec::<String>::new());

        let mapping = extract(&record, &schema).unwrap();
        match mapping.get("x").unwrap() {
            FieldValue::Scalar(v) => {
                prop_assert_eq!(numel, 1);
                prop_assert_eq!(*v, values[0]);
            }
            FieldValue::Array(array) => {
                prop_assert!(numel > 1);
                prop_assert_eq!(array.data(), values.as_slice());
            }
        }
    }

    /// Flattened fields are 1-D whatever their stored shape
    #[test]
    fn test_flatten_is_one_dimensional(field in numeric_field()) {
        let numel = field.numel();
        let record = MatArray::record("data", vec![("spikes", field)]);
        let schema = RecordSchema::new("data").with_flatten_fields(["spikes"]);

        let mapping = extract(&record, &schema).unwrap();
        prop_assert_eq!(mapping.get("spikes").unwrap().shape(), &[numel][..]);
    }

    /// MAT write/read preserves row-major values for any shape
    #[test]
    fn test_mat_layout_preserved(field in numeric_field(), compress in any::<bool>()) {
        let array = field.renamed("x");
        let bytes = MatWriter::new().with_compression(compress).to_bytes(std::slice::from_ref(&array)).unwrap();
        let file = MatFile::from_bytes(&bytes).unwrap();
        prop_assert_eq!(file.get("x"), Some(&array));
    }

    /// Archives decode to the mapping that was written
    #[test]
    fn test_npz_preserves_mapping(
        scalars in prop::collection::btree_map("[a-z]{1,8}", finite(), 0..4),
        arrays in prop::collection::btree_map("[A-Z]{1,8}", prop::collection::vec(finite(), 0..50), 0..4),
        compress in any::<bool>(),
    ) {
        let mut mapping = FlatMapping::new();
        for (name, value) in scalars {
            mapping.insert(name, value);
        }
        for (name, values) in arrays {
            mapping.insert(name, NdArray::vector(values));
        }

        let cursor = npz::write_to(Cursor::new(Vec::new()), &mapping, NpzOptions { compress }).unwrap();
        let decoded = npz::read_from(Cursor::new(cursor.into_inner())).unwrap();
        prop_assert_eq!(decoded, mapping);
    }

    /// Arbitrary bytes never panic the MAT reader
    #[test]
    fn test_mat_reader_rejects_garbage(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = MatFile::from_bytes(&data);
    }
}
