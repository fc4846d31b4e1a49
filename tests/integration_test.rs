//! Integration tests for matflat
//!
//! These tests drive the full pipeline: legacy .mat files on disk, batch
//! conversion, and reading the .npz archives back.

use matflat::batch::{BatchConfig, BatchConverter, BatchError};
use matflat::mat::{MatArray, MatWriter};
use matflat::npz::{self, NpzOptions};
use matflat::record::{ExtractError, FieldValue, RecordSchema};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Record shaped like the legacy exports: waveform column, scalar label,
/// channel with an extra singleton dimension.
fn legacy_record(spike_len: usize, label: f64) -> MatArray {
    let spikes: Vec<f64> = (0..spike_len).map(|i| i as f64 * 0.01).collect();
    MatArray::record(
        "data",
        vec![
            ("spikes", MatArray::numeric("", vec![spike_len, 1], spikes)),
            ("labels", MatArray::scalar("", label)),
            ("channel", MatArray::numeric("", vec![3, 1, 1], vec![1.0, 2.0, 1.0])),
        ],
    )
}

fn write_mat(path: &Path, record: MatArray, compress: bool) {
    MatWriter::new()
        .with_compression(compress)
        .write_file(path, &[record])
        .unwrap();
}

fn config_for(input: &Path, output: &Path) -> BatchConfig {
    BatchConfig {
        input_dir: input.to_path_buf(),
        output_dir: output.to_path_buf(),
        ..Default::default()
    }
}

/// Test the documented spike-sorting record end to end
#[test]
fn test_spike_record_conversion() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_mat(&input.path().join("rec.mat"), legacy_record(100, 3.0), false);

    let stats = BatchConverter::new(config_for(input.path(), output.path()))
        .run()
        .unwrap();
    assert_eq!(stats.files_converted(), 1);
    assert_eq!(stats.scalar_fields, 1);
    assert_eq!(stats.array_fields, 2);

    let mapping = npz::load(output.path().join("rec.npz")).unwrap();
    let keys: Vec<&str> = mapping.keys().collect();
    assert_eq!(keys, vec!["channel", "labels", "spikes"]);

    assert_eq!(mapping.get("labels"), Some(&FieldValue::Scalar(3.0)));

    let spikes = mapping.get("spikes").unwrap().as_array().unwrap();
    assert_eq!(spikes.shape(), &[100]);
    assert!((spikes.data()[99] - 0.99).abs() < 1e-12);

    let channel = mapping.get("channel").unwrap().as_array().unwrap();
    assert_eq!(channel.shape(), &[3]);
    assert_eq!(channel.data(), &[1.0, 2.0, 1.0]);
}

/// An empty input directory produces nothing and is not an error
#[test]
fn test_empty_directory() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();

    let stats = BatchConverter::new(config_for(input.path(), output.path()))
        .run()
        .unwrap();
    assert_eq!(stats.files_converted(), 0);
    assert_eq!(stats.fields_written(), 0);
    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
}

/// A record without `channel` aborts the batch before its archive exists
#[test]
fn test_missing_channel_aborts() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();

    write_mat(&input.path().join("a_good.mat"), legacy_record(10, 1.0), false);
    let broken = MatArray::record(
        "data",
        vec![
            ("spikes", MatArray::numeric("", vec![1, 4], vec![0.0; 4])),
            ("labels", MatArray::scalar("", 2.0)),
        ],
    );
    write_mat(&input.path().join("b_broken.mat"), broken, false);
    write_mat(&input.path().join("c_after.mat"), legacy_record(10, 3.0), false);

    let err = BatchConverter::new(config_for(input.path(), output.path()))
        .run()
        .unwrap_err();
    match err {
        BatchError::Extract { path, source } => {
            assert!(path.ends_with("b_broken.mat"));
            assert!(matches!(source, ExtractError::KeyNotFound(ref key) if key == "channel"));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(output.path().join("a_good.npz").exists());
    assert!(!output.path().join("b_broken.npz").exists());
    assert!(!output.path().join("c_after.npz").exists());
}

/// Files are processed in file-name order
#[test]
fn test_lexicographic_order() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    for name in ["session_10.mat", "session_02.mat", "session_01.mat"] {
        write_mat(&input.path().join(name), legacy_record(5, 0.0), false);
    }
    fs::write(input.path().join("README.txt"), "not a record").unwrap();

    let stats = BatchConverter::new(config_for(input.path(), output.path()))
        .run()
        .unwrap();

    let names: Vec<String> = stats
        .outputs
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["session_01.npz", "session_02.npz", "session_10.npz"]);
}

/// zlib-compressed variables, as MATLAB writes them by default
#[test]
fn test_compressed_input_and_output() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_mat(&input.path().join("rec.mat"), legacy_record(64, 7.0), true);

    let mut config = config_for(input.path(), output.path());
    config.npz = NpzOptions { compress: true };
    BatchConverter::new(config).run().unwrap();

    let mapping = npz::load(output.path().join("rec.npz")).unwrap();
    assert_eq!(mapping.get("labels").unwrap().as_scalar(), Some(7.0));
    assert_eq!(mapping.get("spikes").unwrap().shape(), &[64]);
}

/// Existing archives are replaced, not appended to
#[test]
fn test_rerun_overwrites_output() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    let path = input.path().join("rec.mat");
    let config = config_for(input.path(), output.path());

    write_mat(&path, legacy_record(8, 1.0), false);
    BatchConverter::new(config.clone()).run().unwrap();

    write_mat(&path, legacy_record(8, 2.0), false);
    BatchConverter::new(config).run().unwrap();

    let mapping = npz::load(output.path().join("rec.npz")).unwrap();
    assert_eq!(mapping.get("labels").unwrap().as_scalar(), Some(2.0));
    assert_eq!(mapping.len(), 3);
}

/// Custom variable names and flatten rules
#[test]
fn test_custom_schema() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    let record = MatArray::record(
        "session",
        vec![
            ("waveforms", MatArray::numeric("", vec![1, 2, 1], vec![0.5, 0.25])),
            ("grid", MatArray::numeric("", vec![2, 2], vec![1.0, 2.0, 3.0, 4.0])),
        ],
    );
    write_mat(&input.path().join("rec.mat"), record, false);

    let mut config = config_for(input.path(), output.path());
    config.schema = RecordSchema::new("session").with_flatten_fields(["waveforms"]);
    BatchConverter::new(config).run().unwrap();

    let mapping = npz::load(output.path().join("rec.npz")).unwrap();
    assert_eq!(mapping.get("waveforms").unwrap().shape(), &[2]);
    let grid = mapping.get("grid").unwrap().as_array().unwrap();
    assert_eq!(grid.shape(), &[2, 2]);
    assert_eq!(grid.data(), &[1.0, 2.0, 3.0, 4.0]);
}

/// A file that is not a MAT-file is reported with its path
#[test]
fn test_invalid_input_file() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    fs::write(input.path().join("junk.mat"), b"not a mat file").unwrap();

    let err = BatchConverter::new(config_for(input.path(), output.path()))
        .run()
        .unwrap_err();
    assert!(matches!(err, BatchError::Read { ref path, .. } if path.ends_with("junk.mat")));
}
