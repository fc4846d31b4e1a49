use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use matflat::mat::{MatArray, MatWriter};
use matflat::record::DEFAULT_VARIABLE;

/// Samples per spike waveform
const WAVEFORM_LEN: usize = 32;

/// Sampling rate written into every demo record, in Hz
const SAMPLING_RATE: f64 = 24_000.0;

/// Generate sample legacy .mat files
pub fn run(output: PathBuf, files: usize, compress: bool) -> Result<()> {
    info!("matflat Demo - legacy record generator");
    info!("======================================");

    std::fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create directory: {}", output.display()))?;

    let writer = MatWriter::new().with_compression(compress);
    for index in 1..=files {
        let path = output.join(format!("session_{:02}.mat", index));
        write_session(&writer, &path, index)?;
        info!("  Wrote {}", path.display());
    }

    info!("Generated {} files in {}", files, output.display());
    info!("Convert them with: matflat-convert convert --input {}", output.display());
    Ok(())
}

fn write_session(writer: &MatWriter, path: &Path, index: usize) -> Result<()> {
    let record = mock_record(index);
    writer
        .write_file(path, &[record])
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// One record in the legacy layout: a 1×1 struct whose waveform and channel
/// fields carry extra singleton dimensions.
fn mock_record(index: usize) -> MatArray {
    let spike_count = 4 + index;
    let phase = index as f64 * 0.37;

    let spikes: Vec<f64> = (0..spike_count * WAVEFORM_LEN)
        .map(|i| {
            let t = (i % WAVEFORM_LEN) as f64 / WAVEFORM_LEN as f64;
            (2.0 * std::f64::consts::PI * t + phase).sin() * (-3.0 * t).exp()
        })
        .collect();
    let channel: Vec<f64> = (0..spike_count).map(|i| ((i + index) % 4 + 1) as f64).collect();

    // Every other session stores the channel as 1×n×1, as older exports did.
    let channel_dims = if index % 2 == 0 {
        vec![1, spike_count, 1]
    } else {
        vec![spike_count, 1]
    };

    MatArray::record(
        DEFAULT_VARIABLE,
        vec![
            ("spikes", MatArray::numeric("", vec![spike_count * WAVEFORM_LEN, 1], spikes)),
            ("labels", MatArray::scalar("", (index % 5) as f64)),
            ("channel", MatArray::numeric("", channel_dims, channel)),
            ("fs", MatArray::scalar("", SAMPLING_RATE)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use matflat::record::{extract, RecordSchema};

    #[test]
    fn test_mock_record_extracts() {
        for index in 1..=2 {
            let mapping = extract(&mock_record(index), &RecordSchema::spike_sorting()).unwrap();
            let spike_count = 4 + index;

            let keys: Vec<&str> = mapping.keys().collect();
            assert_eq!(keys, vec!["channel", "fs", "labels", "spikes"]);
            assert_eq!(mapping.get("spikes").unwrap().shape(), &[spike_count * WAVEFORM_LEN]);
            assert_eq!(mapping.get("channel").unwrap().shape(), &[spike_count]);
            assert_eq!(mapping.get("fs").unwrap().as_scalar(), Some(SAMPLING_RATE));
        }
    }
}
