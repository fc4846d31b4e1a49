use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use matflat::batch::{BatchConfig, BatchConverter, DEFAULT_INPUT_DIR};
use matflat::npz::NpzOptions;
use matflat::record::{RecordSchema, DEFAULT_FLATTEN_FIELDS, DEFAULT_VARIABLE};

use super::config::Config;
use super::ConvertArgs;

/// Convert a directory of legacy .mat files to .npz archives
pub fn run(args: ConvertArgs) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let config = batch_config(args, file_config);

    info!("matflat Converter - MAT to NPZ");
    info!("==============================");
    info!("Input:  {}", config.input_dir.display());
    info!("Output: {}", config.output_dir.display());
    info!("Record variable: {}", config.schema.variable());
    let flattened: Vec<&str> = config.schema.rules().iter().map(|r| r.name.as_str()).collect();
    info!("Flattened fields: {}", flattened.join(", "));
    info!(
        "Entries: {}",
        if config.npz.compress { "deflated" } else { "stored" }
    );

    let converter = BatchConverter::new(config);
    let stats = converter.run().context("Conversion failed")?;

    info!("Conversion complete!");
    info!("  Files converted: {}", stats.files_converted());
    info!(
        "  Fields written: {} ({} scalar, {} array)",
        stats.fields_written(),
        stats.scalar_fields,
        stats.array_fields
    );
    info!(
        "  Output size: {} bytes ({:.2} MB)",
        stats.bytes_written,
        stats.bytes_written as f64 / 1024.0 / 1024.0
    );

    if let Some(first) = stats.outputs.first() {
        info!("\nLoad in Python with:");
        info!("  dict(numpy.load('{}'))", first.display());
    }

    Ok(())
}

/// Merge CLI flags over config file values over built-in defaults
fn batch_config(args: ConvertArgs, file_config: Config) -> BatchConfig {
    let conversion = file_config.conversion;

    let variable = args
        .variable
        .or(conversion.variable)
        .unwrap_or_else(|| DEFAULT_VARIABLE.to_string());
    let flatten_fields = conversion
        .flatten_fields
        .unwrap_or_else(|| DEFAULT_FLATTEN_FIELDS.iter().map(|f| f.to_string()).collect());

    BatchConfig {
        input_dir: args
            .input
            .or(conversion.input_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR)),
        output_dir: args
            .output
            .or(conversion.output_dir)
            .unwrap_or_else(|| PathBuf::from(".")),
        schema: RecordSchema::new(variable).with_flatten_fields(flatten_fields),
        npz: NpzOptions {
            compress: args.compress || conversion.compress.unwrap_or(false),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_legacy_layout() {
        let config = batch_config(ConvertArgs::default(), Config::default());
        assert_eq!(config.input_dir, PathBuf::from("Data"));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.schema, RecordSchema::spike_sorting());
        assert!(!config.npz.compress);
    }

    #[test]
    fn test_flags_override_file() {
        let file = Config::from_str(
            r#"
            [conversion]
            input_dir = "from_file"
            output_dir = "out_file"
            variable = "rec"
            compress = true
            flatten_fields = ["waveforms"]
        "#,
        )
        .unwrap();
        let args = ConvertArgs {
            input: Some(PathBuf::from("from_flag")),
            variable: Some("session".to_string()),
            ..Default::default()
        };

        let config = batch_config(args, file);
        assert_eq!(config.input_dir, PathBuf::from("from_flag"));
        assert_eq!(config.output_dir, PathBuf::from("out_file"));
        assert_eq!(config.schema.variable(), "session");
        assert_eq!(config.schema.rules().len(), 1);
        assert_eq!(config.schema.rules()[0].name, "waveforms");
        assert!(config.npz.compress);
    }
}
