use anyhow::{Context, Result};
use std::path::PathBuf;

#[cfg(feature = "colorized_output")]
use console::style;

use matflat::npz;
use matflat::record::{FieldValue, FlatMapping};

/// Values shown per array field before eliding
const PREVIEW_LEN: usize = 6;

/// Display the fields of a converted .npz archive
pub fn run(file: PathBuf, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let mapping = npz::load(&file)
        .with_context(|| format!("Failed to read archive: {}", file.display()))?;

    if json {
        let text = serde_json::to_string_pretty(&mapping).context("Failed to serialize fields")?;
        println!("{}", text);
        return Ok(());
    }

    #[cfg(feature = "colorized_output")]
    {
        println!("{}", style("matflat Archive Information").bold().cyan());
        println!("{}", style("===========================").cyan());
        println!("{}: {}", style("File").bold(), file.display());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("matflat Archive Information");
        println!("===========================");
        println!("File: {}", file.display());
    }
    println!();

    print!("{}", format_fields(&mapping));
    Ok(())
}

fn format_fields(mapping: &FlatMapping) -> String {
    let mut output = format!("Fields ({}):\n", mapping.len());
    for (name, value) in mapping {
        match value {
            FieldValue::Scalar(v) => {
                output.push_str(&format!("  {:<12} scalar  {}\n", name, v));
            }
            FieldValue::Array(array) => {
                output.push_str(&format!(
                    "  {:<12} array   {:?}  {}\n",
                    name,
                    array.shape(),
                    preview(array.data())
                ));
            }
        }
    }
    output
}

fn preview(values: &[f64]) -> String {
    let shown: Vec<String> = values.iter().take(PREVIEW_LEN).map(|v| v.to_string()).collect();
    if values.len() > PREVIEW_LEN {
        format!("[{}, ... ({} values)]", shown.join(", "), values.len())
    } else {
        format!("[{}]", shown.join(", "))
    }
}
