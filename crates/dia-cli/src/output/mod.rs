use serde::Serialize;

use crate::cli::OutputFormat;

pub mod text;

/// Print a serializable response as pretty JSON.
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print `value` as JSON, or the text rendering produced by `render`.
pub fn output<T: Serialize>(
    value: &T,
    format: OutputFormat,
    render: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => json(value),
        OutputFormat::Text => {
            println!("{}", render(value));
            Ok(())
        }
    }
}
