//! Output sink: stdout or a file.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Write `text` to `path`, or to stdout when no path is given.
pub fn emit(text: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            write_file(text, path)?;
            tracing::info!("Output written to {}", path.display());
            Ok(())
        }
        None => {
            let stdout = std::io::stdout();
            write_to(text, &mut stdout.lock()).context("failed to write to stdout")
        }
    }
}

/// File contents are written verbatim.
pub fn write_file(text: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

/// Terminal output always ends with a newline.
pub fn write_to<W: Write>(text: &str, writer: &mut W) -> Result<()> {
    writer.write_all(text.as_bytes())?;
    if !text.is_empty() && !text.ends_with('\n') {
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
