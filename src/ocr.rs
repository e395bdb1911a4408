use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Supplies the ordered line stream recognized on one scanned page. The
/// acquisition step itself (image loading, the vision service call) lives
/// behind this seam; the pipeline only sees lines.
pub trait LineSource {
    fn extract_lines(&mut self, input: &Path) -> Result<Vec<String>>;
}

/// Reads OCR output materialized as plain text files next to the page
/// images, one recognized line per file line.
pub struct TextSidecarSource;

impl LineSource for TextSidecarSource {
    fn extract_lines(&mut self, input: &Path) -> Result<Vec<String>> {
        let raw = fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        Ok(raw.lines().map(|line| line.to_string()).collect())
    }
}

/// Text files in the input folder, sorted by name so page order follows
/// filename order.
pub fn discover_inputs(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    let entries =
        fs::read_dir(folder).with_context(|| format!("failed to read {}", folder.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", folder.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_text = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);

        if is_text {
            inputs.push(path);
        }
    }

    inputs.sort();
    Ok(inputs)
}

/// Concatenates the line streams of all inputs in order. A failing input is
/// logged and contributes nothing; the batch continues.
pub fn collect_lines(
    source: &mut dyn LineSource,
    inputs: &[PathBuf],
    warnings: &mut Vec<String>,
) -> Vec<String> {
    let mut lines = Vec::new();

    for input in inputs {
        match source.extract_lines(input) {
            Ok(mut extracted) => {
                info!(input = %input.display(), lines = extracted.len(), "extracted lines");
                lines.append(&mut extracted);
            }
            Err(error) => {
                warn!(input = %input.display(), error = %error, "line extraction failed, skipping input");
                warnings.push(format!("extraction failed for {}: {error}", input.display()));
            }
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_inputs_are_skipped_and_recorded() {
        let mut source = TextSidecarSource;
        let inputs = vec![
            PathBuf::from("/nonexistent/page-01.txt"),
            PathBuf::from("/nonexistent/page-02.txt"),
        ];

        let mut warnings = Vec::new();
        let lines = collect_lines(&mut source, &inputs, &mut warnings);

        assert!(lines.is_empty());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn sidecar_source_preserves_line_order() {
        let folder = std::env::temp_dir().join(format!("vocabmine-ocr-{}", std::process::id()));
        fs::create_dir_all(&folder).expect("create temp folder");
        let page = folder.join("page-01.txt");
        fs::write(&page, "first\nsecond\n").expect("write page");

        let mut source = TextSidecarSource;
        let lines = source.extract_lines(&page).expect("extract");
        assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);

        fs::remove_dir_all(&folder).ok();
    }
}
