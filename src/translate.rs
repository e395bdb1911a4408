use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Independent translation collaborator. `Ok(None)` signals a recoverable
/// per-call failure (no result, or the implementation's own timeout); the
/// validation loop records it and moves on. Implementations must bound each
/// call so a single slow lookup cannot stall the run.
pub trait Translator {
    fn translate(&mut self, text: &str, from_lang: &str, to_lang: &str) -> Result<Option<String>>;
}

/// Offline lookup backed by a two-column tab-separated glossary file.
/// Lookup is case-folded on the source side; misses are recoverable.
pub struct GlossaryTranslator {
    entries: HashMap<String, String>,
}

impl GlossaryTranslator {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read glossary: {}", path.display()))?;

        let mut entries = HashMap::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((source, target)) = line.split_once('\t') {
                let source = source.trim().to_lowercase();
                let target = target.trim().to_string();
                if !source.is_empty() && !target.is_empty() {
                    entries.insert(source, target);
                }
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Translator for GlossaryTranslator {
    fn translate(&mut self, text: &str, _from_lang: &str, _to_lang: &str) -> Result<Option<String>> {
        Ok(self.entries.get(&text.trim().to_lowercase()).cloned())
    }
}
