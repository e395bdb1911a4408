use std::fs;
use std::path::{Component, Path};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::cli::ExtractArgs;
use crate::deck::{self, DeckHeader};
use crate::lexicon::Lexicon;
use crate::model::{ExtractCounts, ExtractManifest, SourceFile};
use crate::ocr::{TextSidecarSource, collect_lines, discover_inputs};
use crate::parse::{EntryFilter, LineClassifier, SegmentationEngine};
use crate::util::{ensure_directory, now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: ExtractArgs) -> Result<()> {
    if !args.input.exists() {
        bail!("input folder does not exist: {}", args.input.display());
    }

    let deck_name = args
        .deck
        .clone()
        .unwrap_or_else(|| deck_name_from_path(&args.input));
    let slug = slug_from_path(&args.input);

    ensure_directory(&args.output)?;
    let deck_path = args.output.join(format!("deck_{slug}.txt"));
    let raw_path = args.output.join(format!("raw_{slug}.txt"));
    let manifest_path = args.output.join(format!("extract_{slug}.json"));

    if args.reset {
        reset_output(&args.output)?;
    }
    if deck_path.exists() && !args.force && !args.reset {
        bail!(
            "output file already exists: {} (use --force to overwrite or --reset to clear the output folder)",
            deck_path.display()
        );
    }

    let lexicon = Lexicon::load(args.lexicon.as_deref())?;
    let classifier = LineClassifier::new(&lexicon)?;

    let inputs = discover_inputs(&args.input)?;
    if inputs.is_empty() {
        bail!("no OCR text files found in {}", args.input.display());
    }

    info!(
        input = %args.input.display(),
        inputs = inputs.len(),
        deck = %deck_name,
        "extraction started"
    );

    let mut warnings = Vec::new();
    let mut source = TextSidecarSource;
    let lines = collect_lines(&mut source, &inputs, &mut warnings);
    let failed_input_count = warnings.len();
    info!(lines = lines.len(), failed_inputs = failed_input_count, "collected OCR lines");

    if args.trace_lines {
        for (index, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            debug!(
                index,
                kind = classifier.classify(trimmed).as_str(),
                line = trimmed,
                "line classified"
            );
        }
    }

    let engine = SegmentationEngine::new(&classifier);
    let segmented = engine.segment(&lines);

    let filter = EntryFilter::new(&lexicon)?;
    let (entries, filter_counts) = filter.clean(segmented.clone());
    info!(
        segmented = segmented.len(),
        kept = entries.len(),
        dropped = filter_counts.dropped_total(),
        "segmentation complete"
    );

    if args.raw || entries.is_empty() {
        fs::write(&raw_path, lines.join("\n"))
            .with_context(|| format!("failed to write raw lines: {}", raw_path.display()))?;
        info!(path = %raw_path.display(), "wrote raw line dump");
    }

    if entries.is_empty() {
        warn!("no vocabulary entries could be parsed; raw lines kept for manual review");
        return Ok(());
    }

    let header = DeckHeader::new(deck_name.clone(), args.notetype.clone());
    let exported = deck::write_deck(&deck_path, &header, &entries)?;
    info!(path = %deck_path.display(), cards = exported, "wrote deck file");

    let mut sources = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let filename = input
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .with_context(|| format!("invalid UTF-8 filename: {}", input.display()))?;
        sources.push(SourceFile {
            filename,
            sha256: sha256_file(input)?,
        });
    }

    let manifest = ExtractManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: args.input.display().to_string(),
        deck_name,
        deck_path: deck_path.display().to_string(),
        counts: ExtractCounts {
            input_count: inputs.len(),
            failed_input_count,
            line_count: lines.len(),
            segmented_entry_count: segmented.len(),
            exported_card_count: exported,
            filter: filter_counts,
        },
        sources,
        warnings,
    };
    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote extraction manifest");

    Ok(())
}

fn reset_output(folder: &Path) -> Result<()> {
    let entries =
        fs::read_dir(folder).with_context(|| format!("failed to read {}", folder.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", folder.display()))?;
        let path = entry.path();
        if path.is_file() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to delete {}", path.display()))?;
            info!(path = %path.display(), "deleted previous output");
        }
    }
    Ok(())
}

fn tail_components(path: &Path, count: usize) -> Vec<String> {
    let components: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str().map(ToOwned::to_owned),
            _ => None,
        })
        .collect();
    let start = components.len().saturating_sub(count);
    components[start..].to_vec()
}

/// `input/english/unit-1` becomes `English Unit-1`.
fn deck_name_from_path(path: &Path) -> String {
    let parts = tail_components(path, 2);
    if parts.is_empty() {
        return "Vocabulary".to_string();
    }
    parts
        .iter()
        .map(|part| capitalize(part))
        .collect::<Vec<String>>()
        .join(" ")
}

fn slug_from_path(path: &Path) -> String {
    let parts = tail_components(path, 2);
    if parts.is_empty() {
        return "deck".to_string();
    }
    parts.join("_")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn deck_name_uses_last_two_path_components() {
        let path = PathBuf::from("input/english/unit-1");
        assert_eq!(deck_name_from_path(&path), "English Unit-1");
        assert_eq!(slug_from_path(&path), "english_unit-1");
    }

    #[test]
    fn deck_name_handles_short_paths() {
        let path = PathBuf::from("pages");
        assert_eq!(deck_name_from_path(&path), "Pages");
        assert_eq!(slug_from_path(&path), "pages");
    }
}
