use std::fs;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::ExportArgs;
use crate::deck;
use crate::store::VocabStore;
use crate::util::ensure_directory;

pub fn run(args: ExportArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!(
            "output file already exists: {} (use --force to overwrite)",
            args.output.display()
        );
    }

    let store = VocabStore::open(&args.db_path)?;
    let statuses: Vec<_> = args
        .statuses
        .iter()
        .map(|status| status.to_status())
        .collect();
    let entries = store.export_rows(&statuses)?;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    fs::write(&args.output, deck::render_rows(&entries))
        .with_context(|| format!("failed to write export: {}", args.output.display()))?;

    info!(
        path = %args.output.display(),
        entries = entries.len(),
        "export complete"
    );
    Ok(())
}
