use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::store::VocabStore;

pub fn run(args: StatusArgs) -> Result<()> {
    if !args.db_path.exists() {
        warn!(path = %args.db_path.display(), "database file missing");
        return Ok(());
    }

    let store = VocabStore::open(&args.db_path)?;
    let stats = store.stats()?;

    info!(
        path = %args.db_path.display(),
        entries = stats.total,
        corrections = stats.corrections,
        "database status"
    );

    for (status, count) in &stats.by_status {
        info!(status = %status, count, "entries by status");
    }
    for (source, count) in &stats.by_source {
        info!(source = %source, count, "entries by source");
    }

    if let Some(latest) = store.latest_entry()? {
        info!(
            id = latest.id,
            headword = %latest.headword,
            languages = %format!("{} -> {}", latest.source_language, latest.target_language),
            created_at = %latest.created_at,
            updated_at = %latest.updated_at,
            "latest change"
        );
    }

    Ok(())
}
