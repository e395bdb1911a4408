use anyhow::Result;

use crate::cli::ListArgs;
use crate::store::{EntryQuery, VocabStore};

pub fn run(args: ListArgs) -> Result<()> {
    let store = VocabStore::open(&args.db_path)?;

    let query = EntryQuery {
        status: args.status.map(|status| status.to_status()),
        source: args.source.clone(),
        limit: args.limit,
    };
    let entries = store.list(&query)?;

    println!(
        "{:<5} {:<12} {:<25} {:<30} {:<20} {:<6} {:<18}",
        "ID", "Status", "Headword", "Translation", "Corrected", "Score", "Source"
    );
    println!("{}", "-".repeat(120));

    for entry in &entries {
        let score = entry
            .similarity_score
            .map(|value| format!("{value:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<5} {:<12} {:<25} {:<30} {:<20} {:<6} {:<18}",
            entry.id,
            clip(&entry.status, 12),
            clip(&entry.headword, 23),
            clip(&entry.translation, 28),
            clip(entry.corrected_translation.as_deref().unwrap_or("-"), 18),
            score,
            clip(entry.source_file.as_deref().unwrap_or("-"), 16),
        );
    }

    println!();
    println!("Showing {} entries", entries.len());
    Ok(())
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let clipped: String = text.chars().take(max_chars.saturating_sub(2)).collect();
    format!("{clipped}..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_truncates_long_values_only() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("a very long translation", 10), "a very l..");
    }
}
