use anyhow::{Result, bail};
use tracing::info;

use crate::cli::CorrectArgs;
use crate::store::VocabStore;

pub fn run(args: CorrectArgs) -> Result<()> {
    let translation = args.translation.trim();
    if translation.is_empty() {
        bail!("corrected translation must not be empty");
    }

    let mut store = VocabStore::open(&args.db_path)?;
    let previous = store.append_correction(args.id, translation, "manual")?;

    if let Some(translator_result) = &previous.translator_result {
        info!(translator = %translator_result, "translator had suggested");
    }
    if let Some(context) = &previous.ocr_context {
        info!(context = %context, "surrounding OCR text");
    }

    info!(
        id = args.id,
        headword = %previous.headword,
        old = %previous.effective_translation(),
        new = %translation,
        "entry corrected"
    );
    Ok(())
}
