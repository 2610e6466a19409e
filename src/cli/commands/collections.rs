//! Collections command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::{DocumentStore, SqliteDocumentStore, OVERVIEW_ID};
use anyhow::Result;

/// Run the collections command.
pub async fn run_collections(settings: Settings) -> Result<()> {
    let store = SqliteDocumentStore::new(&settings.sqlite_path())?;
    let names = store.list_collections().await?;

    if names.is_empty() {
        Output::info("No channels stored yet. Use 'stemning enrich <channel>' to add one.");
        return Ok(());
    }

    Output::header(&format!("Stored Channels ({})", names.len()));
    println!();
    for name in &names {
        let docs = store.find_all(name).await?;
        let videos = docs.iter().filter(|d| d.id != OVERVIEW_ID).count();
        Output::list_item(&format!("{} ({} videos)", name, videos));
    }

    Ok(())
}
