use crate::catalog::{CatalogClient, MIN_QUERY_LEN};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;

/// Look songs up in the catalog.
pub async fn run(client: &CatalogClient, query: &str, limit: usize) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if query.trim().chars().count() < MIN_QUERY_LEN {
        result.add_message(CmdMessage::warning(format!(
            "Type at least {} characters to search",
            MIN_QUERY_LEN
        )));
        return Ok(result);
    }

    let tracks = client.search(query, limit).await?;
    if tracks.is_empty() {
        result.add_message(CmdMessage::info("No results found"));
    }
    Ok(result.with_tracks(tracks))
}
