//! Song lookup against the iTunes Search API.
//!
//! Used to fill in a song's title and artist. Only `trackName` and
//! `artistName` are read from each result.

use crate::error::{DrumlogError, Result};
use crate::model::{ItemDraft, ItemPatch};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://itunes.apple.com";
pub const DEFAULT_LIMIT: usize = 5;
/// Shorter (trimmed) queries return nothing without a request.
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub title: String,
    pub artist: String,
}

impl CatalogTrack {
    pub fn apply_to_draft(&self, draft: ItemDraft) -> ItemDraft {
        ItemDraft {
            title: self.title.clone(),
            artist: Some(self.artist.clone()),
            ..draft
        }
    }

    pub fn to_patch(&self) -> ItemPatch {
        ItemPatch {
            title: Some(self.title.clone()),
            artist: Some(self.artist.clone()),
            ..ItemPatch::default()
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    track_name: Option<String>,
    artist_name: Option<String>,
}

/// Parse a search response body into tracks.
/// Results missing a track or artist name are skipped.
pub fn parse_results(body: &str) -> Result<Vec<CatalogTrack>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| DrumlogError::Catalog(format!("Unreadable search response: {}", e)))?;
    Ok(response
        .results
        .into_iter()
        .filter_map(|r| match (r.track_name, r.artist_name) {
            (Some(title), Some(artist)) => Some(CatalogTrack { title, artist }),
            _ => None,
        })
        .collect())
}

pub struct CatalogClient {
    http: Client,
    base_url: String,
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogTrack>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let limit = limit.to_string();
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[("entity", "song"), ("term", query), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DrumlogError::Catalog(format!("{}: {}", status, body)));
        }

        let tracks = parse_results(&body)?;
        tracing::debug!(query, count = tracks.len(), "catalog search");
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results() {
        let body = r#"{
            "resultCount": 3,
            "results": [
                {"wrapperType": "track", "trackName": "Rosanna", "artistName": "Toto"},
                {"wrapperType": "track", "artistName": "No Title"},
                {"wrapperType": "track", "trackName": "Aja", "artistName": "Steely Dan"}
            ]
        }"#;
        let tracks = parse_results(body).unwrap();
        assert_eq!(
            tracks,
            vec![
                CatalogTrack {
                    title: "Rosanna".into(),
                    artist: "Toto".into()
                },
                CatalogTrack {
                    title: "Aja".into(),
                    artist: "Steely Dan".into()
                },
            ]
        );
    }

    #[test]
    fn test_parse_empty_and_garbage() {
        assert!(parse_results(r#"{"resultCount": 0}"#).unwrap().is_empty());
        assert!(matches!(
            parse_results("<html>"),
            Err(DrumlogError::Catalog(_))
        ));
    }

    #[tokio::test]
    async fn test_short_query_skips_request() {
        // Unroutable base: a request would fail.
        let client = CatalogClient::new("http://127.0.0.1:9");
        assert!(client.search(" a ", 5).await.unwrap().is_empty());
        assert!(client.search("", 5).await.unwrap().is_empty());
    }

    #[test]
    fn test_track_fills_draft_and_patch() {
        let track = CatalogTrack {
            title: "Rosanna".into(),
            artist: "Toto".into(),
        };
        let draft = track.apply_to_draft(ItemDraft::new("placeholder").difficulty(5));
        assert_eq!(draft.title, "Rosanna");
        assert_eq!(draft.artist.as_deref(), Some("Toto"));
        assert_eq!(draft.difficulty, 5);

        let patch = track.to_patch();
        assert_eq!(patch.title.as_deref(), Some("Rosanna"));
        assert_eq!(patch.progress, None);
    }
}
