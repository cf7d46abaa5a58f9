//! Remote catalog wire models

use modsync_types::PackageRecord;
use serde::Deserialize;

/// The remote index document for one community
///
/// `content` is either a list of chunk URLs, or, for small communities,
/// the literal package-entry list (implicitly one chunk). `hash` is an
/// opaque fingerprint of the full catalog; if it matches the locally
/// stored hash, the local catalog content is guaranteed identical to what
/// a full refetch would produce.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageListIndex {
    pub content: IndexContent,
    pub hash: String,
}

/// The two shapes the index `content` field can take
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IndexContent {
    ChunkUrls(Vec<String>),
    Packages(Vec<PackageRecord>),
}

impl IndexContent {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::ChunkUrls(urls) => urls.is_empty(),
            Self::Packages(records) => records.is_empty(),
        }
    }
}

/// One fetched catalog chunk
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkResponse {
    pub content: Vec<PackageRecord>,
    #[serde(default)]
    pub hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_with_chunk_urls() {
        let json = r#"{
            "content": ["https://cdn.example.com/chunk-0", "https://cdn.example.com/chunk-1"],
            "hash": "abc123"
        }"#;
        let index: PackageListIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.hash, "abc123");
        match index.content {
            IndexContent::ChunkUrls(urls) => assert_eq!(urls.len(), 2),
            IndexContent::Packages(_) => panic!("expected chunk URLs"),
        }
    }

    #[test]
    fn test_index_with_literal_entries() {
        let json = r#"{
            "content": [{
                "full_name": "Team-Mod",
                "versions": [{
                    "version_number": "1.0.0",
                    "download_url": "https://cdn.example.com/Team-Mod-1.0.0.zip"
                }]
            }],
            "hash": "def456"
        }"#;
        let index: PackageListIndex = serde_json::from_str(json).unwrap();
        match index.content {
            IndexContent::Packages(records) => {
                assert_eq!(records[0].full_name, "Team-Mod");
            }
            IndexContent::ChunkUrls(_) => panic!("expected literal entries"),
        }
    }

    #[test]
    fn test_chunk_entry_requires_full_name() {
        let json = r#"{"content": [{"versions": []}], "hash": "x"}"#;
        assert!(serde_json::from_str::<ChunkResponse>(json).is_err());
    }

    #[test]
    fn test_empty_content() {
        let json = r#"{"content": [], "hash": "x"}"#;
        let index: PackageListIndex = serde_json::from_str(json).unwrap();
        assert!(index.content.is_empty());
    }
}
