//! Qdrant-backed vector store over the REST API
//!
//! Point ids are derived from the content hash (see `ingestion::point_id`),
//! so upserting identical content rewrites the same point and the dedup
//! invariant holds without a read-before-write. The full hash rides in the
//! payload alongside the chunk metadata.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::types::{ScoredRecord, StoredRecord};

use super::vector_store::VectorStore;

/// External vector store client
pub struct QdrantStore {
    client: Client,
    base_url: String,
    collection: String,
    dimensions: usize,
    ready: OnceCell<()>,
}

#[derive(Serialize)]
struct VectorParams {
    size: usize,
    distance: &'static str,
}

#[derive(Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
}

#[derive(Serialize, Deserialize)]
struct PointPayload {
    hash: String,
    title: String,
    #[serde(default)]
    section: Option<String>,
    text: String,
}

#[derive(Serialize)]
struct PointStruct {
    id: u64,
    vector: Vec<f32>,
    payload: PointPayload,
}

#[derive(Serialize)]
struct UpsertRequest {
    points: Vec<PointStruct>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    id: u64,
    score: f32,
    payload: Option<PointPayload>,
}

impl QdrantStore {
    /// Connect to Qdrant, probing the service so an unreachable server is
    /// caught at construction time and the caller can fall back.
    pub async fn connect(config: &StoreConfig, dimensions: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        let base_url = config.url.trim_end_matches('/').to_string();

        let probe = format!("{}/collections", base_url);
        let response = client
            .get(&probe)
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Qdrant unreachable: {}", e)))?;
        if !response.status().is_success() {
            return Err(Error::vector_db(format!(
                "Qdrant returned HTTP {}",
                response.status()
            )));
        }

        Ok(Self {
            client,
            base_url,
            collection: config.collection.clone(),
            dimensions,
            ready: OnceCell::new(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    /// Create the collection with the right dimensionality and cosine
    /// distance if it does not exist yet
    async fn ensure_collection(&self) -> Result<()> {
        let response = self
            .client
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Failed to check collection: {}", e)))?;

        if response.status().is_success() {
            return Ok(());
        }

        tracing::info!(
            "Creating Qdrant collection '{}' ({} dims, cosine)",
            self.collection,
            self.dimensions
        );
        let request = CreateCollectionRequest {
            vectors: VectorParams {
                size: self.dimensions,
                distance: "Cosine",
            },
        };
        let response = self
            .client
            .put(self.collection_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Failed to create collection: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::vector_db(format!(
                "Collection creation failed: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn ensure_ready(&self) -> Result<()> {
        self.ready
            .get_or_try_init(|| self.ensure_collection())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn upsert(&self, vectors: Vec<Vec<f32>>, records: Vec<StoredRecord>) -> Result<()> {
        self.ensure_ready().await?;

        let points: Vec<PointStruct> = vectors
            .into_iter()
            .zip(records.into_iter())
            .map(|(vector, record)| PointStruct {
                id: record.id,
                vector,
                payload: PointPayload {
                    hash: record.hash,
                    title: record.title,
                    section: record.section,
                    text: record.text,
                },
            })
            .collect();
        if points.is_empty() {
            return Ok(());
        }

        let url = format!("{}/points?wait=true", self.collection_url());
        let response = self
            .client
            .put(&url)
            .json(&UpsertRequest { points })
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Upsert failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::vector_db(format!(
                "Upsert failed: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredRecord>> {
        self.ensure_ready().await?;

        let url = format!("{}/points/search", self.collection_url());
        let request = SearchRequest {
            vector: query,
            limit: k,
            with_payload: true,
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Search failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::vector_db(format!(
                "Search failed: HTTP {}",
                response.status()
            )));
        }

        let search_response: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::vector_db(format!("Failed to parse search response: {}", e)))?;

        let hits = search_response
            .result
            .into_iter()
            .filter_map(|hit| {
                let payload = hit.payload?;
                Some(ScoredRecord {
                    similarity: hit.score,
                    record: StoredRecord {
                        id: hit.id,
                        hash: payload.hash,
                        title: payload.title,
                        section: payload.section,
                        text: payload.text,
                    },
                })
            })
            .collect();

        Ok(hits)
    }

    async fn clear(&self) -> Result<()> {
        // Dropping a collection that does not exist is fine; the recreate
        // below brings the store back to a known-empty state either way.
        let response = self.client.delete(self.collection_url()).send().await;
        if let Err(e) = response {
            tracing::warn!("Collection delete failed (ignored): {}", e);
        }

        self.ensure_collection().await
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}
