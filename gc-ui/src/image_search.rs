//! Reference photo search
//!
//! Finds a photo of the real car a model replicates. The production backend
//! asks Gemini with Google Search grounding and picks an image link out of
//! the grounding sources. Every failure degrades to a placeholder URL, so
//! callers always get something displayable.

use std::time::Duration;

use async_trait::async_trait;
use gc_common::placeholder::{encode_uri_component, PlaceholderImages, PHOTO_SIZE};
use gc_common::{Field, Record};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const USER_AGENT: &str = concat!("GarageCloud/", env!("CARGO_PKG_VERSION"));
const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

/// What to search for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoQuery {
    pub model_name: String,
    pub color: String,
    pub car_brand: String,
}

impl From<&Record> for PhotoQuery {
    fn from(record: &Record) -> Self {
        Self {
            model_name: record.get(Field::ModelName).to_string(),
            color: record.get(Field::Color).to_string(),
            car_brand: record.get(Field::CarBrand).to_string(),
        }
    }
}

impl PhotoQuery {
    fn prompt(&self) -> String {
        let brand = if self.car_brand.trim().is_empty() {
            String::new()
        } else {
            format!(" di marca {}", self.car_brand)
        };
        format!(
            "Cerca una fotografia professionale dell'auto reale (non un modellino) \
             modello \"{}\"{} di colore \"{}\". \
             Rispondi con l'URL diretto dell'immagine più nitida.",
            self.model_name, brand, self.color
        )
    }
}

/// Photo search backend
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// URL of a reference photo; never fails
    async fn find_reference_photo(&self, query: &PhotoQuery) -> String;
}

/// Always answers with the 800x600 placeholder for the model and color
#[derive(Debug, Clone, Default)]
pub struct PlaceholderImageSearch {
    placeholders: PlaceholderImages,
}

impl PlaceholderImageSearch {
    pub fn new(placeholders: PlaceholderImages) -> Self {
        Self { placeholders }
    }
}

#[async_trait]
impl ImageSearch for PlaceholderImageSearch {
    async fn find_reference_photo(&self, query: &PhotoQuery) -> String {
        let seed = format!("{}{}", query.model_name, query.color);
        self.placeholders.url(&seed, PHOTO_SIZE)
    }
}

/// Gemini client errors
#[derive(Debug, Error)]
pub enum ImageSearchError {
    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Gemini returned an error status
    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    /// Failed to parse the response JSON
    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
}

/// Gemini `generateContent` client with Google Search grounding
pub struct GeminiImageSearch {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    fallback: PlaceholderImageSearch,
}

impl GeminiImageSearch {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        placeholders: PlaceholderImages,
    ) -> Result<Self, ImageSearchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ImageSearchError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            fallback: PlaceholderImageSearch::new(placeholders),
        })
    }

    /// Point the client at another API root (local mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn grounding_uris(
        &self,
        api_key: &str,
        query: &PhotoQuery,
    ) -> Result<Vec<String>, ImageSearchError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": query.prompt() }] }],
            "tools": [{ "google_search": {} }],
        });

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ImageSearchError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ImageSearchError::ApiError(status.as_u16(), text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ImageSearchError::ParseError(e.to_string()))?;

        Ok(parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.grounding_metadata)
            .map(|m| m.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web.and_then(|w| w.uri))
            .collect())
    }
}

#[async_trait]
impl ImageSearch for GeminiImageSearch {
    async fn find_reference_photo(&self, query: &PhotoQuery) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("No Gemini API key, using placeholder photo");
            return self.fallback.find_reference_photo(query).await;
        };

        match self.grounding_uris(api_key, query).await {
            Ok(uris) => match pick_image_uri(&uris) {
                Some(uri) => {
                    info!(model = %query.model_name, uri, "Reference photo found");
                    uri.to_string()
                }
                None => {
                    debug!(model = %query.model_name, "No grounding sources returned");
                    self.fallback.find_reference_photo(query).await
                }
            },
            Err(e) => {
                warn!(model = %query.model_name, error = %e, "Reference photo search failed");
                self.fallback
                    .placeholders
                    .url(&query.model_name, PHOTO_SIZE)
            }
        }
    }
}

/// First URI that looks like an image file, else the first URI.
/// Blank URIs are never picked.
pub fn pick_image_uri(uris: &[String]) -> Option<&str> {
    let mut candidates = uris.iter().map(|uri| uri.trim()).filter(|uri| !uri.is_empty());
    let first = candidates.clone().next();
    candidates
        .find(|uri| {
            let lower = uri.to_lowercase();
            IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext))
        })
        .or(first)
}

/// Google Images search for the real car behind `record`
pub fn google_images_url(record: &Record) -> String {
    let query = format!(
        "{} {} original car {}",
        record.get(Field::ModelName),
        record.get(Field::CarBrand),
        record.get(Field::Year)
    );
    format!(
        "https://www.google.com/search?tbm=isch&q={}",
        encode_uri_component(&query)
    )
}
