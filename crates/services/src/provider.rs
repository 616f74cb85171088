//! Remote data provider: chapters and question batches over HTTP.
//!
//! The engine never talks to this directly; page hosts fetch content through
//! it and degrade any failure to an empty list so provider trouble can never
//! leak into guard or session logic.

use async_trait::async_trait;
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use trainer_core::Config;

use crate::error::ProviderError;

/// One chapter of training content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub slug: String,
    pub title: String,
}

/// One four-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub stem: String,
    pub choices: [String; 4],
    pub correct_index: u8,
}

/// Source of chapters and questions.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// List available chapters.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on transport or HTTP failure.
    async fn fetch_chapters(&self) -> Result<Vec<Chapter>, ProviderError>;

    /// Fetch up to `limit` random questions for a chapter.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on transport or HTTP failure.
    async fn fetch_questions(
        &self,
        chapter_id: &str,
        limit: u32,
    ) -> Result<Vec<Question>, ProviderError>;
}

/// Chapters, or an empty list when the provider fails (logged, never
/// propagated).
pub async fn chapters_or_empty(provider: &dyn DataProvider) -> Vec<Chapter> {
    match provider.fetch_chapters().await {
        Ok(chapters) => chapters,
        Err(e) => {
            warn!(error = %e, "chapter fetch failed; treating as empty");
            Vec::new()
        }
    }
}

/// Questions, or an empty list when the provider fails.
pub async fn questions_or_empty(
    provider: &dyn DataProvider,
    chapter_id: &str,
    limit: u32,
) -> Vec<Question> {
    match provider.fetch_questions(chapter_id, limit).await {
        Ok(questions) => questions,
        Err(e) => {
            warn!(error = %e, chapter_id, "question fetch failed; treating as empty");
            Vec::new()
        }
    }
}

/// HTTP adapter for the production backend.
#[derive(Debug, Clone)]
pub struct HttpDataProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDataProvider {
    /// Build a provider from the configured base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Http` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.provider_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// GET a JSON document, retrying once on any failure.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, ProviderError> {
        match self.get_json_once(url).await {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!(url, error = %e, "provider request failed; retrying once");
                self.get_json_once(url).await
            }
        }
    }

    async fn get_json_once<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, ProviderError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}

/// Cache-busting nonce for question requests.
fn random_nonce() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 8)
}

#[async_trait]
impl DataProvider for HttpDataProvider {
    async fn fetch_chapters(&self) -> Result<Vec<Chapter>, ProviderError> {
        let url = format!("{}/chapters", self.base_url);
        self.get_json(&url).await
    }

    async fn fetch_questions(
        &self,
        chapter_id: &str,
        limit: u32,
    ) -> Result<Vec<Question>, ProviderError> {
        let url = format!(
            "{}/chapters/{}/questions?limit={}&nonce={}",
            self.base_url,
            chapter_id,
            limit,
            random_nonce()
        );
        self.get_json(&url).await
    }
}
