//! Google Books API client
//!
//! Primary metadata source. Searches the volumes endpoint with
//! title/author hints, picks the closest candidate by title similarity,
//! and normalizes the volume info into `BookMetadata`.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::services::normalize::{extract_year, is_valid_isbn, truncate_description};
use crate::services::rate_limiter::RateLimiter;
use crate::services::title_matcher::select_best_match;
use crate::types::{BookMetadata, MetadataSource, SourceError};
use crate::utils::http_retry::{send_with_retry, RetryPolicy};

const GOOGLE_BOOKS_API_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const USER_AGENT: &str = "bookmend/0.1.0 (https://github.com/bookmend/bookmend)";
const SOURCE_NAME: &str = "google_books";
const SEARCH_LIMIT: &str = "5";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct VolumesResponse {
    items: Vec<Volume>,
}

#[derive(Debug, Clone, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo")]
    volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VolumeInfo {
    title: String,
    authors: Vec<String>,
    publisher: String,
    published_date: String,
    industry_identifiers: Vec<IndustryIdentifier>,
    categories: Vec<String>,
    page_count: u32,
    language: String,
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    id_type: String,
    identifier: String,
}

pub struct GoogleBooksClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl GoogleBooksClient {
    pub fn new(rate_limiter: Arc<RateLimiter>, retry: RetryPolicy) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter,
            retry,
        })
    }
}

#[async_trait::async_trait]
impl MetadataSource for GoogleBooksClient {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch(&self, title: &str, author: &str) -> Result<Option<BookMetadata>, SourceError> {
        if title.is_empty() {
            return Ok(None);
        }

        self.rate_limiter.throttle(SOURCE_NAME).await;

        let mut query = format!("intitle:\"{}\"", title);
        if !author.is_empty() {
            query.push_str(&format!(" inauthor:\"{}\"", author));
        }

        tracing::debug!(title = %title, query = %query, "Querying Google Books API");

        let response = send_with_retry(&self.retry, SOURCE_NAME, || {
            self.http_client
                .get(GOOGLE_BOOKS_API_URL)
                .query(&[
                    ("q", query.as_str()),
                    ("maxResults", SEARCH_LIMIT),
                    ("printType", "books"),
                ])
                .send()
        })
        .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(status.as_u16(), error_text));
        }

        let data: VolumesResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if data.items.is_empty() {
            return Ok(None);
        }

        let candidates: Vec<(String, Volume)> = data
            .items
            .into_iter()
            .map(|volume| (volume.volume_info.title.clone(), volume))
            .collect();

        let Some(volume) = select_best_match(title, &candidates) else {
            return Ok(None);
        };

        let metadata = metadata_from_volume(&volume.volume_info);

        tracing::debug!(
            title = %metadata.title,
            isbn = %metadata.isbn,
            "Retrieved volume from Google Books"
        );

        Ok(Some(metadata))
    }
}

fn metadata_from_volume(info: &VolumeInfo) -> BookMetadata {
    BookMetadata {
        title: info.title.clone(),
        authors: info.authors.join(", "),
        publisher: info.publisher.clone(),
        published_year: extract_year(&info.published_date),
        isbn: extract_isbn(&info.industry_identifiers),
        categories: info.categories.join(", "),
        page_count: info.page_count,
        language: info.language.clone(),
        description: truncate_description(&info.description),
    }
}

/// Prefer an ISBN-13 identifier, falling back to ISBN-10.
fn extract_isbn(identifiers: &[IndustryIdentifier]) -> String {
    let mut isbn = String::new();
    for identifier in identifiers {
        if identifier.id_type == "ISBN_13" {
            isbn = identifier.identifier.clone();
            break;
        } else if identifier.id_type == "ISBN_10" && isbn.is_empty() {
            isbn = identifier.identifier.clone();
        }
    }

    if is_valid_isbn(&isbn) {
        isbn
    } else {
        String::new()
    }
}
