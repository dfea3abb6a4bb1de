//! Open Library API client
//!
//! Secondary metadata source. The search endpoint returns flat document
//! records with list-valued fields; the noisier lists (publishers,
//! subjects, languages) are bounded before joining. Search documents
//! carry no description text.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::services::normalize::is_valid_isbn;
use crate::services::rate_limiter::RateLimiter;
use crate::services::title_matcher::select_best_match;
use crate::types::{BookMetadata, MetadataSource, SourceError};
use crate::utils::http_retry::{send_with_retry, RetryPolicy};

const OPEN_LIBRARY_API_URL: &str = "https://openlibrary.org/search.json";
const USER_AGENT: &str = "bookmend/0.1.0 (https://github.com/bookmend/bookmend)";
const SOURCE_NAME: &str = "open_library";
const SEARCH_LIMIT: &str = "5";

const MAX_PUBLISHERS: usize = 3;
const MAX_SUBJECTS: usize = 5;
const MAX_LANGUAGES: usize = 2;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SearchDoc {
    title: String,
    author_name: Vec<String>,
    publisher: Vec<String>,
    first_publish_year: Option<u32>,
    isbn: Vec<String>,
    subject: Vec<String>,
    number_of_pages_median: Option<u32>,
    language: Vec<String>,
}

pub struct OpenLibraryClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl OpenLibraryClient {
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
impl MetadataSource for OpenLibraryClient {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch(&self, title: &str, author: &str) -> Result<Option<BookMetadata>, SourceError> {
        if title.is_empty() {
            return Ok(None);
        }

        self.rate_limiter.throttle(SOURCE_NAME).await;

        let mut params = vec![
            ("title", title.to_string()),
            ("limit", SEARCH_LIMIT.to_string()),
        ];
        if !author.is_empty() {
            params.push(("author", author.to_string()));
        }

        tracing::debug!(title = %title, author = %author, "Querying Open Library API");

        let response = send_with_retry(&self.retry, SOURCE_NAME, || {
            self.http_client
                .get(OPEN_LIBRARY_API_URL)
                .query(&params)
                .send()
        })
        .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(status.as_u16(), error_text));
        }

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if data.docs.is_empty() {
            return Ok(None);
        }

        let candidates: Vec<(String, SearchDoc)> = data
            .docs
            .into_iter()
            .map(|doc| (doc.title.clone(), doc))
            .collect();

        let Some(doc) = select_best_match(title, &candidates) else {
            return Ok(None);
        };

        let metadata = metadata_from_doc(doc);

        tracing::debug!(
            title = %metadata.title,
            isbn = %metadata.isbn,
            "Retrieved document from Open Library"
        );

        Ok(Some(metadata))
    }
}

fn metadata_from_doc(doc: &SearchDoc) -> BookMetadata {
    BookMetadata {
        title: doc.title.clone(),
        authors: doc.author_name.join(", "),
        publisher: join_bounded(&doc.publisher, MAX_PUBLISHERS),
        published_year: doc
            .first_publish_year
            .map(|year| year.to_string())
            .unwrap_or_default(),
        isbn: pick_isbn(&doc.isbn),
        categories: join_bounded(&doc.subject, MAX_SUBJECTS),
        page_count: doc.number_of_pages_median.unwrap_or(0),
        language: join_bounded(&doc.language, MAX_LANGUAGES),
        description: String::new(),
    }
}

fn join_bounded(values: &[String], limit: usize) -> String {
    values
        .iter()
        .take(limit)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prefer a 13-digit entry, falling back to a 10-character one.
fn pick_isbn(candidates: &[String]) -> String {
    candidates
        .iter()
        .find(|isbn| isbn.len() == 13 && is_valid_isbn(isbn))
        .or_else(|| {
            candidates
                .iter()
                .find(|isbn| isbn.len() == 10 && is_valid_isbn(isbn))
        })
        .cloned()
        .unwrap_or_default()
}
