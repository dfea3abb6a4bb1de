//! Google Sheets store backed by the v4 values API
//!
//! Authentication setup lives outside the pipeline; this client only
//! needs a ready-to-use bearer token. The header row is cached after the
//! first read so per-field column lookups during write-back do not
//! re-fetch the sheet.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use super::{RecordStore, StoreError};
use crate::types::BookRecord;
use crate::utils::http_retry::{send_with_retry, RetryPolicy};

const SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const USER_AGENT: &str = "bookmend/0.1.0 (https://github.com/bookmend/bookmend)";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ValueRange {
    values: Vec<Vec<serde_json::Value>>,
}

pub struct GoogleSheetsStore {
    http_client: reqwest::Client,
    retry: RetryPolicy,
    spreadsheet_id: String,
    sheet_name: String,
    token: String,
    headers: RwLock<Option<Vec<String>>>,
}

impl GoogleSheetsStore {
    pub fn new(
        spreadsheet_id: String,
        sheet_name: String,
        token: String,
        retry: RetryPolicy,
    ) -> Result<Self, StoreError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            retry,
            spreadsheet_id,
            sheet_name,
            token,
            headers: RwLock::new(None),
        })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            SHEETS_API_BASE_URL,
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }

    /// Map a non-success response onto the store error taxonomy. The
    /// values API reports an unknown spreadsheet as 404 and an unknown
    /// worksheet as a 400 range-parse failure.
    fn classify_status(&self, status: u16, body: &str) -> StoreError {
        match status {
            401 | 403 => StoreError::Auth(
                "check the Sheets API token and the spreadsheet's sharing settings".to_string(),
            ),
            404 => StoreError::SpreadsheetNotFound(self.spreadsheet_id.clone()),
            400 if body.contains("Unable to parse range") => {
                StoreError::WorksheetNotFound(self.sheet_name.clone())
            }
            _ => StoreError::Api(status, body.to_string()),
        }
    }

    async fn fetch_values(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let url = self.values_url(&self.sheet_name);

        let response = send_with_retry(&self.retry, "sheets values get", || {
            self.http_client.get(&url).bearer_auth(&self.token).send()
        })
        .await
        .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.classify_status(status.as_u16(), &body));
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn cached_headers(&self) -> Result<Vec<String>, StoreError> {
        {
            let cached = self.headers.read().await;
            if let Some(headers) = cached.as_ref() {
                return Ok(headers.clone());
            }
        }

        let rows = self.fetch_values().await?;
        let header_row = rows.into_iter().next().unwrap_or_default();
        *self.headers.write().await = Some(header_row.clone());
        Ok(header_row)
    }
}

#[async_trait::async_trait]
impl RecordStore for GoogleSheetsStore {
    async fn list_records(&self) -> Result<Vec<BookRecord>, StoreError> {
        let rows = self.fetch_values().await?;
        let mut rows = rows.into_iter();

        let Some(header_row) = rows.next() else {
            return Ok(Vec::new());
        };
        *self.headers.write().await = Some(header_row.clone());

        let records = rows
            .enumerate()
            .map(|(i, row)| {
                let mut fields = HashMap::new();
                for (col, header) in header_row.iter().enumerate() {
                    let value = row.get(col).cloned().unwrap_or_default();
                    fields.insert(header.clone(), value);
                }
                BookRecord::new(i + 2, fields)
            })
            .collect();

        Ok(records)
    }

    async fn find_column_index(&self, field: &str) -> Result<usize, StoreError> {
        let headers = self.cached_headers().await?;
        headers
            .iter()
            .position(|header| header == field)
            .map(|i| i + 1)
            .ok_or_else(|| StoreError::ColumnNotFound(field.to_string()))
    }

    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        let range = format!("{}!{}{}", self.sheet_name, column_letter(col), row);
        let url = format!("{}?valueInputOption=RAW", self.values_url(&range));
        let body = json!({ "values": [[value]] });

        let response = send_with_retry(&self.retry, "sheets values update", || {
            self.http_client
                .put(&url)
                .bearer_auth(&self.token)
                .json(&body)
                .send()
        })
        .await
        .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.classify_status(status.as_u16(), &body));
        }

        Ok(())
    }
}

/// A1 column letters for a 1-based column index.
fn column_letter(mut col: usize) -> String {
    let mut letters = String::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
