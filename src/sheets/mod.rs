//! Standalone Google Sheets fetcher.
//!
//! Disconnected from the bot: authenticates with a service account, reads
//! rows from a spreadsheet and prints or saves them. Exposed as the
//! `fetch-sheet` subcommand.

pub mod auth;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("service account credentials file not found; checked: {}", .candidates.join(", "))]
    CredentialsNotFound { candidates: Vec<String> },

    #[error("failed to read credentials file {}: {source}", path.display())]
    CredentialsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid credentials file: {0}")]
    CredentialsParse(#[from] serde_json::Error),

    #[error("failed to sign service account assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("token exchange failed with status {status}: {body}")]
    TokenExchange {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Sheets API error {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Response shape of `spreadsheets.values.get`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct SpreadsheetProperties {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    title: String,
    #[serde(default)]
    sheet_id: i64,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    #[serde(default)]
    properties: SheetProperties,
}

/// Spreadsheet metadata: title and contained sheets.
#[derive(Debug, Deserialize)]
pub struct SpreadsheetMeta {
    #[serde(default)]
    properties: SpreadsheetProperties,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

impl SpreadsheetMeta {
    pub fn title(&self) -> &str {
        &self.properties.title
    }

    /// (title, sheet id) pairs of the contained sheets.
    pub fn sheets(&self) -> impl Iterator<Item = (&str, i64)> {
        self.sheets
            .iter()
            .map(|s| (s.properties.title.as_str(), s.properties.sheet_id))
    }
}

/// Authenticated read-only Sheets API client.
pub struct SheetsClient {
    http: reqwest::Client,
    token: String,
    base: String,
}

impl SheetsClient {
    /// Authenticate with the first credential file found.
    pub async fn from_credential_search() -> Result<Self, SheetsError> {
        let path = auth::resolve_credentials_path()?;
        log::info!("Using credentials file: {}", path.display());

        let key = auth::load_service_account_key(&path)?;
        let http = reqwest::Client::new();
        let token = auth::fetch_access_token(&http, &key).await?;
        log::info!("Authenticated as service account {}", key.client_email);

        Ok(Self {
            http,
            token,
            base: SHEETS_API_BASE.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, SheetsError> {
        let response = self.http.get(url).bearer_auth(&self.token).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api { status, message });
        }
        Ok(response.json().await?)
    }

    /// Fetch values for an A1-style range.
    pub async fn values_get(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange, SheetsError> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.base,
            spreadsheet_id,
            urlencoding::encode(range)
        );
        self.get_json(url).await
    }

    /// Fetch spreadsheet metadata (title and sheet list).
    pub async fn spreadsheet_meta(&self, spreadsheet_id: &str) -> Result<SpreadsheetMeta, SheetsError> {
        let url = format!(
            "{}/spreadsheets/{}?fields=properties.title,sheets.properties",
            self.base, spreadsheet_id
        );
        self.get_json(url).await
    }
}

fn cell_to_string(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Print a bounded preview of the fetched rows, headers first.
pub fn display_rows(values: &[Vec<serde_json::Value>], max_rows: usize) {
    if values.is_empty() {
        println!("No data to display.");
        return;
    }

    let headers: Vec<String> = values[0].iter().map(cell_to_string).collect();
    println!("Headers: {}", headers.join(" | "));

    for (i, row) in values.iter().skip(1).take(max_rows).enumerate() {
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        println!("Row {}: {}", i + 1, cells.join(" | "));
    }

    let data_rows = values.len().saturating_sub(1);
    if data_rows > max_rows {
        println!("... and {} more rows", data_rows - max_rows);
    }
}

/// Save fetched rows to a JSON file.
pub fn save_rows(values: &[Vec<serde_json::Value>], path: &str) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(values)?;
    std::fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn a1_ranges_are_percent_encoded() {
        assert_eq!(urlencoding::encode("Sheet1!A1:C10"), "Sheet1%21A1%3AC10");
        assert_eq!(urlencoding::encode("Sheet1"), "Sheet1");
    }

    #[test]
    fn value_range_tolerates_missing_values() {
        let range: ValueRange = serde_json::from_str(r#"{"range":"Sheet1!A1:C1","majorDimension":"ROWS"}"#).unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn spreadsheet_meta_lists_sheets() {
        let meta: SpreadsheetMeta = serde_json::from_value(json!({
            "properties": { "title": "Subscribers" },
            "sheets": [
                { "properties": { "title": "Sheet1", "sheetId": 0 } },
                { "properties": { "title": "Archive", "sheetId": 120 } }
            ]
        }))
        .unwrap();

        assert_eq!(meta.title(), "Subscribers");
        let sheets: Vec<(&str, i64)> = meta.sheets().collect();
        assert_eq!(sheets, vec![("Sheet1", 0), ("Archive", 120)]);
    }

    #[test]
    fn cells_render_without_json_quoting() {
        assert_eq!(cell_to_string(&json!("plain")), "plain");
        assert_eq!(cell_to_string(&json!(42)), "42");
        assert_eq!(cell_to_string(&json!(true)), "true");
    }
}
