use std::error::Error;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde_json::Value;

pub const BASE_URL: &str = "https://api.troc-velo.com/api/products";

/// The API times out on larger requests, 300 rows per page is safe.
pub const ITEMS_PER_PAGE: usize = 300;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub struct TrocVeloClient {
    client: Client,
    base_url: String,
}

impl TrocVeloClient {
    pub fn new() -> Result<TrocVeloClient, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(TrocVeloClient {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request one page of announcements, most recently updated first.
    /// Returns the raw JSON objects; field coercion happens in
    /// `Announcement::from_json` so that one bad record doesn't sink
    /// the page. A non-200 status or a body that is not a JSON array
    /// is an error, the caller skips the page and moves on.
    pub fn fetch_page(&self, page: usize) -> Result<Vec<Value>, Box<dyn Error>> {
        let items_per_page = ITEMS_PER_PAGE.to_string();
        let page_number = page.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .header(ACCEPT, "application/json")
            .query(&[
                ("category", "u1"),
                ("sorting", "relevance:desc"),
                ("itemsPerPage", items_per_page.as_str()),
                ("page", page_number.as_str()),
            ])
            .send()?;

        if response.status() != StatusCode::OK {
            return Err(Box::from(format!(
                "request for page {} failed with status {}",
                page,
                response.status()
            )));
        }

        let data: Value = response.json()?;
        match data {
            Value::Array(items) => Ok(items),
            _ => Err(Box::from(format!(
                "unexpected JSON format on page {}, expected an array",
                page
            ))),
        }
    }
}
