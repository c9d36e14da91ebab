use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use url::Url;

use crate::model::{Book, BookId, NewBook};

/// REST operations against the book service.
///
/// Every `Err` is a transport failure: unreachable host, non-success status or
/// a body that does not decode. Callers do not distinguish between them.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn fetch_all(&self) -> anyhow::Result<Vec<Book>>;
    async fn create(&self, book: &NewBook) -> anyhow::Result<Book>;
    async fn update(&self, book: &Book) -> anyhow::Result<Book>;
    async fn remove(&self, id: &BookId) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct HttpBookStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBookStore {
    pub fn new(base_url: &Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_owned(),
        })
    }

    pub fn books_endpoint(&self) -> String {
        format!("{}/books", self.base_url)
    }

    pub fn book_endpoint(&self, id: &BookId) -> String {
        format!("{}/books/{id}", self.base_url)
    }
}

#[async_trait]
impl BookStore for HttpBookStore {
    async fn fetch_all(&self) -> anyhow::Result<Vec<Book>> {
        let endpoint = self.books_endpoint();
        let response = self
            .client
            .get(&endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("GET {endpoint}"))?;
        let raw = success_body(response).await?;
        serde_json::from_str(&raw).context("parse book list")
    }

    async fn create(&self, book: &NewBook) -> anyhow::Result<Book> {
        let endpoint = self.books_endpoint();
        let response = self
            .client
            .post(&endpoint)
            .json(book)
            .send()
            .await
            .with_context(|| format!("POST {endpoint}"))?;
        let raw = success_body(response).await?;
        serde_json::from_str(&raw).context("parse created book")
    }

    async fn update(&self, book: &Book) -> anyhow::Result<Book> {
        let endpoint = self.book_endpoint(&book.id);
        let response = self
            .client
            .put(&endpoint)
            .json(book)
            .send()
            .await
            .with_context(|| format!("PUT {endpoint}"))?;
        let raw = success_body(response).await?;
        serde_json::from_str(&raw).context("parse updated book")
    }

    async fn remove(&self, id: &BookId) -> anyhow::Result<()> {
        let endpoint = self.book_endpoint(id);
        let response = self
            .client
            .delete(&endpoint)
            .send()
            .await
            .with_context(|| format!("DELETE {endpoint}"))?;
        success_body(response).await?;
        Ok(())
    }
}

async fn success_body(response: reqwest::Response) -> anyhow::Result<String> {
    let status = response.status();
    let raw = response.text().await.context("read book service response body")?;
    if !status.is_success() {
        let message = parse_error_message(&raw).unwrap_or_else(|| raw.clone());
        anyhow::bail!("book service error ({status}): {message}");
    }
    Ok(raw)
}

fn parse_error_message(raw_json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw_json).ok()?;
    let message = value.get("error")?.as_str()?.to_owned();
    Some(message)
}
