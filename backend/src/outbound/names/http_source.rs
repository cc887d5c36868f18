//! Reqwest-backed name source fetching a published `names.json`.
//!
//! This adapter owns transport details only: the request timeout, HTTP error
//! mapping and decoding into domain participants.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::domain::Person;
use crate::domain::ports::{NameSource, NameSourceError};
use crate::outbound::persistence::decode_people;

const USER_AGENT: &str = concat!("canteen/", env!("CARGO_PKG_VERSION"));

/// Name source performing a GET against one URL.
pub struct HttpNameSource {
    client: Client,
    url: Url,
}

impl HttpNameSource {
    /// Build a source with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl NameSource for HttpNameSource {
    async fn fetch_names(&self) -> Result<Vec<Person>, NameSourceError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        let body = response.text().await.map_err(map_transport_error)?;
        parse_names(&body)
    }
}

fn parse_names(body: &str) -> Result<Vec<Person>, NameSourceError> {
    decode_people(body)
        .map_err(|error| NameSourceError::decode(format!("invalid names payload: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> NameSourceError {
    NameSourceError::transport(error.to_string())
}

fn map_status_error(status: StatusCode) -> NameSourceError {
    NameSourceError::status(status.as_u16())
}
