//! Publishes month blobs through the GitHub contents API.
//!
//! Each publish is one commit replacing `data/reservations-YYYY-MM.json` on
//! the configured branch: the current blob sha is fetched first (absent for
//! a new file) and sent back with the base64 encoded JSON.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::MonthReservations;
use crate::domain::ports::{PublishReceipt, ReservationPublisher, ReservationPublisherError};
use crate::outbound::persistence::{encode_month, month_file_name};

const API_ROOT: &str = "https://api.github.com/";
const COMMIT_MESSAGE: &str = "Update reservations";
const USER_AGENT: &str = concat!("canteen/", env!("CARGO_PKG_VERSION"));
const REMOTE_DIR: &str = "data";

/// Repository and branch receiving published blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubTarget {
    /// Repository owner (user or organisation).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch the commit lands on.
    pub branch: String,
}

impl GitHubTarget {
    fn remote_path(&self, reservations: &MonthReservations) -> String {
        format!("{REMOTE_DIR}/{}", month_file_name(reservations.month()))
    }
}

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: ContentsEntry,
}

/// Publisher committing blobs to a GitHub repository.
pub struct GitHubContentsPublisher {
    client: Client,
    api_root: Url,
    target: GitHubTarget,
    token: Zeroizing<String>,
}

impl GitHubContentsPublisher {
    /// Publisher for `target` on github.com, authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationPublisherError::NotConfigured`] when the token is
    /// blank or the HTTP client cannot be constructed.
    pub fn new(
        target: GitHubTarget,
        token: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Self, ReservationPublisherError> {
        if token.trim().is_empty() {
            return Err(ReservationPublisherError::not_configured("empty GitHub token"));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ReservationPublisherError::not_configured(err.to_string()))?;
        let api_root = Url::parse(API_ROOT)
            .map_err(|err| ReservationPublisherError::not_configured(err.to_string()))?;
        Ok(Self {
            client,
            api_root,
            target,
            token,
        })
    }

    fn contents_url(&self, path: &str) -> Result<Url, ReservationPublisherError> {
        let relative = format!(
            "repos/{}/{}/contents/{path}",
            self.target.owner, self.target.repo
        );
        self.api_root
            .join(&relative)
            .map_err(|err| ReservationPublisherError::not_configured(err.to_string()))
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.token.as_str())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn current_sha(&self, url: &Url) -> Result<Option<String>, ReservationPublisherError> {
        let response = self
            .authorised(self.client.get(url.clone()))
            .query(&[("ref", self.target.branch.as_str())])
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response.text().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        let entry: ContentsEntry = serde_json::from_str(&body).map_err(|err| {
            ReservationPublisherError::rejected(status.as_u16(), format!("unexpected body: {err}"))
        })?;
        Ok(Some(entry.sha))
    }
}

#[async_trait]
impl ReservationPublisher for GitHubContentsPublisher {
    async fn publish(
        &self,
        reservations: &MonthReservations,
    ) -> Result<PublishReceipt, ReservationPublisherError> {
        let path = self.target.remote_path(reservations);
        let url = self.contents_url(&path)?;
        let encoded = encode_month(reservations)
            .map_err(|err| ReservationPublisherError::encode(err.to_string()))?;

        let sha = self.current_sha(&url).await?;
        debug!(%path, existing = sha.is_some(), "publishing reservations");
        let payload = PutContents {
            message: COMMIT_MESSAGE,
            content: STANDARD.encode(encoded.as_bytes()),
            branch: &self.target.branch,
            sha,
        };
        let response = self
            .authorised(self.client.put(url))
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        let version = serde_json::from_str::<PutResponse>(&body)
            .ok()
            .map(|put| put.content.sha);
        Ok(PublishReceipt {
            location: format!(
                "{}/{}@{}:{path}",
                self.target.owner, self.target.repo, self.target.branch
            ),
            version,
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> ReservationPublisherError {
    ReservationPublisherError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &str) -> ReservationPublisherError {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let preview: String = body
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ReservationPublisherError::not_configured(format!(
                "token rejected ({}): {preview}",
                status.as_u16()
            ))
        }
        _ => ReservationPublisherError::rejected(status.as_u16(), preview),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network helpers.

    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{Choice, LunchSlot, MonthKey, PersonId};

    #[fixture]
    fn target() -> GitHubTarget {
        GitHubTarget {
            owner: "cantine".to_owned(),
            repo: "reservations".to_owned(),
            branch: "main".to_owned(),
        }
    }

    fn publisher(target: GitHubTarget) -> GitHubContentsPublisher {
        GitHubContentsPublisher::new(
            target,
            Zeroizing::new("token".to_owned()),
            Duration::from_secs(5),
        )
        .expect("publisher builds")
    }

    #[rstest]
    fn blank_tokens_are_rejected(target: GitHubTarget) {
        let result = GitHubContentsPublisher::new(
            target,
            Zeroizing::new("  ".to_owned()),
            Duration::from_secs(5),
        );
        assert!(matches!(
            result,
            Err(ReservationPublisherError::NotConfigured { .. })
        ));
    }

    #[rstest]
    fn contents_url_targets_the_month_file(target: GitHubTarget) {
        let december = MonthReservations::new(MonthKey::from_ym(2025, 12).expect("valid month"));
        let publisher = publisher(target.clone());

        let url = publisher
            .contents_url(&target.remote_path(&december))
            .expect("url joins");

        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/cantine/reservations/contents/data/reservations-2025-12.json"
        );
    }

    #[rstest]
    fn payload_carries_base64_json_and_optional_sha() {
        let month = MonthKey::from_ym(2025, 12).expect("valid month");
        let mut december = MonthReservations::new(month);
        december
            .insert(
                NaiveDate::from_ymd_opt(2025, 12, 2).expect("valid date"),
                &PersonId::new("u-1").expect("valid id"),
                Choice {
                    vegetarian: true,
                    slot: LunchSlot::None,
                },
            )
            .expect("bookable");
        let encoded = encode_month(&december).expect("encodes");
        let payload = PutContents {
            message: COMMIT_MESSAGE,
            content: STANDARD.encode(encoded.as_bytes()),
            branch: "main",
            sha: None,
        };

        let value = serde_json::to_value(&payload).expect("serialises");

        assert!(value.get("sha").is_none());
        let content = value
            .get("content")
            .and_then(serde_json::Value::as_str)
            .expect("content string");
        let decoded = STANDARD.decode(content).expect("base64");
        assert_eq!(decoded, encoded.into_bytes());
    }

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED, true)]
    #[case(StatusCode::CONFLICT, false)]
    fn auth_failures_read_as_configuration_problems(
        #[case] status: StatusCode,
        #[case] config: bool,
    ) {
        let error = map_status_error(status, "{ \"message\": \"Bad credentials\" }");
        assert_eq!(
            matches!(error, ReservationPublisherError::NotConfigured { .. }),
            config
        );
    }
}
