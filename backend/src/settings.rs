//! Runtime configuration loaded via OrthoConfig.
//!
//! Values layer defaults, an optional configuration file, `CANTEEN_*`
//! environment variables and command-line flags. Secrets never come from
//! here: the GitHub token is read from the environment only when a publish
//! is requested.

use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use mockable::Env;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::domain::{DEFAULT_SUGGESTION_LIMIT, EditWindow, InvalidCutoffHour};
use crate::outbound::publish::GitHubTarget;

/// Environment variable holding the GitHub token.
pub const GITHUB_TOKEN_ENV: &str = "CANTEEN_GITHUB_TOKEN";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_NAMES_TIMEOUT_SECS: u64 = 5;
const DEFAULT_GITHUB_BRANCH: &str = "main";
const MAX_SUGGESTION_LIMIT: usize = 50;

/// Invalid configuration values, reported at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The cutoff hour is outside `0..=23`.
    #[error(transparent)]
    CutoffHour(#[from] InvalidCutoffHour),
    /// The suggestion limit is outside `1..=50`.
    #[error("suggestion limit must be between 1 and {MAX_SUGGESTION_LIMIT}, got {value}")]
    SuggestionLimit {
        /// The rejected limit.
        value: usize,
    },
    /// The names URL does not parse.
    #[error("invalid names URL {value}: {message}")]
    NamesUrl {
        /// The rejected URL.
        value: String,
        /// Parser message.
        message: String,
    },
    /// The data directory is not valid UTF-8.
    #[error("data directory must be valid UTF-8: {path}")]
    DataDir {
        /// Lossy rendering of the rejected path.
        path: String,
    },
}

/// Configuration values for the reservation engine and its adapters.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CANTEEN")]
pub struct CanteenSettings {
    /// Directory holding every blob.
    pub data_dir: Option<PathBuf>,
    /// Hour from which today's choices lock.
    pub cutoff_hour: Option<u32>,
    /// Cap on name suggestions.
    pub suggestion_limit: Option<usize>,
    /// Published `names.json` used to seed the registry.
    pub names_url: Option<String>,
    /// Timeout for the remote seed fetch, in seconds.
    pub names_timeout_secs: Option<u64>,
    /// Emit logs as JSON.
    #[ortho_config(default = false)]
    pub log_json: bool,
    /// Owner of the publishing repository.
    pub github_owner: Option<String>,
    /// Name of the publishing repository.
    pub github_repo: Option<String>,
    /// Branch receiving published blobs.
    pub github_branch: Option<String>,
}

impl CanteenSettings {
    /// Configured data directory, defaulting to `./data`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::DataDir`] for non UTF-8 paths.
    pub fn data_dir(&self) -> Result<Utf8PathBuf, SettingsError> {
        let path = self
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        Utf8PathBuf::from_path_buf(path).map_err(|rejected| SettingsError::DataDir {
            path: rejected.to_string_lossy().into_owned(),
        })
    }

    /// Edit window for the configured cutoff hour.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::CutoffHour`] for hours above 23.
    pub fn edit_window(&self) -> Result<EditWindow, SettingsError> {
        self.cutoff_hour
            .map_or_else(|| Ok(EditWindow::default()), EditWindow::new)
            .map_err(SettingsError::from)
    }

    /// Validated suggestion cap.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::SuggestionLimit`] outside `1..=50`.
    pub fn suggestion_limit(&self) -> Result<usize, SettingsError> {
        let value = self.suggestion_limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT);
        if (1..=MAX_SUGGESTION_LIMIT).contains(&value) {
            Ok(value)
        } else {
            Err(SettingsError::SuggestionLimit { value })
        }
    }

    /// Parsed names URL, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NamesUrl`] when the URL does not parse.
    pub fn names_url(&self) -> Result<Option<Url>, SettingsError> {
        self.names_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|err| SettingsError::NamesUrl {
                    value: raw.to_owned(),
                    message: err.to_string(),
                })
            })
            .transpose()
    }

    /// Timeout for the remote seed fetch.
    #[must_use]
    pub fn names_timeout(&self) -> Duration {
        Duration::from_secs(
            self.names_timeout_secs
                .unwrap_or(DEFAULT_NAMES_TIMEOUT_SECS)
                .max(1),
        )
    }

    /// Publishing target, when both owner and repository are configured.
    #[must_use]
    pub fn github_target(&self) -> Option<GitHubTarget> {
        let owner = self.github_owner.clone()?;
        let repo = self.github_repo.clone()?;
        Some(GitHubTarget {
            owner,
            repo,
            branch: self
                .github_branch
                .clone()
                .unwrap_or_else(|| DEFAULT_GITHUB_BRANCH.to_owned()),
        })
    }

    /// Validate every setting the engine depends on.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.data_dir()?;
        self.edit_window()?;
        self.suggestion_limit()?;
        self.names_url()?;
        Ok(())
    }
}

/// GitHub token from [`GITHUB_TOKEN_ENV`], if set and non-blank.
pub fn github_token<E: Env>(env: &E) -> Option<Zeroizing<String>> {
    env.string(GITHUB_TOKEN_ENV)
        .filter(|token| !token.trim().is_empty())
        .map(Zeroizing::new)
}
