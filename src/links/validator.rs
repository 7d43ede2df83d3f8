use super::extractor::identifier_of;
use super::types::CatalogIdentifier;
use crate::config::ValidatorConfig;
use crate::error::ValidationError;
use anyhow::{Context, Result};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

/// Steam store app-details endpoint; queried with `?appids=<id>`.
pub const DEFAULT_APPDETAILS_ENDPOINT: &str = "https://store.steampowered.com/api/appdetails";

/// Stricter shape check: the link must begin at the first character.
static ANCHORED_STORE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://store\.steampowered\.com/app/(\d+)(?:/[^/\s]+)?")
        .expect("anchored store link pattern is a valid regex")
});

/// Why a link was rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Not a store app link starting at position 0.
    Shape,
    /// No `/app/<digits>` segment.
    MissingIdentifier,
    /// The catalog answered with a non-success HTTP status.
    Status(u16),
    /// The catalog answered, but the app is absent or flagged unsuccessful.
    NotListed,
}

/// Outcome of checking one link against the catalog.
///
/// `Unconfirmed` means the catalog could not be asked or its answer could
/// not be read. It is accepted like `Valid` so that a flaky store API never
/// swallows a real share.
#[derive(Debug)]
pub enum Validation {
    Valid(CatalogIdentifier),
    Invalid(Rejection),
    Unconfirmed {
        identifier: CatalogIdentifier,
        error: ValidationError,
    },
}

impl Validation {
    /// Fail-open collapse: `Unconfirmed` counts as accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Valid(_) | Self::Unconfirmed { .. })
    }

    pub fn identifier(&self) -> Option<&CatalogIdentifier> {
        match self {
            Self::Valid(identifier) | Self::Unconfirmed { identifier, .. } => Some(identifier),
            Self::Invalid(_) => None,
        }
    }
}

/// Confirms store links against the app-details endpoint.
///
/// One request per call: no retries, no caching.
pub struct LinkValidator {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl LinkValidator {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("parse catalog endpoint {endpoint}"))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("steam-link-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build catalog HTTP client")?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn from_config(config: &ValidatorConfig) -> Result<Self> {
        Self::new(&config.endpoint, Duration::from_secs(config.timeout_secs))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// `true` if the link should be counted.
    pub async fn validate(&self, url: &str) -> bool {
        self.check(url).await.is_accepted()
    }

    /// Full typed outcome for `url`.
    pub async fn check(&self, url: &str) -> Validation {
        if !ANCHORED_STORE_LINK.is_match(url) {
            tracing::debug!(url, "link does not match the store app shape");
            return Validation::Invalid(Rejection::Shape);
        }
        let Some(identifier) = identifier_of(url) else {
            tracing::debug!(url, "link has no app id");
            return Validation::Invalid(Rejection::MissingIdentifier);
        };

        match self.lookup(&identifier).await {
            Ok(true) => Validation::Valid(identifier),
            Ok(false) => {
                tracing::debug!(url, app_id = %identifier, "catalog does not list this app");
                Validation::Invalid(Rejection::NotListed)
            }
            Err(LookupFailure::Status(status)) => {
                tracing::debug!(url, status, "catalog returned non-success status");
                Validation::Invalid(Rejection::Status(status))
            }
            Err(LookupFailure::Error(error)) => {
                tracing::warn!(
                    url,
                    app_id = %identifier,
                    %error,
                    "catalog lookup failed; accepting link"
                );
                Validation::Unconfirmed { identifier, error }
            }
        }
    }

    async fn lookup(&self, identifier: &CatalogIdentifier) -> Result<bool, LookupFailure> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("appids", identifier.as_str())])
            .send()
            .await
            .map_err(|e| LookupFailure::Error(self.classify(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupFailure::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LookupFailure::Error(self.classify(&e)))?;

        listed_successfully(identifier, &body).map_err(LookupFailure::Error)
    }

    fn classify(&self, error: &reqwest::Error) -> ValidationError {
        if error.is_timeout() {
            ValidationError::Timeout(self.timeout.as_secs())
        } else if error.is_decode() {
            ValidationError::Body(error.to_string())
        } else {
            ValidationError::Transport(error.to_string())
        }
    }
}

enum LookupFailure {
    Status(u16),
    Error(ValidationError),
}

/// Reads `{"<id>": {"success": bool, ...}}`.
///
/// A body that is not an object, or has no entry for the id, is a clean
/// "no". An entry without a boolean `success` flag is unreadable.
fn listed_successfully(
    identifier: &CatalogIdentifier,
    body: &serde_json::Value,
) -> Result<bool, ValidationError> {
    let Some(entry) = body
        .as_object()
        .and_then(|entries| entries.get(identifier.as_str()))
    else {
        return Ok(false);
    };

    entry
        .get("success")
        .and_then(serde_json::Value::as_bool)
        .ok_or_else(|| {
            ValidationError::Body(format!("entry for app {identifier} has no success flag"))
        })
}
