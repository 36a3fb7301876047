//! HTTP fetch boundary for phpup.
//!
//! One narrow contract: given a URL and an optional bearer token, return
//! the body text or a typed error. Redirects are followed manually so the
//! budget is explicit; the engine never retries a failed fetch — retry,
//! if any, is the caller's responsibility.

use reqwest::header::LOCATION;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

/// Redirect statuses the fetcher follows while budget remains.
const REDIRECT_CODES: [u16; 5] = [301, 302, 303, 307, 308];

/// Default redirect budget per fetch.
pub const DEFAULT_REDIRECTS: u32 = 5;

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors surfaced by the fetch boundary.
///
/// The `Display` strings are part of the contract: callers embed them
/// verbatim in per-tool diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// A redirect status arrived with the budget exhausted.
    #[error("{status}: Redirect error")]
    Redirect {
        /// The redirect status code.
        status: u16,
    },

    /// Any non-2xx, non-redirect status.
    #[error("{status}: {status_text}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The canonical reason phrase.
        status_text: String,
    },

    /// Transport-level failure before a status was received.
    #[error("Fetch error: {message}")]
    Transport {
        /// The underlying error message.
        message: String,
    },
}

impl FetchError {
    fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// HTTP client wrapper with explicit redirect handling.
pub struct HttpFetcher {
    client: Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a new fetcher.
    ///
    /// # Panics
    ///
    /// Uses `expect` internally because `reqwest::Client::builder().build()`
    /// only fails with invalid TLS configuration, which cannot happen with
    /// default settings. The panic indicates a fundamental environment issue.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        // Automatic redirects are disabled so the budget below is the only
        // redirect policy in play.
        Self {
            client: Client::builder()
                .user_agent(format!(
                    "Mozilla/5.0 ({} {}) phpup",
                    std::env::consts::OS,
                    std::env::consts::ARCH
                ))
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("Failed to create HTTP client - TLS backend initialization failed"),
        }
    }

    /// Fetch a URL with the default redirect budget.
    pub async fn fetch(&self, url: &str, token: Option<&str>) -> Result<String> {
        self.fetch_with_budget(url, token, DEFAULT_REDIRECTS).await
    }

    /// Fetch a URL, following up to `budget` redirects.
    ///
    /// A redirect status at budget zero surfaces as `"<code>: Redirect
    /// error"`; other non-2xx statuses as `"<code>: <status text>"`;
    /// transport failures as `"Fetch error: <message>"`.
    pub async fn fetch_with_budget(
        &self,
        url: &str,
        token: Option<&str>,
        budget: u32,
    ) -> Result<String> {
        let mut url = url.to_string();
        let mut remaining = budget;
        loop {
            debug!(%url, remaining, "Fetching");
            let mut request = self.client.get(&url);
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }
            let response = request
                .send()
                .await
                .map_err(|e| FetchError::transport(e.to_string()))?;

            let status = response.status();
            if status.is_success() {
                return response
                    .text()
                    .await
                    .map_err(|e| FetchError::transport(e.to_string()));
            }

            if REDIRECT_CODES.contains(&status.as_u16()) {
                if remaining == 0 {
                    return Err(FetchError::Redirect {
                        status: status.as_u16(),
                    });
                }
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| FetchError::transport("redirect without Location header"))?;
                // Location may be relative; resolve it against the current URL.
                url = response
                    .url()
                    .join(location)
                    .map_err(|e| FetchError::transport(e.to_string()))?
                    .to_string();
                remaining -= 1;
                continue;
            }

            return Err(FetchError::Status {
                status: status.as_u16(),
                status_text: canonical_reason(status),
            });
        }
    }
}

fn canonical_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown status")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_error_format() {
        let err = FetchError::Redirect { status: 302 };
        assert_eq!(err.to_string(), "302: Redirect error");
    }

    #[test]
    fn test_status_error_format() {
        let err = FetchError::Status {
            status: 404,
            status_text: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "404: Not Found");
    }

    #[test]
    fn test_transport_error_format() {
        let err = FetchError::transport("connection refused");
        assert_eq!(err.to_string(), "Fetch error: connection refused");
    }

    #[test]
    fn test_canonical_reason_known_status() {
        assert_eq!(canonical_reason(StatusCode::NOT_FOUND), "Not Found");
        assert_eq!(
            canonical_reason(StatusCode::INTERNAL_SERVER_ERROR),
            "Internal Server Error"
        );
    }
}
