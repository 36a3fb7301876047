//! Error types shared across the phpup crates.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for phpup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tool resolution.
///
/// Every variant is recovered at the single-tool boundary and rendered as
/// a diagnostic line in the generated script; none of them aborts the
/// batch.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No version or manifest entry matched the requested token.
    #[error("{message}")]
    #[diagnostic(code(phpup::version::not_found))]
    NotFound {
        /// Human-readable reason, e.g. the prefix that matched nothing.
        message: String,
    },

    /// Network or HTTP failure at the fetch boundary.
    #[error("{message}")]
    #[diagnostic(code(phpup::fetch::transport))]
    Transport {
        /// The fetch layer's formatted error string.
        message: String,
    },

    /// The tool has no valid installation path on the target platform.
    #[error("{tool} is not supported on {platform}")]
    #[diagnostic(code(phpup::tool::unsupported_platform))]
    UnsupportedPlatform {
        /// The tool being installed.
        tool: String,
        /// The platform that cannot host it, e.g. "Windows" or "PHP 5.4".
        platform: String,
    },

    /// The tool matches nothing known and is not a composer package shape.
    #[error("Tool {tool} is not supported")]
    #[diagnostic(code(phpup::tool::unsupported))]
    UnsupportedTool {
        /// The unrecognized tool name.
        tool: String,
    },

    /// A custom-function installation kind was declared without a function.
    #[error("{tool} has no function defined. Please report this issue.")]
    #[diagnostic(code(phpup::registry::configuration_gap))]
    ConfigurationGap {
        /// The misconfigured tool.
        tool: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    #[diagnostic(code(phpup::io))]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    #[diagnostic(code(phpup::json))]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a transport error from a fetch-layer message.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an unsupported-platform error.
    #[must_use]
    pub fn unsupported_platform(tool: impl Into<String>, platform: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            tool: tool.into(),
            platform: platform.into(),
        }
    }

    /// Create an unsupported-tool error.
    #[must_use]
    pub fn unsupported_tool(tool: impl Into<String>) -> Self {
        Self::UnsupportedTool { tool: tool.into() }
    }

    /// Create a configuration-gap error.
    #[must_use]
    pub fn configuration_gap(tool: impl Into<String>) -> Self {
        Self::ConfigurationGap { tool: tool.into() }
    }
}
