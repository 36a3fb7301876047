//! Shared data model for tool resolution.
//!
//! A tool reference like `phpunit:9.5` flows through three shapes:
//! [`ToolConfig`] (one raw registry entry), [`ToolMetadata`] (the entry
//! matched to a canonical tool name), and [`ToolContext`] (the mutable
//! working record owned by a single tool's resolution pipeline).

use serde::{Deserialize, Serialize};

/// Default download host for tools released on GitHub.
pub const GITHUB: &str = "https://github.com";

/// Raw input unit: a tool name with an optional version qualifier.
///
/// The name may be an alias, a canonical name, or an `org/repo`
/// reference. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReference {
    /// The part before the first `:`.
    pub name: String,
    /// The version qualifier between the first and second `:`, if any.
    pub version: Option<String>,
}

impl ToolReference {
    /// Parse one list entry, stripping all whitespace.
    #[must_use]
    pub fn parse(entry: &str) -> Self {
        let entry: String = entry.chars().filter(|c| !c.is_whitespace()).collect();
        let mut parts = entry.split(':');
        let name = parts.next().unwrap_or_default().to_string();
        let version = parts.next().map(str::to_string);
        Self { name, version }
    }
}

/// Target operating system the generated script runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Darwin,
    Win32,
}

impl Os {
    /// Get the current OS.
    #[must_use]
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        return Self::Darwin;
        #[cfg(target_os = "windows")]
        return Self::Win32;
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        Self::Linux
    }

    /// Whether this is the Windows target.
    #[must_use]
    pub fn is_windows(self) -> bool {
        matches!(self, Self::Win32)
    }
}

impl std::str::FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "darwin" | "macos" => Ok(Self::Darwin),
            "win32" | "windows" => Ok(Self::Win32),
            _ => Err(format!("Unknown operating system: {s}")),
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Darwin => write!(f, "darwin"),
            Self::Win32 => write!(f, "win32"),
        }
    }
}

/// How a tool gets installed.
///
/// Every registry entry maps to exactly one kind; a synthesized minimal
/// record carries none, which the dispatcher reports as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallKind {
    /// Single-file archive (phar) downloaded from a release URL.
    Phar,
    /// Package installed through composer.
    Composer,
    /// Multi-step install driven by a sourced per-tool script.
    CustomPackage,
    /// Tool-specific generator registered in the function table.
    CustomFunction,
}

/// Registered per-tool script generators.
///
/// Modeled as an enum rather than a string key so the handler table in
/// the dispatcher is exhaustive at compile time; a registry entry naming
/// an unknown function fails to deserialize instead of surfacing at
/// resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFunction {
    Castor,
    Composer,
    Deployer,
    DevTools,
    Phive,
    BlackfirePlayer,
    Pecl,
    Phing,
    Phpunit,
    Phpcpd,
    WpCli,
}

/// One raw entry of the declarative tool registry.
///
/// All fields are optional; documented defaults are applied when the
/// [`ToolContext`] is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolConfig {
    /// `org/repo` the tool is released from.
    pub repository: Option<String>,
    /// Installation kind.
    #[serde(rename = "type")]
    pub kind: Option<InstallKind>,
    /// Generator id, present iff `kind` is `custom-function`.
    pub function: Option<ToolFunction>,
    /// Alternate user-facing name resolving to this entry.
    pub alias: Option<String>,
    /// Download host, when not the GitHub host.
    pub domain: Option<String>,
    /// Artifact file extension, defaults to `.phar`.
    pub extension: Option<String>,
    /// Whether `latest` should be resolved through the releases feed.
    #[serde(default)]
    pub fetch_latest: bool,
    /// Composer install scope, defaults to `global`.
    pub scope: Option<String>,
    /// Version flag the executor passes to verify the install.
    pub version_parameter: Option<String>,
    /// Tag prefix convention, e.g. `v`.
    pub version_prefix: Option<String>,
    /// Packagist package name when it differs from the repository.
    pub packagist: Option<String>,
}

/// A registry entry resolved to its canonical tool name.
#[derive(Debug, Clone)]
pub struct ToolMetadata {
    /// Canonical tool name (aliases already resolved).
    pub tool: String,
    /// The matched or synthesized configuration.
    pub config: ToolConfig,
}

/// Mutable working record for one tool's resolution.
///
/// Owned exclusively by that tool's pipeline run, never aliased and never
/// shared across tools. At the end of resolution at most one of
/// `{version, error}` is meaningfully set; an errored context is still
/// emitted as a diagnostic line, never dropped.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Canonical tool name.
    pub tool: String,
    /// Requested version token, replaced by the resolved version.
    pub version: String,
    /// Resolved download URL(s); comma-joined fallback chains.
    pub url: String,
    /// Target operating system.
    pub os: Os,
    /// PHP version the environment targets.
    pub php_version: String,
    /// The GitHub host, kept alongside `domain` for fallback URLs.
    pub github: String,
    /// Download host for this tool.
    pub domain: String,
    /// Artifact file extension.
    pub extension: String,
    /// `org/repo`, empty when the tool has none.
    pub repository: String,
    /// Release path prefix (`releases` on the GitHub host).
    pub prefix: String,
    /// Download verb (`download` on the GitHub host).
    pub verb: String,
    /// Whether `latest` resolves through the releases feed.
    pub fetch_latest: bool,
    /// Composer install scope.
    pub scope: String,
    /// Version flag passed through to the executor.
    pub version_parameter: String,
    /// Tag prefix convention.
    pub version_prefix: String,
    /// `tool` or `tool:version` string consumed by composer installs.
    pub release: String,
    /// Packagist package name.
    pub packagist: String,
    /// Installation kind, absent for synthesized minimal records.
    pub kind: Option<InstallKind>,
    /// Generator id for custom-function tools.
    pub function: Option<ToolFunction>,
    /// Resolution failure, rendered as a diagnostic fragment.
    pub error: Option<String>,
}

impl ToolContext {
    /// Build a fresh context from resolved metadata and ambient facts.
    ///
    /// Applies the documented defaults: GitHub domain, `.phar` extension,
    /// `global` scope, `releases`/`download` path segments on the GitHub
    /// host and empty ones elsewhere.
    #[must_use]
    pub fn new(metadata: ToolMetadata, reference: &ToolReference, php_version: &str, os: Os) -> Self {
        let ToolMetadata { tool, config } = metadata;
        let domain = config.domain.unwrap_or_else(|| GITHUB.to_string());
        let on_github = domain == GITHUB;
        let repository = config.repository.unwrap_or_default();
        let version = reference.version.clone().unwrap_or_default();
        let release = match &reference.version {
            Some(version) => format!("{tool}:{version}"),
            None => tool.clone(),
        };
        Self {
            version,
            url: String::new(),
            os,
            php_version: php_version.to_string(),
            github: GITHUB.to_string(),
            extension: config.extension.unwrap_or_else(|| ".phar".to_string()),
            prefix: if on_github { "releases" } else { "" }.to_string(),
            verb: if on_github { "download" } else { "" }.to_string(),
            fetch_latest: config.fetch_latest,
            scope: config.scope.unwrap_or_else(|| "global".to_string()),
            version_parameter: config.version_parameter.unwrap_or_default(),
            version_prefix: config.version_prefix.unwrap_or_default(),
            release,
            packagist: config.packagist.unwrap_or_else(|| repository.clone()),
            kind: config.kind,
            function: config.function,
            repository,
            domain,
            tool,
            error: None,
        }
    }

    /// Record a resolution failure on this context.
    pub fn fail(&mut self, error: impl std::fmt::Display) {
        self.error = Some(error.to_string());
    }
}
