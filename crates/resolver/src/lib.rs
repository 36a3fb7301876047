//! Multi-strategy version resolver for phpup.
//!
//! Given a raw tool reference and its registry metadata, the resolver
//! classifies the version token, consults the appropriate candidate
//! source (GitHub tag search, releases feed, Packagist), and fills the
//! tool context with a resolved version and download URL. Each context
//! is owned by exactly one tool's pipeline run; a resolution failure is
//! recorded on the context instead of propagating.

pub mod candidates;
pub mod url;
pub mod version;

use phpup_core::registry::ToolRegistry;
use phpup_core::tools::{Os, ToolContext, ToolReference};
use phpup_fetch::HttpFetcher;
use tracing::debug;

use crate::version::VersionToken;

pub use phpup_fetch::FetchError;

/// Resolves tool references into versions and URLs.
pub struct Resolver {
    fetcher: HttpFetcher,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Create a resolver with a fresh HTTP fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fetcher: HttpFetcher::new(),
        }
    }

    /// The underlying fetch boundary, shared with custom generators.
    #[must_use]
    pub fn fetcher(&self) -> &HttpFetcher {
        &self.fetcher
    }

    /// Build and resolve the context for one raw list entry.
    pub async fn context_for(
        &self,
        registry: &ToolRegistry,
        entry: &str,
        php_version: &str,
        os: Os,
    ) -> ToolContext {
        let reference = ToolReference::parse(entry);
        let metadata = registry.resolve(&reference.name);
        let mut ctx = ToolContext::new(metadata, &reference, php_version, os);
        self.resolve(&mut ctx).await;
        ctx
    }

    /// Fill in the resolved version and download URL.
    pub async fn resolve(&self, ctx: &mut ToolContext) {
        let requested = ctx.version.clone();
        ctx.version = if requested.is_empty() {
            self.latest_version(ctx).await
        } else {
            self.resolve_version(&requested, ctx).await
        };
        ctx.url = url::build_url(ctx);
        debug!(tool = %ctx.tool, version = %ctx.version, url = %ctx.url, "Resolved");
    }

    /// Resolve an explicit version token.
    ///
    /// Classification order is the auditable precedence of the engine:
    /// composer channel, exact semver, native constraint, composer
    /// wildcard, tag search, operator-stripped passthrough.
    pub async fn resolve_version(&self, raw: &str, ctx: &mut ToolContext) -> String {
        ctx.version = version::normalize_token(raw);
        match version::classify(&ctx.version, ctx) {
            VersionToken::Channel | VersionToken::Exact | VersionToken::Constraint => {
                ctx.version.clone()
            }
            VersionToken::Wildcard => {
                ctx.release = format!("{}:{}.*", ctx.tool, ctx.version);
                format!("{}.*", ctx.version)
            }
            VersionToken::TagSearch => self.semver_by_tag(ctx).await,
            VersionToken::Passthrough => ctx
                .version
                .trim_start_matches(['>', '<', '=', '^', '~'])
                .to_string(),
        }
    }

    /// Resolve a bare major/minor token against repository tags.
    ///
    /// On failure the reason is recorded on the context and the token is
    /// returned unchanged so the emitted diagnostic still names it.
    async fn semver_by_tag(&self, ctx: &mut ToolContext) -> String {
        let search = format!("{}{}", ctx.version_prefix, ctx.version);
        match candidates::search_tags(&self.fetcher, &ctx.repository, &search).await {
            Ok(tags) => {
                version::pick_latest_tag(tags).unwrap_or_else(|| ctx.version.clone())
            }
            Err(error) => {
                ctx.fail(&error);
                ctx.version.clone()
            }
        }
    }

    /// Latest-version procedure for absent tokens.
    ///
    /// Without the fetch-latest flag (and without a token) the literal
    /// `"latest"` is returned with no network call; with the flag but no
    /// repository likewise; otherwise the releases feed decides, itself
    /// degrading to `"latest"` on failure.
    pub async fn latest_version(&self, ctx: &ToolContext) -> String {
        if ctx.version.is_empty() && !ctx.fetch_latest {
            return "latest".to_string();
        }
        if ctx.fetch_latest && ctx.repository.is_empty() {
            return "latest".to_string();
        }
        candidates::feed_latest(&self.fetcher, &ctx.github, &ctx.repository).await
    }

    /// Best Packagist version for the runtime PHP version.
    pub async fn packagist_best(&self, package: &str, php_version: &str) -> Option<String> {
        candidates::packagist_search(&self.fetcher, package, php_version).await
    }
}
