//! Deterministic download URL construction.
//!
//! Two path shapes, chosen solely by whether the resolved version is
//! `latest`. Only non-empty segments are joined, so tools hosted off
//! GitHub (empty `prefix`/`verb`) collapse to flat paths. Fallback
//! chains are comma-joined URL lists for the executor to try in order;
//! the engine itself never fetches them.

use phpup_core::tools::ToolContext;

/// Build the download URL for a resolved context.
#[must_use]
pub fn build_url(ctx: &ToolContext) -> String {
    let artifact = format!("{}{}", ctx.tool, ctx.extension);
    if ctx.version == "latest" {
        join_segments(&[
            &ctx.domain,
            &ctx.repository,
            &ctx.prefix,
            &ctx.version,
            &ctx.verb,
            &artifact,
        ])
    } else {
        let pinned = format!("{}{}", ctx.version_prefix, ctx.version);
        join_segments(&[
            &ctx.domain,
            &ctx.repository,
            &ctx.prefix,
            &ctx.verb,
            &pinned,
            &artifact,
        ])
    }
}

/// Build the `domain/tool-version.phar` style URL for tools distributed
/// as a single phar without a repository.
#[must_use]
pub fn build_phar_url(ctx: &ToolContext) -> String {
    if ctx.version == "latest" {
        format!("{}/{}.phar", ctx.domain, ctx.tool)
    } else {
        format!(
            "{}/{}-{}{}.phar",
            ctx.domain, ctx.tool, ctx.version_prefix, ctx.version
        )
    }
}

fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .filter(|segment| !segment.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use phpup_core::tools::{Os, ToolConfig, ToolContext, ToolMetadata, ToolReference};

    fn context(entry: &str, config: ToolConfig) -> ToolContext {
        let reference = ToolReference::parse(entry);
        ToolContext::new(
            ToolMetadata {
                tool: reference.name.clone(),
                config,
            },
            &reference,
            "8.3",
            Os::Linux,
        )
    }

    #[test]
    fn test_latest_url_on_github() {
        let mut ctx = context(
            "phpstan",
            ToolConfig {
                repository: Some("phpstan/phpstan".to_string()),
                ..ToolConfig::default()
            },
        );
        ctx.version = "latest".to_string();
        assert_eq!(
            build_url(&ctx),
            "https://github.com/phpstan/phpstan/releases/latest/download/phpstan.phar"
        );
    }

    #[test]
    fn test_pinned_url_on_github() {
        let mut ctx = context(
            "phpstan",
            ToolConfig {
                repository: Some("phpstan/phpstan".to_string()),
                ..ToolConfig::default()
            },
        );
        ctx.version = "1.10.0".to_string();
        assert_eq!(
            build_url(&ctx),
            "https://github.com/phpstan/phpstan/releases/download/1.10.0/phpstan.phar"
        );
    }

    #[test]
    fn test_pinned_url_applies_version_prefix() {
        let mut ctx = context(
            "php-cs-fixer",
            ToolConfig {
                repository: Some("PHP-CS-Fixer/PHP-CS-Fixer".to_string()),
                version_prefix: Some("v".to_string()),
                ..ToolConfig::default()
            },
        );
        ctx.version = "3.26.0".to_string();
        assert_eq!(
            build_url(&ctx),
            "https://github.com/PHP-CS-Fixer/PHP-CS-Fixer/releases/download/v3.26.0/php-cs-fixer.phar"
        );
    }

    #[test]
    fn test_off_github_collapses_empty_segments() {
        let mut ctx = context(
            "phpunit",
            ToolConfig {
                domain: Some("https://phar.phpunit.de".to_string()),
                ..ToolConfig::default()
            },
        );
        ctx.version = "latest".to_string();
        assert_eq!(build_url(&ctx), "https://phar.phpunit.de/latest/phpunit.phar");
    }

    #[test]
    fn test_phar_url_shapes() {
        let mut ctx = context(
            "phpunit",
            ToolConfig {
                domain: Some("https://phar.phpunit.de".to_string()),
                ..ToolConfig::default()
            },
        );
        ctx.version = "latest".to_string();
        assert_eq!(build_phar_url(&ctx), "https://phar.phpunit.de/phpunit.phar");
        ctx.version = "9.5.0".to_string();
        assert_eq!(
            build_phar_url(&ctx),
            "https://phar.phpunit.de/phpunit-9.5.0.phar"
        );
    }
}
