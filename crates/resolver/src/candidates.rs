//! External version-discovery sources.
//!
//! Three independent lookups behind one contract: each is a function of
//! tool metadata (plus an optional runtime constraint) that returns a
//! discovered version or a typed absence — never a panic. The feed
//! scrape additionally degrades to the `"latest"` sentinel by design.

use std::collections::HashMap;
use std::sync::LazyLock;

use phpup_core::{Error, Result};
use phpup_fetch::HttpFetcher;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::version::numeric_str_cmp;

#[allow(clippy::expect_used)]
static FEED_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"releases/tag/([a-zA-Z]*)?(\d+\.\d+\.\d+)""#).expect("hardcoded pattern must compile")
});

/// GitHub reference object from the matching-refs endpoint.
#[derive(Debug, Deserialize)]
struct GitRef {
    #[serde(rename = "ref")]
    ref_name: String,
}

/// Bearer token for the tag-search lookup.
///
/// `GITHUB_TOKEN` wins, `COMPOSER_TOKEN` is the fallback.
fn github_token() -> Option<String> {
    std::env::var("GITHUB_TOKEN")
        .ok()
        .filter(|token| !token.is_empty())
        .or_else(|| std::env::var("COMPOSER_TOKEN").ok())
        .filter(|token| !token.is_empty())
}

/// Query the tag-listing endpoint, filtered server-side by prefix.
///
/// Returns the matching tag names with a leading `v` stripped. An empty
/// result or a transport failure comes back as a typed error carrying
/// the reason the caller surfaces on the tool context.
pub(crate) async fn search_tags(
    fetcher: &HttpFetcher,
    repository: &str,
    search: &str,
) -> Result<Vec<String>> {
    let url = format!(
        "https://api.github.com/repos/{repository}/git/matching-refs/tags%2F{search}."
    );
    let token = github_token();
    let body = fetcher
        .fetch(&url, token.as_deref())
        .await
        .map_err(|e| Error::transport(e.to_string()))?;
    if body == "[]" {
        return Err(Error::not_found(format!(
            "No version found with prefix {search}."
        )));
    }
    let refs: Vec<GitRef> = serde_json::from_str(&body)?;
    let tags: Vec<String> = refs
        .iter()
        .filter_map(|r| r.ref_name.split('/').next_back())
        .map(strip_tag_prefix)
        .filter(|tag| !tag.is_empty())
        .collect();
    if tags.is_empty() {
        return Err(Error::not_found(format!(
            "No version found with prefix {search}."
        )));
    }
    debug!(%repository, %search, count = tags.len(), "Matched tags");
    Ok(tags)
}

/// Strip a leading `v` when it directly precedes a digit.
fn strip_tag_prefix(tag: &str) -> String {
    match tag.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest.to_string(),
        _ => tag.to_string(),
    }
}

/// Latest release version from a repository's Atom feed.
///
/// Fetch failure or an empty match set yields the `"latest"` sentinel
/// rather than an error — graceful degradation by contract.
pub(crate) async fn feed_latest(fetcher: &HttpFetcher, github: &str, repository: &str) -> String {
    let url = format!("{github}/{repository}/releases.atom");
    match fetcher.fetch(&url, None).await {
        Ok(body) => extract_feed_versions(&body)
            .pop()
            .unwrap_or_else(|| "latest".to_string()),
        Err(e) => {
            debug!(%repository, error = %e, "Releases feed unavailable");
            "latest".to_string()
        }
    }
}

/// Extract release versions from an Atom feed body, sorted ascending.
///
/// The pattern has two groups; only the second (the version) is kept —
/// the optional letter prefix on a tag is deliberately discarded.
#[must_use]
pub fn extract_feed_versions(body: &str) -> Vec<String> {
    let mut versions: Vec<String> = FEED_TAG_RE
        .captures_iter(body)
        .map(|caps| caps[2].to_string())
        .collect();
    versions.sort_by(|a, b| numeric_str_cmp(a, b));
    versions
}

/// One version entry of a Packagist p2 document.
#[derive(Debug, Deserialize)]
struct PackageVersion {
    version: String,
    #[serde(default)]
    require: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct PackageDocument {
    packages: HashMap<String, Vec<PackageVersion>>,
}

/// Best registry version compatible with the runtime PHP version.
///
/// Scans the newest-first p2 version list and returns the first stable
/// release whose `require.php` constraint admits the runtime. Any
/// absence (no data, nothing compatible, fetch failure) is `None`; the
/// caller treats that as "fall back to latest".
pub(crate) async fn packagist_search(
    fetcher: &HttpFetcher,
    package: &str,
    php_version: &str,
) -> Option<String> {
    if package.is_empty() {
        return None;
    }
    let url = format!("https://repo.packagist.org/p2/{package}.json");
    let body = fetcher.fetch(&url, None).await.ok()?;
    let document: PackageDocument = serde_json::from_str(&body).ok()?;
    best_compatible(document.packages.get(package)?, php_version)
}

fn best_compatible(versions: &[PackageVersion], php_version: &str) -> Option<String> {
    // p2 documents are minified: entries after the first omit unchanged
    // fields, so the php requirement carries forward while scanning.
    let mut php_requirement: Option<&str> = None;
    for entry in versions {
        if let Some(requirement) = entry.require.as_ref().and_then(|r| r.get("php")) {
            php_requirement = Some(requirement);
        }
        let version = entry.version.trim_start_matches('v');
        if version.starts_with("dev-") || version.contains('-') {
            continue;
        }
        let compatible = php_requirement.is_none_or(|req| php_satisfies(req, php_version));
        if compatible {
            return Some(version.to_string());
        }
    }
    None
}

/// Check a composer php constraint against a runtime version.
///
/// `||`-separated alternatives are checked independently; an alternative
/// that cannot be parsed counts as compatible rather than silently
/// excluding the version.
fn php_satisfies(constraint: &str, php_version: &str) -> bool {
    let Ok(runtime) = semver::Version::parse(&pad_version(php_version)) else {
        return true;
    };
    constraint
        .split('|')
        .map(str::trim)
        .filter(|alt| !alt.is_empty())
        .any(|alt| match parse_requirement(alt) {
            Some(requirement) => requirement.matches(&runtime),
            None => true,
        })
}

fn parse_requirement(alt: &str) -> Option<semver::VersionReq> {
    if let Ok(requirement) = semver::VersionReq::parse(alt) {
        return Some(requirement);
    }
    // Composer joins AND-parts with spaces; retry with commas.
    let joined = alt.split_whitespace().collect::<Vec<_>>().join(",");
    semver::VersionReq::parse(&joined).ok()
}

/// Pad a runtime version like `8.1` to full `major.minor.patch`.
fn pad_version(version: &str) -> String {
    match version.matches('.').count() {
        0 => format!("{version}.0.0"),
        1 => format!("{version}.0"),
        _ => version.to_string(),
    }
}
