//! Version token classification and semver-ish ordering.
//!
//! Real-world tags mix strict semver, glued prerelease suffixes
//! (`1.2.3beta1`) and outright malformed strings. Comparison first tries
//! structured semver and falls back to a numeric-aware textual order, so
//! malformed tags get a stable position instead of a panic.

use std::cmp::Ordering;
use std::sync::LazyLock;

use phpup_core::tools::{InstallKind, ToolContext};
use regex::Regex;

#[allow(clippy::expect_used)]
fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("hardcoded pattern must compile")
}

// semver.org grammar
static SEMVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$")
});
static COMPOSER_CHANNEL_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^composer:(stable|preview|snapshot|[12])$"));
static CONSTRAINT_RE: LazyLock<Regex> = LazyLock::new(|| re(r"[><=^~]+.*"));
static MAJOR_MINOR_RE: LazyLock<Regex> = LazyLock::new(|| re(r"^\d+(\.\d+)?$"));
static LEADING_V_RE: LazyLock<Regex> = LazyLock::new(|| re(r"v(\d)"));
static EXACT_TRIPLE_RE: LazyLock<Regex> = LazyLock::new(|| re(r"^\d+\.\d+\.\d+(-|$)"));
static GLUED_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^(\d+\.\d+\.\d+)([A-Za-z]+[0-9A-Za-z.]+)$"));

/// Classification of a raw version token, in precedence order.
///
/// First match wins; the order is the auditable precedence of the
/// resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionToken {
    /// Composer channel keyword; semantics resolved by the composer
    /// generator, not here.
    Channel,
    /// Full semver, returned verbatim.
    Exact,
    /// Range/constraint syntax a composer install understands natively.
    Constraint,
    /// Bare major/minor for a composer package, widened to a wildcard.
    Wildcard,
    /// Bare major/minor resolved against repository tags.
    TagSearch,
    /// Anything else, passed through minus leading operators.
    Passthrough,
}

/// Classify a normalized version token against its tool context.
#[must_use]
pub fn classify(version: &str, ctx: &ToolContext) -> VersionToken {
    let composer = ctx.kind == Some(InstallKind::Composer);
    if COMPOSER_CHANNEL_RE.is_match(&ctx.release) {
        VersionToken::Channel
    } else if SEMVER_RE.is_match(version) {
        VersionToken::Exact
    } else if composer && CONSTRAINT_RE.is_match(version) {
        VersionToken::Constraint
    } else if composer && MAJOR_MINOR_RE.is_match(version) {
        VersionToken::Wildcard
    } else if !ctx.repository.is_empty() && MAJOR_MINOR_RE.is_match(version) {
        VersionToken::TagSearch
    } else {
        VersionToken::Passthrough
    }
}

/// Strip the leading `v` before the first digit and a trailing `.x`.
#[must_use]
pub fn normalize_token(raw: &str) -> String {
    LEADING_V_RE.replace(raw, "$1").replacen(".x", "", 1)
}

/// Rewrite a glued prerelease suffix so the tag parses as semver.
///
/// `1.2.3` stays as-is, `1.2.3beta1` becomes `1.2.3-beta1`, anything
/// else is left untouched.
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    if EXACT_TRIPLE_RE.is_match(tag) {
        return tag.to_string();
    }
    match GLUED_SUFFIX_RE.captures(tag) {
        Some(caps) => format!("{}-{}", &caps[1], &caps[2]),
        None => tag.to_string(),
    }
}

/// Descending comparison of two normalized tags.
///
/// Falls back to numeric-aware textual comparison when either side does
/// not parse as semver.
#[must_use]
pub fn compare_tags_desc(a: &str, b: &str) -> Ordering {
    match (semver::Version::parse(a), semver::Version::parse(b)) {
        (Ok(a_version), Ok(b_version)) => b_version.cmp(&a_version),
        _ => numeric_str_cmp(b, a),
    }
}

/// Transient pairing of a tag with its comparable normalization.
struct VersionCandidate {
    original: String,
    normalized: String,
}

/// Pick the best tag from a candidate list.
///
/// Sorts descending by normalized semver and returns the *original*
/// spelling of the winner.
#[must_use]
pub fn pick_latest_tag<I>(tags: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let mut candidates: Vec<VersionCandidate> = tags
        .into_iter()
        .map(|tag| VersionCandidate {
            normalized: normalize_tag(&tag),
            original: tag,
        })
        .collect();
    candidates.sort_by(|a, b| compare_tags_desc(&a.normalized, &b.normalized));
    candidates.into_iter().next().map(|c| c.original)
}

/// Numeric-aware string comparison.
///
/// Digit runs compare as numbers, everything else byte-wise, matching
/// the ordering a locale-aware numeric collation produces for version
/// strings.
#[must_use]
pub fn numeric_str_cmp(a: &str, b: &str) -> Ordering {
    let mut a_rest = a;
    let mut b_rest = b;
    loop {
        match (next_chunk(&mut a_rest), next_chunk(&mut b_rest)) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(m), Ok(n)) => m.cmp(&n),
                    _ => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn next_chunk<'a>(s: &mut &'a str) -> Option<&'a str> {
    let first = s.chars().next()?;
    let digits = first.is_ascii_digit();
    let end = s
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit() != digits)
        .map_or(s.len(), |(i, _)| i);
    let (chunk, rest) = s.split_at(end);
    *s = rest;
    Some(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use phpup_core::tools::{Os, ToolConfig, ToolContext, ToolMetadata, ToolReference};

    fn context(kind: Option<InstallKind>, repository: Option<&str>) -> ToolContext {
        ToolContext::new(
            ToolMetadata {
                tool: "sample".to_string(),
                config: ToolConfig {
                    kind,
                    repository: repository.map(str::to_string),
                    ..ToolConfig::default()
                },
            },
            &ToolReference::parse("sample"),
            "8.3",
            Os::Linux,
        )
    }

    #[test]
    fn test_normalize_token_strips_v_and_dot_x() {
        assert_eq!(normalize_token("v9.5.2"), "9.5.2");
        assert_eq!(normalize_token("1.x"), "1");
        assert_eq!(normalize_token("2.4"), "2.4");
    }

    #[test]
    fn test_classify_full_semver_is_exact() {
        let ctx = context(None, None);
        assert_eq!(classify("9.5.2", &ctx), VersionToken::Exact);
        assert_eq!(classify("1.0.0-beta.1", &ctx), VersionToken::Exact);
    }

    #[test]
    fn test_classify_channel_wins_over_semver() {
        let mut ctx = context(None, None);
        ctx.release = "composer:2".to_string();
        assert_eq!(classify("2", &ctx), VersionToken::Channel);
    }

    #[test]
    fn test_classify_constraint_requires_composer_kind() {
        let composer = context(Some(InstallKind::Composer), None);
        assert_eq!(classify("^3.1", &composer), VersionToken::Constraint);
        let phar = context(Some(InstallKind::Phar), None);
        assert_eq!(classify("^3.1", &phar), VersionToken::Passthrough);
    }

    #[test]
    fn test_classify_major_minor() {
        let composer = context(Some(InstallKind::Composer), None);
        assert_eq!(classify("3.1", &composer), VersionToken::Wildcard);
        let tagged = context(Some(InstallKind::Phar), Some("org/repo"));
        assert_eq!(classify("3.1", &tagged), VersionToken::TagSearch);
        let bare = context(None, None);
        assert_eq!(classify("3.1", &bare), VersionToken::Passthrough);
    }

    #[test]
    fn test_normalize_tag_glued_prerelease() {
        assert_eq!(normalize_tag("1.2.3beta1"), "1.2.3-beta1");
        assert_eq!(normalize_tag("1.2.3"), "1.2.3");
        assert_eq!(normalize_tag("1.2.3-rc.1"), "1.2.3-rc.1");
        assert_eq!(normalize_tag("nightly"), "nightly");
    }

    #[test]
    fn test_pick_latest_tag_numeric_descending() {
        let tags = vec![
            "1.2.0".to_string(),
            "1.10.0".to_string(),
            "1.9.0".to_string(),
        ];
        assert_eq!(pick_latest_tag(tags), Some("1.10.0".to_string()));
    }

    #[test]
    fn test_pick_latest_tag_returns_original_spelling() {
        let tags = vec!["1.2.3beta1".to_string(), "1.2.2".to_string()];
        // 1.2.3-beta1 sorts above 1.2.2, and the original glued spelling
        // comes back.
        assert_eq!(pick_latest_tag(tags), Some("1.2.3beta1".to_string()));
    }

    #[test]
    fn test_pick_latest_tag_tolerates_malformed_tags() {
        let tags = vec![
            "not-a-version".to_string(),
            "2.0.1".to_string(),
            "10.0.0".to_string(),
        ];
        assert_eq!(pick_latest_tag(tags), Some("10.0.0".to_string()));
    }

    #[test]
    fn test_numeric_str_cmp_orders_by_number() {
        assert_eq!(numeric_str_cmp("1.9", "1.10"), Ordering::Less);
        assert_eq!(numeric_str_cmp("2.0", "2.0"), Ordering::Equal);
        assert_eq!(numeric_str_cmp("abc", "abd"), Ordering::Less);
    }
}
