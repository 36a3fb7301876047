//! Script synthesis for phpup.
//!
//! Iterates the ordered tool list, resolves each tool independently and
//! concatenates fragments into the final script. A failure resolving
//! one tool becomes an inline diagnostic line; it never aborts the rest
//! of the batch. Output is deterministic: resolving the same list twice
//! against unchanged external data yields byte-identical scripts.

pub mod commands;
pub mod dispatch;
mod functions;

use std::sync::LazyLock;

use phpup_core::Result;
use phpup_core::registry::ToolRegistry;
use phpup_core::tools::Os;
use phpup_resolver::Resolver;
use regex::Regex;
use tracing::debug;

#[allow(clippy::expect_used)]
fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("hardcoded pattern must compile")
}

static COMPOSER_ANY_RE: LazyLock<Regex> = LazyLock::new(|| re(r"^composer($|:.*)"));
static COMPOSER_VALID_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"^composer:?($|preview$|snapshot$|v?\d+(\.\d+)?$|v?\d+\.\d+\.\d+[\w-]*$)")
});
static COMPOSER_V_RE: LazyLock<Regex> = LazyLock::new(|| re(r"v(\d\S*)"));

/// Move composer to the front of the tool list.
///
/// Composer installs the composer-kind tools that follow, so it always
/// runs first. Every composer entry is removed; the last one matching
/// the accepted channel/version grammar wins (leading `v` stripped),
/// defaulting to the bare name when none validates.
#[must_use]
pub fn filter_list(tools: Vec<String>) -> Vec<String> {
    let composer = tools
        .iter()
        .filter(|tool| COMPOSER_VALID_RE.is_match(tool))
        .next_back()
        .map_or_else(
            || "composer".to_string(),
            |tool| COMPOSER_V_RE.replace(tool, "$1").into_owned(),
        );
    let mut list: Vec<String> = tools
        .into_iter()
        .filter(|tool| !COMPOSER_ANY_RE.is_match(tool))
        .collect();
    list.insert(0, composer);
    list
}

/// Synthesize the installation script for a comma-separated tool list.
///
/// Tools are processed strictly sequentially in post-reorder order; each
/// gets a freshly constructed context that is discarded after its
/// fragment is appended. The literal list `none` produces an empty
/// script.
pub async fn synthesize(tools_csv: &str, php_version: &str, os: Os) -> Result<String> {
    if tools_csv == "none" {
        return Ok(String::new());
    }
    let registry = ToolRegistry::load()?;
    let resolver = Resolver::new();
    let mut script = String::from("\n");
    script.push_str(&commands::step_log("Setup Tools", os));
    for entry in filter_list(commands::parse_tools_csv(tools_csv)) {
        let mut ctx = resolver
            .context_for(&registry, &entry, php_version, os)
            .await;
        debug!(tool = %ctx.tool, version = %ctx.version, "Dispatching");
        script.push('\n');
        script.push_str(&dispatch::tool_fragment(&mut ctx, &resolver).await);
    }
    Ok(script)
}
