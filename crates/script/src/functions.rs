//! Per-tool script generators.
//!
//! Each generator encodes one tool's deviation from the generic archive
//! or composer path: historical version pins for old runtimes, manifest
//! lookups, multi-URL fallback chains, platform restrictions. All of
//! them return a complete fragment; failures become diagnostic log
//! lines, never panics.

use std::sync::LazyLock;

use phpup_core::Error;
use phpup_core::tools::ToolContext;
use phpup_resolver::{Resolver, url};
use regex::Regex;
use serde::Deserialize;

use crate::commands::{LogMark, add_log, install_command, joins};

#[allow(clippy::expect_used)]
fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("hardcoded pattern must compile")
}

static COMPOSER_LTS_PHP_RE: LazyLock<Regex> = LazyLock::new(|| re(r"^5\.[3-6]$|^7\.[0-1]$"));
static EXACT_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| re(r"^\d+\.\d+\.\d+[\w-]*$"));
static PHIVE_UNSUPPORTED_RE: LazyLock<Regex> = LazyLock::new(|| re(r"5\.[3-5]"));
static PINNED_MAJOR_RE: LazyLock<Regex> = LazyLock::new(|| re(r"-(\d+)\.\d+\.\d+"));

/// Generic archive-install fragment from a resolved context.
pub(crate) fn add_archive(ctx: &ToolContext) -> String {
    let version_arg = if ctx.version_parameter.is_empty() {
        String::new()
    } else {
        format!("\"{}\"", ctx.version_parameter)
    };
    format!(
        "{}{}",
        install_command(ctx.os, "tool"),
        joins(&[&ctx.url, &ctx.tool, &version_arg])
    )
}

/// Generic composer-install fragment.
pub(crate) fn add_package(ctx: &ToolContext) -> String {
    let (owner, name) = match ctx.repository.split_once('/') {
        Some((owner, name)) => (owner, name),
        None => ("", ctx.repository.as_str()),
    };
    let owner = format!("{owner}/");
    format!(
        "{}{}",
        install_command(ctx.os, "composer_tool"),
        joins(&[name, &ctx.release, &owner, &ctx.scope])
    )
}

/// Composer itself: cache-mirror chain plus a channel- or version-keyed
/// source URL, with an LTS pin for runtimes composer 2 dropped.
pub(crate) fn add_composer(ctx: &mut ToolContext) -> String {
    let channel = ctx.version.replacen("latest", "stable", 1);
    let github = ctx.github.clone();
    let getcomposer = ctx.domain.clone();
    let cds = "https://dl.cloudsmith.io";
    let mirror = "https://artifacts.phpup.dev";
    let filename = format!("composer-{}-{}.phar", ctx.php_version, channel);
    let releases_url =
        format!("{github}/phpup/composer-cache/releases/latest/download/{filename}");
    let cds_url = format!("{cds}/public/phpup/composer-cache/raw/files/{filename}");
    let mirror_url = format!("{mirror}/composer/{filename}");
    let lts_url = format!("{getcomposer}/download/latest-2.2.x/composer.phar");
    let is_lts = COMPOSER_LTS_PHP_RE.is_match(&ctx.php_version);
    let channel_source_url = format!("{getcomposer}/composer-{channel}.phar");
    let version_source_url = format!("{getcomposer}/download/{channel}/composer.phar");
    let mut cache_url = format!("{releases_url},{mirror_url},{cds_url}");
    let mut source_url = format!("{getcomposer}/composer.phar");
    match channel.as_str() {
        "snapshot" => {
            if is_lts {
                source_url = lts_url;
            }
        }
        "preview" | "2" => {
            source_url = if is_lts { lts_url } else { channel_source_url };
        }
        "1" => source_url = channel_source_url,
        _ if EXACT_VERSION_RE.is_match(&ctx.version) => {
            cache_url = format!(
                "{github}/{}/releases/download/{}/composer.phar",
                ctx.repository, ctx.version
            );
            source_url = version_source_url;
        }
        _ => {
            source_url = if is_lts { lts_url } else { channel_source_url };
        }
    }
    let use_cache = std::env::var("NO_TOOLS_CACHE").map_or(true, |value| value != "true");
    ctx.url = if use_cache {
        format!("{cache_url},{source_url}")
    } else {
        source_url
    };
    ctx.version_parameter = ctx.version.clone();
    add_archive(ctx)
}

/// Phive: unsupported below PHP 5.6, version-pinned through 7.4,
/// feed-resolved on latest.
pub(crate) async fn add_phive(ctx: &mut ToolContext, resolver: &Resolver) -> String {
    if PHIVE_UNSUPPORTED_RE.is_match(&ctx.php_version) {
        let error = Error::unsupported_platform("phive", format!("PHP {}", ctx.php_version));
        return add_log(LogMark::Cross, "phive", &error.to_string(), ctx.os);
    }
    if re(r"5\.6|7\.0").is_match(&ctx.php_version) {
        ctx.version = "0.12.1".to_string();
    } else if re(r"7\.1").is_match(&ctx.php_version) {
        ctx.version = "0.13.5".to_string();
    } else if re(r"7\.2").is_match(&ctx.php_version) {
        ctx.version = "0.14.5".to_string();
    } else if re(r"7\.3|7\.4").is_match(&ctx.php_version) {
        ctx.version = "0.15.3".to_string();
    } else if ctx.version == "latest" {
        ctx.version = resolver.latest_version(ctx).await;
    }
    ctx.extension = format!("-{}{}", ctx.version, ctx.extension);
    ctx.url = url::build_url(ctx);
    add_archive(ctx)
}

/// PHPUnit-family tools: Packagist picks the best runtime-compatible
/// version on latest, and a pinned phar URL gets a major-version
/// fallback appended.
pub(crate) async fn add_phpunit_tools(ctx: &mut ToolContext, resolver: &Resolver) -> String {
    if ctx.version == "latest" {
        ctx.version = resolver
            .packagist_best(&ctx.packagist, &ctx.php_version)
            .await
            .unwrap_or_else(|| "latest".to_string());
    }
    ctx.url = url::build_phar_url(ctx);
    if re(r"-\d+").is_match(&ctx.url) {
        let fallback = PINNED_MAJOR_RE.replace(&ctx.url, "-$1");
        ctx.url = format!("{},{}", ctx.url, fallback);
    }
    add_archive(ctx)
}

/// Deployer manifest entry.
#[derive(Debug, Deserialize)]
struct DeployerManifestEntry {
    version: String,
    url: String,
}

/// Deployer: pinned versions resolve through the upstream manifest by
/// exact version match; a missing entry is an explicit diagnostic.
pub(crate) async fn add_deployer(ctx: &mut ToolContext, resolver: &Resolver) -> String {
    if ctx.version == "latest" {
        ctx.url = format!("{}/deployer.phar", ctx.domain);
    } else {
        let manifest = resolver
            .fetcher()
            .fetch("https://deployer.org/manifest.json", None)
            .await;
        let body = match manifest {
            Ok(body) => body,
            Err(e) => return add_log(LogMark::Cross, "deployer", &e.to_string(), ctx.os),
        };
        let entries: Vec<DeployerManifestEntry> = match serde_json::from_str(&body) {
            Ok(entries) => entries,
            Err(e) => return add_log(LogMark::Cross, "deployer", &e.to_string(), ctx.os),
        };
        match entries.iter().find(|entry| entry.version == ctx.version) {
            Some(entry) => ctx.url = entry.url.clone(),
            None => {
                let error = Error::not_found("Version missing in deployer manifest");
                return add_log(LogMark::Cross, "deployer", &error.to_string(), ctx.os);
            }
        }
    }
    add_archive(ctx)
}

/// Phing: primary download host plus, when pinned, a GitHub release
/// fallback with a hyphenated-version artifact name.
pub(crate) fn add_phing(ctx: &mut ToolContext) -> String {
    ctx.url = format!("{}/get/phing-{}{}", ctx.domain, ctx.version, ctx.extension);
    if ctx.version != "latest" {
        ctx.prefix = "releases".to_string();
        ctx.verb = "download".to_string();
        ctx.domain = ctx.github.clone();
        ctx.extension = format!("-{}{}", ctx.version, ctx.extension);
        ctx.url = format!("{},{}", ctx.url, url::build_url(ctx));
    }
    add_archive(ctx)
}

/// Castor ships per-platform binaries; the tool name is expanded for
/// URL building and restored for the install command.
pub(crate) fn add_castor(ctx: &mut ToolContext) -> String {
    let platform = if ctx.os.is_windows() {
        "windows".to_string()
    } else {
        ctx.os.to_string()
    };
    ctx.tool = format!("castor.{platform}-amd64");
    ctx.url = url::build_url(ctx);
    ctx.tool = "castor".to_string();
    if !std::path::Path::new("castor.php").exists() {
        ctx.version_parameter.clear();
    }
    add_archive(ctx)
}

/// Blackfire player: unix only, with historical pins for old runtimes.
pub(crate) fn add_blackfire_player(ctx: &mut ToolContext) -> String {
    if ctx.os.is_windows() {
        let error = Error::unsupported_platform(&ctx.tool, "Windows");
        return add_log(LogMark::Cross, &ctx.tool, &error.to_string(), ctx.os);
    }
    if ctx.version == "latest" {
        if re(r"5\.[5-6]|7\.0").is_match(&ctx.php_version) {
            ctx.version = "1.9.3".to_string();
        } else if re(r"7\.[1-4]|8\.0").is_match(&ctx.php_version) {
            ctx.version = "1.22.0".to_string();
        }
    }
    ctx.url = url::build_phar_url(ctx);
    add_archive(ctx)
}

/// WP-CLI: latest comes from the builds blob, pinned versions from the
/// hyphenated release artifact.
pub(crate) fn add_wp_cli(ctx: &mut ToolContext) -> String {
    if ctx.version == "latest" {
        let uri = "wp-cli/builds/blob/gh-pages/phar/wp-cli.phar?raw=true";
        ctx.url = format!("{}/{uri}", ctx.domain);
    } else {
        ctx.extension = format!("-{}{}", ctx.version, ctx.extension);
        ctx.url = url::build_url(ctx);
    }
    add_archive(ctx)
}

/// PECL only needs the executor helper enabled.
pub(crate) fn add_pecl(ctx: &ToolContext) -> String {
    install_command(ctx.os, "pecl").trim_end().to_string()
}

/// php-config and phpize ship with the PHP build itself.
pub(crate) fn add_dev_tools(ctx: &ToolContext) -> String {
    if ctx.os.is_windows() {
        let error = Error::unsupported_platform(&ctx.tool, "Windows");
        add_log(LogMark::Tick, &ctx.tool, &error.to_string(), ctx.os)
    } else {
        format!("add_devtools {}", ctx.tool)
    }
}
