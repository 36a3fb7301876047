//! Per-tool installation-strategy dispatch.
//!
//! One state machine per tool: an errored context short-circuits to a
//! diagnostic line, otherwise the installation kind picks the fragment
//! generator. Every terminal state produces a fragment (possibly empty
//! for the `none` placeholder); nothing here aborts the batch.

use phpup_core::Error;
use phpup_core::tools::{InstallKind, ToolContext, ToolFunction};
use phpup_resolver::Resolver;

use crate::commands::{LogMark, add_log, custom_package};
use crate::functions;

/// Produce the script fragment for one resolved tool context.
pub async fn tool_fragment(ctx: &mut ToolContext, resolver: &Resolver) -> String {
    if let Some(error) = ctx.error.clone() {
        return add_log(LogMark::Cross, &ctx.tool, &error, ctx.os);
    }
    match ctx.kind {
        Some(InstallKind::Phar) => functions::add_archive(ctx),
        Some(InstallKind::Composer) => functions::add_package(ctx),
        Some(InstallKind::CustomPackage) => {
            let base = ctx
                .tool
                .split('-')
                .next()
                .unwrap_or(ctx.tool.as_str())
                .to_string();
            custom_package(&base, "tools", &ctx.version, ctx.os)
        }
        Some(InstallKind::CustomFunction) => match ctx.function {
            Some(function) => run_function(function, ctx, resolver).await,
            None => {
                let error = Error::configuration_gap(&ctx.tool);
                add_log(LogMark::Cross, &ctx.tool, &error.to_string(), ctx.os)
            }
        },
        // A bare `none` entry is a deliberate no-op placeholder.
        None if ctx.tool == "none" => String::new(),
        None => {
            let error = Error::unsupported_tool(&ctx.tool);
            add_log(LogMark::Cross, &ctx.tool, &error.to_string(), ctx.os)
        }
    }
}

/// The registered-handler table, exhaustive over [`ToolFunction`].
async fn run_function(
    function: ToolFunction,
    ctx: &mut ToolContext,
    resolver: &Resolver,
) -> String {
    match function {
        ToolFunction::Castor => functions::add_castor(ctx),
        ToolFunction::Composer => functions::add_composer(ctx),
        ToolFunction::Deployer => functions::add_deployer(ctx, resolver).await,
        ToolFunction::DevTools => functions::add_dev_tools(ctx),
        ToolFunction::Phive => functions::add_phive(ctx, resolver).await,
        ToolFunction::BlackfirePlayer => functions::add_blackfire_player(ctx),
        ToolFunction::Pecl => functions::add_pecl(ctx),
        ToolFunction::Phing => functions::add_phing(ctx),
        ToolFunction::Phpunit | ToolFunction::Phpcpd => {
            functions::add_phpunit_tools(ctx, resolver).await
        }
        ToolFunction::WpCli => functions::add_wp_cli(ctx),
    }
}
