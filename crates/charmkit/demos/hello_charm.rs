//! A small web charm.
//!
//! Symlink this binary as `hooks/install`, `hooks/config-changed`, ... or
//! run it with `JUJU_HOOK_NAME` set. Handlers:
//!
//! - `install`: writes the landing page, counts installs in unit data
//! - `config-changed`: moves the opened port when `port` changes
//! - `leader-elected`: publishes the site title to peers
//! - `website-relation-joined`: hands the address and port to the proxy
//! - anything else: reports active status

use anyhow::Context;
use charmkit::prelude::*;
use std::path::Path;
use std::process::ExitCode;

const DEFAULT_PORT: u16 = 80;

fn render_page(dir: &Path, title: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let page = format!("<html><body><h1>{title}</h1></body></html>\n");
    std::fs::write(dir.join("index.html"), page).context("writing index.html")?;
    Ok(())
}

fn configured_port(ctx: &mut HookContext<'_>) -> Result<u16, HookError> {
    let Some(raw) = ctx.config().get("port").optional()? else {
        return Ok(DEFAULT_PORT);
    };
    raw.parse()
        .map_err(|_| HookError::failed(format!("port '{raw}' is not a valid TCP port")))
}

fn install(ctx: &mut HookContext<'_>) -> Result<(), HookError> {
    status::set(ctx.runner(), &StatusRecord::maintenance("rendering landing page"))?;

    let title = ctx
        .config()
        .get("title")
        .optional()?
        .unwrap_or_else(|| "hello".to_string());
    let charm_dir = ctx
        .unit()?
        .charm_dir
        .clone()
        .unwrap_or_else(|| ".".into());
    render_page(&charm_dir.join("www"), &title).map_err(|e| HookError::Other(e.into()))?;

    let mut kv = unit_data(ctx)?;
    let installs: u32 = kv.get("installs").map_err(ToolError::from)?.unwrap_or(0);
    kv.set("installs", installs + 1).map_err(ToolError::from)?;
    kv.flush().map_err(ToolError::from)?;

    tracing::info!(installs = installs + 1, "landing page rendered");
    Ok(())
}

fn config_changed(ctx: &mut HookContext<'_>) -> Result<(), HookError> {
    if let ConfigDiff::Changed { old, .. } = ctx.config().diff("port")? {
        if let Ok(old) = old.parse() {
            network::close_port(ctx.runner(), Port::tcp(old))?;
        }
    }
    let port = configured_port(ctx)?;
    network::open_port(ctx.runner(), Port::tcp(port))?;
    status::set(ctx.runner(), &StatusRecord::active(format!("serving on {port}")))?;
    Ok(())
}

fn leader_elected(ctx: &mut HookContext<'_>) -> Result<(), HookError> {
    let title = ctx.config().get("title").optional()?.unwrap_or_default();
    leader::set(ctx.runner(), [("site-title", title.as_str())])?;
    Ok(())
}

fn website_joined(ctx: &mut HookContext<'_>) -> Result<(), HookError> {
    let address = network::private_address(ctx.runner())?;
    let port = configured_port(ctx)?.to_string();
    relation::set(
        ctx.runner(),
        [("hostname", address.to_string()), ("port", port)],
        None,
    )?;
    Ok(())
}

fn report_ready(ctx: &mut HookContext<'_>) -> Result<(), HookError> {
    status::set(ctx.runner(), &StatusRecord::active("ready"))?;
    Ok(())
}

fn main() -> ExitCode {
    CharmApp::builder()
        .hook("install", install)
        .hooks(["config-changed", "upgrade-charm"], config_changed)
        .hook("leader-elected", leader_elected)
        .hook("website-relation-joined", website_joined)
        .default_hook(report_ready)
        .build()
        .run()
}
