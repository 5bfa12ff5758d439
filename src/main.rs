// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Parley CLI entrypoint.
//!
//! By default this runs the interactive TUI and serves MCP over streamable HTTP at
//! `http://127.0.0.1:<port>/mcp`.
//!
//! Use `--mcp` to run the MCP server over stdio instead (intended for tool integrations).

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use parley::config::Config;
use parley::mcp::ParleyMcp;
use parley::model::{demo_workspace, Workspace};
use parley::store::{WorkspaceFolder, WriteDurability};
use parley::ui::UiState;

const LOG_ENV: &str = "PARLEY_LOG";
const LOG_FILE_NAME: &str = "parley.log";

/// Research and interview workspace: terminal UI plus an MCP tool server.
///
/// TUI mode (default) also serves MCP over streamable HTTP at `http://127.0.0.1:<port>/mcp`.
#[derive(Debug, Parser)]
#[command(name = "parley", version)]
struct Cli {
    /// Workspace directory; defaults to the current directory.
    #[arg(value_name = "WORKSPACE_DIR", conflicts_with_all = ["workspace", "demo"])]
    workspace_dir: Option<PathBuf>,

    /// Workspace directory, as a flag.
    #[arg(long, value_name = "DIR", conflicts_with = "demo")]
    workspace: Option<PathBuf>,

    /// Use the built-in demo workspace in a temporary folder.
    #[arg(long)]
    demo: bool,

    /// Serve MCP over stdio instead of running the TUI.
    #[arg(long, conflicts_with = "mcp_http_port")]
    mcp: bool,

    /// Port of the MCP HTTP endpoint in TUI mode (0 = ephemeral).
    #[arg(long, value_name = "PORT")]
    mcp_http_port: Option<u16>,

    /// Fsync every write (slower, best-effort durable).
    #[arg(long)]
    durable_writes: bool,

    /// Config file to use instead of `<workspace>/parley.toml`.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn workspace_dir(&self) -> PathBuf {
        self.workspace_dir
            .clone()
            .or_else(|| self.workspace.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn load_config(&self, workspace_dir: &Path) -> Result<Config, Box<dyn Error>> {
        let mut config = match (&self.config, self.demo) {
            (Some(path), _) => Config::load(path, true)?,
            (None, true) => Config::default(),
            (None, false) => Config::load_for_workspace(workspace_dir)?,
        };
        if let Some(port) = self.mcp_http_port {
            config.mcp_http_port = port;
        }
        if self.durable_writes {
            config.durable_writes = true;
        }
        config.normalize();
        Ok(config)
    }
}

fn demo_dir() -> PathBuf {
    let now_millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("parley-demo-{}-{now_millis}", std::process::id()))
}

/// Stdio MCP logs to stderr; the TUI logs to a file so the terminal stays clean.
fn init_logging(log_dir: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_dir {
        None => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|err| -> Box<dyn Error> { err }),
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let file = OpenOptions::new().create(true).append(true).open(dir.join(LOG_FILE_NAME))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init()
                .map_err(|err| -> Box<dyn Error> { err })
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let workspace_dir = if cli.demo { demo_dir() } else { cli.workspace_dir() };
    let folder = WorkspaceFolder::new(&workspace_dir);
    init_logging(if cli.mcp { None } else { Some(folder.local_dir()) }.as_deref())?;

    let config = cli.load_config(&workspace_dir)?;
    let durability =
        if config.durable_writes { WriteDurability::Durable } else { WriteDurability::BestEffort };
    let folder = folder.with_durability(durability);

    let workspace = if cli.demo {
        // The demo still goes through a folder so TUI and MCP share one persistence channel.
        let workspace = demo_workspace();
        folder.save_workspace(&workspace)?;
        workspace
    } else {
        folder.load_or_init_workspace()?
    };
    info!(root = %workspace_dir.display(), rev = workspace.rev(), "opened workspace");

    if cli.mcp {
        let mcp = ParleyMcp::new_persistent(workspace, folder).with_config(config);
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        info!("serving MCP over stdio");
        runtime.block_on(mcp.serve_stdio())?;
        info!("MCP stdio session ended");
        return Ok(());
    }

    run_tui_with_http(workspace, folder, config)
}

fn run_tui_with_http(
    workspace: Workspace,
    folder: WorkspaceFolder,
    config: Config,
) -> Result<(), Box<dyn Error>> {
    let ui_state = Arc::new(Mutex::new(UiState::default()));
    let mcp = ParleyMcp::new_persistent(workspace.clone(), folder.clone())
        .with_ui_state(ui_state.clone())
        .with_config(config.clone());
    let port = config.mcp_http_port;

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        info!(url = %format!("http://{}/mcp", listener.local_addr()?), "serving MCP over HTTP");

        let http_config =
            StreamableHttpServerConfig { stateful_mode: true, ..StreamableHttpServerConfig::default() };
        let shutdown_token = http_config.cancellation_token.clone();
        let server_shutdown = shutdown_token.clone();

        let session_manager = Arc::new(LocalSessionManager::default());
        let mcp_service = {
            let mcp = mcp.clone();
            StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, http_config)
        };

        let router = Router::new().nest_service("/mcp", mcp_service);
        let server_handle = tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                server_shutdown.cancelled().await;
            });
            if let Err(err) = serve.await {
                error!(error = %err, "MCP HTTP server error");
            }
        });

        let tui_join = tokio::task::spawn_blocking(move || {
            parley::tui::run(workspace, Some(folder), config, Some(ui_state)).map_err(|err| err.to_string())
        })
        .await;

        shutdown_token.cancel();
        let _ = server_handle.await;
        info!("MCP HTTP server stopped");

        let tui_result = tui_join.map_err(|err| -> Box<dyn Error> { Box::new(err) })?;
        tui_result.map_err(|err| Box::new(std::io::Error::other(err)) as Box<dyn Error>)?;
        Ok::<(), Box<dyn Error>>(())
    })?;

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error!(error = %err, "parley failed");
        eprintln!("parley: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("parley").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_empty_args() {
        let cli = parse(&[]).expect("parse");
        assert!(!cli.mcp);
        assert!(!cli.demo);
        assert_eq!(cli.workspace_dir(), PathBuf::from("."));
        assert_eq!(cli.mcp_http_port, None);
    }

    #[test]
    fn positional_and_flag_workspace_are_equivalent() {
        let positional = parse(&["some/dir"]).expect("parse");
        let flag = parse(&["--workspace", "some/dir"]).expect("parse");
        assert_eq!(positional.workspace_dir(), PathBuf::from("some/dir"));
        assert_eq!(flag.workspace_dir(), PathBuf::from("some/dir"));
    }

    #[test]
    fn parses_demo_and_mcp_in_any_order() {
        for args in [["--demo", "--mcp"], ["--mcp", "--demo"]] {
            let cli = parse(&args).expect("parse");
            assert!(cli.demo);
            assert!(cli.mcp);
        }
    }

    #[test]
    fn rejects_invalid_combinations_with_usage_exit_code() {
        for args in [
            &["--demo", "some/dir"][..],
            &["--demo", "--workspace", "x"][..],
            &["--mcp", "--mcp-http-port", "0"][..],
            &["one", "--workspace", "two"][..],
        ] {
            let err = parse(args).expect_err("must conflict");
            assert_eq!(err.kind(), ErrorKind::ArgumentConflict, "{args:?}");
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn rejects_unknown_flags_and_bad_ports() {
        assert_eq!(parse(&["--nope"]).expect_err("unknown").kind(), ErrorKind::UnknownArgument);
        assert!(parse(&["--mcp-http-port", "http"]).is_err());
        assert!(parse(&["--mcp-http-port", "70000"]).is_err());
        assert!(parse(&["one", "two"]).is_err());
    }

    #[test]
    fn cli_flags_override_config_values() {
        let cli = parse(&["--demo", "--mcp-http-port", "9000", "--durable-writes"]).expect("parse");
        let config = cli.load_config(Path::new("unused")).expect("config");
        assert_eq!(config.mcp_http_port, 9000);
        assert!(config.durable_writes);
        assert_eq!(config.page_size, Config::default().page_size);
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let cli = parse(&["--config", "/definitely/missing/parley.toml"]).expect("parse");
        assert!(cli.load_config(Path::new(".")).is_err());
    }
}
