mod output;
mod telemetry;
mod web;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use traceweb_backend::{Backend, HttpBackend, MemoryBackend, TraceQuery};
use traceweb_core::config::{Config, normalize_base_path};
use traceweb_core::ids::TraceId;
use traceweb_core::view::ViewBuilder;

use crate::output::{print_latest_human, print_search_human, print_trace_human};
use crate::telemetry::{init_cli_tracing, init_serve_tracing};
use crate::web::AppState;

#[derive(Parser, Debug)]
#[command(name = "traceweb")]
#[command(about = "Browse distributed traces from a trace-query service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true, help = "Trace-query service endpoint")]
    backend: Option<String>,

    #[arg(long, global = true, help = "Serve spans from a JSON file instead of a backend")]
    fixtures: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Run the JSON view server")]
    Serve {
        #[arg(long)]
        listen_addr: Option<String>,
        #[arg(long)]
        base_path: Option<String>,
    },
    #[command(about = "List the most recent spans")]
    Latest,
    #[command(about = "Search spans by name")]
    Search { query: String },
    #[command(about = "Show one trace as a waterfall")]
    Trace { trace_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = Config::load().context("load config")?;
    if let Some(v) = cli.backend.clone() {
        cfg.backend_url = v;
    }

    match cli.command {
        Commands::Serve {
            listen_addr,
            base_path,
        } => {
            if let Some(v) = listen_addr {
                cfg.listen_addr = v;
            }
            if let Some(v) = base_path {
                cfg.base_path = normalize_base_path(&v);
            }
            let telemetry = init_serve_tracing();
            let result = run_server(cfg, cli.fixtures).await;
            drop(telemetry);
            result
        }
        Commands::Latest => {
            init_cli_tracing();
            let query = build_query(&cfg, cli.fixtures.as_deref())?;
            let spans = query.latest().await;
            let render = cfg.render_config();
            let view = ViewBuilder::new(&render, Utc::now()).latest(&spans);
            emit(&view, cli.json, |v, color| print_latest_human(v, color))
        }
        Commands::Search { query: q } => {
            init_cli_tracing();
            let query = build_query(&cfg, cli.fixtures.as_deref())?;
            let spans = query.search(&q).await;
            let render = cfg.render_config();
            let view = ViewBuilder::new(&render, Utc::now()).search(Some(&q), &spans);
            emit(&view, cli.json, |v, color| print_search_human(v, color))
        }
        Commands::Trace { trace_id } => {
            init_cli_tracing();
            let id = TraceId::parse(&trace_id)?;
            let query = build_query(&cfg, cli.fixtures.as_deref())?;
            let spans = query.trace(&id).await;
            let render = cfg.render_config();
            let view = ViewBuilder::new(&render, Utc::now()).trace(id.as_str(), &spans);
            emit(&view, cli.json, |v, color| print_trace_human(v, color))
        }
    }
}

async fn run_server(cfg: Config, fixtures: Option<PathBuf>) -> anyhow::Result<()> {
    let query = build_query(&cfg, fixtures.as_deref())?;

    eprintln!("traceweb serve");
    eprintln!("  listen: {}", cfg.listen_addr);
    eprintln!("  backend: {}", query.backend().describe());
    eprintln!("  base path: {}", cfg.base_path);

    let state = AppState {
        query,
        render: Arc::new(cfg.render_config()),
        base_path: Arc::from(cfg.base_path.as_str()),
    };
    let addr = cfg
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {}", cfg.listen_addr))?;
    web::run_web_server(state, addr).await
}

fn build_query(cfg: &Config, fixtures: Option<&std::path::Path>) -> anyhow::Result<TraceQuery> {
    let backend = match fixtures {
        Some(path) => Backend::Memory(
            MemoryBackend::from_file(path)
                .with_context(|| format!("load fixtures {}", path.display()))?,
        ),
        None => Backend::Http(HttpBackend::new(&cfg.backend_url, cfg.backend_timeout)?),
    };
    Ok(TraceQuery::new(backend, cfg.search_limit))
}

fn emit<T: Serialize>(view: &T, json: bool, human: impl FnOnce(&T, bool)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }
    human(view, std::io::stdout().is_terminal());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["traceweb", "trace", "abc", "--json", "--fixtures", "f.json"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.fixtures, Some(PathBuf::from("f.json")));
        assert!(matches!(cli.command, Commands::Trace { trace_id } if trace_id == "abc"));
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "traceweb",
            "serve",
            "--listen-addr",
            "0.0.0.0:9000",
            "--base-path",
            "debug",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve {
                listen_addr,
                base_path,
            } => {
                assert_eq!(listen_addr.as_deref(), Some("0.0.0.0:9000"));
                assert_eq!(base_path.as_deref(), Some("debug"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn build_query_reports_missing_fixtures() {
        let cfg = Config::default();
        let err = build_query(&cfg, Some(std::path::Path::new("/definitely/missing.json")))
            .err()
            .unwrap();
        assert!(err.to_string().contains("load fixtures"));
    }
}
