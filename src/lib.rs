// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod protocol;
pub mod transport;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_for_cli};
use crate::engine::{CoreSession, Runtime, SearchParams, SessionStats};
use crate::protocol::{Credentials, ProblemBody};
use crate::transport::{LocalReport, LocalTransport, Transport, WebSocketTransport};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the transport (WebSocket, or the local simulated oracle)
/// - the core session and its runtime shell
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_for_cli(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    if let (Some(problem), Some(culprit)) = (&args.problem, &args.culprit) {
        let report = run_local(&cfg, problem, culprit).await?;
        print_local_report(&report);
        if report.solution.as_deref() != Some(culprit.as_str()) {
            bail!(
                "wrong solution: expected {culprit}, got {:?}",
                report.solution
            );
        }
        return Ok(());
    }

    let credentials = cfg.credentials()?;
    let transport = WebSocketTransport::connect(&cfg.server.url, cfg.connect_timeout()).await?;
    let stats = run_session(&cfg, transport, credentials).await?;
    info!(
        repositories = stats.repositories,
        instances = stats.instances_solved(),
        questions = stats.total_questions(),
        "done"
    );
    Ok(())
}

/// Run one session over `transport` until the oracle is done or Ctrl-C.
pub async fn run_session<T: Transport>(
    cfg: &ConfigFile,
    transport: T,
    credentials: Credentials,
) -> Result<SessionStats> {
    let core = CoreSession::new(SearchParams::from(&cfg.search));

    // Ctrl-C → graceful shutdown.
    let (stop_tx, stop_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            return;
        }
        info!("Ctrl-C received; closing session");
        let _ = stop_tx.send(()).await;
    });

    let runtime = Runtime::new(core, transport, credentials).with_shutdown(stop_rx);
    Ok(runtime.run().await?)
}

/// Solve the problem stored at `problem_path` against a simulated oracle
/// whose first bad node is `culprit`.
pub async fn run_local(
    cfg: &ConfigFile,
    problem_path: &Path,
    culprit: &str,
) -> Result<LocalReport> {
    let contents = fs::read_to_string(problem_path)
        .with_context(|| format!("reading problem file {}", problem_path.display()))?;
    let problem: ProblemBody = serde_json::from_str(&contents)
        .with_context(|| format!("parsing problem file {}", problem_path.display()))?;

    let transport = LocalTransport::new(problem, culprit, false)?;
    let report = transport.report();

    let user = match cfg.server.user.trim() {
        "" => "local",
        user => user,
    };
    run_session(cfg, transport, Credentials::new(user, None)).await?;

    let report = report
        .lock()
        .map_err(|_| anyhow::anyhow!("local report lock poisoned"))?
        .clone();
    Ok(report)
}

fn print_local_report(report: &LocalReport) {
    match &report.solution {
        Some(solution) => println!("solution: {solution}"),
        None => println!("solution: <none>"),
    }
    println!("questions: {}", report.questions.len());
    for (i, node) in report.questions.iter().enumerate() {
        println!("  {:>3}. {node}", i + 1);
    }
}

/// Print the effective settings.
fn print_dry_run(cfg: &ConfigFile) {
    println!("dagbisect dry-run");
    println!("  server.url = {}", cfg.server.url);
    if cfg.server.user.is_empty() {
        println!("  server.user = <unset>");
    } else {
        println!("  server.user = {}", cfg.server.user);
    }
    println!(
        "  server.token = {}",
        if cfg.server.token.is_some() { "<set>" } else { "<unset>" }
    );
    println!("  server.connect_timeout_secs = {}", cfg.server.connect_timeout_secs);
    println!("  search.threshold = {}", cfg.search.threshold);
    println!("  search.batch = {}", cfg.search.batch);
    println!("  search.validate_repository = {}", cfg.search.validate_repository);
}
