//! Factcheck CLI entrypoint.
//!
//! Usage: `factcheck [--crawl-only] <facts.json>...`
//!
//! Each file holds one fact or an array of facts. One verdict line is printed
//! per fact; Ctrl+C or SIGTERM stops after the fact in flight.

use std::path::Path;

use anyhow::Context;
use mimalloc::MiMalloc;
use serde::Deserialize;
use tokio::signal;

use factcheck::config::Config;
use factcheck::crawl::CancellationFlag;
use factcheck::fact::Fact;
use factcheck::pipeline::{CheckMode, FactChecker};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Deserialize)]
#[serde(untagged)]
enum FactFile {
    Many(Vec<Fact>),
    One(Fact),
}

fn read_facts(path: &Path) -> anyhow::Result<Vec<Fact>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: FactFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse facts in {}", path.display()))?;
    Ok(match parsed {
        FactFile::Many(facts) => facts,
        FactFile::One(fact) => vec![fact],
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut mode = CheckMode::Full;
    let mut facts = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--crawl-only" {
            mode = CheckMode::CrawlOnly;
            continue;
        }
        facts.extend(read_facts(Path::new(&arg))?);
    }
    if facts.is_empty() {
        anyhow::bail!("usage: factcheck [--crawl-only] <facts.json>...");
    }

    let config = Config::from_env().context("invalid configuration")?;
    let checker = FactChecker::from_config(&config).context("failed to start fact checker")?;

    tracing::info!(
        facts = facts.len(),
        mode = ?mode,
        backends = checker.crawler().backends().len(),
        training_mode = checker.training_mode(),
        "Factcheck starting"
    );

    let cancel = CancellationFlag::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let results = checker.check_facts_with_cancel(&facts, mode, &cancel).await;
    for evidence in &results {
        println!("{}\t{}", evidence.fact, evidence.verdict());
    }

    if let Err(e) = checker.persist_cache() {
        tracing::error!("Failed to persist result cache: {}", e);
    }

    tracing::info!(checked = results.len(), "Factcheck complete");
    Ok(())
}

async fn cancel_on_signal(cancel: CancellationFlag) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, finishing the fact in flight");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, finishing the fact in flight");
        }
    }
    cancel.cancel();
}
