use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn, Level};

use incident_ledger::{LedgerCommand, LedgerConfig, LedgerService};

#[tokio::main]
async fn main() -> Result<()> {
    let config = LedgerConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {:#}", e);
        eprintln!("Please check INCIDENT_* environment variables.");
        e
    })?;

    init_logging(&config)?;

    info!(
        cooldown_secs = config.rules.cooldown_secs,
        event_history = config.events.history_capacity,
        "Starting incident ledger replay"
    );

    let service = config.build_service();
    let watcher = spawn_event_logger(&service).await;

    let processed = match std::env::args().nth(1) {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open script {}", path))?;
            replay(&service, BufReader::new(file)).await?
        }
        None => replay(&service, BufReader::new(tokio::io::stdin())).await?,
    };

    let total = service.get_all_reports(0, 0).await?.total;
    info!(commands = processed, reports = total, "Replay finished");

    // Dropping the last handle closes the channel; let the logger drain
    drop(service);
    let _ = watcher.await;

    Ok(())
}

/// Initialize logging on stderr so stdout carries only command results
fn init_logging(config: &LedgerConfig) -> Result<()> {
    let log_level = match config.logging.level.as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}

/// Log every published notification until the ledger goes away
async fn spawn_event_logger(service: &LedgerService) -> tokio::task::JoinHandle<()> {
    let mut rx = service.subscribe().await;
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(record) => debug!(sequence = record.sequence, event = ?record.event, "Notification"),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Notification logger lagged behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Apply every command line and print one JSON result per line
async fn replay<R>(service: &LedgerService, reader: R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stdout = tokio::io::stdout();
    let mut processed = 0;
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read script")? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let outcome = match serde_json::from_str::<LedgerCommand>(line) {
            Ok(command) => match service.execute(command, Utc::now()).await {
                Ok(value) => json!({ "line": line_no, "ok": value }),
                Err(e) => json!({
                    "line": line_no,
                    "error": { "kind": e.kind(), "message": e.to_string() },
                }),
            },
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping malformed command");
                json!({
                    "line": line_no,
                    "error": { "kind": "InvalidCommand", "message": e.to_string() },
                })
            }
        };
        processed += 1;

        let mut out = serde_json::to_vec(&outcome).context("Failed to encode outcome")?;
        out.push(b'\n');
        stdout.write_all(&out).await.context("Failed to write outcome")?;
    }

    stdout.flush().await.context("Failed to flush stdout")?;
    Ok(processed)
}
