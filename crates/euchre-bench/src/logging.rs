use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{Level, info};
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, format::FmtSpan};

use crate::config::{LoggingConfig, ResolvedOutputs};

/// Keeps the background writer alive; dropping it flushes the telemetry file.
pub struct LoggingGuard {
    _worker: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// `<run_id>.telemetry.jsonl`, next to the hand rows.
pub fn telemetry_path(outputs: &ResolvedOutputs, run_id: &str) -> PathBuf {
    let dir = outputs
        .jsonl
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    dir.join(format!("{run_id}.telemetry.jsonl"))
}

/// Harness and engine targets are filtered separately: per-action engine
/// events are far noisier than the runner's per-hand rows.
pub fn filter_directives(logging: &LoggingConfig) -> String {
    let bench = logging.level().unwrap_or(Level::INFO);
    let engine = logging.engine_level().unwrap_or(Level::WARN);
    format!(
        "euchre_bench={},euchre_core={}",
        bench.as_str().to_ascii_lowercase(),
        engine.as_str().to_ascii_lowercase()
    )
}

/// Installs a JSON subscriber for the run. `RUST_LOG` still wins when set.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let telemetry_path = telemetry_path(outputs, run_id);
    if let Some(dir) = telemetry_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    }
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;
    let (writer, worker) = NonBlockingBuilder::default().lossy(false).finish(file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(logging)));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // Tests may have installed a subscriber already.
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        info!(target: "euchre_bench::run", %run_id, "telemetry opened");
    }

    Ok(Some(LoggingGuard {
        _worker: worker,
        telemetry_path,
    }))
}
