use std::fs;

use anyhow::{Context, Result, bail};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};
use uuid::Uuid;

use crate::config::{Config, LoggingRotation};

const DECISION_LOG_PREFIX: &str = "eligibility.log";

/// Keeps the decision log writer alive for the run and carries its id.
pub struct TracingGuard {
    _writer: WorkerGuard,
    run_id: Uuid,
}

impl TracingGuard {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }
}

/// Installs the global subscriber for one checker run.
///
/// Decisions go to a JSON decision log under `logging.dir`. Warnings and
/// above, including entitlement mismatches, are echoed to stderr unless
/// disabled.
pub fn init_tracing(config: &Config) -> Result<TracingGuard> {
    let logging = &config.logging;
    let filter = decision_log_filter(&logging.filter)?;

    fs::create_dir_all(&logging.dir).with_context(|| {
        format!("failed to create decision log directory {}", logging.dir.display())
    })?;
    let appender = match logging.rotation {
        LoggingRotation::Daily => rolling::daily(&logging.dir, DECISION_LOG_PREFIX),
        LoggingRotation::Hourly => rolling::hourly(&logging.dir, DECISION_LOG_PREFIX),
    };
    let (writer, writer_guard) = tracing_appender::non_blocking(appender);

    let decision_log = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(true)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter);
    let operator_echo = logging.stderr_warn_enabled.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(LevelFilter::WARN)
    });

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(decision_log)
        .with(operator_echo)
        .try_init()
        .context("failed to install eligibility tracing subscriber")?;

    let run_id = Uuid::now_v7();
    tracing::info!(
        target: "logging",
        run_id = %run_id,
        service = %config.service.service_label,
        decision_mode = %config.service.decision_mode(),
        snapshot_path = %config.directory.snapshot_path.display(),
        log_dir = %logging.dir.display(),
        rotation = ?logging.rotation,
        "eligibility_run_started"
    );

    Ok(TracingGuard {
        _writer: writer_guard,
        run_id,
    })
}

fn decision_log_filter(directives: &str) -> Result<EnvFilter> {
    if directives.trim().is_empty() {
        bail!("logging.filter cannot be empty");
    }
    EnvFilter::try_new(directives)
        .with_context(|| format!("failed to parse logging.filter '{directives}'"))
}
