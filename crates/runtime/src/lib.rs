//! Runtime bootstrap and the replay driver.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use oe_core::{Event, Order};
use oe_ingest::read_events;
use oe_observers::{AlertObserver, LoggingObserver};
use oe_processor::{Applied, EventProcessor, ProcessError};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod metrics;

pub use config::{OutputFormat, ReplayConfig};
pub use metrics::{MetricsSnapshot, ProcessingMetrics, ReplayTimer};

/// Installs the fmt subscriber on stderr. `RUST_LOG` overrides the default
/// `info` filter. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub processed: usize,
    pub failed: usize,
}

/// Hooks around each event of a replay. `before_event` runs ahead of any
/// observer output for that event.
pub trait ReplayProgress {
    fn before_event(&mut self, _event: &Event) {}
    fn after_event(&mut self, _outcome: &Result<Applied, ProcessError>) {}
}

impl ReplayProgress for () {}

/// Feeds `events` through `processor` in order. Failures are counted and
/// the fold carries on.
pub fn replay<I, P>(
    events: I,
    processor: &mut EventProcessor,
    metrics: &ProcessingMetrics,
    progress: &mut P,
) -> ReplaySummary
where
    I: IntoIterator<Item = Event>,
    P: ReplayProgress + ?Sized,
{
    let mut summary = ReplaySummary::default();
    for event in events {
        progress.before_event(&event);
        let outcome = processor.process_event(event);
        metrics.record(&outcome);
        progress.after_event(&outcome);
        summary.processed += 1;
        if outcome.is_err() {
            summary.failed += 1;
        }
    }
    summary
}

#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub source: PathBuf,
    pub loaded: usize,
    pub summary: ReplaySummary,
    /// Final order states, sorted by order id.
    pub orders: Vec<Order>,
    pub metrics: MetricsSnapshot,
    pub elapsed: Duration,
}

/// Events read from the configured input, not yet processed.
pub struct LoadedEvents {
    source: PathBuf,
    events: Vec<Event>,
    metrics: ProcessingMetrics,
    timer: ReplayTimer,
}

impl LoadedEvents {
    pub fn load(cfg: &ReplayConfig) -> Result<Self> {
        let source = cfg
            .input
            .clone()
            .context("no input file given on the command line or in the config")?;
        let timer = ReplayTimer::start();
        let metrics = ProcessingMetrics::default();

        let mut reader = read_events(&source);
        let events: Vec<Event> = reader.by_ref().collect();
        metrics.inc_events_read(events.len() as u64);
        metrics.inc_lines_skipped(reader.skipped() as u64);
        info!(
            source = %source.display(),
            loaded = events.len(),
            skipped = reader.skipped(),
            "events loaded"
        );

        Ok(Self {
            source,
            events,
            metrics,
            timer,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Replays the events through a fresh processor carrying the observers
    /// `cfg` enables.
    pub fn replay<P>(self, cfg: &ReplayConfig, progress: &mut P) -> ReplayReport
    where
        P: ReplayProgress + ?Sized,
    {
        let mut processor = EventProcessor::new();
        if cfg.logger.enabled {
            processor.add_observer(Arc::new(LoggingObserver::stdout(cfg.logger.observer.clone())));
        }
        if cfg.alerts.enabled {
            processor.add_observer(Arc::new(AlertObserver::stdout(cfg.alerts.observer.clone())));
        }

        let loaded = self.events.len();
        let summary = replay(self.events, &mut processor, &self.metrics, progress);

        let mut orders: Vec<Order> = processor.get_orders().into_values().collect();
        orders.sort_by(|a, b| a.order_id().cmp(b.order_id()));

        ReplayReport {
            source: self.source,
            loaded,
            summary,
            orders,
            metrics: self.metrics.snapshot(),
            elapsed: self.timer.elapsed(),
        }
    }
}

/// Loads the configured input and replays it in one step.
pub fn run(cfg: &ReplayConfig) -> Result<ReplayReport> {
    Ok(LoadedEvents::load(cfg)?.replay(cfg, &mut ()))
}
