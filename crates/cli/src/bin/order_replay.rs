use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use oe_core::{Amount, Event, Order, OrderStatus};
use oe_processor::{Applied, ProcessError};
use oe_runtime::{
    init_tracing, LoadedEvents, OutputFormat, ReplayConfig, ReplayProgress, ReplayReport,
};
use serde::Serialize;
use tracing::info;

/// Replays a file of JSON order events and prints the final order states.
#[derive(Parser, Debug)]
#[command(name = "order_replay", version)]
struct Args {
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print final states as one JSON object per line
    #[arg(long)]
    json: bool,
    #[arg(long)]
    no_alerts: bool,
    #[arg(long)]
    no_logger: bool,
    /// Print a metrics snapshot after the run
    #[arg(long)]
    metrics: bool,
    /// Event file, one JSON object per line
    input: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<ReplayConfig> {
        let mut cfg = match &self.config {
            Some(path) => ReplayConfig::from_path(path)?,
            None => ReplayConfig::default(),
        };
        if let Some(input) = self.input {
            cfg.input = Some(input);
        }
        if self.json {
            cfg.output = OutputFormat::Json;
        }
        if self.no_alerts {
            cfg.alerts.enabled = false;
        }
        if self.no_logger {
            cfg.logger.enabled = false;
        }
        cfg.metrics |= self.metrics;
        Ok(cfg)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderLine<'a> {
    order_id: &'a str,
    customer_id: &'a str,
    status: OrderStatus,
    total_amount: Amount,
    events: usize,
}

impl<'a> From<&'a Order> for OrderLine<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            order_id: order.order_id(),
            customer_id: order.customer_id(),
            status: order.status(),
            total_amount: order.total_amount(),
            events: order.event_history().len(),
        }
    }
}

/// Brackets each event's observer output on stdout.
struct Console;

impl ReplayProgress for Console {
    fn before_event(&mut self, event: &Event) {
        println!("Processing event: {}", event.event_id());
    }

    fn after_event(&mut self, _outcome: &Result<Applied, ProcessError>) {
        println!("=====");
    }
}

fn print_report(report: &ReplayReport, cfg: &ReplayConfig) -> Result<()> {
    println!("\nFinal Order States");
    for order in &report.orders {
        match cfg.output {
            OutputFormat::Text => println!(
                "Order: {} | Status: {} | Events: {}",
                order.order_id(),
                order.status(),
                order.event_history().len()
            ),
            OutputFormat::Json => println!("{}", serde_json::to_string(&OrderLine::from(order))?),
        }
    }
    if cfg.metrics {
        println!("{}", report.metrics.to_json_line("replay", Some(report.elapsed)));
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cfg = Args::parse().into_config()?;

    println!("Order Processing Started\n");
    let loaded = LoadedEvents::load(&cfg)?;
    println!(
        "Loaded {} events from {}\n",
        loaded.len(),
        loaded.source().display()
    );

    let report = loaded.replay(&cfg, &mut Console);
    info!(
        processed = report.summary.processed,
        failed = report.summary.failed,
        "replay finished"
    );

    print_report(&report, &cfg)?;
    println!("\nProcessing Complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::Utc;
    use oe_core::{OrderCreated, OrderItem};
    use rust_decimal::Decimal;

    use super::*;

    fn config_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{json}").unwrap();
        file
    }

    fn config(args: &[&str]) -> ReplayConfig {
        let argv = std::iter::once("order_replay").chain(args.iter().copied());
        Args::try_parse_from(argv).unwrap().into_config().unwrap()
    }

    #[test]
    fn no_flags_gives_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg, ReplayConfig::default());
    }

    #[test]
    fn positional_input_overrides_config_file() {
        let file = config_file(r#"{"input": "from_file.json"}"#);
        let path = file.path().to_str().unwrap();

        assert_eq!(
            config(&["--config", path]).input,
            Some(PathBuf::from("from_file.json"))
        );
        assert_eq!(
            config(&["--config", path, "cli.json"]).input,
            Some(PathBuf::from("cli.json"))
        );
    }

    #[test]
    fn flags_switch_settings_off_or_on() {
        let file = config_file(r#"{"output": "text", "metrics": false}"#);
        let cfg = config(&[
            "--config",
            file.path().to_str().unwrap(),
            "--json",
            "--no-logger",
            "--no-alerts",
            "--metrics",
        ]);

        assert_eq!(cfg.output, OutputFormat::Json);
        assert!(!cfg.logger.enabled);
        assert!(!cfg.alerts.enabled);
        assert!(cfg.metrics);
    }

    #[test]
    fn absent_flags_keep_file_values() {
        let file = config_file(
            r#"{"output": "json", "metrics": true, "logger": {"enabled": false}, "alerts": {"critical_statuses": ["PAID"]}}"#,
        );
        let cfg = config(&["--config", file.path().to_str().unwrap()]);

        assert_eq!(cfg.output, OutputFormat::Json);
        assert!(cfg.metrics);
        assert!(!cfg.logger.enabled);
        assert!(cfg.alerts.enabled);
        assert_eq!(cfg.alerts.observer.critical_statuses, vec![OrderStatus::Paid]);
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let args = Args::try_parse_from(["order_replay", "--config", missing.to_str().unwrap()])
            .unwrap();
        assert!(args.into_config().is_err());
    }

    #[test]
    fn order_line_uses_camel_case_keys() {
        let order = Order::open(Event::new(
            "e1",
            Utc::now(),
            OrderCreated {
                order_id: "ORD1".to_string(),
                customer_id: "CUST1".to_string(),
                items: vec![OrderItem::new("P1", 2)],
                total_amount: Decimal::new(10050, 2),
            },
        ))
        .unwrap();

        let value = serde_json::to_value(OrderLine::from(&order)).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "orderId": "ORD1",
                "customerId": "CUST1",
                "status": "PENDING",
                "totalAmount": "100.50",
                "events": 1,
            })
        );
    }
}
