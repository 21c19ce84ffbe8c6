//! Stock ledger command-line interface.
//!
//! Records stock observations and reports current levels from a SQLite
//! ledger file. Every invocation opens its own connection, so several
//! concurrent invocations against one file are safe.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::borrow::Cow;
use std::path::PathBuf;
use stockledger_core::db::open_db;
use stockledger_core::{
    init_logging, ChartOutcome, LevelOrder, SqliteLedgerRepository, StockService,
};

mod config;
mod render;

use config::{CliConfig, DEFAULT_CHART_DIR, DEFAULT_DB_PATH, DEFAULT_LOG_DIR};
use render::JsonFileRenderer;

/// Record stock observations and report current levels
#[derive(Parser, Debug)]
#[command(name = "stockledger")]
#[command(version)]
struct Args {
    /// Ledger database file
    #[arg(long, env = "STOCKLEDGER_DB", default_value = DEFAULT_DB_PATH, global = true)]
    db: PathBuf,

    /// Directory the chart document is written to
    #[arg(long, env = "STOCKLEDGER_CHART_DIR", default_value = DEFAULT_CHART_DIR, global = true)]
    chart_dir: PathBuf,

    /// Log level: trace|debug|info|warn|error (default depends on build mode)
    #[arg(long, env = "STOCKLEDGER_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Directory for rolling log files
    #[arg(long, env = "STOCKLEDGER_LOG_DIR", default_value = DEFAULT_LOG_DIR, global = true)]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Record the quantity of an item on a date (YYYY-MM-DD)
    Add {
        item_name: String,
        #[arg(allow_hyphen_values = true)]
        quantity: String,
        record_date: String,
    },
    /// Print the current quantity of every item
    Levels {
        /// Emit JSON instead of tab-separated lines
        #[arg(long)]
        json: bool,
        /// Order by quantity (highest first) instead of item name
        #[arg(long)]
        by_quantity: bool,
    },
    /// Write the current-levels bar chart document
    Chart,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = CliConfig::resolve(
        &args.db,
        &args.chart_dir,
        args.log_level.as_deref(),
        &args.log_dir,
    )?;

    init_logging(&config.log_level, &config.log_dir).context("failed to initialize logging")?;
    info!("event=cli_start module=cli status=ok command={}", command_name(&args.command));

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open ledger {}", config.db_path.display()))?;
    let service = StockService::new(SqliteLedgerRepository::try_new(&conn)?);

    match args.command {
        Command::Add {
            item_name,
            quantity,
            record_date,
        } => {
            let observation = service
                .record_observation(&item_name, &quantity, &record_date)
                .context("observation rejected")?;
            println!(
                "recorded #{} {} = {} on {}",
                observation.sequence_id,
                escape_field(&observation.item_name),
                observation.quantity,
                observation.record_date
            );
        }
        Command::Levels { json, by_quantity } => {
            let order = if by_quantity {
                LevelOrder::ByQuantityDesc
            } else {
                LevelOrder::ByItem
            };
            let levels = service.current_levels_ordered_by(order)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&levels)?);
            } else if levels.is_empty() {
                println!("no data");
            } else {
                for entry in levels {
                    println!("{}\t{}", escape_field(&entry.item_name), entry.quantity);
                }
            }
        }
        Command::Chart => {
            let renderer = JsonFileRenderer::new(config.chart_path());
            match service.render_chart(&renderer)?? {
                ChartOutcome::NoData => println!("no data"),
                ChartOutcome::Rendered(path) => println!("{}", path.display()),
            }
        }
    }

    Ok(())
}

// Keeps one record per line in the tab-separated output; `--json` is lossless.
fn escape_field(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', '\t', '\n', '\r']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 4);
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Add { .. } => "add",
        Command::Levels { .. } => "levels",
        Command::Chart => "chart",
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_field, Args, Command};
    use clap::Parser;

    #[test]
    fn add_accepts_negative_quantity_text_for_core_validation() {
        let args =
            Args::try_parse_from(["stockledger", "add", "Widget", "-5", "2024-01-01"]).unwrap();
        assert_eq!(
            args.command,
            Command::Add {
                item_name: "Widget".to_string(),
                quantity: "-5".to_string(),
                record_date: "2024-01-01".to_string(),
            }
        );
    }

    #[test]
    fn global_options_may_follow_the_subcommand() {
        let args = Args::try_parse_from([
            "stockledger",
            "levels",
            "--json",
            "--db",
            "/tmp/other.db",
        ])
        .unwrap();
        assert_eq!(args.db, std::path::Path::new("/tmp/other.db"));
        assert_eq!(
            args.command,
            Command::Levels {
                json: true,
                by_quantity: false,
            }
        );
    }

    #[test]
    fn level_lines_escape_separators_in_item_names() {
        assert_eq!(escape_field("Widget"), "Widget");
        assert_eq!(escape_field("Bolt\tM8"), "Bolt\\tM8");
        assert_eq!(escape_field("Crate\nLarge"), "Crate\\nLarge");
        assert_eq!(escape_field("a\\b"), "a\\\\b");
    }

    #[test]
    fn add_requires_all_three_fields() {
        assert!(Args::try_parse_from(["stockledger", "add", "Widget", "5"]).is_err());
    }
}
