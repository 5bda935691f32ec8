use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use freight_app::{AppConfig, ShipmentArgs, DEFAULT_CONFIG_PATH};
use freight_core::OutputShape;
use freight_logging::freight_debug;

mod commands;

/// Freight quotes from the command line: single shipments, spreadsheets and pickups.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// RON configuration file; missing file means defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Quote one shipment and list the offers by price.
    Quote(ShipmentArgs),
    /// Quote each row of an .xlsx or .csv file right away and print one line per row.
    ///
    /// An optional `ref` column labels the rows.
    QuoteMany { input: PathBuf },
    /// Quote every row of an .xlsx or .csv file and save the result spreadsheet.
    Batch {
        input: PathBuf,
        /// `cheapest` for one row per input row, `all` for one row per offer.
        #[arg(long, default_value_t = OutputShape::AllOptions)]
        shape: OutputShape,
    },
    /// Write the input spreadsheet template.
    Template {
        /// Target directory; defaults to the configured output directory.
        dir: Option<PathBuf>,
    },
    /// Print the fields read from an NF-e XML file.
    Nfe { xml: PathBuf },
    /// Quote a shipment, pick an offer and register a pickup for an NF-e.
    Pickup {
        #[command(flatten)]
        shipment: ShipmentArgs,
        #[arg(long)]
        nfe: PathBuf,
        /// 1-based position in the price-sorted list; the cheapest when omitted.
        #[arg(long)]
        option: Option<usize>,
        /// Move the new request straight to `Scheduled`.
        #[arg(long)]
        schedule: bool,
    },
    /// Print the effective configuration with the token hidden.
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_with_env(&cli.config)?;
    freight_logging::initialize(config.log.destination, config.log.level);
    freight_debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Quote(shipment) => commands::quote(&config, shipment).await,
        Command::QuoteMany { input } => commands::quote_items(&config, &input).await,
        Command::Batch { input, shape } => commands::batch(&config, &input, shape).await,
        Command::Template { dir } => {
            commands::template(dir.as_deref().unwrap_or(&config.output_dir))
        }
        Command::Nfe { xml } => commands::nfe(&xml),
        Command::Pickup {
            shipment,
            nfe,
            option,
            schedule,
        } => commands::pickup(&config, shipment, &nfe, option, schedule).await,
        Command::Config => {
            println!("{}", config.to_redacted_ron()?);
            Ok(())
        }
    }
}
