use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};

use freight_app::{AppConfig, ShipmentArgs};
use freight_core::{
    JobPhase, NfeData, OutputShape, Party, PickupBook, PickupStatus, QuoteOption, ShipmentRow,
};
use freight_engine::{
    extract_nfe, quote_many, quote_shipment, read_table, template_workbook, AtomicFileWriter,
    BatchOrchestrator, InteractiveQuote, JobRequest, QuoteItem, ReqwestQuoter, Throttle,
    TEMPLATE_FILENAME,
};
use freight_logging::{freight_info, freight_warn};

async fn run_quote(config: &AppConfig, shipment: ShipmentArgs) -> Result<InteractiveQuote> {
    let shipment = shipment.into_shipment(&config.shipment_defaults());
    let quoter = ReqwestQuoter::new(config.quote_settings());
    let throttle = Throttle::default();
    let quote = quote_shipment(&quoter, &throttle, &shipment)
        .await
        .context("shipment rejected")?;
    Ok(quote)
}

pub(crate) async fn quote(config: &AppConfig, shipment: ShipmentArgs) -> Result<()> {
    let quote = run_quote(config, shipment).await?;
    if let Some(message) = quote.outcome.message() {
        println!("{}: {}", quote.outcome.status_label(), message);
    }
    for (index, option) in quote.sorted.iter().enumerate() {
        print_option(index + 1, option);
    }
    let summary = &quote.summary;
    println!(
        "cargo value {:.2} | weight {} kg | {} volumes",
        summary.total_value, summary.total_weight, summary.total_quantity
    );
    Ok(())
}

fn print_option(position: usize, option: &QuoteOption) {
    println!(
        "{position:>3}. {:<24} {:>12.2}  {:<10} {}",
        option.carrier, option.total, option.lead_time, option.service
    );
    if !option.note.is_empty() {
        println!("     {}", option.note);
    }
}

/// Quotes every row of a small table in the foreground, one line per item.
pub(crate) async fn quote_items(config: &AppConfig, input: &Path) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("cannot read {}", input.display()))?;
    let source_name = input.to_string_lossy();
    let table = read_table(&source_name, &bytes)
        .with_context(|| format!("cannot read table {}", input.display()))?;
    if table.is_empty() {
        bail!("{} has no rows to quote", input.display());
    }

    let defaults = config.shipment_defaults();
    let mut items = Vec::with_capacity(table.len());
    for (index, record) in table.records().iter().enumerate() {
        let reference = record
            .get("ref")
            .map_or_else(|| format!("linha-{}", index + 1), str::to_string);
        match ShipmentRow::from_record(record, &defaults) {
            Ok(shipment) => items.push(QuoteItem {
                reference: Some(reference),
                shipment,
            }),
            Err(err) => println!("{reference}: erro ({err})"),
        }
    }

    let quoter = ReqwestQuoter::new(config.quote_settings());
    let settings = config.batch_settings();
    let throttle = Throttle::new(settings.max_calls, settings.window);
    for item in quote_many(&quoter, &throttle, &items).await {
        let cheapest = item.result.as_ref().ok().and_then(|quote| {
            quote.cheapest().map(|option| (quote.sorted.len(), option))
        });
        match (item.error(), cheapest) {
            (None, Some((offers, option))) => println!(
                "{}: ok, {} offers, cheapest {} {:.2}",
                item.reference, offers, option.carrier, option.total
            ),
            (error, _) => println!("{}: erro ({})", item.reference, error.unwrap_or_default()),
        }
    }
    Ok(())
}

pub(crate) async fn batch(config: &AppConfig, input: &Path, shape: OutputShape) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("cannot read {}", input.display()))?;
    let source_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("input path has no usable file name"))?
        .to_string();

    let quoter = Arc::new(ReqwestQuoter::new(config.quote_settings()));
    let orchestrator = BatchOrchestrator::new(quoter, config.batch_settings());
    orchestrator
        .start_job(JobRequest {
            source_name,
            bytes,
            shape,
        })
        .await?;

    let mut ticker = tokio::time::interval(config.poll_interval());
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    let mut last_completed = None;
    loop {
        tokio::select! {
            _ = &mut interrupt => {
                freight_warn!("Interrupted; cancelling batch job");
                orchestrator.shutdown().await;
                break;
            }
            _ = ticker.tick() => {
                let progress = orchestrator.progress();
                if last_completed != Some(progress.completed) {
                    println!("{}/{} rows ({}%)", progress.completed, progress.total, progress.percent);
                    last_completed = Some(progress.completed);
                }
                if !progress.running {
                    break;
                }
            }
        }
    }
    orchestrator.join().await;

    let progress = orchestrator.progress();
    match progress.phase {
        JobPhase::Completed => {
            let artifact = orchestrator.result_artifact()?;
            let path = AtomicFileWriter::new(&config.output_dir)
                .write_artifact(&artifact)
                .context("cannot save result spreadsheet")?;
            freight_info!("Result saved to {}", path.display());
            println!("saved {}", path.display());
            Ok(())
        }
        JobPhase::Cancelled => bail!(
            "batch cancelled after {} of {} rows",
            progress.completed,
            progress.total
        ),
        _ => bail!(
            "batch failed: {}",
            progress.error.unwrap_or_else(|| "unknown error".to_string())
        ),
    }
}

pub(crate) fn template(dir: &Path) -> Result<()> {
    let bytes = template_workbook()?;
    let path = AtomicFileWriter::new(dir)
        .write(TEMPLATE_FILENAME, &bytes)
        .context("cannot save template")?;
    println!("saved {}", path.display());
    Ok(())
}

fn read_nfe(path: &Path) -> Result<NfeData> {
    let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let nfe = extract_nfe(&bytes);
    if nfe.is_empty() {
        freight_warn!("No NF-e fields found in {}", path.display());
    }
    Ok(nfe)
}

pub(crate) fn nfe(path: &Path) -> Result<()> {
    print_nfe(&read_nfe(path)?);
    Ok(())
}

fn print_nfe(nfe: &NfeData) {
    println!("NF-e {} serie {} issued {}", nfe.number, nfe.series, nfe.issued_at);
    println!("total {}", nfe.total_value);
    print_party("from", &nfe.origin);
    print_party("to", &nfe.destination);
}

fn print_party(label: &str, party: &Party) {
    println!(
        "{label:<5} {} ({}) {} {}-{}",
        party.name, party.tax_id, party.postal_code, party.city, party.state
    );
}

pub(crate) async fn pickup(
    config: &AppConfig,
    shipment: ShipmentArgs,
    nfe_path: &Path,
    position: Option<usize>,
    schedule: bool,
) -> Result<()> {
    let invoice = read_nfe(nfe_path)?;
    let defaults = config.shipment_defaults();
    let shipment_row = shipment.clone().into_shipment(&defaults);
    let quote = run_quote(config, shipment).await?;

    let option = match position {
        Some(position) => position
            .checked_sub(1)
            .and_then(|index| quote.sorted.get(index))
            .ok_or_else(|| anyhow!("option {position} not in 1..={}", quote.sorted.len()))?,
        None => quote
            .cheapest()
            .ok_or_else(|| anyhow!("no offer to select: {}", quote.outcome.message().unwrap_or_default()))?,
    };

    let mut book = PickupBook::new();
    let selection = book.select(shipment_row, option.clone());
    let id = book.register_pickup(selection, invoice)?;
    if schedule {
        book.advance(id, PickupStatus::Scheduled)?;
    }

    let request = book
        .pickup(id)
        .ok_or_else(|| anyhow!("pickup {id} vanished"))?;
    freight_info!("Pickup {} registered with {}", request.id, request.carrier);
    println!(
        "pickup #{} [{}] carrier {} freight {:.2}",
        request.id, request.status, request.carrier, request.freight_total
    );
    print_nfe(&request.invoice);
    Ok(())
}
