use freight_core::{sorted_by_price, DeliverySummary, QuoteOption, QuoteOutcome, ShipmentRow, ValidationError};
use freight_logging::freight_warn;

use crate::throttle::Throttle;
use crate::Quoter;

/// Result of a single on-demand quote, ready to show to a user.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveQuote {
    pub outcome: QuoteOutcome,
    /// Options by ascending price; empty unless the quote succeeded.
    pub sorted: Vec<QuoteOption>,
    pub summary: DeliverySummary,
}

impl InteractiveQuote {
    pub fn cheapest(&self) -> Option<&QuoteOption> {
        self.outcome.cheapest()
    }
}

/// Quotes one shipment outside any batch job.
///
/// Validation happens before anything is sent upstream.
pub async fn quote_shipment(
    quoter: &dyn Quoter,
    throttle: &Throttle,
    shipment: &ShipmentRow,
) -> Result<InteractiveQuote, ValidationError> {
    quote_at(quoter, throttle, 0, shipment).await
}

async fn quote_at(
    quoter: &dyn Quoter,
    throttle: &Throttle,
    row: usize,
    shipment: &ShipmentRow,
) -> Result<InteractiveQuote, ValidationError> {
    shipment.validate()?;
    let outcome = quoter.quote(row, shipment, throttle).await;
    Ok(InteractiveQuote {
        sorted: sorted_by_price(outcome.options()),
        summary: DeliverySummary::for_shipment(shipment),
        outcome,
    })
}

/// One shipment of a multi-item quote.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteItem {
    /// Caller's label for the item; `linha-N` (1-based position) when absent.
    pub reference: Option<String>,
    pub shipment: ShipmentRow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemQuote {
    pub reference: String,
    pub result: Result<InteractiveQuote, ValidationError>,
}

impl ItemQuote {
    /// True when the item was valid and upstream returned at least one offer.
    pub fn is_ok(&self) -> bool {
        matches!(&self.result, Ok(quote) if quote.outcome.is_success())
    }

    pub fn error(&self) -> Option<String> {
        match &self.result {
            Err(err) => Some(err.to_string()),
            Ok(quote) if !quote.outcome.is_success() => quote.outcome.message().map(str::to_string),
            Ok(_) => None,
        }
    }
}

/// Quotes several shipments one after another, sharing `throttle`.
///
/// Every item gets an entry in input order; an invalid or failed item never
/// stops the ones after it.
pub async fn quote_many(quoter: &dyn Quoter, throttle: &Throttle, items: &[QuoteItem]) -> Vec<ItemQuote> {
    let mut results = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let reference = item
            .reference
            .clone()
            .unwrap_or_else(|| format!("linha-{}", index + 1));
        let result = quote_at(quoter, throttle, index, &item.shipment).await;
        if let Err(err) = &result {
            freight_warn!("Item {}: {}", reference, err);
        }
        results.push(ItemQuote { reference, result });
    }
    results
}
