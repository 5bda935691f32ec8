use serde::{Deserialize, Serialize};

use crate::ShipmentRow;

pub const DEFAULT_CARRIER: &str = "N/D";
pub const DEFAULT_LEAD_TIME: &str = "N/A";
pub const DEFAULT_SERVICE: &str = "Padrão";

/// One carrier offer, fully populated. Serializes with the upstream field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteOption {
    #[serde(rename = "transportadora")]
    pub carrier: String,
    #[serde(rename = "integrador")]
    pub integrator: String,
    pub total: f64,
    #[serde(rename = "prazo")]
    pub lead_time: String,
    #[serde(rename = "servico")]
    pub service: String,
    #[serde(rename = "imagem")]
    pub image_url: String,
    #[serde(rename = "observacao")]
    pub note: String,
}

impl Default for QuoteOption {
    fn default() -> Self {
        Self {
            carrier: DEFAULT_CARRIER.to_string(),
            integrator: String::new(),
            total: 0.0,
            lead_time: DEFAULT_LEAD_TIME.to_string(),
            service: DEFAULT_SERVICE.to_string(),
            image_url: String::new(),
            note: String::new(),
        }
    }
}

/// Outcome of quoting one shipment row.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    /// `cheapest` indexes into `options`.
    Success {
        options: Vec<QuoteOption>,
        cheapest: usize,
    },
    NoResult {
        message: String,
    },
    Error {
        message: String,
    },
}

impl QuoteOutcome {
    /// Success with the cheapest option selected, or no-result for an empty list.
    pub fn from_options(options: Vec<QuoteOption>) -> Self {
        match cheapest_index(&options) {
            Some(cheapest) => Self::Success { options, cheapest },
            None => Self::NoResult {
                message: "no quote with a valid total".to_string(),
            },
        }
    }

    pub fn no_result(message: impl Into<String>) -> Self {
        Self::NoResult {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn cheapest(&self) -> Option<&QuoteOption> {
        match self {
            Self::Success { options, cheapest } => options.get(*cheapest),
            _ => None,
        }
    }

    pub fn options(&self) -> &[QuoteOption] {
        match self {
            Self::Success { options, .. } => options,
            _ => &[],
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::NoResult { message } | Self::Error { message } => Some(message),
        }
    }

    /// Status label written to result tables.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "sucesso",
            Self::NoResult { .. } => "sem_resultado",
            Self::Error { .. } => "erro",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Index of the lowest `total`; the first one wins on ties.
pub fn cheapest_index(options: &[QuoteOption]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, option) in options.iter().enumerate() {
        match best {
            Some(current) if options[current].total <= option.total => {}
            _ => best = Some(index),
        }
    }
    best
}

/// Options ordered by ascending price, keeping upstream order between equal prices.
pub fn sorted_by_price(options: &[QuoteOption]) -> Vec<QuoteOption> {
    let mut sorted = options.to_vec();
    sorted.sort_by(|a, b| a.total.total_cmp(&b.total));
    sorted
}

/// Totals shown next to an interactive quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliverySummary {
    pub total_value: f64,
    pub total_weight: f64,
    pub total_quantity: u64,
}

impl DeliverySummary {
    pub fn for_shipment(shipment: &ShipmentRow) -> Self {
        let packages = &shipment.packages;
        Self {
            total_value: packages.iter().map(|p| p.total_value()).sum(),
            total_weight: packages.iter().map(|p| p.weight).sum(),
            total_quantity: packages.iter().map(|p| u64::from(p.quantity)).sum(),
        }
    }
}
