use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{QuoteOption, QuoteOutcome, Record};

/// Column names added to result tables.
pub mod columns {
    pub const STATUS: &str = "status";
    pub const MESSAGE: &str = "mensagem";

    pub const CHEAPEST_CARRIER: &str = "transportadora_mais_barata";
    pub const CHEAPEST_INTEGRATOR: &str = "integrador_mais_barato";
    pub const CHEAPEST_TOTAL: &str = "valor_frete_mais_barato";
    pub const CHEAPEST_LEAD_TIME: &str = "prazo_mais_barato";
    pub const CHEAPEST_SERVICE: &str = "servico_mais_barato";
    pub const CHEAPEST_IMAGE: &str = "imagem_mais_barata";
    pub const CHEAPEST_NOTE: &str = "observacao_mais_barata";

    pub const CARRIER: &str = "transportadora";
    pub const INTEGRATOR: &str = "integrador";
    pub const TOTAL: &str = "valor_frete";
    pub const LEAD_TIME: &str = "prazo";
    pub const SERVICE: &str = "servico";
    pub const IMAGE: &str = "imagem";
    pub const NOTE: &str = "observacao";
    pub const BEST_OPTION: &str = "melhor_opcao";

    pub const YES: &str = "Sim";
    pub const NO: &str = "Não";
}

/// Which rows a batch job produces per input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputShape {
    /// One row per input row carrying the cheapest option.
    CheapestOnly,
    /// One row per option, flagging the cheapest.
    #[default]
    AllOptions,
}

impl FromStr for OutputShape {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cheapest" | "mais_barata" => Ok(Self::CheapestOnly),
            "all" | "todas_opcoes" => Ok(Self::AllOptions),
            other => Err(format!("unknown output shape {other:?}")),
        }
    }
}

impl fmt::Display for OutputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheapestOnly => write!(f, "cheapest"),
            Self::AllOptions => write!(f, "all"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

/// One result-table row. Setting an existing column overwrites it in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputRow {
    cells: Vec<(String, Cell)>,
}

impl OutputRow {
    pub fn from_record(record: &Record) -> Self {
        let mut row = Self::default();
        for (column, value) in record.fields() {
            row.set(column.clone(), Cell::Text(value.clone()));
        }
        row
    }

    pub fn set(&mut self, column: impl Into<String>, cell: Cell) {
        let column = column.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = cell,
            None => self.cells.push((column, cell)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn cells(&self) -> &[(String, Cell)] {
        &self.cells
    }
}

/// Row recording a failure (`status` + `mensagem`) on top of the input fields.
pub fn error_row(record: &Record, status: &str, message: &str) -> OutputRow {
    let mut row = OutputRow::from_record(record);
    row.set(columns::STATUS, Cell::text(status));
    row.set(columns::MESSAGE, Cell::text(message));
    row
}

/// Turns one quoted input row into its result rows.
///
/// Cheapest-only yields exactly one row. All-options yields one row per option,
/// or a single failure row when the outcome carries no options.
pub fn assemble_rows(record: &Record, outcome: &QuoteOutcome, shape: OutputShape) -> Vec<OutputRow> {
    let QuoteOutcome::Success { options, cheapest } = outcome else {
        let message = outcome.message().unwrap_or_default();
        return vec![error_row(record, outcome.status_label(), message)];
    };

    match shape {
        OutputShape::CheapestOnly => {
            let mut row = OutputRow::from_record(record);
            let best = options.get(*cheapest).cloned().unwrap_or_default();
            row.set(columns::CHEAPEST_CARRIER, Cell::Text(best.carrier));
            row.set(columns::CHEAPEST_INTEGRATOR, Cell::Text(best.integrator));
            row.set(columns::CHEAPEST_TOTAL, Cell::Number(best.total));
            row.set(columns::CHEAPEST_LEAD_TIME, Cell::Text(best.lead_time));
            row.set(columns::CHEAPEST_SERVICE, Cell::Text(best.service));
            row.set(columns::CHEAPEST_IMAGE, Cell::Text(best.image_url));
            row.set(columns::CHEAPEST_NOTE, Cell::Text(best.note));
            vec![row]
        }
        OutputShape::AllOptions => options
            .iter()
            .enumerate()
            .map(|(index, option)| option_row(record, option, index == *cheapest))
            .collect(),
    }
}

fn option_row(record: &Record, option: &QuoteOption, is_best: bool) -> OutputRow {
    let mut row = OutputRow::from_record(record);
    row.set(columns::CARRIER, Cell::text(&option.carrier));
    row.set(columns::INTEGRATOR, Cell::text(&option.integrator));
    row.set(columns::TOTAL, Cell::Number(option.total));
    row.set(columns::LEAD_TIME, Cell::text(&option.lead_time));
    row.set(columns::SERVICE, Cell::text(&option.service));
    row.set(columns::IMAGE, Cell::text(&option.image_url));
    row.set(columns::NOTE, Cell::text(&option.note));
    let flag = if is_best { columns::YES } else { columns::NO };
    row.set(columns::BEST_OPTION, Cell::text(flag));
    row
}
