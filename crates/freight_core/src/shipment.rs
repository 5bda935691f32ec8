use serde::Serialize;
use thiserror::Error;

/// One input record as read from a table: ordered `(column, cell)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (column, value) in pairs {
            record.push(column, value);
        }
        record
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.push((column.into(), value.into()));
    }

    /// Trimmed cell for `column`; blank cells read as absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(column))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field {0} is required")]
    MissingField(&'static str),
    #[error("at least one package is required")]
    NoPackage,
}

/// Fallbacks for columns the interactive form never asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentDefaults {
    pub contract_segment_id: String,
    pub origin_state: String,
    pub origin_city: String,
}

impl Default for ShipmentDefaults {
    fn default() -> Self {
        Self {
            contract_segment_id: "1".to_string(),
            origin_state: "SC".to_string(),
            origin_city: "Lages".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Package {
    pub description: String,
    pub quantity: u32,
    pub weight: f64,
    pub height: f64,
    pub width: f64,
    pub depth: f64,
    pub unit_value: f64,
}

impl Package {
    /// Declared value of the whole line: unit value times quantity (at least one unit).
    pub fn total_value(&self) -> f64 {
        self.unit_value * f64::from(self.quantity.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentRow {
    pub contract_segment_id: String,
    pub origin_tax_id: String,
    pub origin_postal_code: String,
    pub origin_state: String,
    pub origin_city: String,
    pub destination_tax_id: String,
    pub destination_postal_code: String,
    pub destination_state: String,
    pub destination_city: String,
    pub packages: Vec<Package>,
    pub note: String,
}

const REQUIRED: [&str; 4] = ["cnpj_origem", "cep_origem", "cnpj_destino", "cep_destino"];

impl ShipmentRow {
    /// Checks the fields the upstream service cannot quote without.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let values = [
            &self.origin_tax_id,
            &self.origin_postal_code,
            &self.destination_tax_id,
            &self.destination_postal_code,
        ];
        for (name, value) in REQUIRED.into_iter().zip(values) {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }
        if self.packages.is_empty() {
            return Err(ValidationError::NoPackage);
        }
        Ok(())
    }

    /// Builds a shipment from a template-shaped record.
    ///
    /// Package columns without suffix describe the first package; `quantidade_2`,
    /// `peso_2`, ... add more packages for as long as the quantity column is filled.
    pub fn from_record(
        record: &Record,
        defaults: &ShipmentDefaults,
    ) -> Result<Self, ValidationError> {
        for name in REQUIRED {
            if record.get(name).is_none() {
                return Err(ValidationError::MissingField(name));
            }
        }
        if record.get("quantidade").is_none() {
            return Err(ValidationError::NoPackage);
        }

        let mut packages = vec![package_from_record(record, "")];
        for index in 2.. {
            let suffix = format!("_{index}");
            if record.get(&format!("quantidade{suffix}")).is_none() {
                break;
            }
            packages.push(package_from_record(record, &suffix));
        }

        let text = |name: &str| record.get(name).unwrap_or_default().to_string();
        let or_default = |name: &str, fallback: &str| {
            record.get(name).unwrap_or(fallback).to_string()
        };

        let row = Self {
            contract_segment_id: or_default(
                "id_contrato_transportadora_segmento",
                &defaults.contract_segment_id,
            ),
            origin_tax_id: text("cnpj_origem"),
            origin_postal_code: text("cep_origem"),
            origin_state: or_default("estado_origem", &defaults.origin_state),
            origin_city: or_default("cidade_origem", &defaults.origin_city),
            destination_tax_id: text("cnpj_destino"),
            destination_postal_code: text("cep_destino"),
            destination_state: text("estado_destino"),
            destination_city: text("cidade_destino"),
            packages,
            note: text("observacao"),
        };
        row.validate()?;
        Ok(row)
    }
}

fn package_from_record(record: &Record, suffix: &str) -> Package {
    let cell = |name: &str| record.get(&format!("{name}{suffix}"));
    let number = |name: &str| cell(name).and_then(parse_decimal).unwrap_or(0.0);
    let unit_value = cell("valor")
        .or_else(|| cell("valor_unitario"))
        .and_then(parse_decimal)
        .unwrap_or(0.0);

    Package {
        description: cell("descricao").unwrap_or("Carga").to_string(),
        quantity: cell("quantidade").and_then(parse_quantity).unwrap_or(0),
        weight: number("peso"),
        height: number("altura"),
        width: number("largura"),
        depth: cell("profundidade")
            .or_else(|| cell("comprimento"))
            .and_then(parse_decimal)
            .unwrap_or(0.0),
        unit_value,
    }
}

/// Strips everything but ASCII digits (tax IDs arrive with dots, slashes and dashes).
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Parses a decimal that may use a comma as separator. Non-finite values are rejected.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a non-negative whole quantity; `"2.0"` is accepted, `"2.5"` is not.
pub fn parse_quantity(raw: &str) -> Option<u32> {
    if let Ok(value) = raw.trim().parse::<u32>() {
        return Some(value);
    }
    parse_decimal(raw)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v as u32)
}

/// Canonical decimal text sent upstream for numeric package fields.
pub fn format_decimal(value: f64) -> String {
    if value == 0.0 {
        // Avoids "-0".
        return "0".to_string();
    }
    value.to_string()
}
