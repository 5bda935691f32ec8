use clap::Args;

use freight_core::{parse_decimal, parse_quantity, Package, ShipmentDefaults, ShipmentRow};

/// Shipment particulars shared by `quote` and `pickup`.
#[derive(Debug, Clone, Args)]
pub struct ShipmentArgs {
    #[arg(long)]
    pub origin_tax_id: String,
    #[arg(long)]
    pub origin_postal_code: String,
    /// Defaults to the configured origin state.
    #[arg(long)]
    pub origin_state: Option<String>,
    /// Defaults to the configured origin city.
    #[arg(long)]
    pub origin_city: Option<String>,
    #[arg(long)]
    pub destination_tax_id: String,
    #[arg(long)]
    pub destination_postal_code: String,
    #[arg(long, default_value = "")]
    pub destination_state: String,
    #[arg(long, default_value = "")]
    pub destination_city: String,
    /// `QTY:WEIGHT:HEIGHT:WIDTH:DEPTH:UNIT_VALUE[:DESCRIPTION]`; repeat for more packages.
    #[arg(long = "package", required = true, value_parser = parse_package)]
    pub packages: Vec<Package>,
    #[arg(long, default_value = "")]
    pub note: String,
}

impl ShipmentArgs {
    pub fn into_shipment(self, defaults: &ShipmentDefaults) -> ShipmentRow {
        ShipmentRow {
            contract_segment_id: defaults.contract_segment_id.clone(),
            origin_tax_id: self.origin_tax_id,
            origin_postal_code: self.origin_postal_code,
            origin_state: self
                .origin_state
                .unwrap_or_else(|| defaults.origin_state.clone()),
            origin_city: self
                .origin_city
                .unwrap_or_else(|| defaults.origin_city.clone()),
            destination_tax_id: self.destination_tax_id,
            destination_postal_code: self.destination_postal_code,
            destination_state: self.destination_state,
            destination_city: self.destination_city,
            packages: self.packages,
            note: self.note,
        }
    }
}

/// Parses one `--package` value. Numbers may use a decimal comma.
pub fn parse_package(raw: &str) -> Result<Package, String> {
    let parts: Vec<&str> = raw.splitn(7, ':').collect();
    if parts.len() < 6 {
        return Err(format!(
            "expected QTY:WEIGHT:HEIGHT:WIDTH:DEPTH:UNIT_VALUE, got {raw:?}"
        ));
    }
    let number = |index: usize, name: &str| {
        parse_decimal(parts[index])
            .filter(|v| *v >= 0.0)
            .ok_or_else(|| format!("invalid {name} {:?}", parts[index]))
    };
    let quantity = parse_quantity(parts[0]).ok_or_else(|| format!("invalid quantity {:?}", parts[0]))?;
    let description = parts
        .get(6)
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .unwrap_or("Carga");

    Ok(Package {
        description: description.to_string(),
        quantity,
        weight: number(1, "weight")?,
        height: number(2, "height")?,
        width: number(3, "width")?,
        depth: number(4, "depth")?,
        unit_value: number(5, "unit value")?,
    })
}
