use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;

use freight_core::{digits_only, format_decimal, QuoteOutcome, ShipmentRow};
use freight_logging::{freight_debug, freight_warn};

use crate::normalize::interpret_response;
use crate::throttle::Throttle;
use crate::{FailureKind, QuoteFailure};

#[derive(Debug, Clone)]
pub struct QuoteSettings {
    pub endpoint: String,
    /// Sent verbatim in the `Authorization` header.
    pub credential: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            credential: String::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Quotes one shipment. Implementations never fail: every problem becomes a
/// `QuoteOutcome::Error` or `QuoteOutcome::NoResult`.
#[async_trait::async_trait]
pub trait Quoter: Send + Sync {
    async fn quote(&self, row: usize, shipment: &ShipmentRow, throttle: &Throttle) -> QuoteOutcome;
}

#[derive(Debug, Serialize)]
struct QuoteRequest<'a> {
    #[serde(rename = "id_contrato_transportadora_segmento")]
    contract_segment_id: &'a str,
    #[serde(rename = "cnpj_origem")]
    origin_tax_id: String,
    #[serde(rename = "cep_origem")]
    origin_postal_code: &'a str,
    #[serde(rename = "estado_origem")]
    origin_state: &'a str,
    #[serde(rename = "cidade_origem")]
    origin_city: &'a str,
    #[serde(rename = "cnpj_destino")]
    destination_tax_id: String,
    #[serde(rename = "cep_destino")]
    destination_postal_code: &'a str,
    #[serde(rename = "estado_destino")]
    destination_state: &'a str,
    #[serde(rename = "cidade_destino")]
    destination_city: &'a str,
    #[serde(rename = "produtos")]
    packages: Vec<PackageRequest<'a>>,
}

#[derive(Debug, Serialize)]
struct PackageRequest<'a> {
    #[serde(rename = "descricao")]
    description: &'a str,
    #[serde(rename = "quantidade")]
    quantity: String,
    #[serde(rename = "peso")]
    weight: String,
    #[serde(rename = "altura")]
    height: String,
    #[serde(rename = "largura")]
    width: String,
    #[serde(rename = "profundidade")]
    depth: String,
    #[serde(rename = "valor")]
    value: String,
}

/// JSON body sent upstream for a shipment: digits-only tax IDs, numbers as decimal strings.
pub fn request_body(shipment: &ShipmentRow) -> serde_json::Value {
    let request = QuoteRequest {
        contract_segment_id: &shipment.contract_segment_id,
        origin_tax_id: digits_only(&shipment.origin_tax_id),
        origin_postal_code: &shipment.origin_postal_code,
        origin_state: &shipment.origin_state,
        origin_city: &shipment.origin_city,
        destination_tax_id: digits_only(&shipment.destination_tax_id),
        destination_postal_code: &shipment.destination_postal_code,
        destination_state: &shipment.destination_state,
        destination_city: &shipment.destination_city,
        packages: shipment
            .packages
            .iter()
            .map(|p| PackageRequest {
                description: &p.description,
                quantity: p.quantity.to_string(),
                weight: format_decimal(p.weight),
                height: format_decimal(p.height),
                width: format_decimal(p.width),
                depth: format_decimal(p.depth),
                value: format_decimal(p.total_value()),
            })
            .collect(),
    };
    // Plain strings and vectors only; serialization cannot fail.
    serde_json::to_value(request).unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct ReqwestQuoter {
    settings: QuoteSettings,
}

impl ReqwestQuoter {
    pub fn new(settings: QuoteSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, QuoteFailure> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| QuoteFailure::new(FailureKind::Network, err.to_string()))
    }

    async fn post(&self, body: Vec<u8>) -> Result<Vec<u8>, QuoteFailure> {
        if self.settings.endpoint.trim().is_empty() || self.settings.credential.trim().is_empty() {
            return Err(QuoteFailure::new(
                FailureKind::NotConfigured,
                "endpoint or credential missing",
            ));
        }
        let url = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| QuoteFailure::new(FailureKind::NotConfigured, err.to_string()))?;
        let client = self.build_client()?;

        let response = client
            .post(url)
            .header(AUTHORIZATION, self.settings.credential.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteFailure::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl Quoter for ReqwestQuoter {
    async fn quote(&self, row: usize, shipment: &ShipmentRow, throttle: &Throttle) -> QuoteOutcome {
        let body = request_body(shipment);
        throttle.acquire().await;

        freight_debug!("row {}: POST {} payload={}", row, self.settings.endpoint, body);
        let bytes = match self.post(body.to_string().into_bytes()).await {
            Ok(bytes) => bytes,
            Err(err) => {
                freight_warn!("row {}: upstream call failed ({}): {}", row, err.kind, err.message);
                return QuoteOutcome::error(err.message);
            }
        };

        let value: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(err) => {
                freight_warn!("row {}: upstream body is not JSON: {}", row, err);
                return QuoteOutcome::error(format!("{}: not JSON", FailureKind::InvalidBody));
            }
        };
        freight_debug!("row {}: response={}", row, value);
        interpret_response(row, &value)
    }
}

fn too_large(max_bytes: u64, actual: u64) -> QuoteFailure {
    QuoteFailure::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> QuoteFailure {
    if err.is_timeout() {
        return QuoteFailure::new(FailureKind::Timeout, format!("timeout: {err}"));
    }
    QuoteFailure::new(FailureKind::Network, err.to_string())
}
