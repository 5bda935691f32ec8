use serde_json::Value;

use freight_core::{parse_decimal, QuoteOption, QuoteOutcome, DEFAULT_CARRIER, DEFAULT_LEAD_TIME, DEFAULT_SERVICE};
use freight_logging::freight_warn;

const NO_QUOTE_MESSAGE: &str = "no quote available";
const NO_VALID_TOTAL: &str = "no quote with a valid total";
const INVALID_RESPONSE: &str = "invalid response from quoting service";

/// Total coercion of one upstream entry into a `QuoteOption`.
///
/// Missing, null or oddly-typed fields fall back to their defaults. A total that
/// is not a finite non-negative number becomes 0.0; callers that must discard
/// such entries check `parse_total` first.
pub fn normalize_option(entry: &Value) -> QuoteOption {
    let Some(object) = entry.as_object() else {
        return QuoteOption {
            note: "invalid entry: not an object".to_string(),
            ..QuoteOption::default()
        };
    };
    let text = |key: &str, fallback: &str| {
        object
            .get(key)
            .and_then(scalar_text)
            .unwrap_or_else(|| fallback.to_string())
    };

    QuoteOption {
        carrier: text("transportadora", DEFAULT_CARRIER),
        integrator: text("integrador", ""),
        total: object
            .get("total")
            .and_then(parse_total)
            .filter(|total| *total >= 0.0)
            .unwrap_or(0.0),
        lead_time: text("prazo", DEFAULT_LEAD_TIME),
        service: text("servico", DEFAULT_SERVICE),
        image_url: text("imagem", ""),
        note: text("observacao", ""),
    }
}

/// Price as a finite number, from a JSON number or a decimal string.
pub fn parse_total(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => parse_decimal(text),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn is_truthy(flag: &Value) -> bool {
    match flag {
        Value::Bool(flag) => *flag,
        Value::String(text) => {
            let text = text.trim();
            text.eq_ignore_ascii_case("true") || text == "1"
        }
        Value::Number(number) => number.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    }
}

/// Interprets a parsed upstream body for input row `row`.
pub fn interpret_response(row: usize, body: &Value) -> QuoteOutcome {
    let Some(object) = body.as_object() else {
        freight_warn!("row {}: upstream body is not an object", row);
        return QuoteOutcome::no_result(INVALID_RESPONSE);
    };

    let message = object
        .get("mensagem")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(NO_QUOTE_MESSAGE);

    if object.get("erro").is_some_and(is_truthy) {
        return QuoteOutcome::no_result(message);
    }
    let entries = match object.get("resultado").and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => entries,
        _ => return QuoteOutcome::no_result(message),
    };

    let mut options = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            freight_warn!("row {}: skipping malformed quote entry {}: {}", row, index, entry);
            continue;
        }
        let valid_total = entry
            .get("total")
            .and_then(parse_total)
            .is_some_and(|total| total >= 0.0);
        if !valid_total {
            freight_warn!("row {}: discarding quote entry {} without a valid total", row, index);
            continue;
        }
        options.push(normalize_option(entry));
    }

    if options.is_empty() {
        return QuoteOutcome::no_result(NO_VALID_TOTAL);
    }
    QuoteOutcome::from_options(options)
}
