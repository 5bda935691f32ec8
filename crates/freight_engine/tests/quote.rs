use std::time::Duration;

use freight_core::{QuoteOutcome, Record, ShipmentDefaults, ShipmentRow};
use freight_engine::{request_body, QuoteSettings, Quoter, ReqwestQuoter, Throttle};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn shipment() -> ShipmentRow {
    let record = Record::from_pairs([
        ("cnpj_origem", "48.566.347/0001-22"),
        ("cep_origem", "88504-357"),
        ("cnpj_destino", "11.417.744/0001-22"),
        ("cep_destino", "89660-000"),
        ("estado_destino", "SC"),
        ("cidade_destino", "Lacerdopolis"),
        ("quantidade", "2"),
        ("peso", "20,5"),
        ("altura", "0.3"),
        ("largura", "0.4"),
        ("profundidade", "0.5"),
        ("valor", "500"),
    ]);
    ShipmentRow::from_record(&record, &ShipmentDefaults::default()).unwrap()
}

fn settings(server: &MockServer) -> QuoteSettings {
    QuoteSettings {
        endpoint: format!("{}/cotacao", server.uri()),
        credential: "token-abc".to_string(),
        ..QuoteSettings::default()
    }
}

async fn quote_with(settings: QuoteSettings) -> QuoteOutcome {
    let quoter = ReqwestQuoter::new(settings);
    quoter.quote(0, &shipment(), &Throttle::default()).await
}

#[test]
fn request_body_normalizes_tax_ids_and_numbers() {
    let body = request_body(&shipment());
    assert_eq!(body["cnpj_origem"], "48566347000122");
    assert_eq!(body["cnpj_destino"], "11417744000122");
    assert_eq!(body["estado_origem"], "SC");
    assert_eq!(body["cidade_origem"], "Lages");
    assert_eq!(body["id_contrato_transportadora_segmento"], "1");
    assert_eq!(
        body["produtos"],
        json!([{
            "descricao": "Carga",
            "quantidade": "2",
            "peso": "20.5",
            "altura": "0.3",
            "largura": "0.4",
            "profundidade": "0.5",
            "valor": "1000",
        }])
    );
}

#[tokio::test]
async fn success_selects_cheapest_and_drops_unpriced_entries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cotacao"))
        .and(header("authorization", "token-abc"))
        .and(body_partial_json(json!({
            "cnpj_origem": "48566347000122",
            "cep_destino": "89660-000",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "erro": false,
            "resultado": [
                {"transportadora": "Beta", "total": "120,50"},
                {"transportadora": "Alfa", "total": 99.9, "prazo": 3},
                {"transportadora": "Gama"},
                "garbage",
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = quote_with(settings(&server)).await;

    assert!(outcome.is_success());
    let carriers: Vec<_> = outcome.options().iter().map(|o| o.carrier.as_str()).collect();
    assert_eq!(carriers, vec!["Beta", "Alfa"]);
    let cheapest = outcome.cheapest().unwrap();
    assert_eq!(cheapest.carrier, "Alfa");
    assert_eq!(cheapest.lead_time, "3");
    assert_eq!(cheapest.service, "Padrão");
    assert_eq!(outcome.options()[0].total, 120.5);
}

#[tokio::test]
async fn error_flag_is_no_result_with_upstream_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "erro": true,
            "mensagem": "CEP de destino não atendido",
        })))
        .mount(&server)
        .await;

    let outcome = quote_with(settings(&server)).await;
    assert_eq!(outcome, QuoteOutcome::no_result("CEP de destino não atendido"));
}

#[tokio::test]
async fn empty_results_use_default_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"erro": false, "resultado": []})))
        .mount(&server)
        .await;

    let outcome = quote_with(settings(&server)).await;
    assert_eq!(outcome, QuoteOutcome::no_result("no quote available"));
}

#[tokio::test]
async fn non_json_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>oops</html>", "text/html"))
        .mount(&server)
        .await;

    let outcome = quote_with(settings(&server)).await;
    assert_eq!(outcome, QuoteOutcome::error("invalid response body: not JSON"));
}

#[tokio::test]
async fn http_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let outcome = quote_with(settings(&server)).await;
    assert_eq!(outcome, QuoteOutcome::error("500 Internal Server Error"));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"erro": false, "resultado": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let outcome = quote_with(QuoteSettings {
        request_timeout: Duration::from_millis(200),
        ..settings(&server)
    })
    .await;

    assert_eq!(outcome.status_label(), "erro");
    assert!(outcome.message().unwrap().starts_with("timeout"));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
        .mount(&server)
        .await;

    let outcome = quote_with(QuoteSettings {
        max_response_bytes: 16,
        ..settings(&server)
    })
    .await;
    assert_eq!(outcome, QuoteOutcome::error("response too large"));
}

#[tokio::test]
async fn missing_credential_never_calls_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = quote_with(QuoteSettings {
        credential: String::new(),
        ..settings(&server)
    })
    .await;
    assert_eq!(outcome, QuoteOutcome::error("endpoint or credential missing"));
}
