use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use freight_core::{
    QuoteOption, QuoteOutcome, Record, ShipmentDefaults, ShipmentRow, ValidationError,
};
use freight_engine::{quote_many, quote_shipment, QuoteItem, Quoter, Throttle};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct CountingQuoter {
    calls: AtomicUsize,
}

#[async_trait]
impl Quoter for CountingQuoter {
    async fn quote(&self, _row: usize, shipment: &ShipmentRow, _throttle: &Throttle) -> QuoteOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if shipment.destination_postal_code == "00000-000" {
            return QuoteOutcome::no_result("no quote available");
        }
        let offer = |carrier: &str, total: f64| QuoteOption {
            carrier: carrier.to_string(),
            total,
            ..QuoteOption::default()
        };
        QuoteOutcome::from_options(vec![offer("Gama", 80.0), offer("Alfa", 45.0), offer("Beta", 80.0)])
    }
}

fn shipment() -> ShipmentRow {
    let record = Record::from_pairs([
        ("cnpj_origem", "48566347000122"),
        ("cep_origem", "88504-357"),
        ("cnpj_destino", "11417744000122"),
        ("cep_destino", "89660-000"),
        ("quantidade", "3"),
        ("peso", "2,5"),
        ("valor", "10"),
        ("quantidade_2", "1"),
        ("peso_2", "4"),
        ("valor_2", "100"),
    ]);
    ShipmentRow::from_record(&record, &ShipmentDefaults::default()).unwrap()
}

#[tokio::test]
async fn options_are_sorted_and_summarized() {
    let quoter = CountingQuoter::default();
    let quote = quote_shipment(&quoter, &Throttle::default(), &shipment())
        .await
        .unwrap();

    let carriers: Vec<_> = quote.sorted.iter().map(|o| o.carrier.as_str()).collect();
    assert_eq!(carriers, vec!["Alfa", "Gama", "Beta"]);
    assert_eq!(quote.cheapest().unwrap().carrier, "Alfa");
    assert_eq!(quote.summary.total_quantity, 4);
    assert_eq!(quote.summary.total_weight, 6.5);
    assert_eq!(quote.summary.total_value, 130.0);
}

#[tokio::test]
async fn invalid_shipment_is_rejected_before_quoting() {
    let quoter = CountingQuoter::default();
    let mut shipment = shipment();
    shipment.packages.clear();

    let result = quote_shipment(&quoter, &Throttle::default(), &shipment).await;

    assert_eq!(result.unwrap_err(), ValidationError::NoPackage);
    assert_eq!(quoter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn many_items_are_answered_in_order_with_their_references() {
    let quoter = CountingQuoter::default();
    let mut missing_cep = shipment();
    missing_cep.destination_postal_code.clear();
    let mut unserved = shipment();
    unserved.destination_postal_code = "00000-000".to_string();
    let items = vec![
        QuoteItem {
            reference: Some("pedido-7".to_string()),
            shipment: shipment(),
        },
        QuoteItem {
            reference: None,
            shipment: missing_cep,
        },
        QuoteItem {
            reference: None,
            shipment: unserved,
        },
    ];

    let results = quote_many(&quoter, &Throttle::default(), &items).await;

    let summary: Vec<_> = results
        .iter()
        .map(|item| (item.reference.as_str(), item.is_ok(), item.error()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("pedido-7", true, None),
            ("linha-2", false, Some("field cep_destino is required".to_string())),
            ("linha-3", false, Some("no quote available".to_string())),
        ]
    );
    assert_eq!(
        results[0].result.as_ref().unwrap().cheapest().unwrap().carrier,
        "Alfa"
    );
    assert_eq!(quoter.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn no_items_means_no_calls() {
    let quoter = CountingQuoter::default();
    let results = quote_many(&quoter, &Throttle::default(), &[]).await;
    assert!(results.is_empty());
    assert_eq!(quoter.calls.load(Ordering::SeqCst), 0);
}
