use freight_core::{QuoteOption, QuoteOutcome};
use freight_engine::{interpret_response, normalize_option, parse_total};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn missing_fields_take_defaults() {
    let option = normalize_option(&json!({"total": 10}));
    assert_eq!(
        option,
        QuoteOption {
            total: 10.0,
            ..QuoteOption::default()
        }
    );
    assert_eq!(option.carrier, "N/D");
    assert_eq!(option.lead_time, "N/A");
    assert_eq!(option.service, "Padrão");
}

#[test]
fn null_blank_and_nested_fields_fall_back() {
    let option = normalize_option(&json!({
        "transportadora": "  ",
        "integrador": null,
        "total": "abc",
        "prazo": {"dias": 3},
        "servico": ["x"],
        "observacao": " frágil ",
    }));
    assert_eq!(option.carrier, "N/D");
    assert_eq!(option.integrator, "");
    assert_eq!(option.total, 0.0);
    assert_eq!(option.lead_time, "N/A");
    assert_eq!(option.service, "Padrão");
    assert_eq!(option.note, "frágil");
}

#[test]
fn non_object_entry_becomes_annotated_default() {
    let option = normalize_option(&json!(42));
    assert_eq!(option.carrier, "N/D");
    assert_eq!(option.note, "invalid entry: not an object");
}

#[test]
fn normalizing_twice_changes_nothing() {
    let inputs = [
        json!({"transportadora": "Alfa", "total": "12,5", "prazo": 2, "imagem": "a.png"}),
        json!({"total": -3}),
        json!({}),
        json!("text"),
    ];
    for input in inputs {
        let once = normalize_option(&input);
        let twice = normalize_option(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice, "input {input}");
    }
}

#[test]
fn totals_accept_numbers_and_decimal_strings() {
    assert_eq!(parse_total(&json!(10.25)), Some(10.25));
    assert_eq!(parse_total(&json!("10,25")), Some(10.25));
    assert_eq!(parse_total(&json!(" 7 ")), Some(7.0));
    assert_eq!(parse_total(&json!("")), None);
    assert_eq!(parse_total(&json!(null)), None);
    assert_eq!(parse_total(&json!(true)), None);
}

#[test]
fn negative_totals_are_discarded() {
    let body = json!({"resultado": [{"total": -1}, {"total": "-0,5"}]});
    assert_eq!(
        interpret_response(0, &body),
        QuoteOutcome::no_result("no quote with a valid total")
    );
}

#[test]
fn ties_go_to_first_entry() {
    let body = json!({"resultado": [
        {"transportadora": "Alfa", "total": 50},
        {"transportadora": "Beta", "total": "50"},
        {"transportadora": "Gama", "total": 70},
    ]});
    let outcome = interpret_response(3, &body);
    assert_eq!(outcome.cheapest().unwrap().carrier, "Alfa");
}

#[test]
fn truthy_error_flags_short_circuit() {
    for flag in [json!(true), json!("true"), json!(1)] {
        let body = json!({"erro": flag, "resultado": [{"total": 1}]});
        assert_eq!(
            interpret_response(0, &body),
            QuoteOutcome::no_result("no quote available")
        );
    }
}

#[test]
fn non_object_body_is_no_result() {
    assert_eq!(
        interpret_response(0, &json!([1, 2])),
        QuoteOutcome::no_result("invalid response from quoting service")
    );
}
