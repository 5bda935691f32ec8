use freight_core::{
    assemble_rows, cheapest_index, columns, sorted_by_price, Cell, OutputShape, QuoteOption,
    QuoteOutcome, Record,
};
use pretty_assertions::assert_eq;

fn option(carrier: &str, total: f64) -> QuoteOption {
    QuoteOption {
        carrier: carrier.to_string(),
        total,
        ..QuoteOption::default()
    }
}

fn record() -> Record {
    Record::from_pairs([("cnpj_origem", "1"), ("observacao", "frágil")])
}

#[test]
fn cheapest_prefers_first_on_ties() {
    let options = vec![option("A", 30.0), option("B", 10.0), option("C", 10.0)];
    assert_eq!(cheapest_index(&options), Some(1));
    assert_eq!(cheapest_index(&[]), None);
}

#[test]
fn cheapest_is_not_above_any_option() {
    let totals = [5.5, 3.25, 9.0, 3.25, 100.0, 0.0, 0.5];
    let options: Vec<_> = totals.iter().map(|t| option("X", *t)).collect();
    let best = cheapest_index(&options).unwrap();
    assert!(options.iter().all(|o| options[best].total <= o.total));
    assert_eq!(best, 5);
}

#[test]
fn sorting_is_stable() {
    let options = vec![option("A", 2.0), option("B", 1.0), option("C", 2.0)];
    let sorted: Vec<_> = sorted_by_price(&options)
        .into_iter()
        .map(|o| o.carrier)
        .collect();
    assert_eq!(sorted, vec!["B", "A", "C"]);
}

#[test]
fn empty_option_list_is_no_result() {
    let outcome = QuoteOutcome::from_options(Vec::new());
    assert_eq!(outcome.status_label(), "sem_resultado");
    assert!(outcome.cheapest().is_none());
}

#[test]
fn cheapest_only_merges_onto_input_fields() {
    let outcome = QuoteOutcome::from_options(vec![option("A", 30.0), option("B", 12.5)]);
    let rows = assemble_rows(&record(), &outcome, OutputShape::CheapestOnly);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.get("cnpj_origem"), Some(&Cell::text("1")));
    assert_eq!(row.get(columns::CHEAPEST_CARRIER), Some(&Cell::text("B")));
    assert_eq!(row.get(columns::CHEAPEST_TOTAL), Some(&Cell::Number(12.5)));
    assert_eq!(row.get(columns::CHEAPEST_SERVICE), Some(&Cell::text("Padrão")));
}

#[test]
fn all_options_emits_one_row_per_option_and_flags_one_best() {
    let outcome =
        QuoteOutcome::from_options(vec![option("A", 10.0), option("B", 10.0), option("C", 4.0)]);
    let rows = assemble_rows(&record(), &outcome, OutputShape::AllOptions);
    assert_eq!(rows.len(), 3);

    let flags: Vec<_> = rows
        .iter()
        .map(|r| r.get(columns::BEST_OPTION).and_then(Cell::as_text).unwrap().to_string())
        .collect();
    assert_eq!(flags, vec!["Não", "Não", "Sim"]);
    // The option note overwrites the input column of the same name.
    assert_eq!(rows[0].get(columns::NOTE), Some(&Cell::text("")));
    let order: Vec<_> = rows[0].columns().collect();
    assert_eq!(order[0], "cnpj_origem");
    assert_eq!(order[1], "observacao");
}

#[test]
fn failures_produce_a_single_status_row() {
    for shape in [OutputShape::CheapestOnly, OutputShape::AllOptions] {
        let outcome = QuoteOutcome::error("operation timed out");
        let rows = assemble_rows(&record(), &outcome, shape);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(columns::STATUS), Some(&Cell::text("erro")));
        assert_eq!(
            rows[0].get(columns::MESSAGE),
            Some(&Cell::text("operation timed out"))
        );

        let rows = assemble_rows(&record(), &QuoteOutcome::no_result("no carrier"), shape);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(columns::STATUS), Some(&Cell::text("sem_resultado")));
    }
}

#[test]
fn shape_parses_from_both_vocabularies() {
    assert_eq!("cheapest".parse::<OutputShape>(), Ok(OutputShape::CheapestOnly));
    assert_eq!("mais_barata".parse::<OutputShape>(), Ok(OutputShape::CheapestOnly));
    assert_eq!("todas_opcoes".parse::<OutputShape>(), Ok(OutputShape::AllOptions));
    assert!("some".parse::<OutputShape>().is_err());
}
