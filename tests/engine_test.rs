use distdash::{
    build_flow, dominant, filter, group_sum, group_sum_pair, pivot, rank_descending, top_n,
    DimensionSelection, EngineError, Partition, Selection, Table, MISSING_KEY,
};
use polars::prelude::*;

mod common;

const MEASURE: &str = "Beneficiary_Count";

#[test]
fn test_three_row_walkthrough() {
    let table = Table::new(
        df!(
            "district" => &["A", "A", "B"],
            "type" => &["X", "Y", "X"],
            "count" => &[3i64, 2, 5]
        )
        .unwrap(),
    );

    let agg = group_sum(&table, "district", "count").unwrap();
    let pairs: Vec<(&str, f64)> = agg.iter().map(|e| (e.key.as_str(), e.sum)).collect();
    assert_eq!(pairs, vec![("A", 5.0), ("B", 5.0)]);
    let top = top_n(&agg, 1);
    assert_eq!(top.entries()[0].key, "A");

    let matrix = pivot(&table, "district", "type", "count").unwrap();
    assert_eq!(matrix.row_keys(), ["A", "B"]);
    assert_eq!(matrix.column_keys(), ["X", "Y"]);
    assert_eq!(matrix.cell("B", "Y"), Some(0.0));

    let graph = build_flow(&table, "type", "district", "count").unwrap();
    assert_eq!(graph.labels(), vec!["X", "Y", "A", "B"]);
    let edges: Vec<(usize, usize, f64)> = graph
        .edges()
        .iter()
        .map(|e| (e.source, e.target, e.weight))
        .collect();
    assert_eq!(edges, vec![(0, 2, 3.0), (0, 3, 5.0), (1, 2, 2.0)]);
}

#[test]
fn test_group_sum_conserves_total() {
    let table = common::intervention_table();
    let total = table.measure_total(MEASURE).unwrap();
    assert_eq!(total, 360.0);

    for key in ["district_name", "block_name", "broad_category", "typeofsupport", "pillar"] {
        let agg = group_sum(&table, key, MEASURE).unwrap();
        assert_eq!(agg.total(), total, "grouping by {}", key);
        assert_eq!(agg.len(), table.n_unique(key).unwrap());
    }
}

#[test]
fn test_district_totals() {
    let table = common::intervention_table();
    let agg = group_sum(&table, "district_name", MEASURE).unwrap();
    let pairs: Vec<(&str, f64)> = agg.iter().map(|e| (e.key.as_str(), e.sum)).collect();
    assert_eq!(pairs, vec![("Bastar", 105.0), ("Durg", 60.0), ("Raipur", 195.0)]);

    let top = dominant(&agg).unwrap();
    assert_eq!(top.key, "Raipur");

    let ranking = rank_descending(&agg);
    let ranked: Vec<&str> = ranking.keys().map(String::as_str).collect();
    assert_eq!(ranked, vec!["Raipur", "Bastar", "Durg"]);
}

#[test]
fn test_top_support_types() {
    let table = common::intervention_table();
    let agg = group_sum(&table, "typeofsupport", MEASURE).unwrap();
    let top = top_n(&agg, 3);
    let keys: Vec<&str> = top.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Tractor", "Urea", "Paddy Seed"]);
    assert_eq!(top_n(&top, 3), top);
}

#[test]
fn test_filter_then_aggregate() {
    let table = common::intervention_table();
    let selection = Selection::new().with_values("district_name", ["Raipur", "Durg"]);
    let filtered = filter::apply(&table, &selection).unwrap();
    assert_eq!(filtered.height(), 4);
    assert_eq!(filtered.measure_total(MEASURE).unwrap(), 255.0);
    assert_eq!(
        filtered.domain("district_name").unwrap(),
        vec!["Durg".to_string(), "Raipur".to_string()]
    );
    // the source table is untouched
    assert_eq!(table.height(), 6);
}

#[test]
fn test_drill_down_narrows_selection() {
    let table = common::intervention_table();
    let selection = Selection::new()
        .with_all("district_name")
        .with_drill_down("pillar", "Livelihood");
    let filtered = filter::apply(&table, &selection).unwrap();
    assert_eq!(filtered.height(), 1);
    assert_eq!(filtered.domain("district_name").unwrap(), vec!["Bastar".to_string()]);
}

#[test]
fn test_empty_selection_boundary() {
    let table = common::intervention_table();
    let selection =
        Selection::new().with("district_name", DimensionSelection::values(Vec::<String>::new()));
    let filtered = filter::apply(&table, &selection).unwrap();

    assert!(filtered.is_empty());
    assert_eq!(filtered.column_names(), table.column_names());
    assert_eq!(filtered.measure_total(MEASURE).unwrap(), 0.0);

    let agg = group_sum(&filtered, "district_name", MEASURE).unwrap();
    assert!(agg.is_empty());
    assert!(matches!(dominant(&agg), Err(EngineError::EmptyAggregation)));
    assert!(pivot(&filtered, "district_name", "broad_category", MEASURE)
        .unwrap()
        .is_empty());
    assert!(build_flow(&filtered, "input_category", "pillar", MEASURE)
        .unwrap()
        .is_empty());
}

#[test]
fn test_pivot_district_by_category() {
    let table = common::intervention_table();
    let matrix = pivot(&table, "district_name", "broad_category", MEASURE).unwrap();

    assert_eq!(matrix.row_keys(), ["Bastar", "Durg", "Raipur"]);
    assert_eq!(matrix.column_keys(), ["Equipment", "Inputs", "Training"]);
    assert_eq!(
        matrix.cells(),
        [
            vec![80.0, 0.0, 25.0],
            vec![0.0, 60.0, 0.0],
            vec![120.0, 75.0, 0.0]
        ]
    );
    assert_eq!(matrix.total(), 360.0);
    assert_eq!(matrix.row_totals(), vec![105.0, 60.0, 195.0]);
    assert_eq!(matrix.column_totals(), vec![200.0, 135.0, 25.0]);
}

#[test]
fn test_flow_input_category_to_pillar() {
    let table = common::intervention_table();
    let graph = build_flow(&table, "input_category", "pillar", MEASURE).unwrap();

    assert_eq!(
        graph.labels(),
        vec!["Livelihood", "Machinery", "Nutrient", "Seed", "Agriculture", "Livelihood"]
    );
    assert_eq!(graph.link_sources(), vec![0, 1, 2, 3]);
    assert_eq!(graph.link_targets(), vec![5, 4, 4, 4]);
    assert_eq!(graph.link_values(), vec![25.0, 200.0, 60.0, 75.0]);
    assert_eq!(graph.total_weight(), 360.0);

    let agri = graph.index_of(Partition::Target, "Agriculture").unwrap();
    assert_eq!(graph.incoming_weight(agri), 335.0);
    for node in graph.source_nodes() {
        assert_eq!(node.partition, Partition::Source);
        assert!(graph.edges().iter().all(|e| e.source < graph.source_nodes().len()));
    }
}

#[test]
fn test_pair_grouping_conserves_total() {
    let table = common::intervention_table();
    let pairs = group_sum_pair(&table, "district_name", "typeofsupport", MEASURE).unwrap();
    assert_eq!(pairs.total(), 360.0);
    let keys: Vec<_> = pairs.keys().cloned().collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn test_nulls_and_non_numeric_measures() {
    let df = df!(
        "district_name" => &[Some("A"), None, Some("A"), Some("B")],
        "Beneficiary_Count" => &[Some(3i64), Some(4), None, Some(2)]
    )
    .unwrap();
    let table = Table::new(df);

    let agg = group_sum(&table, "district_name", MEASURE).unwrap();
    assert_eq!(agg.get(&"A".to_string()), Some(3.0));
    assert_eq!(agg.get(&MISSING_KEY.to_string()), Some(4.0));
    assert_eq!(agg.total(), table.measure_total(MEASURE).unwrap());

    let selection = Selection::new().with_values("district_name", [MISSING_KEY]);
    assert_eq!(filter::apply(&table, &selection).unwrap().height(), 1);
}

#[test]
fn test_derivations_are_deterministic() {
    let table = common::intervention_table();
    let selection = Selection::new().with_values("district_name", ["Bastar", "Raipur"]);
    let first = filter::apply(&table, &selection).unwrap();
    let second = filter::apply(&table, &selection).unwrap();

    assert_eq!(
        group_sum(&first, "typeofsupport", MEASURE).unwrap(),
        group_sum(&second, "typeofsupport", MEASURE).unwrap()
    );
    assert_eq!(
        pivot(&first, "district_name", "broad_category", MEASURE).unwrap(),
        pivot(&second, "district_name", "broad_category", MEASURE).unwrap()
    );
    assert_eq!(
        build_flow(&first, "input_category", "pillar", MEASURE).unwrap(),
        build_flow(&second, "input_category", "pillar", MEASURE).unwrap()
    );
}
