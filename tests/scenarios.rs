use std::collections::BTreeSet;
use proptest::prelude::*;
use rmindex::{
    Comparison, ErrorKind, IndexOptions, IndexSnapshot, ModelDump, ModelKind, Predicate, RmiIndex,
    RowId, ScanState, Value,
};

fn build_index(model: ModelKind, pairs: Vec<(f64, i64)>) -> RmiIndex {
    let mut index = RmiIndex::create("scenario", IndexOptions::with_model(model)).unwrap();
    index
        .build(pairs.into_iter().map(|(k, r)| (k, RowId(r))).collect())
        .unwrap();
    index
}

fn search_equal(index: &RmiIndex, key: f64) -> Vec<i64> {
    let mut out = BTreeSet::new();
    assert!(index.search_equal(key, 1_000_000, &mut out));
    out.iter().map(|r| r.0).collect()
}

fn search_range(index: &RmiIndex, low: f64, high: f64, li: bool, hi: bool) -> Vec<i64> {
    let mut out = BTreeSet::new();
    assert!(index.search_range(low, high, li, hi, 1_000_000, &mut out));
    out.iter().map(|r| r.0).collect()
}

// Scenario A: simple linear build and equality
#[test]
fn linear_build_and_equality() {
    let index = build_index(
        ModelKind::Linear,
        vec![(1.0, 10), (2.0, 20), (3.0, 30), (4.0, 40), (5.0, 50)],
    );

    match index.model_dump() {
        ModelDump::Linear { slope, intercept } => {
            assert!((slope - 1.0).abs() < 1e-9);
            assert!((intercept + 1.0).abs() < 1e-9);
        }
        other => panic!("expected linear dump, got {:?}", other),
    }
    let info = index.info();
    assert_eq!((info.min_error, info.max_error), (0, 0));

    assert_eq!(search_equal(&index, 3.0), vec![30]);
    assert_eq!(search_range(&index, 2.0, 4.0, true, true), vec![20, 30, 40]);
}

// Scenario B: overflow after build
#[test]
fn overflow_after_build() {
    let index = build_index(ModelKind::Linear, vec![(10.0, 1), (20.0, 2), (30.0, 3)]);
    index.insert(15.0, RowId(99));
    index.insert(25.0, RowId(100));

    assert_eq!(
        search_range(&index, 10.0, 25.0, true, true),
        vec![1, 2, 99, 100]
    );

    index.delete(15.0, RowId(99));
    assert_eq!(search_equal(&index, 15.0), Vec::<i64>::new());
}

// Scenario C: non-linear data with the polynomial model
#[test]
fn poly_on_quadratic_keys() {
    let pairs: Vec<(f64, i64)> = (0..100).map(|i| ((i * i) as f64, i)).collect();
    let index = build_index(ModelKind::Poly, pairs);

    assert_eq!(search_equal(&index, 2500.0), vec![50]);

    match index.model_dump() {
        ModelDump::Poly { degree, coeffs } => {
            assert!(degree >= 1);
            assert_eq!(coeffs.len(), degree + 1);
        }
        other => panic!("expected poly dump, got {:?}", other),
    }
}

// Scenario D: capacity cap on heavy duplication
#[test]
fn capacity_cap_on_duplicate_keys() {
    let pairs: Vec<(f64, i64)> = (0..1000).map(|i| (7.0, i)).collect();
    let index = build_index(ModelKind::Linear, pairs);

    let mut out = BTreeSet::new();
    assert!(!index.search_equal(7.0, 10, &mut out));
    assert!(out.len() <= 10);
    assert!(out.iter().all(|r| (0..1000).contains(&r.0)));
}

// Scenario E: two-layer model on a skewed (bimodal) distribution
#[test]
fn two_layer_on_bimodal_distribution() {
    let mut pairs: Vec<(f64, i64)> = Vec::new();
    for i in 0..500 {
        pairs.push((i as f64 * 0.01, i));
    }
    for i in 0..500 {
        pairs.push((1000.0 + i as f64 * 0.01, 500 + i));
    }
    let index = build_index(ModelKind::TwoLayer, pairs.clone());

    for (key, row) in &pairs {
        assert_eq!(search_equal(&index, *key), vec![*row], "key {}", key);
    }

    match index.model_dump() {
        ModelDump::TwoLayer { segments, leaves, .. } => {
            assert_eq!(segments, 31); // ⌊√1000⌋
            assert_eq!(leaves.len(), segments);
        }
        other => panic!("expected two-layer dump, got {:?}", other),
    }
}

// Scenario F: strict vs inclusive bounds
#[test]
fn strict_vs_inclusive_bounds() {
    let index = build_index(ModelKind::Linear, vec![(1.0, 1), (2.0, 2), (3.0, 3)]);

    assert_eq!(search_range(&index, 1.0, 3.0, false, false), vec![2]);
    assert_eq!(search_range(&index, 1.0, 3.0, true, false), vec![1, 2]);
    assert_eq!(search_range(&index, 1.0, 3.0, false, true), vec![2, 3]);
    assert_eq!(search_range(&index, 1.0, 3.0, true, true), vec![1, 2, 3]);
}

#[test]
fn every_trained_key_is_found_by_every_model() {
    let pairs: Vec<(f64, i64)> = (0..300)
        .map(|i| (((i * i) % 977) as f64, i))
        .collect();

    for model in [ModelKind::Linear, ModelKind::Poly, ModelKind::TwoLayer] {
        let index = build_index(model, pairs.clone());
        for (key, row) in &pairs {
            let hits = search_equal(&index, *key);
            assert!(
                hits.contains(row),
                "model {:?} lost row {} for key {}",
                model,
                row,
                key
            );
        }
    }
}

#[test]
fn insert_then_delete_round_trip_on_empty_index() {
    let index = RmiIndex::create("empty", IndexOptions::default()).unwrap();

    index.insert(3.25, RowId(77));
    assert_eq!(search_equal(&index, 3.25), vec![77]);

    index.delete(3.25, RowId(77));
    assert_eq!(search_equal(&index, 3.25), Vec::<i64>::new());
}

#[test]
fn single_element_index() {
    let index = build_index(ModelKind::Linear, vec![(5.0, 42)]);

    assert_eq!(search_equal(&index, 5.0), vec![42]);
    assert_eq!(search_equal(&index, 4.0), Vec::<i64>::new());

    let mut out = BTreeSet::new();
    assert!(index.search_greater(4.0, false, 100, &mut out));
    assert_eq!(out.iter().map(|r| r.0).collect::<Vec<_>>(), vec![42]);

    let mut out = BTreeSet::new();
    assert!(index.search_greater(5.0, false, 100, &mut out));
    assert!(out.is_empty());

    let mut out = BTreeSet::new();
    assert!(index.search_less(5.0, true, 100, &mut out));
    assert_eq!(out.iter().map(|r| r.0).collect::<Vec<_>>(), vec![42]);

    assert_eq!(search_range(&index, 0.0, 10.0, true, true), vec![42]);
}

#[test]
fn all_equal_keys_return_every_row() {
    let pairs: Vec<(f64, i64)> = (0..64).map(|i| (9.0, i)).collect();
    let index = build_index(ModelKind::Linear, pairs);

    match index.model_dump() {
        ModelDump::Linear { slope, intercept } => {
            assert_eq!(slope, 0.0);
            assert!((intercept - 31.5).abs() < 1e-9);
        }
        other => panic!("expected linear dump, got {:?}", other),
    }
    assert_eq!(search_equal(&index, 9.0), (0..64).collect::<Vec<i64>>());
}

#[test]
fn scan_state_drives_all_four_routines() {
    let index = build_index(
        ModelKind::Linear,
        vec![(1.0, 1), (2.0, 2), (3.0, 3), (4.0, 4)],
    );

    let cases: Vec<(Vec<Predicate>, Vec<i64>)> = vec![
        (
            vec![Predicate::new(Comparison::Equal, Value::Float(2.0))],
            vec![2],
        ),
        (
            vec![Predicate::new(Comparison::GreaterThan, Value::Integer(2))],
            vec![3, 4],
        ),
        (
            vec![Predicate::new(Comparison::LessThanOrEqual, Value::Float(2.0))],
            vec![1, 2],
        ),
        (
            vec![
                Predicate::new(Comparison::GreaterThanOrEqual, Value::Integer(2)),
                Predicate::new(Comparison::LessThan, Value::Integer(4)),
            ],
            vec![2, 3],
        ),
    ];

    for (predicates, expected) in cases {
        let mut state = ScanState::try_from_predicates(&predicates).unwrap();
        let mut out = BTreeSet::new();
        assert!(index.scan(&mut state, 1_000, &mut out).unwrap());
        assert_eq!(out.iter().map(|r| r.0).collect::<Vec<_>>(), expected);

        // One-shot: a second pass adds nothing
        let mut again = BTreeSet::new();
        assert!(index.scan(&mut state, 1_000, &mut again).unwrap());
        assert!(again.is_empty());
    }
}

#[test]
fn non_numeric_predicates_are_rejected() {
    let err = ScanState::try_from_predicates(&[Predicate::new(
        Comparison::Equal,
        Value::Text("seven".to_string()),
    )])
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Predicate);
}

#[test]
fn snapshot_round_trip_preserves_results() {
    let pairs: Vec<(f64, i64)> = (0..250).map(|i| ((i * 7 % 611) as f64, i)).collect();
    let index = build_index(ModelKind::TwoLayer, pairs.clone());
    index.insert(123.456, RowId(9001));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.snapshot");
    IndexSnapshot::capture(&index).save_to(&path).unwrap();
    let restored = IndexSnapshot::load_from(&path).unwrap().restore().unwrap();

    assert_eq!(restored.info().total_rows, index.info().total_rows);
    assert_eq!(restored.model_dump(), index.model_dump());
    for (key, _) in pairs.iter().take(50) {
        assert_eq!(search_equal(&restored, *key), search_equal(&index, *key));
    }
    assert_eq!(search_equal(&restored, 123.456), vec![9001]);
}

proptest! {
    // Envelope soundness: every trained key is found again, whatever the
    // key distribution or model.
    #[test]
    fn trained_keys_always_resurface(
        mut keys in proptest::collection::vec(-1e6f64..1e6f64, 1..200),
        model_pick in 0usize..3,
    ) {
        keys.sort_by(f64::total_cmp);
        let model = [ModelKind::Linear, ModelKind::Poly, ModelKind::TwoLayer][model_pick];
        let pairs: Vec<(f64, i64)> = keys.iter().enumerate().map(|(i, &k)| (k, i as i64)).collect();
        let index = build_index(model, pairs.clone());

        for (key, row) in &pairs {
            let hits = search_equal(&index, *key);
            prop_assert!(hits.contains(row));
        }
    }

    // Range completeness against a brute-force oracle over base + overflow.
    #[test]
    fn inclusive_range_matches_oracle(
        mut keys in proptest::collection::vec(0f64..1000f64, 1..120),
        extra in proptest::collection::vec((0f64..1000f64, 0i64..1000), 0..20),
        low in 0f64..1000f64,
        width in 0f64..500f64,
    ) {
        keys.sort_by(f64::total_cmp);
        let pairs: Vec<(f64, i64)> = keys.iter().enumerate().map(|(i, &k)| (k, i as i64)).collect();
        let index = build_index(ModelKind::Linear, pairs.clone());
        for (k, r) in &extra {
            index.insert(*k, RowId(100_000 + r));
        }

        let high = low + width;
        let got = search_range(&index, low, high, true, true);

        let mut expected: BTreeSet<i64> = pairs
            .iter()
            .filter(|(k, _)| *k >= low && *k <= high)
            .map(|(_, r)| *r)
            .collect();
        for (k, r) in &extra {
            if *k >= low && *k <= high {
                expected.insert(100_000 + r);
            }
        }

        prop_assert_eq!(got, expected.into_iter().collect::<Vec<_>>());
    }
}
