#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::sync::{Arc, Once};

use keyscope::primitives::bytes::key;
use keyscope::query::{
    encode_index_key, index_key_prefix, select_index, select_index_explained, IndexSelector,
    PlannerOptions, Scan,
};
use keyscope::sql::{
    encode_table_key, ColumnDescriptor, ColumnType, Datum, Expr, IndexDescriptor, TableDescriptor,
};
use keyscope::types::{ColumnId, IndexId, TableId};
use tracing_subscriber::EnvFilter;

const TABLE: TableId = TableId(51);
const PRIMARY: IndexId = IndexId(1);
const IDX_B: IndexId = IndexId(2);
const A: ColumnId = ColumnId(1);
const B: ColumnId = ColumnId(2);

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keyscope=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init();
    });
}

/// Table `t(a INT PRIMARY KEY, b INT)` with non-unique `idx_b(b)`.
fn table_t() -> Arc<TableDescriptor> {
    Arc::new(
        TableDescriptor::new(
            TABLE,
            "t",
            vec![
                ColumnDescriptor::new(A, "a", ColumnType::Int),
                ColumnDescriptor::new(B, "b", ColumnType::Int),
            ],
            IndexDescriptor::new(PRIMARY, "primary", vec![A]).unique(),
        )
        .with_index(IndexDescriptor::new(IDX_B, "idx_b", vec![B])),
    )
}

fn a() -> Expr {
    Expr::column(A, "a")
}

fn b() -> Expr {
    Expr::column(B, "b")
}

fn plan(table: Arc<TableDescriptor>, filter: Expr) -> Scan {
    init_tracing();
    let targets = [a(), b()];
    let selector = IndexSelector::new(PlannerOptions::traced()).expect("valid options");
    selector.select(Scan::new(table).with_targets(&targets).with_filter(filter))
}

fn row(a: i64, b: i64) -> BTreeMap<ColumnId, Datum> {
    BTreeMap::from([(A, Datum::Int(a)), (B, Datum::Int(b))])
}

fn key_in(scan: &Scan, row: &BTreeMap<ColumnId, Datum>) -> bool {
    let table = scan.table().expect("table");
    let index = scan.index().expect("index");
    scan.span().contains(&encode_index_key(table, index, row))
}

#[test]
fn equality_on_secondary_column_picks_secondary_index() {
    let scan = plan(table_t(), Expr::eq(b(), Expr::lit(5i64)));

    assert_eq!(scan.index_id(), Some(IDX_B));
    assert!(scan.is_secondary_index());
    let start = encode_table_key(index_key_prefix(TABLE, IDX_B), &Datum::Int(5));
    assert_eq!(scan.span().start, start);
    assert_eq!(scan.span().end, key::prefix_end(&start));

    assert!(key_in(&scan, &row(-100, 5)));
    assert!(key_in(&scan, &row(i64::MAX, 5)));
    assert!(!key_in(&scan, &row(0, 4)));
    assert!(!key_in(&scan, &row(0, 6)));
}

#[test]
fn open_range_on_primary_key() {
    let filter = Expr::and(
        Expr::gt(a(), Expr::lit(10i64)),
        Expr::lt(a(), Expr::lit(20i64)),
    );
    let scan = plan(table_t(), filter);

    assert_eq!(scan.index_id(), Some(PRIMARY));
    assert!(!scan.is_secondary_index());
    let prefix = index_key_prefix(TABLE, PRIMARY);
    assert_eq!(
        scan.span().start,
        key::next(&encode_table_key(prefix.clone(), &Datum::Int(10)))
    );
    assert_eq!(scan.span().end, encode_table_key(prefix, &Datum::Int(20)));

    for a in 11..20 {
        assert!(key_in(&scan, &row(a, 0)), "a = {a}");
    }
    assert!(!key_in(&scan, &row(10, 0)));
    assert!(!key_in(&scan, &row(20, 0)));
}

#[test]
fn disjunction_on_one_column_is_a_sound_superset() {
    let filter = Expr::or(
        Expr::eq(a(), Expr::lit(1i64)),
        Expr::eq(a(), Expr::lit(2i64)),
    );
    let scan = plan(table_t(), filter);

    assert_eq!(scan.index_id(), Some(PRIMARY));
    let prefix = index_key_prefix(TABLE, PRIMARY);
    assert_eq!(scan.span().start, encode_table_key(prefix.clone(), &Datum::Int(1)));
    assert_eq!(
        scan.span().end,
        key::prefix_end(&encode_table_key(prefix, &Datum::Int(2)))
    );
    assert!(key_in(&scan, &row(1, 0)));
    assert!(key_in(&scan, &row(2, 0)));
    assert!(!key_in(&scan, &row(3, 0)));
}

#[test]
fn disjunction_over_different_columns_scans_everything() {
    let filter = Expr::or(
        Expr::gt(a(), Expr::lit(10i64)),
        Expr::gt(b(), Expr::lit(5i64)),
    );
    let (scan, explain) = select_index_explained(
        Scan::new(table_t())
            .with_targets(&[a(), b()])
            .with_filter(filter),
    );
    let explain = explain.expect("filtered scan is explained");

    assert!(explain.bounds.is_empty());
    assert!(explain.candidates.iter().all(|c| c.start_bounds == 0 && c.end_bounds == 0));
    // idx_b reads one key per row, the primary index two.
    assert_eq!(scan.index_id(), Some(IDX_B));
    let prefix = index_key_prefix(TABLE, IDX_B);
    assert_eq!(scan.span().start, prefix);
    assert_eq!(scan.span().end, key::prefix_end(&prefix));
}

#[test]
fn unique_index_without_primary_suffix_is_never_chosen() {
    let table = Arc::new(
        TableDescriptor::new(
            TABLE,
            "t",
            vec![
                ColumnDescriptor::new(A, "a", ColumnType::Int),
                ColumnDescriptor::new(B, "b", ColumnType::Int),
            ],
            IndexDescriptor::new(PRIMARY, "primary", vec![A]).unique(),
        )
        .with_index(IndexDescriptor::new(IndexId(3), "uniq_b", vec![B]).unique()),
    );
    let scan = plan(table.clone(), Expr::eq(b(), Expr::lit(5i64)));
    assert_eq!(scan.index_id(), Some(PRIMARY));

    // Without `a` in the projection the unique index covers and wins.
    let scan = select_index(
        Scan::new(table)
            .with_targets(&[b()])
            .with_filter(Expr::eq(b(), Expr::lit(5i64))),
    );
    assert_eq!(scan.index_id(), Some(IndexId(3)));
}

#[test]
fn equal_costs_prefer_primary_then_declaration_order() {
    let table = Arc::new(
        TableDescriptor::new(
            TABLE,
            "t",
            vec![ColumnDescriptor::new(A, "a", ColumnType::Int)],
            IndexDescriptor::new(PRIMARY, "primary", vec![A]).unique(),
        )
        .with_index(IndexDescriptor::new(IndexId(2), "idx_a1", vec![A]))
        .with_index(IndexDescriptor::new(IndexId(3), "idx_a2", vec![A])),
    );
    // primary: 1 + 1 - 1 = 1 key per row; each secondary: 1 key. All tie.
    let (scan, explain) = select_index_explained(
        Scan::new(table).with_filter(Expr::ge(a(), Expr::lit(0i64))),
    );
    let order: Vec<_> = explain
        .expect("explained")
        .candidates
        .into_iter()
        .map(|c| c.index)
        .collect();
    assert_eq!(order, vec!["primary", "idx_a1", "idx_a2"]);
    assert_eq!(scan.index_id(), Some(PRIMARY));
}

#[test]
fn selection_is_deterministic() {
    let filter = Expr::and(
        Expr::between(b(), Expr::lit(3i64), Expr::lit(9i64)),
        Expr::or(
            Expr::lt(a(), Expr::lit(0i64)),
            Expr::le(a(), Expr::lit(-4i64)),
        ),
    );
    let first = plan(table_t(), filter.clone());
    for _ in 0..8 {
        let again = plan(table_t(), filter.clone());
        assert_eq!(again.index_id(), first.index_id());
        assert_eq!(again.span(), first.span());
    }
}

#[test]
fn hint_bypasses_cost_ranking() {
    let scan = Scan::new(table_t())
        .with_index_hint("primary")
        .expect("primary exists")
        .with_filter(Expr::eq(b(), Expr::lit(5i64)));
    let scan = select_index(scan);
    assert_eq!(scan.index_id(), Some(PRIMARY));
    let prefix = index_key_prefix(TABLE, PRIMARY);
    assert_eq!(scan.span().start, prefix);
    assert_eq!(scan.span().end, key::prefix_end(&prefix));
}

#[test]
fn contradictory_range_yields_empty_span() {
    let filter = Expr::and(
        Expr::gt(a(), Expr::lit(20i64)),
        Expr::lt(a(), Expr::lit(10i64)),
    );
    let scan = plan(table_t(), filter.clone());
    assert_eq!(scan.index_id(), Some(PRIMARY));
    assert!(scan.span().is_empty());

    let (_, explain) = select_index_explained(Scan::new(table_t()).with_filter(filter));
    assert_eq!(
        explain.expect("explained").bounds,
        vec!["a: > 20 AND < 10 (empty)".to_owned()]
    );
}

#[test]
fn composite_index_consumes_leading_equalities() {
    let c = ColumnId(3);
    let table = Arc::new(
        TableDescriptor::new(
            TABLE,
            "t",
            vec![
                ColumnDescriptor::new(A, "a", ColumnType::Int),
                ColumnDescriptor::new(B, "b", ColumnType::String),
                ColumnDescriptor::new(c, "c", ColumnType::Float),
            ],
            IndexDescriptor::new(PRIMARY, "primary", vec![A]).unique(),
        )
        .with_index(IndexDescriptor::new(IndexId(4), "idx_bc", vec![B, c])),
    );
    let filter = Expr::and(
        Expr::eq(b(), Expr::lit("x")),
        Expr::ge(Expr::column(c, "c"), Expr::lit(1i64)),
    );
    let scan = select_index(Scan::new(table.clone()).with_filter(filter));
    assert_eq!(scan.index_id(), Some(IndexId(4)));

    let prefix = index_key_prefix(TABLE, IndexId(4));
    let start = encode_table_key(
        encode_table_key(prefix.clone(), &Datum::from("x")),
        &Datum::Float(1.0),
    );
    assert_eq!(scan.span().start, start);
    assert_eq!(
        scan.span().end,
        key::prefix_end(&encode_table_key(prefix, &Datum::from("x")))
    );

    let index = scan.index().expect("index");
    let matching = BTreeMap::from([
        (A, Datum::Int(9)),
        (B, Datum::from("x")),
        (c, Datum::Float(1.5)),
    ]);
    assert!(scan.span().contains(&encode_index_key(&table, index, &matching)));
    let other = BTreeMap::from([
        (A, Datum::Int(9)),
        (B, Datum::from("xa")),
        (c, Datum::Float(1.5)),
    ]);
    assert!(!scan.span().contains(&encode_index_key(&table, index, &other)));
}

#[test]
fn detached_scan_passes_through() {
    let scan = select_index(Scan::detached().with_filter(Expr::eq(a(), Expr::lit(1i64))));
    assert!(scan.index_id().is_none());
}
