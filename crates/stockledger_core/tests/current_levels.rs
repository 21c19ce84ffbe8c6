use rusqlite::Connection;
use stockledger_core::db::open_db_in_memory;
use stockledger_core::{
    current_levels, BarChart, ChartOutcome, ChartPlan, ChartRenderer, LedgerRepository,
    LevelEntry, LevelOrder, Observation, ObservationField, RepoError, SqliteLedgerRepository,
    StockService, ValidationError,
};
use std::convert::Infallible;

fn ledger_service(conn: &Connection) -> StockService<SqliteLedgerRepository<'_>> {
    StockService::new(SqliteLedgerRepository::try_new(conn).unwrap())
}

fn entry(item_name: &str, quantity: i64) -> LevelEntry {
    LevelEntry {
        item_name: item_name.to_string(),
        quantity,
    }
}

#[test]
fn latest_date_wins_per_item() {
    let conn = open_db_in_memory().unwrap();
    let service = ledger_service(&conn);
    service
        .record_observation("Widget", "10", "2024-01-01")
        .unwrap();
    service
        .record_observation("Widget", "7", "2024-01-05")
        .unwrap();
    service
        .record_observation("Gadget", "3", "2024-01-02")
        .unwrap();

    let levels = service.current_levels().unwrap();
    assert_eq!(levels.len(), 2);
    assert_eq!(levels["Widget"], 7);
    assert_eq!(levels["Gadget"], 3);
}

#[test]
fn same_date_resolved_by_later_insertion() {
    let conn = open_db_in_memory().unwrap();
    let service = ledger_service(&conn);
    service
        .record_observation("Widget", "10", "2024-01-05")
        .unwrap();
    service
        .record_observation("Widget", "99", "2024-01-05")
        .unwrap();

    assert_eq!(service.current_levels().unwrap()["Widget"], 99);
}

#[test]
fn backdated_observation_does_not_replace_current_level() {
    let conn = open_db_in_memory().unwrap();
    let service = ledger_service(&conn);
    service
        .record_observation("Widget", "7", "2024-03-01")
        .unwrap();
    service
        .record_observation("Widget", "500", "2023-12-31")
        .unwrap();

    assert_eq!(service.current_levels().unwrap()["Widget"], 7);
    let latest = service.latest_observations().unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].record_date.to_string(), "2024-03-01");
}

#[test]
fn empty_item_name_is_missing_field() {
    let conn = open_db_in_memory().unwrap();
    let err = ledger_service(&conn)
        .record_observation("", "5", "2024-01-01")
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingField(ObservationField::ItemName))
    ));
}

#[test]
fn negative_quantity_is_invalid_quantity() {
    let conn = open_db_in_memory().unwrap();
    let err = ledger_service(&conn)
        .record_observation("Widget", "-5", "2024-01-01")
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidQuantity(value)) if value == "-5"
    ));
}

#[test]
fn day_month_swapped_date_is_invalid_date() {
    let conn = open_db_in_memory().unwrap();
    let err = ledger_service(&conn)
        .record_observation("Widget", "5", "2024-31-01")
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidDate(value)) if value == "2024-31-01"
    ));
}

#[test]
fn winner_is_maximum_date_then_sequence_for_generated_histories() {
    // Deterministic pseudo-random histories with heavy date collisions.
    let mut state: u64 = 0x5eed_1234_abcd_0001;
    let mut next = move |bound: u64| {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 33) % bound
    };

    for round in 0..50 {
        let conn = open_db_in_memory().unwrap();
        let service = ledger_service(&conn);
        let mut recorded: Vec<Observation> = Vec::new();

        for _ in 0..(1 + next(20)) {
            let day = 1 + next(3);
            let quantity = next(1_000);
            let date = format!("2024-05-0{day}");
            let observation = service
                .record_observation("Widget", &quantity.to_string(), &date)
                .unwrap();
            recorded.push(observation);
        }

        let expected = recorded
            .iter()
            .max_by_key(|observation| (observation.record_date, observation.sequence_id))
            .unwrap();
        assert_eq!(
            service.current_levels().unwrap()["Widget"],
            expected.quantity,
            "round {round}"
        );
    }
}

#[test]
fn projection_is_independent_of_scan_order() {
    let conn = open_db_in_memory().unwrap();
    let service = ledger_service(&conn);
    for (item, quantity, date) in [
        ("Widget", "1", "2024-01-02"),
        ("Gadget", "2", "2024-01-02"),
        ("Widget", "3", "2024-01-02"),
        ("Gadget", "4", "2024-01-01"),
        ("Sprocket", "5", "2024-01-03"),
    ] {
        service.record_observation(item, quantity, date).unwrap();
    }

    let repo = SqliteLedgerRepository::try_new(&conn).unwrap();
    let mut scan = repo.scan_all().unwrap();
    let baseline = current_levels(&scan);
    scan.reverse();
    assert_eq!(current_levels(&scan), baseline);
    scan.rotate_left(2);
    assert_eq!(current_levels(&scan), baseline);

    assert_eq!(baseline["Widget"], 3);
    assert_eq!(baseline["Gadget"], 2);
    assert_eq!(baseline["Sprocket"], 5);
}

#[test]
fn repeated_reads_return_identical_results() {
    let conn = open_db_in_memory().unwrap();
    let service = ledger_service(&conn);
    service
        .record_observation("Widget", "4", "2024-01-01")
        .unwrap();
    service
        .record_observation("Gadget", "9", "2024-01-01")
        .unwrap();

    assert_eq!(
        service.current_levels().unwrap(),
        service.current_levels().unwrap()
    );
    assert_eq!(
        service.current_levels_ordered().unwrap(),
        service.current_levels_ordered().unwrap()
    );
    assert_eq!(service.observation_count().unwrap(), 2);
}

#[test]
fn ordered_levels_default_to_item_name_ascending() {
    let conn = open_db_in_memory().unwrap();
    let service = ledger_service(&conn);
    for (item, quantity) in [("Widget", "9"), ("Anchor", "1"), ("Gadget", "5")] {
        service
            .record_observation(item, quantity, "2024-01-01")
            .unwrap();
    }

    assert_eq!(
        service.current_levels_ordered().unwrap(),
        vec![entry("Anchor", 1), entry("Gadget", 5), entry("Widget", 9)]
    );
    assert_eq!(
        service
            .current_levels_ordered_by(LevelOrder::ByQuantityDesc)
            .unwrap(),
        vec![entry("Widget", 9), entry("Gadget", 5), entry("Anchor", 1)]
    );
}

struct LabelRenderer;

impl ChartRenderer for LabelRenderer {
    type Output = Vec<String>;
    type Error = Infallible;

    fn render(&self, chart: &BarChart) -> Result<Vec<String>, Infallible> {
        Ok(chart.bars.iter().map(|bar| bar.label.clone()).collect())
    }
}

#[test]
fn empty_ledger_yields_no_levels_and_no_chart() {
    let conn = open_db_in_memory().unwrap();
    let service = ledger_service(&conn);

    assert!(service.current_levels().unwrap().is_empty());
    assert!(service.current_levels_ordered().unwrap().is_empty());
    assert_eq!(service.chart_plan().unwrap(), ChartPlan::NoData);
    assert_eq!(
        service.render_chart(&LabelRenderer).unwrap(),
        Ok(ChartOutcome::NoData)
    );
}

#[test]
fn single_observation_still_renders_a_chart() {
    let conn = open_db_in_memory().unwrap();
    let service = ledger_service(&conn);
    service
        .record_observation("Widget", "3", "2024-01-01")
        .unwrap();

    assert_eq!(
        service.render_chart(&LabelRenderer).unwrap(),
        Ok(ChartOutcome::Rendered(vec!["Widget".to_string()]))
    );
}
