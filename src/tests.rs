use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{TimeZone, Utc};

use crate::app::{skeleton_cell_style, table_container_style, table_header_cell_style};
use crate::domain::entities::column::{
    column_label, ColumnDescriptor, NumberOptions, SelectOption,
};
use crate::domain::entities::filter::{
    ColumnFilter, FilterType, FilterValue, NumericFilter, NumericOperator, SELECT_ALL_VALUE,
};
use crate::domain::entities::table::{
    FetchParams, FetchResult, PaginationState, SortDirection, SortSpec, SortState,
};
use crate::domain::entities::voucher::{voucher_columns, Voucher, VoucherStatus};
use crate::infra::config::settings::TableSettings;
use crate::infra::sqlite::queries::{build_voucher_query, InvalidFilter};
use crate::infra::sqlite::repo::SqliteVoucherSource;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::state::table_state::{body_state, range_label, BodyState, TableState};
use crate::usecase::ports::fetch::{FetchError, FnSource, RowSource};
use crate::usecase::services::fetch_coordinator::{build_fetch_params, execute, FetchCoordinator};
use crate::usecase::services::filter_builder::{
    FilterBuilder, FilterEditor, FilterError, FilterState,
};

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("certdesk-{prefix}-{nanos}"))
}

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, 15, 30, 0)
        .single()
        .expect("fixed timestamp should be valid")
}

fn people_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("name", "Nombre").filter(FilterType::Text),
        ColumnDescriptor::new("age", "Edad").number(NumberOptions {
            min: Some(0.0),
            max: Some(120.0),
            step: Some(1.0),
            operators: true,
        }),
        ColumnDescriptor::new("active", "Activo").boolean_labels("Activo", "Inactivo"),
        ColumnDescriptor::new("created_at", "Creado").filter(FilterType::Date),
        ColumnDescriptor::new("role", "Rol").select(vec![
            SelectOption::new("Administrador", "admin"),
            SelectOption::new("Candidato", "candidate"),
        ]),
        ColumnDescriptor::new("notes", "Notas"),
    ]
}

fn recording_source(
    seen: Arc<Mutex<Vec<FetchParams>>>,
    rows: Vec<String>,
) -> impl RowSource<String> {
    FnSource::new(move |params: FetchParams| {
        let seen = seen.clone();
        let rows = rows.clone();
        async move {
            seen.lock().expect("lock should not be poisoned").push(params);
            let total = rows.len() as u64;
            Ok::<_, FetchError>(FetchResult::new(rows, total))
        }
    })
}

async fn fetch_into<T, S>(
    coordinator: &mut FetchCoordinator<T>,
    source: &S,
    params: FetchParams,
) -> bool
where
    S: RowSource<T> + ?Sized,
{
    let ticket = coordinator.begin(params);
    let (token, outcome) = execute(source, ticket).await;
    coordinator.complete(token, outcome)
}

#[test]
fn draft_never_holds_two_filters_for_one_column() {
    let columns = people_columns();
    let builder = FilterBuilder::new(&columns);
    let mut state = FilterState::default();

    for column_id in ["name", "age", "name", "active", "age", "name"] {
        let _ = builder.add(&mut state, column_id, fixed_now());
    }

    let mut ids: Vec<&str> = state.draft().iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["name", "age", "active"]);
    ids.dedup();
    assert_eq!(ids.len(), state.draft().len());

    let duplicate = builder.add(&mut state, "name", fixed_now());
    assert_eq!(duplicate, Err(FilterError::DuplicateColumn("name".to_string())));
}

#[test]
fn add_rejects_unknown_and_unfilterable_columns() {
    let columns = people_columns();
    let builder = FilterBuilder::new(&columns);
    let mut state = FilterState::default();

    assert_eq!(
        builder.add(&mut state, "missing", fixed_now()),
        Err(FilterError::UnknownColumn("missing".to_string()))
    );
    assert_eq!(
        builder.add(&mut state, "notes", fixed_now()),
        Err(FilterError::NotFilterable("notes".to_string()))
    );
    assert!(state.draft().is_empty());
}

#[test]
fn new_filters_start_with_type_defaults() {
    let columns = people_columns();
    let builder = FilterBuilder::new(&columns);
    let mut state = FilterState::default();

    for column_id in ["name", "age", "active", "created_at", "role"] {
        builder
            .add(&mut state, column_id, fixed_now())
            .expect("filterable column should be added");
    }

    assert_eq!(state.draft_value("name"), Some(&FilterValue::Text(String::new())));
    assert_eq!(
        state.draft_value("age"),
        Some(&FilterValue::Number(NumericFilter::with_op(NumericOperator::Eq, "0")))
    );
    assert_eq!(state.draft_value("active"), Some(&FilterValue::Boolean(true)));
    assert_eq!(state.draft_value("created_at"), Some(&FilterValue::Date(fixed_now())));
    assert_eq!(
        state.draft_value("role"),
        Some(&FilterValue::Select(SELECT_ALL_VALUE.to_string()))
    );
}

#[test]
fn plain_number_columns_default_to_bare_zero() {
    let columns = vec![ColumnDescriptor::new("score", "Puntaje").number(NumberOptions::default())];
    let builder = FilterBuilder::new(&columns);
    let mut state = FilterState::default();

    builder
        .add(&mut state, "score", fixed_now())
        .expect("score should be filterable");

    assert_eq!(
        state.draft_value("score"),
        Some(&FilterValue::Number(NumericFilter::plain("0")))
    );
}

#[test]
fn available_columns_skip_filtered_and_unfilterable() {
    let columns = people_columns();
    let builder = FilterBuilder::new(&columns);
    let mut state = FilterState::default();
    builder
        .add(&mut state, "age", fixed_now())
        .expect("age should be added");

    let available: Vec<&str> = builder
        .available_columns(&state)
        .into_iter()
        .filter_map(ColumnDescriptor::resolved_id)
        .collect();

    assert_eq!(available, vec!["name", "active", "created_at", "role"]);
}

#[test]
fn update_value_is_noop_for_missing_filter() {
    let mut state = FilterState::default();
    assert!(!state.update_filter_value("name", FilterValue::Text("Ana".to_string())));
    assert!(state.draft().is_empty());
}

#[test]
fn applying_twice_leaves_active_set_unchanged() {
    let mut state = FilterState::default();
    state
        .add_filter("name", FilterValue::Text("Ana".to_string()))
        .expect("first add should succeed");

    state.apply_draft();
    let after_first = state.active().to_vec();
    state.apply_draft();

    assert_eq!(state.active(), after_first.as_slice());
    assert!(!state.is_dirty());
}

#[test]
fn remove_filter_updates_draft_and_active_together() {
    let mut state = FilterState::default();
    state
        .add_filter("name", FilterValue::Text("Ana".to_string()))
        .expect("add name");
    state
        .add_filter("active", FilterValue::Boolean(false))
        .expect("add active");
    state.apply_draft();

    assert!(state.remove_filter("name"));

    assert_eq!(state.draft().len(), 1);
    assert_eq!(state.active().len(), 1);
    assert_eq!(state.draft(), state.active());
    assert!(!state.remove_filter("name"));
}

#[test]
fn reset_clears_draft_only_and_marks_dirty() {
    let mut state = FilterState::default();
    state
        .add_filter("name", FilterValue::Text("Ana".to_string()))
        .expect("add name");
    state.apply_draft();

    state.reset_draft();

    assert!(state.draft().is_empty());
    assert_eq!(state.active().len(), 1);
    assert!(state.is_dirty());

    state.apply_draft();
    assert!(state.active().is_empty());
    assert!(!state.is_dirty());
}

#[test]
fn clear_all_empties_both_sets_and_resets_page() {
    let columns = people_columns();
    let mut table = TableState::default();
    table
        .add_filter(&columns, "name", fixed_now())
        .expect("add name");
    table.apply_filters();
    table.next_page(100);

    table.clear_filters();

    assert!(table.filters().draft().is_empty());
    assert!(table.filters().active().is_empty());
    assert_eq!(table.pagination().page_index, 0);
}

#[test]
fn apply_always_resets_page_index() {
    let mut table = TableState::default();
    for _ in 0..4 {
        table.next_page(95);
    }
    assert_eq!(table.pagination().page_index, 4);

    table.apply_filters();

    assert_eq!(table.pagination().page_index, 0);
}

#[test]
fn pagination_stays_in_range_for_any_action_sequence() {
    for total in 0..=27_u64 {
        for page_size in [1_u32, 5, 10] {
            let mut pagination = PaginationState::new(page_size);
            let max_index = pagination.page_count(total).saturating_sub(1);
            for step in 0..40 {
                match step % 7 {
                    0 | 1 | 4 => pagination.next(total),
                    2 => pagination.previous(total),
                    3 => pagination.last(total),
                    5 => pagination.next(total),
                    _ => pagination.first(),
                }
                assert!(
                    u64::from(pagination.page_index) <= max_index,
                    "total {total}, size {page_size}, index {}",
                    pagination.page_index
                );
            }
        }
    }
}

#[test]
fn navigation_recovers_from_out_of_range_index() {
    for total in [0_u64, 1, 9, 10, 11, 37] {
        for start in [3_u32, 50, u32::MAX] {
            let max_index = PaginationState::new(10).page_count(total).saturating_sub(1);
            let actions: [fn(&mut PaginationState, u64); 4] = [
                |p, total| p.next(total),
                |p, total| p.previous(total),
                |p, total| p.last(total),
                |p, _| p.first(),
            ];
            for action in actions {
                let mut pagination = PaginationState {
                    page_index: start,
                    page_size: 10,
                };
                action(&mut pagination, total);
                assert!(
                    u64::from(pagination.page_index) <= max_index,
                    "total {total}, start {start}, index {}",
                    pagination.page_index
                );
            }
        }
    }
}

#[test]
fn navigation_stays_in_range_while_total_changes() {
    let totals = [100_u64, 100, 42, 0, 7, 55, 3, 3, 90, 11];
    let mut pagination = PaginationState::new(5);
    for (step, total) in totals.into_iter().cycle().take(60).enumerate() {
        match step % 5 {
            0 => pagination.last(total),
            1 | 2 => pagination.next(total),
            3 => pagination.previous(total),
            _ => {
                pagination.clamp(total);
            }
        }
        let max_index = pagination.page_count(total).saturating_sub(1);
        assert!(
            u64::from(pagination.page_index) <= max_index,
            "step {step}, total {total}, index {}",
            pagination.page_index
        );
    }
}

#[test]
fn navigation_is_noop_at_boundaries() {
    let mut pagination = PaginationState::new(10);
    assert!(!pagination.can_previous());
    pagination.previous(25);
    assert_eq!(pagination.page_index, 0);

    pagination.last(25);
    assert_eq!(pagination.page_index, 2);
    assert!(!pagination.can_next(25));
    pagination.next(25);
    assert_eq!(pagination.page_index, 2);
}

#[test]
fn changing_page_size_resets_index_and_ignores_zero() {
    let mut pagination = PaginationState::new(5);
    pagination.last(40);
    assert_eq!(pagination.page_index, 7);

    pagination.set_page_size(10);
    assert_eq!(pagination, PaginationState { page_index: 0, page_size: 10 });

    pagination.last(40);
    pagination.set_page_size(0);
    assert_eq!(pagination, PaginationState { page_index: 3, page_size: 10 });
}

#[test]
fn clamp_pulls_index_back_when_rows_shrink() {
    let mut table = TableState::default();
    table.last_page(100);
    assert_eq!(table.pagination().page_index, 9);

    assert!(table.needs_clamp(15));
    assert!(table.clamp_page(15));
    assert_eq!(table.pagination().page_index, 1);
    assert!(!table.clamp_page(15));

    assert!(table.clamp_page(0));
    assert_eq!(table.pagination().page_index, 0);
}

#[test]
fn numeric_operator_filters_round_trip() {
    for op in NumericOperator::ALL {
        for value in ["18", "-3.5", "0", "1000"] {
            let encoded = NumericFilter::with_op(op, value).encode();
            assert_eq!(encoded, format!("{}:{value}", op.as_str()));

            let decoded = NumericFilter::decode(&encoded).expect("encoded filter should decode");
            assert_eq!(decoded.op, Some(op));
            assert_eq!(decoded.value, value);
        }
    }
}

#[test]
fn decode_rejects_unknown_operator() {
    assert!(NumericFilter::decode("~:5").is_err());
    assert_eq!(NumericFilter::decode("42"), Ok(NumericFilter::plain("42")));
}

#[test]
fn datetime_values_are_sent_as_calendar_dates() {
    let filters = vec![
        ColumnFilter::new("created_at", FilterValue::Date(fixed_now())),
        ColumnFilter::new("note", FilterValue::Text("2026-07-09T23:10:00Z".to_string())),
        ColumnFilter::new("label", FilterValue::Text("Tarde".to_string())),
    ];

    let params = build_fetch_params(&filters, &PaginationState::default(), &SortState::default());

    assert_eq!(params.filter("created_at"), Some("2026-03-04"));
    assert_eq!(params.filter("note"), Some("2026-07-09"));
    assert_eq!(params.filter("label"), Some("Tarde"));
}

#[test]
fn params_carry_paging_and_default_sort() {
    let mut pagination = PaginationState::new(5);
    pagination.next(30);
    pagination.next(30);

    let params = build_fetch_params(&[], &pagination, &SortState::default());
    assert_eq!(params.page, 3);
    assert_eq!(params.limit, 5);
    assert_eq!(params.order_by, "created_at");
    assert_eq!(params.order_dir, SortDirection::Desc);
    assert_eq!(params.offset(), 10);

    let unsorted = build_fetch_params(&[], &pagination, &SortState::new(None));
    assert_eq!(unsorted.order_by, "created_at");
    assert_eq!(unsorted.order_dir, SortDirection::Desc);

    let by_price = build_fetch_params(
        &[],
        &pagination,
        &SortState::new(Some(SortSpec::asc("price"))),
    );
    assert_eq!(by_price.order_by, "price");
    assert_eq!(by_price.order_dir, SortDirection::Asc);
}

#[test]
fn blank_filters_are_still_sent_but_select_all_is_not() {
    let filters = vec![
        ColumnFilter::new("name", FilterValue::Text(String::new())),
        ColumnFilter::new("role", FilterValue::Select(SELECT_ALL_VALUE.to_string())),
        ColumnFilter::new("status", FilterValue::Select("used".to_string())),
        ColumnFilter::new("active", FilterValue::Boolean(false)),
    ];

    let params = build_fetch_params(&filters, &PaginationState::default(), &SortState::default());

    assert_eq!(params.filter("name"), Some(""));
    assert_eq!(params.filter("role"), None);
    assert_eq!(params.filter("status"), Some("used"));
    assert_eq!(params.filter("active"), Some("false"));
}

#[test]
fn operator_key_is_not_a_filtered_column() {
    let filters = vec![ColumnFilter::new(
        "age",
        FilterValue::Number(NumericFilter::with_op(NumericOperator::Lt, "30")),
    )];
    let params = build_fetch_params(&filters, &PaginationState::default(), &SortState::default());

    let keys: Vec<&str> = params.filters.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["filter_age", "filter_age_op"]);
    assert_eq!(params.filtered_columns(), vec!["age"]);
}

#[test]
fn text_with_colon_is_sent_verbatim() {
    let filters = vec![
        ColumnFilter::new("note", FilterValue::Text(">=:18".to_string())),
        ColumnFilter::new("url", FilterValue::Text("https://ejemplo.com".to_string())),
    ];
    let params = build_fetch_params(&filters, &PaginationState::default(), &SortState::default());

    assert_eq!(params.filter("note"), Some(">=:18"));
    assert_eq!(params.filter_op("note"), None);
    assert_eq!(params.filter("url"), Some("https://ejemplo.com"));
    assert_eq!(params.filter_op("url"), None);
    assert_eq!(params.filtered_columns(), vec!["note", "url"]);
}

#[tokio::test]
async fn applied_text_filter_reaches_fetch_function() {
    let columns = vec![ColumnDescriptor::new("name", "Nombre").filter(FilterType::Text)];
    let mut table = TableState::default();
    table
        .add_filter(&columns, "name", fixed_now())
        .expect("name should be filterable");
    table
        .set_filter_raw(&columns, "name", "Ana")
        .expect("text value should be accepted");
    table.apply_filters();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let source = recording_source(seen.clone(), vec!["Ana".to_string()]);
    let mut coordinator = FetchCoordinator::<String>::new();

    assert!(fetch_into(&mut coordinator, &source, table.fetch_params()).await);

    let seen = seen.lock().expect("lock should not be poisoned");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].filter("name"), Some("Ana"));
    assert_eq!(seen[0].page, 1);
    assert_eq!(coordinator.data(), Some(&["Ana".to_string()][..]));
    assert_eq!(coordinator.total_count(), Some(1));
}

#[test]
fn operator_filter_splits_into_value_and_op() {
    let value = FilterValue::parse(FilterType::Number, ">=:18").expect("composite value should parse");
    let mut state = FilterState::default();
    state.add_filter("age", value).expect("add age");
    state.apply_draft();

    let params = build_fetch_params(state.active(), &PaginationState::default(), &SortState::default());

    assert_eq!(params.filter_op("age"), Some(">="));
    assert_eq!(params.filter("age"), Some("18"));
}

#[tokio::test]
async fn empty_result_renders_empty_state() {
    let source = FnSource::new(|_params: FetchParams| async {
        Ok::<_, FetchError>(FetchResult::<String>::new(Vec::new(), 0))
    });
    let mut coordinator = FetchCoordinator::<String>::new();
    let pagination = PaginationState::default();

    fetch_into(&mut coordinator, &source, FetchParams::default()).await;

    assert_eq!(body_state(&coordinator, &pagination), BodyState::Empty);
    assert_eq!(coordinator.total_count(), Some(0));
}

#[tokio::test]
async fn rejected_fetch_shows_error_then_retry_populates() {
    let healthy = Arc::new(AtomicBool::new(false));
    let flag = healthy.clone();
    let source = FnSource::new(move |_params: FetchParams| {
        let ok = flag.load(Ordering::SeqCst);
        async move {
            if ok {
                Ok(FetchResult::new(vec!["fila".to_string()], 1))
            } else {
                Err(FetchError::other("servicio no disponible"))
            }
        }
    });
    let mut coordinator = FetchCoordinator::<String>::new();
    let pagination = PaginationState::default();

    fetch_into(&mut coordinator, &source, FetchParams::default()).await;

    assert!(matches!(
        body_state(&coordinator, &pagination),
        BodyState::Error { .. }
    ));
    assert!(coordinator.data().is_none());
    assert!(coordinator.total_count().is_none());

    healthy.store(true, Ordering::SeqCst);
    let ticket = coordinator.refetch().expect("a fetch was issued before");
    let (token, outcome) = execute(&source, ticket).await;
    assert!(coordinator.complete(token, outcome));

    assert_eq!(
        body_state(&coordinator, &pagination),
        BodyState::Populated { rows: 1 }
    );
    assert!(coordinator.error().is_none());
}

#[test]
fn failure_keeps_previous_rows() {
    let mut coordinator = FetchCoordinator::new();
    let first = coordinator.begin(FetchParams::default());
    coordinator.complete(first.token, Ok(FetchResult::new(vec![1, 2, 3], 3)));

    let second = coordinator.begin(FetchParams::default());
    coordinator.complete(second.token, Err(FetchError::Backend("timeout".to_string())));

    assert_eq!(coordinator.data(), Some(&[1, 2, 3][..]));
    assert_eq!(coordinator.total_count(), Some(3));
    assert_eq!(
        coordinator.error(),
        Some(&FetchError::Backend("timeout".to_string()))
    );
}

#[test]
fn stale_responses_are_discarded() {
    let mut coordinator = FetchCoordinator::new();
    let slow = coordinator.begin(FetchParams::default());
    let fast = coordinator.begin(FetchParams {
        page: 2,
        ..FetchParams::default()
    });

    assert!(coordinator.complete(fast.token, Ok(FetchResult::new(vec!["nuevo"], 11))));
    assert!(!coordinator.complete(slow.token, Ok(FetchResult::new(vec!["viejo"], 10))));

    assert_eq!(coordinator.data(), Some(&["nuevo"][..]));
    assert_eq!(coordinator.total_count(), Some(11));
    assert!(!coordinator.is_loading());
}

#[test]
fn loading_persists_until_latest_fetch_resolves() {
    let mut coordinator = FetchCoordinator::<u8>::new();
    let pagination = PaginationState::new(5);
    let first = coordinator.begin(FetchParams::default());
    let second = coordinator.begin(FetchParams::default());

    assert!(!coordinator.complete(first.token, Ok(FetchResult::new(vec![1], 1))));
    assert!(coordinator.is_loading());
    assert_eq!(
        body_state(&coordinator, &pagination),
        BodyState::Loading { skeleton_rows: 5 }
    );

    assert!(coordinator.complete(second.token, Ok(FetchResult::new(vec![2], 1))));
    assert!(!coordinator.is_loading());
    assert_eq!(coordinator.data(), Some(&[2][..]));
}

#[test]
fn refetch_before_any_fetch_is_none() {
    let mut coordinator = FetchCoordinator::<u8>::new();
    assert!(coordinator.refetch().is_none());
    assert!(!coordinator.is_loading());
}

#[test]
fn sort_cycles_through_directions_per_column() {
    let mut sort = SortState::new(None);

    sort.toggle("price");
    assert_eq!(sort.current(), Some(&SortSpec::asc("price")));
    sort.toggle("price");
    assert_eq!(sort.current(), Some(&SortSpec::desc("price")));
    sort.toggle("price");
    assert_eq!(sort.current(), Some(&SortSpec::asc("price")));

    sort.toggle("code");
    assert_eq!(sort.current(), Some(&SortSpec::asc("code")));
    assert_eq!(sort.direction_for("price"), None);
}

#[test]
fn default_sort_is_newest_first_and_header_toggle_flips_it() {
    let columns = voucher_columns();
    let mut table = TableState::default();
    assert_eq!(table.sort().current(), Some(&SortSpec::desc("created_at")));

    let created = columns
        .iter()
        .find(|column| column.resolved_id() == Some("created_at"))
        .expect("created_at column");
    table.toggle_sort(created);

    assert_eq!(table.sort().current(), Some(&SortSpec::asc("created_at")));
}

#[test]
fn unsortable_columns_ignore_header_clicks() {
    let column = ColumnDescriptor::new("email", "Correo").unsortable();
    let mut table = TableState::default();

    table.toggle_sort(&column);

    assert_eq!(table.sort().current(), Some(&SortSpec::desc("created_at")));
}

#[test]
fn voucher_email_resolves_by_accessor_and_is_not_sortable() {
    let columns = voucher_columns();
    let email = columns
        .iter()
        .find(|column| column.resolved_id() == Some("email"))
        .expect("email column");
    assert!(email.id.is_none());
    assert!(!email.sortable);

    let mut table = TableState::default();
    table.toggle_sort(email);
    assert_eq!(table.sort().current(), Some(&SortSpec::desc("created_at")));
}

#[test]
fn badges_format_each_filter_type() {
    let columns = people_columns();
    let builder = FilterBuilder::new(&columns);
    let mut state = FilterState::default();
    for (id, value) in [
        ("name", FilterValue::Text("Ana".to_string())),
        ("active", FilterValue::Boolean(false)),
        ("created_at", FilterValue::Date(fixed_now())),
        (
            "age",
            FilterValue::Number(NumericFilter::with_op(NumericOperator::Gte, "18")),
        ),
        ("role", FilterValue::Select("admin".to_string())),
        ("ghost", FilterValue::Boolean(true)),
    ] {
        state.add_filter(id, value).expect("distinct ids");
    }
    state.apply_draft();

    let badges: Vec<(String, String)> = builder
        .badges(&state)
        .into_iter()
        .map(|badge| (badge.label, badge.text))
        .collect();

    assert_eq!(
        badges,
        vec![
            ("Nombre".to_string(), "Ana".to_string()),
            ("Activo".to_string(), "Inactivo".to_string()),
            ("Creado".to_string(), "04/03/2026".to_string()),
            ("Edad".to_string(), "≥ 18".to_string()),
            ("Rol".to_string(), "Administrador".to_string()),
            ("ghost".to_string(), "Sí".to_string()),
        ]
    );
}

#[test]
fn badges_come_from_active_set_not_draft() {
    let columns = people_columns();
    let builder = FilterBuilder::new(&columns);
    let mut state = FilterState::default();
    state
        .add_filter("name", FilterValue::Text("Ana".to_string()))
        .expect("add name");

    assert!(builder.badges(&state).is_empty());
    state.apply_draft();
    assert_eq!(builder.badges(&state).len(), 1);
}

#[test]
fn column_identity_falls_back_through_accessor_and_header() {
    let by_accessor = ColumnDescriptor::accessor("email", "Correo");
    assert_eq!(by_accessor.resolved_id(), Some("email"));

    let mut by_header = ColumnDescriptor::accessor("x", "Estado");
    by_header.accessor_key = None;
    assert_eq!(by_header.resolved_id(), Some("Estado"));

    by_header.header = String::new();
    assert_eq!(by_header.resolved_id(), None);

    let columns = vec![by_accessor];
    assert_eq!(column_label(&columns, "email"), "Correo");
    assert_eq!(column_label(&columns, "deleted_column"), "deleted_column");
}

#[test]
fn editor_matches_column_type_with_value_fallback() {
    let columns = people_columns();
    let builder = FilterBuilder::new(&columns);

    let age = ColumnFilter::new(
        "age",
        FilterValue::Number(NumericFilter::with_op(NumericOperator::Eq, "0")),
    );
    match builder.editor_for(&age) {
        FilterEditor::Number { options, operators } => {
            assert!(operators);
            assert_eq!(options.max, Some(120.0));
        }
        other => panic!("expected number editor, got {other:?}"),
    }

    let orphan = ColumnFilter::new("orphan", FilterValue::Boolean(true));
    assert_eq!(
        builder.editor_for(&orphan),
        FilterEditor::Boolean(Default::default())
    );
    assert_eq!(builder.label("orphan"), "orphan");
}

#[test]
fn raw_values_are_decoded_per_column_type() {
    let columns = people_columns();
    let mut table = TableState::default();
    for id in ["age", "active", "created_at"] {
        table.add_filter(&columns, id, fixed_now()).expect("add filter");
    }

    table
        .set_filter_raw(&columns, "age", "<:65")
        .expect("operator value");
    table
        .set_filter_raw(&columns, "active", "false")
        .expect("boolean value");
    table
        .set_filter_raw(&columns, "created_at", "2026-05-01")
        .expect("date value");

    let drafts = table.filters();
    assert_eq!(
        drafts.draft_value("age"),
        Some(&FilterValue::Number(NumericFilter::with_op(NumericOperator::Lt, "65")))
    );
    assert_eq!(drafts.draft_value("active"), Some(&FilterValue::Boolean(false)));
    assert!(matches!(
        drafts.draft_value("created_at"),
        Some(FilterValue::Date(date)) if date.format("%Y-%m-%d").to_string() == "2026-05-01"
    ));

    assert!(matches!(
        table.set_filter_raw(&columns, "active", "maybe"),
        Err(FilterError::InvalidValue { .. })
    ));
    assert_eq!(
        table.set_filter_raw(&columns, "name", "Ana"),
        Err(FilterError::MissingFilter("name".to_string()))
    );
}

#[test]
fn draft_edits_do_not_change_fetch_params_until_applied() {
    let columns = people_columns();
    let mut table = TableState::default();
    let before = table.fetch_params();

    table.add_filter(&columns, "name", fixed_now()).expect("add name");
    table
        .set_filter_raw(&columns, "name", "Luis")
        .expect("set name");
    assert_eq!(table.fetch_params(), before);
    assert!(table.filters().is_dirty());

    table.apply_filters();
    assert_eq!(table.fetch_params().filter("name"), Some("Luis"));
}

#[test]
fn range_label_describes_visible_rows() {
    let mut pagination = PaginationState::new(10);
    assert_eq!(range_label(&pagination, 0), "0 resultados");
    assert_eq!(range_label(&pagination, 23), "Mostrando 1–10 de 23");
    pagination.last(23);
    assert_eq!(range_label(&pagination, 23), "Mostrando 21–23 de 23");
}

#[test]
fn settings_defaults_and_overrides() {
    let defaults = TableSettings::parse("").expect("empty settings should parse");
    assert_eq!(defaults, TableSettings::default());
    assert_eq!(defaults.page_size_options, vec![5, 10]);
    assert_eq!(defaults.default_sort, SortSpec::desc("created_at"));

    let custom = TableSettings::parse(
        r#"
        page_size_options = [20, 50]
        default_page_size = 10

        [default_sort]
        column_id = "price"
        "#,
    )
    .expect("custom settings should parse");
    assert_eq!(custom.default_page_size, 20);
    assert_eq!(custom.default_sort, SortSpec::asc("price"));

    let table = TableState::from_settings(&custom);
    assert_eq!(table.pagination().page_size, 20);
    assert_eq!(table.page_size_options(), &[20, 50]);
}

#[test]
fn settings_reject_zero_page_size() {
    let result = TableSettings::parse("page_size_options = [0, 10]");
    assert!(result.is_err(), "zero page size should be rejected");
}

#[test]
fn settings_load_missing_file_uses_defaults() {
    let temp_dir = unique_test_dir("settings-missing");
    let loaded = TableSettings::load(&temp_dir.join("settings.toml"))
        .expect("missing file should fall back to defaults");
    assert_eq!(loaded, TableSettings::default());
}

#[test]
fn fetch_params_serialize_flat() {
    let filters = vec![ColumnFilter::new("name", FilterValue::Text("Ana".to_string()))];
    let params = build_fetch_params(&filters, &PaginationState::default(), &SortState::default());

    let json = serde_json::to_value(&params).expect("params should serialize");

    assert_eq!(json["page"], 1);
    assert_eq!(json["limit"], 10);
    assert_eq!(json["order_by"], "created_at");
    assert_eq!(json["order_dir"], "desc");
    assert_eq!(json["filter_name"], "Ana");
}

#[test]
fn style_helpers_keep_sticky_header_and_scroll() {
    let header = table_header_cell_style(true);
    assert!(header.contains("position: sticky"));
    assert!(header.contains("cursor: pointer"));
    assert!(table_header_cell_style(false).contains("cursor: default"));
    assert!(table_container_style().contains("overflow: auto"));
    assert!(skeleton_cell_style().contains("color: transparent"));
}

#[test]
fn voucher_query_rejects_unknown_columns() {
    let mut params = FetchParams::default();
    params
        .filters
        .insert("filter_password".to_string(), "x".to_string());

    assert_eq!(
        build_voucher_query(&params),
        Err(InvalidFilter::UnknownColumn("password".to_string()))
    );
}

#[test]
fn voucher_query_falls_back_to_created_at_for_unknown_order() {
    let params = FetchParams {
        order_by: "drop table".to_string(),
        order_dir: SortDirection::Asc,
        ..FetchParams::default()
    };

    let query = build_voucher_query(&params).expect("query should build");

    assert_eq!(query.order_sql, "created_at ASC, id ASC");
    assert_eq!(query.where_sql, "1 = 1");
}

fn seeded_source(prefix: &str) -> (PathBuf, SqliteVoucherSource) {
    let temp_dir = unique_test_dir(prefix);
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let source = SqliteVoucherSource::new(temp_dir.join("vouchers.sqlite"));
    let seeded = source.init(40).expect("database should initialize");
    assert_eq!(seeded, 40);
    (temp_dir, source)
}

fn params_with(filters: &[(&str, &str)]) -> FetchParams {
    let mut params = FetchParams::default();
    for (key, value) in filters {
        params.filters.insert(key.to_string(), value.to_string());
    }
    params
}

#[tokio::test]
async fn sqlite_source_pages_and_counts() {
    let (temp_dir, source) = seeded_source("paging");

    let first = source
        .fetch(&FetchParams::default())
        .await
        .expect("first page should load");
    assert_eq!(first.total_count, 40);
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.data[0].code, "CERT-00040");

    let last = source
        .fetch(&FetchParams {
            page: 4,
            ..FetchParams::default()
        })
        .await
        .expect("last page should load");
    assert_eq!(last.data.len(), 10);
    assert_eq!(last.data[9].code, "CERT-00001");

    assert_eq!(source.init(40).expect("re-init should succeed"), 0);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn sqlite_source_applies_each_filter_kind() {
    let (temp_dir, source) = seeded_source("filters");

    let cases: Vec<(Vec<(&str, &str)>, u64)> = vec![
        (vec![("filter_status", VoucherStatus::Used.as_str())], 10),
        (vec![("filter_is_paid", "true")], 26),
        (vec![("filter_price", "200"), ("filter_price_op", ">=")], 9),
        (vec![("filter_code", "cert-0000")], 9),
        (vec![("filter_created_at", "2026-01-05")], 1),
        (vec![("filter_email", "")], 40),
        (vec![("filter_email", "candidato1@")], 1),
        (vec![("filter_email", "candidato1_@")], 0),
        (vec![("filter_email", "%")], 0),
        (vec![("filter_code", "cert_0000")], 0),
        (vec![("filter_code", "\\")], 0),
    ];

    for (filters, expected) in cases {
        let result = source
            .fetch(&params_with(&filters))
            .await
            .expect("filtered query should succeed");
        assert_eq!(result.total_count, expected, "filters {filters:?}");
    }

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn sqlite_source_sorts_by_requested_column() {
    let (temp_dir, source) = seeded_source("sorting");

    let result = source
        .fetch(&FetchParams {
            order_by: "price".to_string(),
            order_dir: SortDirection::Asc,
            limit: 40,
            ..FetchParams::default()
        })
        .await
        .expect("sorted query should succeed");

    let prices: Vec<f64> = result.data.iter().map(|voucher| voucher.price).collect();
    assert!(prices.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(prices[0], 50.0);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn sqlite_source_reports_bad_params() {
    let (temp_dir, source) = seeded_source("bad-params");

    let unknown = source
        .fetch(&params_with(&[("filter_secret", "1")]))
        .await;
    assert!(matches!(unknown, Err(FetchError::InvalidParams(_))));

    let bad_number = source
        .fetch(&params_with(&[("filter_price", "abc")]))
        .await;
    assert!(matches!(bad_number, Err(FetchError::InvalidParams(_))));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn table_state_drives_sqlite_source_end_to_end() {
    let (temp_dir, source) = seeded_source("end-to-end");
    let columns = voucher_columns();
    let mut table = TableState::default();
    let mut coordinator = FetchCoordinator::<Voucher>::new();

    table
        .add_filter(&columns, "status", fixed_now())
        .expect("status is filterable");
    table
        .set_filter_raw(&columns, "status", "expired")
        .expect("status value");
    table.apply_filters();
    table.set_page_size(5);

    assert!(fetch_into(&mut coordinator, &source, table.fetch_params()).await);
    let total = coordinator.total_count().expect("total after fetch");
    assert_eq!(total, 10);
    assert_eq!(
        body_state(&coordinator, table.pagination()),
        BodyState::Populated { rows: 5 }
    );

    table.last_page(total);
    assert!(fetch_into(&mut coordinator, &source, table.fetch_params()).await);
    assert_eq!(table.fetch_params().page, 2);
    assert!(coordinator
        .data()
        .expect("rows")
        .iter()
        .all(|voucher| voucher.status == VoucherStatus::Expired));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn text_filters_match_like_wildcards_literally() {
    let query = build_voucher_query(&params_with(&[("filter_email", "50%_off\\")]))
        .expect("text filter should build");

    assert_eq!(query.where_sql, "LOWER(email) LIKE ? ESCAPE '\\'");
    assert_eq!(
        query.params,
        vec![rusqlite::types::Value::Text("%50\\%\\_off\\\\%".to_string())]
    );
}

#[tokio::test]
async fn blocking_calls_report_panics_as_errors() {
    let value = run_blocking("sum", || 2 + 2)
        .await
        .expect("closure should complete");
    assert_eq!(value, 4);

    let failed = run_blocking("boom", || -> u32 { panic!("query worker crashed") }).await;
    assert!(failed.is_err_and(|err| err.is_panic()));
}
