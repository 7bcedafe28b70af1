use std::sync::Arc;

use chrono::Utc;
use dioxus::prelude::*;

use crate::domain::entities::column::ColumnDescriptor;
use crate::domain::entities::filter::{
    ColumnFilter, FilterValue, NumericFilter, NumericOperator, SELECT_ALL_VALUE,
};
use crate::domain::entities::table::{SortDirection, TableRow};
use crate::domain::entities::voucher::Voucher;
use crate::infra::config::settings::TableSettings;
use crate::ui::state::app_state::AppState;
use crate::ui::state::table_state::{body_state, range_label, BodyState, TableState};
use crate::usecase::ports::fetch::RowSource;
use crate::usecase::services::fetch_coordinator::{execute, FetchCoordinator, FetchTicket};
use crate::usecase::services::filter_builder::{FilterBuilder, FilterEditor, FilterError};

/// Root context handed to the desktop launcher.
#[derive(Clone)]
pub struct AppContext {
    pub settings: TableSettings,
    pub columns: Vec<ColumnDescriptor>,
    pub source: Arc<dyn RowSource<Voucher>>,
}

pub fn table_container_style() -> &'static str {
    "flex: 1; min-height: 0; overflow: auto; border: 1px solid #ddd; border-radius: 6px;"
}

pub fn table_header_cell_style(sortable: bool) -> String {
    format!(
        "position: sticky; top: 0; z-index: 1; background: #f4f4f4; border: 1px solid #bbb; padding: 6px; text-align: left; cursor: {};",
        if sortable { "pointer" } else { "default" }
    )
}

pub fn skeleton_cell_style() -> &'static str {
    "border: 1px solid #eee; padding: 6px; background: linear-gradient(90deg, #eee, #f6f6f6, #eee); color: transparent;"
}

fn sort_indicator(direction: Option<SortDirection>) -> &'static str {
    match direction {
        Some(SortDirection::Asc) => " ▲",
        Some(SortDirection::Desc) => " ▼",
        None => "",
    }
}

fn report(result: Result<(), FilterError>) {
    if let Err(err) = result {
        tracing::warn!(error = %err, "filter edit rejected");
    }
}

/// Sends `ticket` to the source and commits the outcome when it is still
/// the latest request. Pulls the page index back in range afterwards.
fn dispatch(
    source: Arc<dyn RowSource<Voucher>>,
    mut coordinator: Signal<FetchCoordinator<Voucher>>,
    mut table: Signal<TableState>,
    ticket: FetchTicket,
) {
    spawn(async move {
        let (token, outcome) = execute(source.as_ref(), ticket).await;
        if !coordinator.write().complete(token, outcome) {
            return;
        }
        let total = coordinator.peek().total_count();
        if let Some(total) = total {
            if table.peek().needs_clamp(total) {
                table.write().clamp_page(total);
            }
        }
    });
}

#[component]
pub fn App() -> Element {
    let ctx = use_context::<AppContext>();
    let AppState {
        table,
        mut coordinator,
        new_filter_column,
    } = AppState::new(&ctx.settings);

    let columns = ctx.columns.clone();
    let source_for_effect = ctx.source.clone();
    let source_for_retry = ctx.source.clone();

    let params = use_memo(move || table.read().fetch_params());
    use_effect(move || {
        let ticket = coordinator.write().begin(params());
        dispatch(source_for_effect.clone(), coordinator, table, ticket);
    });

    let snapshot = coordinator.read();
    let table_snapshot = table.read();
    let total_count = snapshot.total_count().unwrap_or_default();
    let body = body_state(&snapshot, table_snapshot.pagination());
    let rows: Vec<Vec<String>> = snapshot
        .data()
        .unwrap_or_default()
        .iter()
        .map(|voucher| {
            columns
                .iter()
                .map(|column| voucher.cell(column.resolved_id().unwrap_or_default()))
                .collect()
        })
        .collect();
    let page_size = table_snapshot.pagination().page_size;
    let header_cells: Vec<(ColumnDescriptor, Option<SortDirection>)> = columns
        .iter()
        .map(|column| {
            let direction = column
                .resolved_id()
                .and_then(|id| table_snapshot.sort().direction_for(id));
            (column.clone(), direction)
        })
        .collect();
    drop(table_snapshot);
    drop(snapshot);

    rsx! {
        div {
            style: "height: 100vh; display: flex; flex-direction: column; gap: 8px; padding: 12px; box-sizing: border-box; overflow: hidden; font-family: sans-serif;",
            h2 { style: "margin: 0;", "Vouchers" }
            FilterPanel { table, columns: columns.clone(), new_filter_column }
            ActiveFilterBadges { table, columns: columns.clone() }
            div {
                style: "{table_container_style()}",
                table { style: "border-collapse: collapse; width: 100%; background: #fff;",
                    thead {
                        tr {
                            for (column, direction) in header_cells {
                                HeaderCell { table, column, direction }
                            }
                        }
                    }
                    TableBody {
                        body,
                        rows,
                        column_count: columns.len(),
                        page_size,
                        on_retry: move |_| {
                            let ticket = coordinator.write().refetch();
                            if let Some(ticket) = ticket {
                                dispatch(source_for_retry.clone(), coordinator, table, ticket);
                            }
                        },
                    }
                }
            }
            PaginationBar { table, total_count }
        }
    }
}

#[component]
fn HeaderCell(
    mut table: Signal<TableState>,
    column: ColumnDescriptor,
    direction: Option<SortDirection>,
) -> Element {
    let sortable = column.sortable;
    let header = column.header.clone();
    let indicator = sort_indicator(direction);

    rsx! {
        th {
            style: "{table_header_cell_style(sortable)}",
            onclick: move |_| table.write().toggle_sort(&column),
            "{header}{indicator}"
        }
    }
}

#[component]
fn TableBody(
    body: BodyState,
    rows: Vec<Vec<String>>,
    column_count: usize,
    page_size: u32,
    on_retry: EventHandler<()>,
) -> Element {
    let span = column_count.max(1);
    match body {
        BodyState::Loading { skeleton_rows } => rsx! {
            tbody {
                for row_idx in 0..skeleton_rows {
                    tr { key: "skeleton-{row_idx}",
                        for col_idx in 0..span {
                            td { key: "{col_idx}", style: "{skeleton_cell_style()}", "·" }
                        }
                    }
                }
            }
        },
        BodyState::Error { message } => rsx! {
            tbody {
                tr {
                    td { colspan: "{span}", style: "padding: 16px; color: #b22;",
                        p { "No se pudieron cargar los datos." }
                        p { style: "font-size: 12px; color: #777;", "{message}" }
                        button { onclick: move |_| on_retry.call(()), "Intentar de nuevo" }
                    }
                }
            }
        },
        BodyState::Empty => rsx! {
            tbody {
                tr {
                    td { colspan: "{span}", style: "padding: 16px; text-align: center; color: #777;",
                        "No se encontraron resultados."
                    }
                }
            }
        },
        BodyState::Populated { .. } => rsx! {
            tbody {
                for (row_idx, row) in rows.into_iter().take(page_size as usize).enumerate() {
                    tr { key: "{row_idx}",
                        for (col_idx, value) in row.into_iter().enumerate() {
                            td { key: "{col_idx}", style: "border: 1px solid #bbb; padding: 4px;", "{value}" }
                        }
                    }
                }
            }
        },
    }
}

#[component]
fn FilterPanel(
    mut table: Signal<TableState>,
    columns: Vec<ColumnDescriptor>,
    mut new_filter_column: Signal<Option<String>>,
) -> Element {
    let state = table.read();
    let builder = FilterBuilder::new(&columns);
    let available: Vec<(String, String)> = builder
        .available_columns(state.filters())
        .into_iter()
        .filter_map(|column| {
            column
                .resolved_id()
                .map(|id| (id.to_string(), column.header.clone()))
        })
        .collect();
    let drafts: Vec<ColumnFilter> = state.filters().draft().to_vec();
    let is_dirty = state.filters().is_dirty();
    drop(state);

    let selected = new_filter_column().unwrap_or_default();
    let columns_for_add = columns.clone();

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 6px; padding: 8px; border: 1px solid #ddd; border-radius: 6px;",
            div { style: "display: flex; gap: 8px; align-items: center;",
                select {
                    value: "{selected}",
                    onchange: move |event| {
                        let value = event.value();
                        new_filter_column.set(if value.is_empty() { None } else { Some(value) });
                    },
                    option { value: "", "Seleccionar columna" }
                    for (id, label) in available {
                        option { key: "{id}", value: "{id}", "{label}" }
                    }
                }
                button {
                    disabled: selected.is_empty(),
                    onclick: move |_| {
                        let Some(column_id) = new_filter_column() else {
                            return;
                        };
                        report(table.write().add_filter(&columns_for_add, &column_id, Utc::now()));
                        new_filter_column.set(None);
                    },
                    "Agregar filtro"
                }
                if is_dirty {
                    span { style: "color: #b60; font-size: 12px;", "Cambios sin aplicar" }
                }
            }
            for filter in drafts {
                FilterRow { key: "{filter.id}", table, columns: columns.clone(), filter: filter.clone() }
            }
            div { style: "display: flex; gap: 8px;",
                button { onclick: move |_| table.write().apply_filters(), "Aplicar filtros" }
                button { onclick: move |_| table.write().reset_draft(), "Restablecer" }
                button { onclick: move |_| table.write().clear_filters(), "Limpiar todo" }
            }
        }
    }
}

#[component]
fn FilterRow(
    mut table: Signal<TableState>,
    columns: Vec<ColumnDescriptor>,
    filter: ColumnFilter,
) -> Element {
    let builder = FilterBuilder::new(&columns);
    let label = builder.label(&filter.id);
    let editor = builder.editor_for(&filter);
    let column_id = filter.id.clone();
    let remove_id = filter.id.clone();

    rsx! {
        div { style: "display: flex; gap: 8px; align-items: center;",
            span { style: "min-width: 120px;", "{label}" }
            FilterValueEditor { table, columns, column_id, editor, value: filter.value }
            button { onclick: move |_| { table.write().remove_filter(&remove_id); }, "✕" }
        }
    }
}

#[component]
fn FilterValueEditor(
    mut table: Signal<TableState>,
    columns: Vec<ColumnDescriptor>,
    column_id: String,
    editor: FilterEditor,
    value: FilterValue,
) -> Element {
    let raw = value.raw();
    let mut set_raw = {
        let column_id = column_id.clone();
        move |raw: String| report(table.write().set_filter_raw(&columns, &column_id, &raw))
    };

    match editor {
        FilterEditor::Text => rsx! {
            input {
                r#type: "text",
                value: "{raw}",
                oninput: move |event| set_raw(event.value()),
            }
        },
        FilterEditor::Boolean(options) => rsx! {
            select {
                value: "{raw}",
                onchange: move |event| set_raw(event.value()),
                option { value: "true", "{options.true_label}" }
                option { value: "false", "{options.false_label}" }
            }
        },
        FilterEditor::Date => {
            let date = match &value {
                FilterValue::Date(date) => date.format("%Y-%m-%d").to_string(),
                _ => String::new(),
            };
            rsx! {
                input {
                    r#type: "date",
                    value: "{date}",
                    onchange: move |event| set_raw(event.value()),
                }
            }
        }
        FilterEditor::Select(options) => rsx! {
            select {
                value: "{raw}",
                onchange: move |event| set_raw(event.value()),
                option { value: SELECT_ALL_VALUE, "Todos" }
                for option in options {
                    option { key: "{option.value}", value: "{option.value}", "{option.label}" }
                }
            }
        },
        FilterEditor::Number { options, operators } => {
            let numeric = match &value {
                FilterValue::Number(numeric) => numeric.clone(),
                _ => NumericFilter::plain(""),
            };
            let min = options.min.map(|min| min.to_string()).unwrap_or_default();
            let max = options.max.map(|max| max.to_string()).unwrap_or_default();
            let step = options.step.map(|step| step.to_string()).unwrap_or_else(|| "any".to_string());
            let current_op = numeric.op.unwrap_or(NumericOperator::Eq);
            let op_value = current_op.as_str();
            let op_choices: Vec<(&str, &str)> = NumericOperator::ALL
                .into_iter()
                .map(|op| (op.as_str(), op.label()))
                .collect();
            let number_text = numeric.value.clone();
            let id_for_op = column_id.clone();
            let id_for_value = column_id.clone();
            let number_for_op = numeric.value.clone();

            rsx! {
                if operators {
                    select {
                        value: "{op_value}",
                        onchange: move |event| {
                            let Ok(op) = event.value().parse::<NumericOperator>() else {
                                return;
                            };
                            table.write().update_filter_value(
                                &id_for_op,
                                FilterValue::Number(NumericFilter::with_op(op, number_for_op.clone())),
                            );
                        },
                        for (token, label) in op_choices {
                            option { key: "{token}", value: "{token}", "{label}" }
                        }
                    }
                }
                input {
                    r#type: "number",
                    value: "{number_text}",
                    min: "{min}",
                    max: "{max}",
                    step: "{step}",
                    oninput: move |event| {
                        let next = if operators {
                            NumericFilter::with_op(current_op, event.value())
                        } else {
                            NumericFilter::plain(event.value())
                        };
                        table.write().update_filter_value(&id_for_value, FilterValue::Number(next));
                    },
                }
            }
        }
    }
}

#[component]
fn ActiveFilterBadges(table: Signal<TableState>, columns: Vec<ColumnDescriptor>) -> Element {
    let badges = FilterBuilder::new(&columns).badges(table.read().filters());
    if badges.is_empty() {
        return rsx! {};
    }

    rsx! {
        div { style: "display: flex; gap: 6px; flex-wrap: wrap;",
            for badge in badges {
                FilterBadgeChip {
                    key: "{badge.column_id}",
                    table,
                    column_id: badge.column_id.clone(),
                    text: format!("{}: {}", badge.label, badge.text),
                }
            }
        }
    }
}

#[component]
fn FilterBadgeChip(mut table: Signal<TableState>, column_id: String, text: String) -> Element {
    rsx! {
        span {
            style: "background: #eef4ff; border: 1px solid #9ab; border-radius: 12px; padding: 2px 8px; font-size: 12px;",
            "{text} "
            button {
                style: "border: none; background: transparent; cursor: pointer;",
                onclick: move |_| {
                    table.write().remove_filter(&column_id);
                },
                "✕"
            }
        }
    }
}

#[component]
fn PaginationBar(mut table: Signal<TableState>, total_count: u64) -> Element {
    let state = table.read();
    let pagination = *state.pagination();
    let options = state.page_size_options().to_vec();
    drop(state);

    let page_count = pagination.page_count(total_count).max(1);
    let current_page = pagination.page_index + 1;
    let label = range_label(&pagination, total_count);
    let can_previous = pagination.can_previous();
    let can_next = pagination.can_next(total_count);

    rsx! {
        div { style: "display: flex; gap: 8px; align-items: center; justify-content: space-between;",
            span { "{label}" }
            div { style: "display: flex; gap: 6px; align-items: center;",
                span { "Filas por página" }
                select {
                    value: "{pagination.page_size}",
                    onchange: move |event| {
                        if let Ok(size) = event.value().parse::<u32>() {
                            table.write().set_page_size(size);
                        }
                    },
                    for size in options {
                        option { key: "{size}", value: "{size}", "{size}" }
                    }
                }
                button { disabled: !can_previous, onclick: move |_| table.write().first_page(), "«" }
                button { disabled: !can_previous, onclick: move |_| table.write().previous_page(total_count), "‹" }
                span { "Página {current_page} de {page_count}" }
                button { disabled: !can_next, onclick: move |_| table.write().next_page(total_count), "›" }
                button { disabled: !can_next, onclick: move |_| table.write().last_page(total_count), "»" }
            }
        }
    }
}
