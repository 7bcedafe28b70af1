use chrono::{DateTime, Utc};

use crate::domain::entities::column::ColumnDescriptor;
use crate::domain::entities::filter::FilterValue;
use crate::domain::entities::table::{FetchParams, PaginationState, SortState};
use crate::infra::config::settings::TableSettings;
use crate::usecase::services::fetch_coordinator::{build_fetch_params, FetchCoordinator};
use crate::usecase::services::filter_builder::{FilterBuilder, FilterError, FilterState};

/// What the table body shows, derived only from coordinator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyState {
    Loading { skeleton_rows: u32 },
    Error { message: String },
    Empty,
    Populated { rows: usize },
}

pub fn body_state<T>(coordinator: &FetchCoordinator<T>, pagination: &PaginationState) -> BodyState {
    if coordinator.is_loading() {
        return BodyState::Loading {
            skeleton_rows: pagination.page_size,
        };
    }
    if let Some(err) = coordinator.error() {
        return BodyState::Error {
            message: err.to_string(),
        };
    }
    match coordinator.data() {
        None => BodyState::Loading {
            skeleton_rows: pagination.page_size,
        },
        Some([]) => BodyState::Empty,
        Some(rows) => BodyState::Populated { rows: rows.len() },
    }
}

pub fn range_label(pagination: &PaginationState, total_count: u64) -> String {
    match pagination.visible_range(total_count) {
        Some((start, end)) => format!("Mostrando {start}–{end} de {total_count}"),
        None => "0 resultados".to_string(),
    }
}

/// Filters, pagination and sort owned by one table instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    filters: FilterState,
    pagination: PaginationState,
    sort: SortState,
    page_size_options: Vec<u32>,
}

impl Default for TableState {
    fn default() -> Self {
        TableState::from_settings(&TableSettings::default())
    }
}

impl TableState {
    pub fn from_settings(settings: &TableSettings) -> Self {
        Self {
            filters: FilterState::default(),
            pagination: PaginationState::new(settings.default_page_size),
            sort: SortState::new(Some(settings.default_sort.clone())),
            page_size_options: settings.page_size_options.clone(),
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn page_size_options(&self) -> &[u32] {
        &self.page_size_options
    }

    pub fn fetch_params(&self) -> FetchParams {
        build_fetch_params(self.filters.active(), &self.pagination, &self.sort)
    }

    pub fn add_filter(
        &mut self,
        columns: &[ColumnDescriptor],
        column_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), FilterError> {
        FilterBuilder::new(columns).add(&mut self.filters, column_id, now)
    }

    pub fn set_filter_raw(
        &mut self,
        columns: &[ColumnDescriptor],
        column_id: &str,
        raw: &str,
    ) -> Result<(), FilterError> {
        FilterBuilder::new(columns).set_raw_value(&mut self.filters, column_id, raw)
    }

    pub fn update_filter_value(&mut self, column_id: &str, value: FilterValue) -> bool {
        self.filters.update_filter_value(column_id, value)
    }

    pub fn remove_filter(&mut self, column_id: &str) -> bool {
        self.filters.remove_filter(column_id)
    }

    pub fn apply_filters(&mut self) {
        self.filters.apply_draft();
        self.pagination.first();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear_all();
        self.pagination.first();
    }

    pub fn reset_draft(&mut self) {
        self.filters.reset_draft();
    }

    pub fn toggle_sort(&mut self, column: &ColumnDescriptor) {
        if !column.sortable {
            return;
        }
        if let Some(id) = column.resolved_id() {
            self.sort.toggle(id);
        }
    }

    pub fn first_page(&mut self) {
        self.pagination.first();
    }

    pub fn previous_page(&mut self, total_count: u64) {
        self.pagination.previous(total_count);
    }

    pub fn next_page(&mut self, total_count: u64) {
        self.pagination.next(total_count);
    }

    pub fn last_page(&mut self, total_count: u64) {
        self.pagination.last(total_count);
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.pagination.set_page_size(page_size);
    }

    /// Pulls the page index back in range after the row count shrank.
    pub fn clamp_page(&mut self, total_count: u64) -> bool {
        self.pagination.clamp(total_count)
    }

    pub fn needs_clamp(&self, total_count: u64) -> bool {
        self.pagination.page_index > self.pagination.last_index(total_count)
    }
}
