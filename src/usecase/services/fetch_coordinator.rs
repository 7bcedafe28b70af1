use std::collections::BTreeMap;

use crate::domain::entities::filter::{parse_iso_datetime, ColumnFilter, FilterValue};
use crate::domain::entities::table::{
    FetchParams, FetchResult, PaginationState, SortDirection, SortState, DEFAULT_SORT_COLUMN,
};
use crate::usecase::ports::fetch::{FetchError, RowSource};

/// Flattens the active filters, pagination and sort into request parameters.
pub fn build_fetch_params(
    filters: &[ColumnFilter],
    pagination: &PaginationState,
    sort: &SortState,
) -> FetchParams {
    let mut encoded = BTreeMap::new();
    for filter in filters {
        encode_filter(filter, &mut encoded);
    }

    let (order_by, order_dir) = match sort.current() {
        Some(spec) => (spec.column_id.clone(), spec.direction()),
        None => (DEFAULT_SORT_COLUMN.to_string(), SortDirection::Desc),
    };

    FetchParams {
        page: pagination.page_index.saturating_add(1),
        limit: pagination.page_size,
        order_by,
        order_dir,
        filters: encoded,
    }
}

fn encode_filter(filter: &ColumnFilter, out: &mut BTreeMap<String, String>) {
    let key = format!("filter_{}", filter.id);
    match &filter.value {
        FilterValue::Date(date) => {
            out.insert(key, date.format("%Y-%m-%d").to_string());
        }
        FilterValue::Number(numeric) => {
            if let Some(op) = numeric.op {
                out.insert(format!("{key}_op"), op.as_str().to_string());
            }
            out.insert(key, numeric.value.clone());
        }
        FilterValue::Boolean(flag) => {
            out.insert(key, flag.to_string());
        }
        FilterValue::Select(_) if filter.value.is_select_all() => {}
        FilterValue::Select(value) => {
            out.insert(key, value.clone());
        }
        FilterValue::Text(text) => {
            out.insert(key, date_only(text).unwrap_or_else(|| text.clone()));
        }
    }
}

/// Text that is really an ISO timestamp is sent as its calendar date.
fn date_only(text: &str) -> Option<String> {
    if !text.contains('T') {
        return None;
    }
    parse_iso_datetime(text).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Identifies one issued fetch. Only the most recent ticket may commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub token: u64,
    pub params: FetchParams,
}

/// Loading, error and result state of a remote table, guarded against
/// responses arriving out of order.
#[derive(Debug, Clone)]
pub struct FetchCoordinator<T> {
    data: Option<Vec<T>>,
    total_count: Option<u64>,
    is_loading: bool,
    error: Option<FetchError>,
    issued: u64,
    last_params: Option<FetchParams>,
}

impl<T> Default for FetchCoordinator<T> {
    fn default() -> Self {
        Self {
            data: None,
            total_count: None,
            is_loading: false,
            error: None,
            issued: 0,
            last_params: None,
        }
    }
}

impl<T> FetchCoordinator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> Option<&[T]> {
        self.data.as_deref()
    }

    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn begin(&mut self, params: FetchParams) -> FetchTicket {
        self.issued += 1;
        self.is_loading = true;
        self.last_params = Some(params.clone());
        tracing::debug!(
            token = self.issued,
            page = params.page,
            limit = params.limit,
            order_by = %params.order_by,
            order_dir = params.order_dir.as_str(),
            filters = params.filters.len(),
            "fetch issued"
        );
        FetchTicket {
            token: self.issued,
            params,
        }
    }

    /// Re-issues the last request; `None` before anything was fetched.
    pub fn refetch(&mut self) -> Option<FetchTicket> {
        let params = self.last_params.clone()?;
        Some(self.begin(params))
    }

    /// Commits the outcome of `token`. Returns false when a newer fetch
    /// has been issued since, in which case the outcome is dropped.
    pub fn complete(&mut self, token: u64, outcome: Result<FetchResult<T>, FetchError>) -> bool {
        if token != self.issued {
            tracing::debug!(token, latest = self.issued, "stale fetch response discarded");
            return false;
        }
        self.is_loading = false;
        match outcome {
            Ok(result) => {
                self.total_count = Some(result.total_count);
                self.data = Some(result.data);
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(token, error = %err, "fetch failed");
                self.error = Some(err);
            }
        }
        true
    }
}

/// Runs one ticket without holding the coordinator across the await.
pub async fn execute<T, S>(source: &S, ticket: FetchTicket) -> (u64, Result<FetchResult<T>, FetchError>)
where
    S: RowSource<T> + ?Sized,
{
    let outcome = source.fetch(&ticket.params).await;
    (ticket.token, outcome)
}
