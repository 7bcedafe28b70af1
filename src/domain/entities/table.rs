use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SORT_COLUMN: &str = "created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn from_descending(descending: bool) -> Self {
        if descending {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column_id: String,
    #[serde(default)]
    pub descending: bool,
}

impl SortSpec {
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            descending: false,
        }
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            descending: true,
        }
    }

    pub fn direction(&self) -> SortDirection {
        SortDirection::from_descending(self.descending)
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec::desc(DEFAULT_SORT_COLUMN)
    }
}

/// Holds at most one sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    current: Option<SortSpec>,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            current: Some(SortSpec::default()),
        }
    }
}

impl SortState {
    pub fn new(current: Option<SortSpec>) -> Self {
        Self { current }
    }

    pub fn current(&self) -> Option<&SortSpec> {
        self.current.as_ref()
    }

    pub fn direction_for(&self, column_id: &str) -> Option<SortDirection> {
        self.current
            .as_ref()
            .filter(|spec| spec.column_id == column_id)
            .map(SortSpec::direction)
    }

    /// unsorted -> ascending -> descending -> ascending -> ... for `column_id`,
    /// replacing whatever column was sorted before.
    pub fn toggle(&mut self, column_id: &str) {
        let next = match self.direction_for(column_id) {
            Some(SortDirection::Asc) => SortSpec::desc(column_id),
            Some(SortDirection::Desc) | None => SortSpec::asc(column_id),
        };
        self.current = Some(next);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page_index: u32,
    pub page_size: u32,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: 10,
        }
    }
}

impl PaginationState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page_count(&self, total_count: u64) -> u64 {
        total_count.div_ceil(u64::from(self.page_size.max(1)))
    }

    pub fn last_index(&self, total_count: u64) -> u32 {
        let last = self.page_count(total_count).saturating_sub(1);
        u32::try_from(last).unwrap_or(u32::MAX)
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self, total_count: u64) -> bool {
        self.page_index < self.last_index(total_count)
    }

    pub fn first(&mut self) {
        self.page_index = 0;
    }

    pub fn previous(&mut self, total_count: u64) {
        self.page_index = self
            .page_index
            .saturating_sub(1)
            .min(self.last_index(total_count));
    }

    pub fn next(&mut self, total_count: u64) {
        if self.can_next(total_count) {
            self.page_index += 1;
        }
        self.clamp(total_count);
    }

    pub fn last(&mut self, total_count: u64) {
        self.page_index = self.last_index(total_count);
    }

    /// Returns true when the index had to move.
    pub fn clamp(&mut self, total_count: u64) -> bool {
        let last = self.last_index(total_count);
        if self.page_index > last {
            self.page_index = last;
            return true;
        }
        false
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        if page_size == 0 {
            return;
        }
        self.page_size = page_size;
        self.page_index = 0;
    }

    /// 1-based inclusive row range shown on the current page, `None` when empty.
    pub fn visible_range(&self, total_count: u64) -> Option<(u64, u64)> {
        if total_count == 0 {
            return None;
        }
        let size = u64::from(self.page_size.max(1));
        let start = u64::from(self.page_index) * size + 1;
        if start > total_count {
            return None;
        }
        Some((start, (start + size - 1).min(total_count)))
    }
}

/// Flat request-parameter object handed to a row source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchParams {
    /// 1-based.
    pub page: u32,
    pub limit: u32,
    pub order_by: String,
    pub order_dir: SortDirection,
    #[serde(flatten)]
    pub filters: BTreeMap<String, String>,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: PaginationState::default().page_size,
            order_by: DEFAULT_SORT_COLUMN.to_string(),
            order_dir: SortDirection::Desc,
            filters: BTreeMap::new(),
        }
    }
}

impl FetchParams {
    pub fn filter(&self, column_id: &str) -> Option<&str> {
        self.filters
            .get(&format!("filter_{column_id}"))
            .map(String::as_str)
    }

    pub fn filter_op(&self, column_id: &str) -> Option<&str> {
        self.filters
            .get(&format!("filter_{column_id}_op"))
            .map(String::as_str)
    }

    /// Column ids carrying a `filter_<id>` entry.
    pub fn filtered_columns(&self) -> Vec<&str> {
        self.filters
            .keys()
            .filter_map(|key| key.strip_prefix("filter_"))
            .filter(|id| match id.strip_suffix("_op") {
                Some(base) => !self.filters.contains_key(&format!("filter_{base}")),
                None => true,
            })
            .collect()
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult<T> {
    pub data: Vec<T>,
    #[serde(rename = "totalCount")]
    pub total_count: u64,
}

impl<T> FetchResult<T> {
    pub fn new(data: Vec<T>, total_count: u64) -> Self {
        Self { data, total_count }
    }
}

/// A row the shell can render cell by cell.
pub trait TableRow {
    fn cell(&self, column_id: &str) -> String;
}
