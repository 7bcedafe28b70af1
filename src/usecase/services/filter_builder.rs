use chrono::{DateTime, Utc};

use crate::domain::entities::column::{
    column_label, find_column, BooleanOptions, ColumnDescriptor, NumberOptions, SelectOption,
};
use crate::domain::entities::filter::{ColumnFilter, FilterType, FilterValue, ParseFilterError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("column `{0}` already has a filter")]
    DuplicateColumn(String),
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
    #[error("column `{0}` is not filterable")]
    NotFilterable(String),
    #[error("no draft filter for column `{0}`")]
    MissingFilter(String),
    #[error("invalid value for column `{column}`: {source}")]
    InvalidValue {
        column: String,
        #[source]
        source: ParseFilterError,
    },
}

/// Draft filters being edited next to the filters last committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    draft: Vec<ColumnFilter>,
    active: Vec<ColumnFilter>,
}

impl FilterState {
    pub fn draft(&self) -> &[ColumnFilter] {
        &self.draft
    }

    pub fn active(&self) -> &[ColumnFilter] {
        &self.active
    }

    pub fn draft_value(&self, column_id: &str) -> Option<&FilterValue> {
        self.draft
            .iter()
            .find(|filter| filter.id == column_id)
            .map(|filter| &filter.value)
    }

    pub fn has_draft(&self, column_id: &str) -> bool {
        self.draft_value(column_id).is_some()
    }

    pub fn add_filter(
        &mut self,
        column_id: impl Into<String>,
        value: FilterValue,
    ) -> Result<(), FilterError> {
        let column_id = column_id.into();
        if self.has_draft(&column_id) {
            tracing::warn!(column = %column_id, "refusing duplicate filter");
            return Err(FilterError::DuplicateColumn(column_id));
        }
        tracing::debug!(column = %column_id, "draft filter added");
        self.draft.push(ColumnFilter::new(column_id, value));
        Ok(())
    }

    /// Returns false when no draft filter exists for `column_id`.
    pub fn update_filter_value(&mut self, column_id: &str, value: FilterValue) -> bool {
        match self.draft.iter_mut().find(|filter| filter.id == column_id) {
            Some(filter) => {
                filter.value = value;
                true
            }
            None => false,
        }
    }

    /// Removes the filter from the draft and the active set at once.
    pub fn remove_filter(&mut self, column_id: &str) -> bool {
        let before = self.draft.len() + self.active.len();
        self.draft.retain(|filter| filter.id != column_id);
        self.active.retain(|filter| filter.id != column_id);
        let removed = before != self.draft.len() + self.active.len();
        if removed {
            tracing::debug!(column = %column_id, "filter removed");
        }
        removed
    }

    pub fn apply_draft(&mut self) {
        tracing::debug!(filters = self.draft.len(), "draft filters applied");
        self.active = self.draft.clone();
    }

    pub fn clear_all(&mut self) {
        self.draft.clear();
        self.active.clear();
    }

    /// Empties the draft only; the active set stays in effect until the next apply.
    pub fn reset_draft(&mut self) {
        self.draft.clear();
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.active
    }
}

/// Editor a draft filter row should render.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEditor {
    Text,
    Boolean(BooleanOptions),
    Number {
        options: NumberOptions,
        operators: bool,
    },
    Date,
    Select(Vec<SelectOption>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBadge {
    pub column_id: String,
    pub label: String,
    pub text: String,
}

/// Column-aware operations over a [`FilterState`].
pub struct FilterBuilder<'a> {
    columns: &'a [ColumnDescriptor],
}

impl<'a> FilterBuilder<'a> {
    pub fn new(columns: &'a [ColumnDescriptor]) -> Self {
        Self { columns }
    }

    pub fn filterable_columns(&self) -> Vec<&'a ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|column| column.filter_type().is_some() && column.resolved_id().is_some())
            .collect()
    }

    /// Filterable columns without a draft filter yet.
    pub fn available_columns(&self, state: &FilterState) -> Vec<&'a ColumnDescriptor> {
        self.filterable_columns()
            .into_iter()
            .filter(|column| {
                column
                    .resolved_id()
                    .is_some_and(|id| !state.has_draft(id))
            })
            .collect()
    }

    pub fn add(
        &self,
        state: &mut FilterState,
        column_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), FilterError> {
        let column = find_column(self.columns, column_id)
            .ok_or_else(|| FilterError::UnknownColumn(column_id.to_string()))?;
        let filter_type = column
            .filter_type()
            .ok_or_else(|| FilterError::NotFilterable(column_id.to_string()))?;
        let value = FilterValue::default_for(filter_type, column.operators_enabled(), now);
        state.add_filter(column_id, value)
    }

    /// Decodes an editor's string value for the column and stores it in the draft.
    pub fn set_raw_value(
        &self,
        state: &mut FilterState,
        column_id: &str,
        raw: &str,
    ) -> Result<(), FilterError> {
        let filter_type = self
            .filter_type_of(state, column_id)
            .ok_or_else(|| FilterError::MissingFilter(column_id.to_string()))?;
        let value = FilterValue::parse(filter_type, raw).map_err(|source| {
            FilterError::InvalidValue {
                column: column_id.to_string(),
                source,
            }
        })?;
        if state.update_filter_value(column_id, value) {
            Ok(())
        } else {
            Err(FilterError::MissingFilter(column_id.to_string()))
        }
    }

    fn filter_type_of(&self, state: &FilterState, column_id: &str) -> Option<FilterType> {
        let from_value = state.draft_value(column_id).map(FilterValue::filter_type)?;
        Some(
            find_column(self.columns, column_id)
                .and_then(ColumnDescriptor::filter_type)
                .unwrap_or(from_value),
        )
    }

    pub fn label(&self, column_id: &str) -> String {
        column_label(self.columns, column_id)
    }

    /// Falls back to the editor matching the value when the column is gone.
    pub fn editor_for(&self, filter: &ColumnFilter) -> FilterEditor {
        let column = find_column(self.columns, &filter.id);
        let filter_type = column
            .and_then(ColumnDescriptor::filter_type)
            .unwrap_or_else(|| filter.value.filter_type());
        match filter_type {
            FilterType::Text => FilterEditor::Text,
            FilterType::Date => FilterEditor::Date,
            FilterType::Boolean => FilterEditor::Boolean(
                column
                    .map(ColumnDescriptor::boolean_options)
                    .unwrap_or_default(),
            ),
            FilterType::Number => FilterEditor::Number {
                options: column
                    .and_then(|column| column.meta.number_options.clone())
                    .unwrap_or_default(),
                operators: column.is_some_and(ColumnDescriptor::operators_enabled)
                    || matches!(&filter.value, FilterValue::Number(numeric) if numeric.op.is_some()),
            },
            FilterType::Select => FilterEditor::Select(
                column
                    .map(|column| column.meta.select_options.clone())
                    .unwrap_or_default(),
            ),
        }
    }

    pub fn badges(&self, state: &FilterState) -> Vec<FilterBadge> {
        state
            .active()
            .iter()
            .map(|filter| FilterBadge {
                column_id: filter.id.clone(),
                label: self.label(&filter.id),
                text: self.badge_text(filter),
            })
            .collect()
    }

    pub fn badge_text(&self, filter: &ColumnFilter) -> String {
        let column = find_column(self.columns, &filter.id);
        match &filter.value {
            FilterValue::Boolean(flag) => column
                .map(ColumnDescriptor::boolean_options)
                .unwrap_or_default()
                .label(*flag)
                .to_string(),
            FilterValue::Date(date) => date.format("%d/%m/%Y").to_string(),
            FilterValue::Number(numeric) => match numeric.op {
                Some(op) => format!("{} {}", op.symbol(), numeric.value),
                None => numeric.value.clone(),
            },
            FilterValue::Select(value) => column
                .and_then(|column| {
                    column
                        .meta
                        .select_options
                        .iter()
                        .find(|option| &option.value == value)
                })
                .map(|option| option.label.clone())
                .unwrap_or_else(|| value.clone()),
            FilterValue::Text(text) => text.clone(),
        }
    }
}
