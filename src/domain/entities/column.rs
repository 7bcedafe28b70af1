use serde::{Deserialize, Serialize};

use crate::domain::entities::filter::FilterType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanOptions {
    pub true_label: String,
    pub false_label: String,
}

impl Default for BooleanOptions {
    fn default() -> Self {
        Self {
            true_label: "Sí".to_string(),
            false_label: "No".to_string(),
        }
    }
}

impl BooleanOptions {
    pub fn label(&self, value: bool) -> &str {
        if value {
            &self.true_label
        } else {
            &self.false_label
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberOptions {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    #[serde(default)]
    pub operators: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub filter_type: Option<FilterType>,
    pub boolean_options: Option<BooleanOptions>,
    pub number_options: Option<NumberOptions>,
    #[serde(default)]
    pub select_options: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub id: Option<String>,
    pub accessor_key: Option<String>,
    pub header: String,
    #[serde(default = "default_sortable")]
    pub sortable: bool,
    #[serde(default)]
    pub meta: ColumnMeta,
}

fn default_sortable() -> bool {
    true
}

impl ColumnDescriptor {
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            accessor_key: None,
            header: header.into(),
            sortable: true,
            meta: ColumnMeta::default(),
        }
    }

    pub fn accessor(accessor_key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            id: None,
            accessor_key: Some(accessor_key.into()),
            header: header.into(),
            sortable: true,
            meta: ColumnMeta::default(),
        }
    }

    pub fn filter(mut self, filter_type: FilterType) -> Self {
        self.meta.filter_type = Some(filter_type);
        self
    }

    pub fn boolean_labels(mut self, true_label: &str, false_label: &str) -> Self {
        self.meta.filter_type = Some(FilterType::Boolean);
        self.meta.boolean_options = Some(BooleanOptions {
            true_label: true_label.to_string(),
            false_label: false_label.to_string(),
        });
        self
    }

    pub fn number(mut self, options: NumberOptions) -> Self {
        self.meta.filter_type = Some(FilterType::Number);
        self.meta.number_options = Some(options);
        self
    }

    pub fn select(mut self, options: Vec<SelectOption>) -> Self {
        self.meta.filter_type = Some(FilterType::Select);
        self.meta.select_options = options;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Explicit id, then accessor key, then header text. Only the explicit id
    /// is stable across header relabelling; the rest of the chain exists so
    /// older column sets keep resolving.
    pub fn resolved_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.accessor_key.as_deref())
            .or_else(|| Some(self.header.as_str()).filter(|header| !header.is_empty()))
    }

    pub fn filter_type(&self) -> Option<FilterType> {
        self.meta.filter_type
    }

    pub fn operators_enabled(&self) -> bool {
        self.meta
            .number_options
            .as_ref()
            .is_some_and(|options| options.operators)
    }

    pub fn boolean_options(&self) -> BooleanOptions {
        self.meta.boolean_options.clone().unwrap_or_default()
    }
}

pub fn find_column<'a>(columns: &'a [ColumnDescriptor], id: &str) -> Option<&'a ColumnDescriptor> {
    columns
        .iter()
        .find(|column| column.resolved_id() == Some(id))
}

/// Header label for `id`, or the raw id when the column cannot be resolved.
pub fn column_label(columns: &[ColumnDescriptor], id: &str) -> String {
    find_column(columns, id)
        .map(|column| column.header.clone())
        .filter(|header| !header.is_empty())
        .unwrap_or_else(|| id.to_string())
}
