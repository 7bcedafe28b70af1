use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;

use crate::domain::entities::filter::NumericOperator;
use crate::domain::entities::table::{FetchParams, FetchResult, DEFAULT_SORT_COLUMN};
use crate::domain::entities::voucher::{Voucher, VoucherStatus};
use crate::infra::sqlite::schema::open_connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Boolean,
    Number,
    Date,
    Exact,
}

const VOUCHER_COLUMNS: [(&str, ColumnKind); 7] = [
    ("code", ColumnKind::Text),
    ("email", ColumnKind::Text),
    ("certification", ColumnKind::Text),
    ("status", ColumnKind::Exact),
    ("price", ColumnKind::Number),
    ("is_paid", ColumnKind::Boolean),
    ("created_at", ColumnKind::Date),
];

fn column_kind(column_id: &str) -> Option<ColumnKind> {
    VOUCHER_COLUMNS
        .iter()
        .find(|(name, _)| *name == column_id)
        .map(|(_, kind)| *kind)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidFilter {
    #[error("unknown filter column `{0}`")]
    UnknownColumn(String),
    #[error("`{value}` is not a valid value for `{column}`")]
    BadValue { column: String, value: String },
    #[error("unknown operator `{op}` for `{column}`")]
    BadOperator { column: String, op: String },
}

/// WHERE/ORDER BY fragments with their bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct VoucherQuery {
    pub where_sql: String,
    pub params: Vec<Value>,
    pub order_sql: String,
    pub limit: i64,
    pub offset: i64,
}

pub fn build_voucher_query(params: &FetchParams) -> Result<VoucherQuery, InvalidFilter> {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    for column_id in params.filtered_columns() {
        let kind = column_kind(column_id)
            .ok_or_else(|| InvalidFilter::UnknownColumn(column_id.to_string()))?;
        let raw = params.filter(column_id).unwrap_or_default();
        let bad_value = || InvalidFilter::BadValue {
            column: column_id.to_string(),
            value: raw.to_string(),
        };

        match kind {
            ColumnKind::Text => {
                clauses.push(format!("LOWER({column_id}) LIKE ? ESCAPE '\\'"));
                values.push(Value::Text(format!(
                    "%{}%",
                    escape_like(&raw.trim().to_lowercase())
                )));
            }
            ColumnKind::Exact => {
                clauses.push(format!("{column_id} = ?"));
                values.push(Value::Text(raw.to_string()));
            }
            ColumnKind::Boolean => {
                let flag = match raw {
                    "true" => 1,
                    "false" => 0,
                    _ => return Err(bad_value()),
                };
                clauses.push(format!("{column_id} = ?"));
                values.push(Value::Integer(flag));
            }
            ColumnKind::Number => {
                let op = match params.filter_op(column_id) {
                    Some(op) => op.parse::<NumericOperator>().map_err(|_| {
                        InvalidFilter::BadOperator {
                            column: column_id.to_string(),
                            op: op.to_string(),
                        }
                    })?,
                    None => NumericOperator::Eq,
                };
                let number: f64 = raw.trim().parse().map_err(|_| bad_value())?;
                clauses.push(format!("{column_id} {} ?", sql_operator(op)));
                values.push(Value::Real(number));
            }
            ColumnKind::Date => {
                let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| bad_value())?;
                clauses.push(format!("substr({column_id}, 1, 10) = ?"));
                values.push(Value::Text(date.format("%Y-%m-%d").to_string()));
            }
        }
    }

    let order_column = if column_kind(&params.order_by).is_some() {
        params.order_by.as_str()
    } else {
        DEFAULT_SORT_COLUMN
    };
    let order_sql = format!(
        "{order_column} {}, id ASC",
        params.order_dir.as_str().to_ascii_uppercase()
    );

    let where_sql = if clauses.is_empty() {
        "1 = 1".to_string()
    } else {
        clauses.join(" AND ")
    };

    Ok(VoucherQuery {
        where_sql,
        params: values,
        order_sql,
        limit: i64::from(params.limit.max(1)),
        offset: i64::try_from(params.offset()).unwrap_or(i64::MAX),
    })
}

/// Makes `%`, `_` and the escape character itself match literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn sql_operator(op: NumericOperator) -> &'static str {
    match op {
        NumericOperator::Eq => "=",
        NumericOperator::NotEq => "<>",
        NumericOperator::Gt => ">",
        NumericOperator::Gte => ">=",
        NumericOperator::Lt => "<",
        NumericOperator::Lte => "<=",
    }
}

pub fn query_vouchers(db_path: &Path, query: &VoucherQuery) -> Result<FetchResult<Voucher>> {
    let conn = open_connection(db_path)?;

    let count_sql = format!("SELECT COUNT(*) FROM voucher WHERE {}", query.where_sql);
    let total_count: i64 = conn
        .query_row(
            &count_sql,
            rusqlite::params_from_iter(query.params.iter().cloned()),
            |row| row.get(0),
        )
        .context("failed to query filtered voucher count")?;

    let page_sql = format!(
        "SELECT id, code, email, certification, status, price, is_paid, created_at
         FROM voucher
         WHERE {}
         ORDER BY {}
         LIMIT ? OFFSET ?",
        query.where_sql, query.order_sql
    );
    let mut page_params = query.params.clone();
    page_params.push(Value::Integer(query.limit));
    page_params.push(Value::Integer(query.offset));

    let mut stmt = conn
        .prepare(&page_sql)
        .context("failed to prepare voucher page query")?;
    let raw_rows = stmt
        .query_map(rusqlite::params_from_iter(page_params), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, bool>(6)?,
                row.get::<_, String>(7)?,
            ))
        })
        .context("failed to query voucher page")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect voucher page")?;

    let mut data = Vec::with_capacity(raw_rows.len());
    for (id, code, email, certification, status, price, is_paid, created_at) in raw_rows {
        let status = VoucherStatus::parse(&status)
            .with_context(|| format!("voucher #{id} has unknown status `{status}`"))?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .with_context(|| format!("voucher #{id} has invalid created_at"))?
            .with_timezone(&Utc);
        data.push(Voucher {
            id,
            code,
            email,
            certification,
            status,
            price,
            is_paid,
            created_at,
        });
    }

    Ok(FetchResult::new(
        data,
        u64::try_from(total_count).unwrap_or_default(),
    ))
}
