use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::column::{ColumnDescriptor, NumberOptions, SelectOption};
use crate::domain::entities::filter::FilterType;
use crate::domain::entities::table::TableRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    Available,
    Assigned,
    Used,
    Expired,
}

impl VoucherStatus {
    pub const ALL: [VoucherStatus; 4] = [
        VoucherStatus::Available,
        VoucherStatus::Assigned,
        VoucherStatus::Used,
        VoucherStatus::Expired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VoucherStatus::Available => "available",
            VoucherStatus::Assigned => "assigned",
            VoucherStatus::Used => "used",
            VoucherStatus::Expired => "expired",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VoucherStatus::Available => "Disponible",
            VoucherStatus::Assigned => "Asignado",
            VoucherStatus::Used => "Usado",
            VoucherStatus::Expired => "Expirado",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        VoucherStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    pub id: i64,
    pub code: String,
    pub email: String,
    pub certification: String,
    pub status: VoucherStatus,
    pub price: f64,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl TableRow for Voucher {
    fn cell(&self, column_id: &str) -> String {
        match column_id {
            "code" => self.code.clone(),
            "email" => self.email.clone(),
            "certification" => self.certification.clone(),
            "status" => self.status.label().to_string(),
            "price" => format!("{:.2}", self.price),
            "is_paid" => if self.is_paid { "Pagado" } else { "Pendiente" }.to_string(),
            "created_at" => self.created_at.format("%d/%m/%Y %H:%M").to_string(),
            _ => String::new(),
        }
    }
}

pub fn voucher_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("code", "Código").filter(FilterType::Text),
        ColumnDescriptor::accessor("email", "Correo")
            .filter(FilterType::Text)
            .unsortable(),
        ColumnDescriptor::new("certification", "Certificación").filter(FilterType::Text),
        ColumnDescriptor::new("status", "Estado").select(
            VoucherStatus::ALL
                .into_iter()
                .map(|status| SelectOption::new(status.label(), status.as_str()))
                .collect(),
        ),
        ColumnDescriptor::new("price", "Precio").number(NumberOptions {
            min: Some(0.0),
            max: None,
            step: Some(0.01),
            operators: true,
        }),
        ColumnDescriptor::new("is_paid", "Pago").boolean_labels("Pagado", "Pendiente"),
        ColumnDescriptor::new("created_at", "Creado").filter(FilterType::Date),
    ]
}
