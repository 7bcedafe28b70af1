use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, TimeZone, Utc};
use rusqlite::{params, Connection};

use crate::domain::entities::voucher::VoucherStatus;

const CERTIFICATIONS: [&str; 4] = [
    "Fundamentos de Redes",
    "Administración Linux",
    "Desarrollo Web",
    "Seguridad Informática",
];

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign key enforcement")?;
    Ok(conn)
}

pub fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS voucher (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            code          TEXT NOT NULL UNIQUE,
            email         TEXT NOT NULL,
            certification TEXT NOT NULL,
            status        TEXT NOT NULL,
            price         REAL NOT NULL,
            is_paid       INTEGER NOT NULL DEFAULT 0,
            created_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_voucher_created_at
            ON voucher(created_at);

        CREATE INDEX IF NOT EXISTS idx_voucher_status
            ON voucher(status);
        ",
    )
    .context("failed to initialize schema")?;

    Ok(())
}

/// Inserts `count` deterministic vouchers when the table is empty. Returns
/// the number of rows written.
pub fn seed_demo_vouchers(db_path: &Path, count: u32) -> Result<u32> {
    let mut conn = open_connection(db_path)?;
    let existing: i64 = conn
        .query_row("SELECT COUNT(*) FROM voucher", [], |row| row.get(0))
        .context("failed to count vouchers")?;
    if existing > 0 || count == 0 {
        return Ok(0);
    }

    let base = Utc
        .with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
        .single()
        .ok_or_else(|| anyhow!("invalid seed timestamp"))?;

    let tx = conn
        .transaction()
        .context("failed to start seed transaction")?;
    let mut insert = tx
        .prepare(
            "INSERT INTO voucher(code, email, certification, status, price, is_paid, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .context("failed to prepare voucher insert")?;

    for idx in 0..count {
        let i = i64::from(idx);
        let status = VoucherStatus::ALL[idx as usize % VoucherStatus::ALL.len()];
        let certification = CERTIFICATIONS[idx as usize % CERTIFICATIONS.len()];
        let price = 50.0 + ((i * 37) % 200) as f64;
        let is_paid = idx % 3 != 0;
        let created_at = base + Duration::days(i) + Duration::hours(i % 8);
        insert
            .execute(params![
                format!("CERT-{:05}", idx + 1),
                format!("candidato{}@ejemplo.com", idx + 1),
                certification,
                status.as_str(),
                price,
                is_paid,
                created_at.to_rfc3339(),
            ])
            .context("failed to insert demo voucher")?;
    }
    drop(insert);

    tx.commit().context("failed to commit demo vouchers")?;
    Ok(count)
}
