use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

mod app;
mod domain {
    pub mod entities {
        pub mod column;
        pub mod filter;
        pub mod table;
        pub mod voucher;
    }
}
mod infra {
    pub mod config {
        pub mod settings;
    }
    pub mod sqlite {
        pub mod queries;
        pub mod repo;
        pub mod schema;
    }
}
mod platform {
    pub mod desktop {
        pub mod blocking;
    }
}
mod ui {
    pub mod state {
        pub mod app_state;
        pub mod table_state;
    }
}
mod usecase {
    pub mod ports {
        pub mod fetch;
    }
    pub mod services {
        pub mod fetch_coordinator;
        pub mod filter_builder;
    }
}

#[cfg(test)]
mod tests;

use crate::app::{App, AppContext};
use crate::domain::entities::voucher::voucher_columns;
use crate::infra::config::settings::{
    default_db_path, default_settings_path, default_webview_data_dir, TableSettings,
};
use crate::infra::sqlite::repo::SqliteVoucherSource;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("certdesk=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_context() -> Result<AppContext> {
    let settings_path = default_settings_path()?;
    let settings = TableSettings::load(&settings_path)?;
    tracing::info!(path = %settings_path.display(), "settings loaded");

    let db_path = default_db_path()?;
    let source = SqliteVoucherSource::new(db_path.clone());
    let seeded = source
        .init(settings.seed_demo_rows)
        .with_context(|| format!("failed to prepare database: {}", db_path.display()))?;
    tracing::info!(path = %db_path.display(), seeded, "voucher database ready");

    Ok(AppContext {
        settings,
        columns: voucher_columns(),
        source: Arc::new(source),
    })
}

fn main() {
    init_tracing();

    let (context, webview_data_dir) = match build_context()
        .and_then(|context| Ok((context, default_webview_data_dir()?)))
    {
        Ok(ready) => ready,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "startup failed");
            std::process::exit(1);
        }
    };

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("Certdesk · Vouchers"))
                .with_data_directory(webview_data_dir),
        )
        .with_context(context)
        .launch(App);
}
