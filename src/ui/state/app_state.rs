use dioxus::prelude::{use_signal, Signal};

use crate::domain::entities::voucher::Voucher;
use crate::infra::config::settings::TableSettings;
use crate::ui::state::table_state::TableState;
use crate::usecase::services::fetch_coordinator::FetchCoordinator;

pub struct AppState {
    pub table: Signal<TableState>,
    pub coordinator: Signal<FetchCoordinator<Voucher>>,
    pub new_filter_column: Signal<Option<String>>,
}

impl AppState {
    pub fn new(settings: &TableSettings) -> Self {
        let settings = settings.clone();
        Self {
            table: use_signal(move || TableState::from_settings(&settings)),
            coordinator: use_signal(FetchCoordinator::<Voucher>::new),
            new_filter_column: use_signal(|| None::<String>),
        }
    }
}
