use std::sync::Arc;

use crate::db::DescontoStore;

pub struct AppState {
    pub store: Arc<dyn DescontoStore>,
}
