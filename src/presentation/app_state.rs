// Application state for HTTP handlers
use crate::application::sli_service::SliService;

#[derive(Clone)]
pub struct AppState {
    pub sli_service: SliService,
}
