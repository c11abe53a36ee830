use std::sync::Arc;

use homeval_core::{LookupService, UpstreamSettings};

/// Shared handler state.
///
/// Upstream settings are kept unresolved so the server can start without
/// them; each request resolves them and reports a configuration error if
/// they are incomplete.
#[derive(Clone)]
pub struct AppState {
    pub service: LookupService,
    pub settings: Arc<UpstreamSettings>,
}

impl AppState {
    pub fn new(service: LookupService, settings: UpstreamSettings) -> Self {
        Self {
            service,
            settings: Arc::new(settings),
        }
    }
}
