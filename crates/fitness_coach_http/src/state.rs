use std::sync::Arc;

use fitness_coach::Coach;
use fitness_coach::profile_store::ProfileRepository;
use metrics_exporter_prometheus::PrometheusHandle;

/// Shared by every handler.
pub struct AppState {
    pub coach: Coach,
    pub profiles: Arc<dyn ProfileRepository>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(
        coach: Coach,
        profiles: Arc<dyn ProfileRepository>,
        metrics: PrometheusHandle,
    ) -> Arc<Self> {
        Arc::new(Self {
            coach,
            profiles,
            metrics,
        })
    }
}
