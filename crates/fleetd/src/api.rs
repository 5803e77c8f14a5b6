//! Health endpoint.
//!
//! Exposes the control plane's per-collaborator health report over HTTP for
//! an external checker (load balancer, orchestrator probe) to poll.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;

use fleetscale_engine::ControlPlane;

pub fn build_router(plane: Arc<ControlPlane>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .with_state(plane)
}

/// GET /healthz — 200 with the component report when every collaborator is
/// healthy, 503 otherwise.
async fn healthz(State(plane): State<Arc<ControlPlane>>) -> impl IntoResponse {
    let report = plane.check_health().await;
    let status = if report.healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyser::FileMetricAnalyserFactory;
    use crate::scaler::DryRunScaler;
    use crate::source::FileServiceSource;
    use fleetscale_engine::{AnalyserRegistry, NullElection};
    use std::io::Write;
    use std::path::PathBuf;

    fn plane_with_manifest(path: PathBuf) -> Arc<ControlPlane> {
        let registry = AnalyserRegistry::new(vec![Arc::new(FileMetricAnalyserFactory)]).unwrap();
        Arc::new(ControlPlane::new(
            Arc::new(FileServiceSource::new(path, "workers".to_string())),
            Arc::new(DryRunScaler::new()),
            Arc::new(NullElection::new()),
            registry,
        ))
    }

    #[tokio::test]
    async fn healthz_is_ok_when_collaborators_are_healthy() {
        let mut manifest = tempfile::NamedTempFile::new().unwrap();
        manifest.write_all(b"services = []\n").unwrap();
        let plane = plane_with_manifest(manifest.path().to_path_buf());

        let response = healthz(State(plane)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn healthz_reports_unavailable_on_broken_discovery() {
        let plane = plane_with_manifest(PathBuf::from("/nonexistent/services.toml"));

        let response = healthz(State(plane)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
