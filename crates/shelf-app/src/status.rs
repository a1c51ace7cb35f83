//! Liveness report and static deployment metadata.
//!
//! Nothing here touches the database, report is built only from process configuration
//! and current time.

use axum::{extract::State, response::IntoResponse, routing::get, Json};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::state::AppState;

pub const HEALTHY: &str = "healthy";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub region: Option<String>,
    pub zone: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct About {
    pub message: String,
    pub version: String,
    pub docs: String,
}

#[derive(Debug, Clone)]
pub struct StatusReporter {
    version: String,
    region: Option<String>,
    zone: Option<String>,
}

/// Metadata may come as full resource path like `projects/123/zones/europe-west1-b`
fn last_segment(value: &str) -> Option<String> {
    value
        .rsplit('/')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
}

impl StatusReporter {
    pub fn new(version: &str, region: Option<&str>, zone: Option<&str>) -> Self {
        Self {
            version: version.to_string(),
            region: region.and_then(last_segment),
            zone: zone.and_then(last_segment),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn report(&self) -> HealthStatus {
        debug!("Health check performed");
        HealthStatus {
            status: HEALTHY.to_string(),
            version: self.version.clone(),
            region: self.region.clone(),
            zone: self.zone.clone(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn about(&self) -> About {
        About {
            message: "Library Book Catalog API".to_string(),
            version: self.version.clone(),
            docs: "/swagger-ui".to_string(),
        }
    }
}

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(paths(health, about))]
struct ModuleDocs;

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    ModuleDocs::openapi()
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/health", tag = "Status", operation_id = "health",
    responses((status = StatusCode::OK, description = "Service status", body = HealthStatus))))]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.status().report()))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/", tag = "Status", operation_id = "about",
    responses((status = StatusCode::OK, description = "Service info", body = About))))]
pub async fn about(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.status().about()))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(about))
        .route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report() {
        let reporter = StatusReporter::new(
            "1.2.3",
            Some("projects/42/regions/europe-west1"),
            Some("europe-west1-b"),
        );
        let before = OffsetDateTime::now_utc();
        let report = reporter.report();
        assert_eq!(report.status, HEALTHY);
        assert_eq!(report.version, "1.2.3");
        assert_eq!(report.region.as_deref(), Some("europe-west1"));
        assert_eq!(report.zone.as_deref(), Some("europe-west1-b"));
        assert!(report.timestamp >= before);
    }

    #[test]
    fn test_report_without_metadata() {
        let reporter = StatusReporter::new("0.1.0", None, Some("  "));
        let report = reporter.report();
        assert!(report.region.is_none());
        assert!(report.zone.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json["region"].is_null());
    }
}
