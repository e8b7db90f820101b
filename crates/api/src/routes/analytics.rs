//! Admin analytics routes.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use database::AnalyticsSummary;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::state::AppState;

const DEFAULT_GROWTH_DAYS: i64 = 30;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryData {
    #[serde(flatten)]
    summary: AnalyticsSummary,
    generated_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GrowthData {
    growth_data: BTreeMap<String, i64>,
    total_days: i64,
    generated_at: String,
}

#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    message: &'static str,
    data: T,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Dashboard summary. Never cached by clients or proxies.
pub async fn summary(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let summary = database::analytics::summary(state.db.pool()).await?;

    let headers = [
        (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        (header::PRAGMA, "no-cache"),
        (header::EXPIRES, "0"),
    ];

    Ok((
        headers,
        Json(Envelope {
            success: true,
            message: "Analytics data fetched successfully",
            data: SummaryData {
                summary,
                generated_at: now(),
            },
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct GrowthQuery {
    pub days: Option<i64>,
}

/// New users per day over the requested window.
pub async fn user_growth(
    State(state): State<AppState>,
    Query(query): Query<GrowthQuery>,
) -> Result<impl IntoResponse> {
    let days = query.days.unwrap_or(DEFAULT_GROWTH_DAYS);
    if days <= 0 {
        return Err(ApiError::BadRequest("days must be a positive number".to_string()));
    }

    let growth_data = database::analytics::user_growth(state.db.pool(), days).await?;

    Ok(Json(Envelope {
        success: true,
        message: "User growth data fetched successfully",
        data: GrowthData {
            growth_data,
            total_days: days,
            generated_at: now(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use proposal_core::AttributionPolicy;
    use tower::ServiceExt;

    use crate::routes::test_support::*;

    #[tokio::test]
    async fn test_summary_is_not_cached() {
        let db = test_db().await;
        add_user(&db, "alice@example.com").await;
        let app = test_app(&db, None, AttributionPolicy::Strict);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/admin/analytics/summary").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["cache-control"],
            "no-cache, no-store, must-revalidate"
        );

        let (_, body) = send(app, get("/api/admin/analytics/summary")).await;
        assert_eq!(body["data"]["totalUsers"], 1);
        assert_eq!(body["data"]["roleDistribution"]["User"], 1);
        assert!(body["data"]["generatedAt"].is_string());
    }

    #[tokio::test]
    async fn test_user_growth() {
        let db = test_db().await;
        add_user(&db, "alice@example.com").await;
        let app = test_app(&db, None, AttributionPolicy::Strict);

        let (status, body) = send(app.clone(), get("/api/admin/analytics/user-growth?days=7")).await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["totalDays"], 7);
        let total: i64 = body["data"]["growthData"]
            .as_object()
            .unwrap()
            .values()
            .map(|v| v.as_i64().unwrap())
            .sum();
        assert_eq!(total, 1);

        let (status, _) = send(app, get("/api/admin/analytics/user-growth?days=0")).await;
        assert_eq!(status, 400);
    }
}
