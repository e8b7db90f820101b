//! Aggregate statistics for the admin dashboard.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::error::Result;

/// Number of users listed in [`AnalyticsSummary::most_active_users`].
const MOST_ACTIVE_LIMIT: i64 = 5;

/// Window for [`AnalyticsSummary::recent_users`].
const RECENT_USER_DAYS: i64 = 30;

/// Window for [`AnalyticsSummary::daily_proposal_counts`].
const DAILY_PROPOSAL_DAYS: i64 = 10;

/// A user ranked by proposal count.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUser {
    pub name: String,
    pub email: String,
    pub proposal_count: i64,
    /// Creation time of the user's newest proposal.
    pub last_proposal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_users: i64,
    pub total_proposals: i64,
    /// Users created in the last 30 days.
    pub recent_users: i64,
    pub today_users: i64,
    pub today_proposals: i64,
    /// Rounded to two decimals; zero when there are no users.
    pub avg_proposals_per_user: f64,
    pub most_active_users: Vec<ActiveUser>,
    /// Proposals per `YYYY-MM-DD` over the last 10 days.
    pub daily_proposal_counts: BTreeMap<String, i64>,
    pub role_distribution: BTreeMap<String, i64>,
}

/// Compute the dashboard summary.
pub async fn summary(pool: &SqlitePool) -> Result<AnalyticsSummary> {
    let total_users = scalar(pool, "SELECT COUNT(*) FROM users").await?;
    let total_proposals = scalar(pool, "SELECT COUNT(*) FROM proposals").await?;

    let recent_users = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        WHERE created_at >= datetime('now', printf('-%d days', ?))
        "#,
    )
    .bind(RECENT_USER_DAYS)
    .fetch_one(pool)
    .await?;

    let today_users = scalar(
        pool,
        "SELECT COUNT(*) FROM users WHERE date(created_at) = date('now')",
    )
    .await?;
    let today_proposals = scalar(
        pool,
        "SELECT COUNT(*) FROM proposals WHERE date(created_at) = date('now')",
    )
    .await?;

    let avg_proposals_per_user = if total_users > 0 {
        (total_proposals as f64 / total_users as f64 * 100.0).round() / 100.0
    } else {
        0.0
    };

    let most_active_users = sqlx::query_as::<_, ActiveUser>(
        r#"
        SELECT u.name, u.email,
               COUNT(p.id) AS proposal_count,
               MAX(p.created_at) AS last_proposal
        FROM users u
        JOIN proposals p ON p.user_id = u.id
        GROUP BY u.id
        ORDER BY proposal_count DESC, last_proposal DESC
        LIMIT ?
        "#,
    )
    .bind(MOST_ACTIVE_LIMIT)
    .fetch_all(pool)
    .await?;

    let daily_proposal_counts = day_buckets(
        pool,
        r#"
        SELECT date(created_at) AS day, COUNT(*) AS count
        FROM proposals
        WHERE created_at >= datetime('now', printf('-%d days', ?))
        GROUP BY day
        "#,
        DAILY_PROPOSAL_DAYS,
    )
    .await?;

    let role_distribution = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT COALESCE(NULLIF(role, ''), 'User') AS role, COUNT(*)
        FROM users
        GROUP BY 1
        "#,
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .collect();

    tracing::debug!(total_users, total_proposals, "Computed analytics summary");

    Ok(AnalyticsSummary {
        total_users,
        total_proposals,
        recent_users,
        today_users,
        today_proposals,
        avg_proposals_per_user,
        most_active_users,
        daily_proposal_counts,
        role_distribution,
    })
}

/// New users per `YYYY-MM-DD` over the last `days` days.
pub async fn user_growth(pool: &SqlitePool, days: i64) -> Result<BTreeMap<String, i64>> {
    day_buckets(
        pool,
        r#"
        SELECT date(created_at) AS day, COUNT(*) AS count
        FROM users
        WHERE created_at >= datetime('now', printf('-%d days', ?))
        GROUP BY day
        "#,
        days,
    )
    .await
}

async fn scalar(pool: &SqlitePool, query: &str) -> Result<i64> {
    Ok(sqlx::query_scalar::<_, i64>(query).fetch_one(pool).await?)
}

async fn day_buckets(pool: &SqlitePool, query: &str, days: i64) -> Result<BTreeMap<String, i64>> {
    let rows = sqlx::query_as::<_, (String, i64)>(query)
        .bind(days)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().collect())
}
