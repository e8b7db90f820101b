//! Proposal storage.
//!
//! Proposals are JSON documents. Writes go through [`ProposalDocument`], but
//! older rows were written with whatever shapes the client sent at the time,
//! so reads hand back [`RawRecord`]s for the normalizer rather than typed
//! structs. Three read paths exist, from richest to most defensive:
//!
//! - [`list_full`] decodes whole documents and joins the owner
//! - [`list_projected`] extracts known fields one by one, without the owner
//! - [`list_minimal`] reads a few fields and tolerates corrupt documents

use proposal_core::RawRecord;
use serde_json::{json, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{ProposalDocument, ProposalRow};

/// Document fields read individually by [`list_projected`].
const PROJECTED_FIELDS: &[&str] = &[
    "name",
    "clientName",
    "clientIndustry",
    "budget",
    "timelineStart",
    "timelineEnd",
    "goals",
    "tone",
    "proposalType",
    "techStack",
    "modules",
    "challenges",
    "latexContent",
];

/// Create a proposal from a typed document.
pub async fn create_proposal(
    pool: &SqlitePool,
    user_id: Option<&str>,
    document: &ProposalDocument,
) -> Result<ProposalRow> {
    let encoded = serde_json::to_string(document)?;
    insert_document(pool, user_id, &encoded).await
}

/// Insert an arbitrary document string as-is.
///
/// Used for imports of historical data, whose documents may not match
/// [`ProposalDocument`] or even be valid JSON.
pub async fn insert_raw_document(
    pool: &SqlitePool,
    user_id: Option<&str>,
    document: &str,
) -> Result<ProposalRow> {
    insert_document(pool, user_id, document).await
}

async fn insert_document(
    pool: &SqlitePool,
    user_id: Option<&str>,
    document: &str,
) -> Result<ProposalRow> {
    let id = Uuid::new_v4().to_string();

    let row = sqlx::query_as::<_, ProposalRow>(
        r#"
        INSERT INTO proposals (id, user_id, document)
        VALUES (?, ?, ?)
        RETURNING id, user_id, document, created_at, updated_at
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(document)
    .fetch_one(pool)
    .await?;

    tracing::debug!(proposal_id = %row.id, owner = ?row.user_id, "Inserted proposal");
    Ok(row)
}

/// Get a proposal row by ID.
pub async fn get_proposal(pool: &SqlitePool, id: &str) -> Result<ProposalRow> {
    sqlx::query_as::<_, ProposalRow>(
        r#"
        SELECT id, user_id, document, created_at, updated_at
        FROM proposals
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Proposal",
        id: id.to_string(),
    })
}

/// Get a proposal by ID as a raw record.
///
/// An unreadable document yields a record holding only the row columns.
pub async fn get_raw(pool: &SqlitePool, id: &str) -> Result<RawRecord> {
    let row = get_proposal(pool, id).await?;
    Ok(lenient_record(&row))
}

/// Replace a proposal's generated content.
///
/// The content is stored serialized, as a string inside the document.
pub async fn update_content(pool: &SqlitePool, id: &str, content: &Value) -> Result<ProposalRow> {
    let encoded = serde_json::to_string(content)?;

    let result = sqlx::query(
        r#"
        UPDATE proposals
        SET document = json_set(document, '$.latexContent', ?),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&encoded)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Proposal",
            id: id.to_string(),
        });
    }

    get_proposal(pool, id).await
}

/// Delete a proposal by ID.
pub async fn delete_proposal(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM proposals
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Proposal",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Count total proposals.
pub async fn count_proposals(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM proposals
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// A proposal joined with its owner, if the owner exists.
#[derive(Debug, FromRow)]
struct OwnedProposalRow {
    #[sqlx(flatten)]
    proposal: ProposalRow,
    owner_id: Option<String>,
    owner_name: Option<String>,
    owner_email: Option<String>,
    owner_avatar: Option<String>,
}

/// Newest proposals as whole documents with the owner embedded under `user`.
///
/// Fails if any document in the page is not a JSON object.
pub async fn list_full(pool: &SqlitePool, limit: i64) -> Result<Vec<RawRecord>> {
    let rows = sqlx::query_as::<_, OwnedProposalRow>(
        r#"
        SELECT p.id, p.user_id, p.document, p.created_at, p.updated_at,
               u.id AS owner_id, u.name AS owner_name,
               u.email AS owner_email, u.avatar AS owner_avatar
        FROM proposals p
        LEFT JOIN users u ON u.id = p.user_id
        ORDER BY p.created_at DESC, p.rowid DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(owned_row_to_record).collect()
}

/// Newest proposals for one owner, as whole documents.
///
/// Unreadable documents come back as records holding only the row columns.
pub async fn list_raw_by_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<RawRecord>> {
    let rows = sqlx::query_as::<_, ProposalRow>(
        r#"
        SELECT id, user_id, document, created_at, updated_at
        FROM proposals
        WHERE user_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(lenient_record).collect())
}

/// Newest proposals with known fields extracted one at a time.
///
/// Each field is read as its own JSON fragment, so a document whose fields
/// have unexpected types still comes back. A document that is not valid JSON
/// fails the query.
pub async fn list_projected(pool: &SqlitePool, limit: i64) -> Result<Vec<RawRecord>> {
    let columns = PROJECTED_FIELDS
        .iter()
        .map(|field| format!("document -> '$.{field}' AS \"{field}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let query = format!(
        r#"
        SELECT id, user_id, created_at, updated_at, {columns}
        FROM proposals
        ORDER BY created_at DESC, rowid DESC
        LIMIT ?
        "#
    );

    let rows = sqlx::query(&query).bind(limit).fetch_all(pool).await?;

    rows.iter().map(projected_row_to_record).collect()
}

/// Newest proposals with only id, name, client and creation time.
///
/// Never fails on document contents: fields of corrupt documents read as
/// absent.
pub async fn list_minimal(pool: &SqlitePool, limit: i64) -> Result<Vec<RawRecord>> {
    let rows = sqlx::query_as::<_, (String, String, Option<String>, Option<String>)>(
        r#"
        SELECT id, created_at,
               CASE WHEN json_valid(document) THEN document -> '$.name' END AS name,
               CASE WHEN json_valid(document) THEN document -> '$.clientName' END AS client_name
        FROM proposals
        ORDER BY created_at DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, created_at, name, client_name)| {
            RawRecord::new()
                .with("id", json!(id))
                .with("createdAt", json!(created_at))
                .with("name", fragment_value(name.as_deref()))
                .with("clientName", fragment_value(client_name.as_deref()))
        })
        .collect())
}

/// Raw JSON fragment as a value, `null` when absent.
fn fragment_value(fragment: Option<&str>) -> Value {
    fragment
        .and_then(|f| serde_json::from_str(f).ok())
        .unwrap_or(Value::Null)
}

fn row_to_record(row: &ProposalRow) -> Result<RawRecord> {
    let value: Value = serde_json::from_str(&row.document).map_err(|e| DatabaseError::Document {
        id: row.id.clone(),
        reason: e.to_string(),
    })?;
    let mut record = RawRecord::from_value(value).ok_or_else(|| DatabaseError::Document {
        id: row.id.clone(),
        reason: "document is not a JSON object".to_string(),
    })?;

    record.insert("id", json!(row.id));
    record.insert("userId", json!(row.user_id));
    record.insert("createdAt", json!(row.created_at));
    record.insert("updatedAt", json!(row.updated_at));
    Ok(record)
}

fn lenient_record(row: &ProposalRow) -> RawRecord {
    row_to_record(row).unwrap_or_else(|err| {
        tracing::warn!(proposal_id = %row.id, error = %err, "Serving proposal without its document");
        RawRecord::new()
            .with("id", json!(row.id))
            .with("userId", json!(row.user_id))
            .with("createdAt", json!(row.created_at))
            .with("updatedAt", json!(row.updated_at))
    })
}

fn owned_row_to_record(row: &OwnedProposalRow) -> Result<RawRecord> {
    let mut record = row_to_record(&row.proposal)?;

    if let Some(owner_id) = &row.owner_id {
        record.insert(
            "user",
            json!({
                "id": owner_id,
                "name": row.owner_name,
                "email": row.owner_email,
                "avatar": row.owner_avatar,
            }),
        );
    }
    Ok(record)
}

fn projected_row_to_record(row: &SqliteRow) -> Result<RawRecord> {
    let id: String = row.try_get("id")?;
    let mut record = RawRecord::new()
        .with("id", json!(id))
        .with("userId", json!(row.try_get::<Option<String>, _>("user_id")?))
        .with("createdAt", json!(row.try_get::<String, _>("created_at")?))
        .with("updatedAt", json!(row.try_get::<String, _>("updated_at")?));

    for field in PROJECTED_FIELDS {
        let Some(fragment) = row.try_get::<Option<String>, _>(*field)? else {
            continue;
        };
        let value = serde_json::from_str(&fragment).map_err(|e| DatabaseError::Document {
            id: id.clone(),
            reason: format!("{field}: {e}"),
        })?;
        record.insert(*field, value);
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::{user, Database};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn document(name: &str) -> ProposalDocument {
        ProposalDocument {
            name: name.to_string(),
            client_name: Some("Acme".to_string()),
            tech_stack: vec!["Rust".to_string()],
            modules: vec!["Billing".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let db = test_db().await;

        let row = create_proposal(db.pool(), None, &document("Portal")).await.unwrap();
        let fetched = get_proposal(db.pool(), &row.id).await.unwrap();
        assert_eq!(fetched, row);
        assert!(fetched.user_id.is_none());

        let raw = get_raw(db.pool(), &row.id).await.unwrap();
        assert_eq!(raw.get("name"), Some(&json!("Portal")));
        assert_eq!(raw.get("id"), Some(&json!(row.id)));

        delete_proposal(db.pool(), &row.id).await.unwrap();
        let result = get_proposal(db.pool(), &row.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

        let result = delete_proposal(db.pool(), &row.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_content_stores_serialized_blob() {
        let db = test_db().await;
        let row = create_proposal(db.pool(), None, &document("Portal")).await.unwrap();

        let updated = update_content(db.pool(), &row.id, &json!({"title": "Revised"}))
            .await
            .unwrap();

        let doc: Value = serde_json::from_str(&updated.document).unwrap();
        assert_eq!(doc["latexContent"], r#"{"title":"Revised"}"#);
        assert_eq!(doc["name"], "Portal");

        let result = update_content(db.pool(), "missing", &json!({})).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_full_embeds_existing_owner() {
        let db = test_db().await;
        let owner = user::create_user(
            db.pool(),
            &NewUser {
                email: "owner@example.com".to_string(),
                name: "Owner".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        create_proposal(db.pool(), Some(&owner.id), &document("Owned")).await.unwrap();
        create_proposal(db.pool(), Some("ghost-user"), &document("Orphan")).await.unwrap();

        let records = list_full(db.pool(), 50).await.unwrap();
        assert_eq!(records.len(), 2);

        // Newest first
        assert_eq!(records[0].get("name"), Some(&json!("Orphan")));
        assert!(records[0].get("user").is_none());
        assert_eq!(records[1].get("user").unwrap()["email"], "owner@example.com");
    }

    #[tokio::test]
    async fn test_tiers_against_corrupt_documents() {
        let db = test_db().await;
        insert_raw_document(db.pool(), None, r#"{"name": "Drifted", "budget": 5000, "techStack": "[\"Vue\"]"}"#)
            .await
            .unwrap();

        // A JSON array is valid JSON but not a document.
        insert_raw_document(db.pool(), None, r#"["not", "an", "object"]"#).await.unwrap();
        assert!(matches!(
            list_full(db.pool(), 50).await,
            Err(DatabaseError::Document { .. })
        ));

        let projected = list_projected(db.pool(), 50).await.unwrap();
        assert_eq!(projected.len(), 2);
        let drifted = projected
            .iter()
            .find(|r| r.get("name").is_some())
            .unwrap();
        assert_eq!(drifted.get("budget"), Some(&json!(5000)));
        assert_eq!(drifted.get("techStack"), Some(&json!("[\"Vue\"]")));

        // Not JSON at all.
        insert_raw_document(db.pool(), None, "{name: oops").await.unwrap();
        assert!(list_projected(db.pool(), 50).await.is_err());

        let minimal = list_minimal(db.pool(), 10).await.unwrap();
        assert_eq!(minimal.len(), 3);
        assert!(minimal.iter().any(|r| r.get("name") == Some(&json!("Drifted"))));
        assert!(minimal.iter().all(|r| r.get("id").is_some()));
    }

    #[tokio::test]
    async fn test_minimal_keeps_json_types() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        insert_raw_document(db.pool(), None, r#"{"name": false, "clientName": 0}"#)
            .await
            .unwrap();

        let minimal = list_minimal(db.pool(), 10).await.unwrap();
        assert_eq!(minimal[0].get("name"), Some(&json!(false)));
        assert_eq!(minimal[0].get("clientName"), Some(&json!(0)));

        let view = proposal_core::normalize_minimal(&minimal[0], 0);
        assert_eq!(view.name, "Proposal");
        assert_eq!(view.client_name, "Client");
    }

    #[tokio::test]
    async fn test_list_raw_by_user() {
        let db = test_db().await;
        create_proposal(db.pool(), Some("u1"), &document("One")).await.unwrap();
        create_proposal(db.pool(), Some("u2"), &document("Two")).await.unwrap();
        let broken = insert_raw_document(db.pool(), Some("u1"), "not json").await.unwrap();

        let records = list_raw_by_user(db.pool(), "u1").await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.get("userId") == Some(&json!("u1"))));
        assert_eq!(count_proposals(db.pool()).await.unwrap(), 3);

        let raw = get_raw(db.pool(), &broken.id).await.unwrap();
        assert_eq!(raw.get("id"), Some(&json!(broken.id)));
        assert!(raw.get("name").is_none());
    }

    #[tokio::test]
    async fn test_limit_is_respected() {
        let db = test_db().await;
        for i in 0..5 {
            create_proposal(db.pool(), None, &document(&format!("P{i}"))).await.unwrap();
        }

        assert_eq!(list_full(db.pool(), 3).await.unwrap().len(), 3);
        assert_eq!(list_projected(db.pool(), 2).await.unwrap().len(), 2);
        assert_eq!(list_minimal(db.pool(), 4).await.unwrap().len(), 4);
    }
}
