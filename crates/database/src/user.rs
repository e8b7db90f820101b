//! User operations.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{NewUser, User};

const DEFAULT_ROLE: &str = "User";

/// Create a new user with a fresh id.
pub async fn create_user(pool: &SqlitePool, new_user: &NewUser) -> Result<User> {
    let id = Uuid::new_v4().to_string();
    let role = new_user
        .role
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .unwrap_or(DEFAULT_ROLE);

    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, name, phone, role, avatar)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, email, name, phone, role, avatar, created_at
        "#,
    )
    .bind(&id)
    .bind(new_user.email.trim())
    .bind(&new_user.name)
    .bind(&new_user.phone)
    .bind(role)
    .bind(&new_user.avatar)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "User",
                    id: new_user.email.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })
}

/// Get a user by ID.
///
/// Ids that are not UUIDs are rejected with [`DatabaseError::InvalidId`]
/// before touching the database.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    if Uuid::parse_str(id).is_err() {
        return Err(DatabaseError::InvalidId {
            entity: "User",
            id: id.to_string(),
        });
    }

    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, phone, role, avatar, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Get a user by email.
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, phone, role, avatar, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: email.to_string(),
    })
}

/// Get the most recently created user, if any.
pub async fn most_recent_user(pool: &SqlitePool) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, phone, role, avatar, created_at
        FROM users
        ORDER BY created_at DESC, rowid DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// List all users, newest first.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, phone, role, avatar, created_at
        FROM users
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn alice() -> NewUser {
        NewUser {
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = test_db().await;

        let created = create_user(db.pool(), &alice()).await.unwrap();
        assert_eq!(created.role, "User");
        assert!(Uuid::parse_str(&created.id).is_ok());

        let by_id = get_user(db.pool(), &created.id).await.unwrap();
        assert_eq!(by_id, created);

        let by_email = get_user_by_email(db.pool(), " alice@example.com ").await.unwrap();
        assert_eq!(by_email.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = test_db().await;
        create_user(db.pool(), &alice()).await.unwrap();

        let result = create_user(db.pool(), &alice()).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_get_user_rejects_malformed_id() {
        let db = test_db().await;

        let result = get_user(db.pool(), "not-a-uuid").await;
        assert!(matches!(result, Err(DatabaseError::InvalidId { .. })));

        let result = get_user(db.pool(), &Uuid::new_v4().to_string()).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_most_recent_and_list_order() {
        let db = test_db().await;
        assert!(most_recent_user(db.pool()).await.unwrap().is_none());

        create_user(db.pool(), &alice()).await.unwrap();
        let bob = create_user(
            db.pool(),
            &NewUser {
                email: "bob@example.com".to_string(),
                name: "Bob".to_string(),
                role: Some("Admin".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let recent = most_recent_user(db.pool()).await.unwrap().unwrap();
        assert_eq!(recent.id, bob.id);
        assert_eq!(recent.role, "Admin");

        let users = list_users(db.pool()).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "Bob");
        assert_eq!(count_users(db.pool()).await.unwrap(), 2);
    }
}
