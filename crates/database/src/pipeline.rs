//! [`Database`] as the backing store for the proposal pipelines.

use async_trait::async_trait;
use proposal_core::{DirectoryError, ListingTier, ProposalSource, RawRecord, SourceError, UserDirectory};

use crate::error::DatabaseError;
use crate::models::User;
use crate::{proposal, user, Database};

/// Map "this user does not exist" to `None`; anything else is a lookup failure.
fn found(result: crate::Result<User>) -> Result<Option<User>, DirectoryError> {
    match result {
        Ok(user) => Ok(Some(user)),
        Err(DatabaseError::NotFound { .. }) => Ok(None),
        Err(e) => Err(DirectoryError::new(e.to_string())),
    }
}

#[async_trait]
impl UserDirectory for Database {
    type User = User;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        found(user::get_user_by_email(self.pool(), email).await)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DirectoryError> {
        found(user::get_user(self.pool(), id).await)
    }

    async fn most_recent(&self) -> Result<Option<User>, DirectoryError> {
        user::most_recent_user(self.pool())
            .await
            .map_err(|e| DirectoryError::new(e.to_string()))
    }
}

#[async_trait]
impl ProposalSource for Database {
    async fn fetch(&self, tier: ListingTier, limit: i64) -> Result<Vec<RawRecord>, SourceError> {
        let result = match tier {
            ListingTier::Full => proposal::list_full(self.pool(), limit).await,
            ListingTier::Projected => proposal::list_projected(self.pool(), limit).await,
            ListingTier::Minimal => proposal::list_minimal(self.pool(), limit).await,
        };

        result.map_err(|e| SourceError::new(e.to_string()))
    }
}
