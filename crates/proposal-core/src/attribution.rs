//! Owner attribution for newly created proposals.
//!
//! A creation request can carry several hints about who is asking: an
//! explicit email, an explicit user id, and whatever the session middleware
//! attached. [`resolve_owner`] evaluates them as an ordered list of
//! [`AttributionStrategy`]s and stops at the first that yields a user.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::fallback::first_success;

/// A user lookup that could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("user lookup failed: {0}")]
pub struct DirectoryError(pub String);

impl DirectoryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Read-only access to user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// The user record this directory hands out.
    type User: Clone + Send + Sync;

    async fn find_by_email(&self, email: &str) -> Result<Option<Self::User>, DirectoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Self::User>, DirectoryError>;

    /// The most recently created user, if any exist.
    async fn most_recent(&self) -> Result<Option<Self::User>, DirectoryError>;
}

/// The ownership hints available for one creation request.
#[derive(Debug, Clone)]
pub struct AttributionRequest<U> {
    /// User attached by the session middleware.
    pub session_user: Option<U>,
    /// User id referenced by the session store.
    pub session_user_id: Option<String>,
    /// `userId` supplied in the request body.
    pub user_id: Option<String>,
    /// `userEmail` supplied in the request body.
    pub user_email: Option<String>,
}

impl<U> Default for AttributionRequest<U> {
    fn default() -> Self {
        Self {
            session_user: None,
            session_user_id: None,
            user_id: None,
            user_email: None,
        }
    }
}

impl<U> AttributionRequest<U> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_user(mut self, user: Option<U>) -> Self {
        self.session_user = user;
        self
    }

    pub fn session_user_id(mut self, id: Option<String>) -> Self {
        self.session_user_id = id;
        self
    }

    pub fn user_id(mut self, id: Option<String>) -> Self {
        self.user_id = id;
        self
    }

    pub fn user_email(mut self, email: Option<String>) -> Self {
        self.user_email = email;
        self
    }
}

/// A single way of finding the owner, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionStrategy {
    /// Look up the email supplied in the request.
    RequestEmail,
    /// Use the user the session middleware authenticated.
    SessionUser,
    /// Look up the id held in the session store.
    SessionStoreId,
    /// Look up the id supplied in the request.
    RequestUserId,
    /// Take the most recently created user.
    MostRecentUser,
}

impl AttributionStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributionStrategy::RequestEmail => "request_email",
            AttributionStrategy::SessionUser => "session_user",
            AttributionStrategy::SessionStoreId => "session_store_id",
            AttributionStrategy::RequestUserId => "request_user_id",
            AttributionStrategy::MostRecentUser => "most_recent_user",
        }
    }
}

impl fmt::Display for AttributionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const STRICT_STRATEGIES: &[AttributionStrategy] = &[
    AttributionStrategy::RequestEmail,
    AttributionStrategy::SessionUser,
    AttributionStrategy::SessionStoreId,
    AttributionStrategy::RequestUserId,
];

const PERMISSIVE_STRATEGIES: &[AttributionStrategy] = &[
    AttributionStrategy::RequestEmail,
    AttributionStrategy::SessionUser,
    AttributionStrategy::SessionStoreId,
    AttributionStrategy::RequestUserId,
    AttributionStrategy::MostRecentUser,
];

/// What to do when no strategy produces a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributionPolicy {
    /// Reject the request.
    #[default]
    Strict,
    /// Fall back to the most recent user, then allow an ownerless proposal.
    Permissive,
}

impl AttributionPolicy {
    /// Strategies evaluated under this policy, in order.
    pub fn strategies(self) -> &'static [AttributionStrategy] {
        match self {
            AttributionPolicy::Strict => STRICT_STRATEGIES,
            AttributionPolicy::Permissive => PERMISSIVE_STRATEGIES,
        }
    }
}

impl FromStr for AttributionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(AttributionPolicy::Strict),
            "permissive" => Ok(AttributionPolicy::Permissive),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// An unrecognised policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown attribution policy: {0} (expected strict or permissive)")]
pub struct ParsePolicyError(pub String);

/// The outcome of attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution<U> {
    /// The owning user, `None` for an anonymous proposal.
    pub user: Option<U>,
    /// The strategy that produced `user`.
    pub strategy: Option<AttributionStrategy>,
}

impl<U> Attribution<U> {
    fn anonymous() -> Self {
        Self {
            user: None,
            strategy: None,
        }
    }
}

/// Errors from [`resolve_owner`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributionError {
    /// Strict policy and nothing resolved.
    #[error("no valid user could be resolved for this request")]
    NoValidUser,
}

/// Why a strategy did not produce a user.
#[derive(Debug)]
enum Miss {
    /// The request carried nothing for this strategy to work with.
    NoHint,
    NotFound,
    Lookup(DirectoryError),
}

/// Resolve the owner of a new proposal.
pub async fn resolve_owner<D>(
    directory: &D,
    request: AttributionRequest<D::User>,
    policy: AttributionPolicy,
) -> Result<Attribution<D::User>, AttributionError>
where
    D: UserDirectory + ?Sized,
{
    let request = &request;
    let outcome = first_success(policy.strategies().iter().copied(), |strategy| async move {
        let result = attempt(directory, request, strategy).await;
        match &result {
            Ok(_) => {}
            Err(Miss::Lookup(err)) => {
                warn!(strategy = %strategy, error = %err, "Owner lookup failed, trying next strategy")
            }
            Err(miss) => debug!(strategy = %strategy, ?miss, "Owner strategy missed"),
        }
        result
    })
    .await;

    match outcome {
        Ok(success) => {
            info!(strategy = %success.candidate, "Resolved proposal owner");
            Ok(Attribution {
                user: Some(success.value),
                strategy: Some(success.candidate),
            })
        }
        Err(_) if policy == AttributionPolicy::Permissive => {
            warn!("No owner resolved, creating anonymous proposal");
            Ok(Attribution::anonymous())
        }
        Err(_) => Err(AttributionError::NoValidUser),
    }
}

async fn attempt<D>(
    directory: &D,
    request: &AttributionRequest<D::User>,
    strategy: AttributionStrategy,
) -> Result<D::User, Miss>
where
    D: UserDirectory + ?Sized,
{
    let found = match strategy {
        AttributionStrategy::RequestEmail => {
            let email = hint(request.user_email.as_deref()).ok_or(Miss::NoHint)?;
            directory.find_by_email(email).await
        }
        AttributionStrategy::SessionUser => {
            return request.session_user.clone().ok_or(Miss::NoHint);
        }
        AttributionStrategy::SessionStoreId => {
            let id = hint(request.session_user_id.as_deref()).ok_or(Miss::NoHint)?;
            directory.find_by_id(id).await
        }
        AttributionStrategy::RequestUserId => {
            let id = hint(request.user_id.as_deref()).ok_or(Miss::NoHint)?;
            directory.find_by_id(id).await
        }
        AttributionStrategy::MostRecentUser => directory.most_recent().await,
    };

    found.map_err(Miss::Lookup)?.ok_or(Miss::NotFound)
}

fn hint(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct TestUser {
        id: String,
        email: String,
    }

    fn user(id: &str, email: &str) -> TestUser {
        TestUser {
            id: id.to_string(),
            email: email.to_string(),
        }
    }

    /// In-memory directory; ids starting with `bad` fail like malformed ids.
    #[derive(Default)]
    struct MemoryDirectory {
        users: Vec<TestUser>,
        lookups: Mutex<Vec<String>>,
    }

    impl MemoryDirectory {
        fn with_users(users: Vec<TestUser>) -> Self {
            Self {
                users,
                lookups: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl UserDirectory for MemoryDirectory {
        type User = TestUser;

        async fn find_by_email(&self, email: &str) -> Result<Option<TestUser>, DirectoryError> {
            self.lookups.lock().unwrap().push(format!("email:{email}"));
            Ok(self.users.iter().find(|u| u.email == email).cloned())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<TestUser>, DirectoryError> {
            self.lookups.lock().unwrap().push(format!("id:{id}"));
            if id.starts_with("bad") {
                return Err(DirectoryError::new(format!("malformed id {id}")));
            }
            Ok(self.users.iter().find(|u| u.id == id).cloned())
        }

        async fn most_recent(&self) -> Result<Option<TestUser>, DirectoryError> {
            self.lookups.lock().unwrap().push("recent".to_string());
            Ok(self.users.last().cloned())
        }
    }

    #[tokio::test]
    async fn test_session_user_without_explicit_hints() {
        let dir = MemoryDirectory::default();
        let request = AttributionRequest::new().session_user(Some(user("s1", "s@x.com")));

        let resolved = resolve_owner(&dir, request, AttributionPolicy::Strict).await.unwrap();

        assert_eq!(resolved.user, Some(user("s1", "s@x.com")));
        assert_eq!(resolved.strategy, Some(AttributionStrategy::SessionUser));
        assert!(dir.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_email_takes_precedence_over_session() {
        let dir = MemoryDirectory::with_users(vec![user("a1", "a@x.com")]);
        let request = AttributionRequest::new()
            .session_user(Some(user("s1", "s@x.com")))
            .user_email(Some("a@x.com".to_string()));

        let resolved = resolve_owner(&dir, request, AttributionPolicy::Strict).await.unwrap();

        assert_eq!(resolved.user.unwrap().id, "a1");
        assert_eq!(resolved.strategy, Some(AttributionStrategy::RequestEmail));
    }

    #[tokio::test]
    async fn test_unknown_email_falls_through_to_ids() {
        let dir = MemoryDirectory::with_users(vec![user("u2", "b@x.com")]);
        let request = AttributionRequest::new()
            .user_email(Some("nobody@x.com".to_string()))
            .user_id(Some("u2".to_string()));

        let resolved = resolve_owner(&dir, request, AttributionPolicy::Strict).await.unwrap();

        assert_eq!(resolved.user.unwrap().id, "u2");
        assert_eq!(resolved.strategy, Some(AttributionStrategy::RequestUserId));
        assert_eq!(
            *dir.lookups.lock().unwrap(),
            vec!["email:nobody@x.com".to_string(), "id:u2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_session_store_id_before_request_id() {
        let dir = MemoryDirectory::with_users(vec![user("u1", "a@x.com"), user("u2", "b@x.com")]);
        let request = AttributionRequest::new()
            .session_user_id(Some("u1".to_string()))
            .user_id(Some("u2".to_string()));

        let resolved = resolve_owner(&dir, request, AttributionPolicy::Strict).await.unwrap();

        assert_eq!(resolved.user.unwrap().id, "u1");
        assert_eq!(resolved.strategy, Some(AttributionStrategy::SessionStoreId));
    }

    #[tokio::test]
    async fn test_lookup_error_is_treated_as_not_found() {
        let dir = MemoryDirectory::with_users(vec![user("u2", "b@x.com")]);
        let request = AttributionRequest::new()
            .session_user_id(Some("bad-id".to_string()))
            .user_id(Some("u2".to_string()));

        let resolved = resolve_owner(&dir, request, AttributionPolicy::Strict).await.unwrap();

        assert_eq!(resolved.user.unwrap().id, "u2");
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_unresolved() {
        let dir = MemoryDirectory::with_users(vec![user("u1", "a@x.com")]);
        let request = AttributionRequest::new().user_email(Some("nobody@x.com".to_string()));

        let err = resolve_owner(&dir, request, AttributionPolicy::Strict).await.unwrap_err();

        assert_eq!(err, AttributionError::NoValidUser);
        assert!(!dir.lookups.lock().unwrap().contains(&"recent".to_string()));
    }

    #[tokio::test]
    async fn test_permissive_policy_uses_most_recent_user() {
        let dir = MemoryDirectory::with_users(vec![user("u1", "a@x.com"), user("u9", "z@x.com")]);
        let request = AttributionRequest::new().user_id(Some("missing".to_string()));

        let resolved = resolve_owner(&dir, request, AttributionPolicy::Permissive)
            .await
            .unwrap();

        assert_eq!(resolved.user.unwrap().id, "u9");
        assert_eq!(resolved.strategy, Some(AttributionStrategy::MostRecentUser));
    }

    #[tokio::test]
    async fn test_unknown_email_without_session_falls_back_to_recent() {
        let dir = MemoryDirectory::with_users(vec![user("u1", "a@x.com"), user("u9", "z@x.com")]);
        let request = AttributionRequest::new().user_email(Some("nobody@x.com".to_string()));

        let resolved = resolve_owner(&dir, request, AttributionPolicy::Permissive)
            .await
            .unwrap();

        assert_eq!(resolved.user.unwrap().id, "u9");
        assert_eq!(resolved.strategy, Some(AttributionStrategy::MostRecentUser));
        assert_eq!(
            *dir.lookups.lock().unwrap(),
            vec!["email:nobody@x.com".to_string(), "recent".to_string()]
        );
    }

    #[tokio::test]
    async fn test_permissive_policy_allows_anonymous() {
        let dir = MemoryDirectory::default();

        let resolved = resolve_owner(&dir, AttributionRequest::new(), AttributionPolicy::Permissive)
            .await
            .unwrap();

        assert!(resolved.user.is_none());
        assert!(resolved.strategy.is_none());
    }

    #[tokio::test]
    async fn test_blank_hints_are_skipped() {
        let dir = MemoryDirectory::with_users(vec![user("u1", "a@x.com")]);
        let request = AttributionRequest::new()
            .user_email(Some("   ".to_string()))
            .user_id(Some("".to_string()));

        let err = resolve_owner(&dir, request, AttributionPolicy::Strict).await.unwrap_err();

        assert_eq!(err, AttributionError::NoValidUser);
        assert!(dir.lookups.lock().unwrap().is_empty());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("strict".parse(), Ok(AttributionPolicy::Strict));
        assert_eq!(" Permissive ".parse(), Ok(AttributionPolicy::Permissive));
        assert!("loose".parse::<AttributionPolicy>().is_err());
        assert_eq!(AttributionPolicy::default(), AttributionPolicy::Strict);
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(
            AttributionPolicy::Permissive.strategies().last(),
            Some(&AttributionStrategy::MostRecentUser)
        );
        assert!(!AttributionPolicy::Strict
            .strategies()
            .contains(&AttributionStrategy::MostRecentUser));
        assert_eq!(AttributionPolicy::Strict.strategies()[0], AttributionStrategy::RequestEmail);
    }
}
