use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::{password::hash_password, repo_types::User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store's uniqueness constraint rejected the email.
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// User-record store consumed by the auth handlers.
///
/// `create` receives the plaintext password and is responsible for hashing
/// it; implementations must reject duplicate emails with
/// [`StoreError::DuplicateEmail`] even when callers pre-checked with
/// `find_by_email`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn create(&self, email: &str, password: &str) -> Result<User, StoreError>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, image, color,
                   profile_setup, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("select user by email")?;
        Ok(user)
    }

    async fn create(&self, email: &str, password: &str) -> Result<User, StoreError> {
        let password_hash = hash_password(password)?;
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, first_name, last_name, image, color,
                      profile_setup, created_at
            "#,
        )
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::DuplicateEmail)
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert user").into()),
        }
    }
}

#[cfg(test)]
pub(crate) use memory::{MemoryUserStore, RacingUserStore, UnavailableUserStore};

#[cfg(test)]
mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::{StoreError, UserStore};
    use crate::auth::{password::hash_password, repo_types::User};

    /// Map keyed by email; insertion checks uniqueness under the lock.
    #[derive(Default)]
    pub(crate) struct MemoryUserStore {
        users: Mutex<HashMap<String, User>>,
    }

    impl MemoryUserStore {
        pub(crate) fn len(&self) -> usize {
            self.users.lock().unwrap().len()
        }

        pub(crate) fn update(&self, email: &str, f: impl FnOnce(&mut User)) {
            if let Some(user) = self.users.lock().unwrap().get_mut(email) {
                f(user);
            }
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
            Ok(self.users.lock().unwrap().get(email).cloned())
        }

        async fn create(&self, email: &str, password: &str) -> Result<User, StoreError> {
            let password_hash = hash_password(password)?;
            let mut users = self.users.lock().unwrap();
            if users.contains_key(email) {
                return Err(StoreError::DuplicateEmail);
            }
            let user = User {
                id: Uuid::new_v4(),
                email: email.to_owned(),
                password_hash,
                first_name: None,
                last_name: None,
                image: None,
                color: None,
                profile_setup: false,
                created_at: OffsetDateTime::now_utc(),
            };
            users.insert(email.to_owned(), user.clone());
            Ok(user)
        }
    }

    /// Sees no user on lookup but loses the insert to a concurrent signup.
    pub(crate) struct RacingUserStore;

    #[async_trait]
    impl UserStore for RacingUserStore {
        async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<User>> {
            Ok(None)
        }

        async fn create(&self, _email: &str, _password: &str) -> Result<User, StoreError> {
            Err(StoreError::DuplicateEmail)
        }
    }

    /// Every call fails as if the database were down.
    pub(crate) struct UnavailableUserStore;

    #[async_trait]
    impl UserStore for UnavailableUserStore {
        async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<User>> {
            anyhow::bail!("connection refused")
        }

        async fn create(&self, _email: &str, _password: &str) -> Result<User, StoreError> {
            Err(anyhow::anyhow!("connection refused").into())
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = MemoryUserStore::default();
        store.create("ada@example.com", "pw-one").await.expect("first create");
        let err = store.create("ada@example.com", "pw-two").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn create_stores_hash_not_plaintext() {
        let store = MemoryUserStore::default();
        let user = store.create("ada@example.com", "plain-pw").await.expect("create");
        assert_ne!(user.password_hash, "plain-pw");
        assert!(crate::auth::password::verify_password("plain-pw", &user.password_hash).unwrap());
    }
}
