use crate::error::{IdentityError, IdentityErrorExt};
use crate::model::{User, UserRecord};
use catalog_database::Database;
use catalog_derive::timed;
use std::future::Future;

/// Account storage keyed by username.
pub trait UserRepository: Send + Sync + 'static {
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, IdentityError>> + Send;

    /// Inserts a new account. Fails with `Conflict` when the username is taken.
    fn insert(&self, user: &User) -> impl Future<Output = Result<(), IdentityError>> + Send;

    fn count(&self) -> impl Future<Output = Result<usize, IdentityError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SurrealUserRepository {
    db: Database,
}

impl SurrealUserRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

impl UserRepository for SurrealUserRepository {
    #[timed(SurrealUserRepository)]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, IdentityError> {
        let mut records = self
            .db
            .query("SELECT username, password_hash, role FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username.to_owned()))
            .await
            .context("Loading user")?
            .take::<Vec<UserRecord>>(0)
            .context("Parsing user")?;

        records.pop().map(User::try_from).transpose()
    }

    #[timed(SurrealUserRepository)]
    async fn insert(&self, user: &User) -> Result<(), IdentityError> {
        if self.find_by_username(&user.username).await?.is_some() {
            return Err(IdentityError::Conflict {
                message: user.username.clone().into(),
                context: Some("insert user".into()),
            });
        }

        let record = UserRecord::from(user);
        self.db
            .query("CREATE user SET username = $username, password_hash = $password_hash, role = $role")
            .bind(("username", record.username))
            .bind(("password_hash", record.password_hash))
            .bind(("role", record.role))
            .await
            .context("Saving user")?
            .check()
            .map_err(surrealdb::Error::from)?;
        Ok(())
    }

    #[timed(SurrealUserRepository)]
    async fn count(&self) -> Result<usize, IdentityError> {
        let total = self
            .db
            .query("SELECT VALUE count() FROM user GROUP ALL")
            .await
            .context("Counting users")?
            .take::<Vec<i64>>(0)
            .context("Parsing user count")?;

        Ok(total.first().copied().map_or(0, |n| usize::try_from(n).unwrap_or_default()))
    }
}
