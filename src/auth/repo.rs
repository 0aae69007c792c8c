use anyhow::Context;
use async_trait::async_trait;
use sqlx::FromRow;
use tracing::{info, warn};

use crate::auth::repo_types::{NewUser, StoredPassword, User, UserRow};
use crate::db::{is_unique_violation, Database, Fetch};

const USER_COLUMNS: &str =
    "id, username, email, password, password_scheme, CAST(created_at AS TEXT) AS created_at";

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;

    /// Inserts the user. `Ok(None)` means the username is already taken.
    async fn create(&self, new_user: NewUser) -> anyhow::Result<Option<User>>;

    async fn update_password(&self, user_id: i64, password: &StoredPassword)
        -> anyhow::Result<()>;

    async fn exists(&self, username: &str) -> anyhow::Result<bool> {
        Ok(self.find_by_username(username).await?.is_some())
    }
}

#[async_trait]
impl UserRepo for Database {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS);
        let row = self
            .execute_query(&sql, vec![username.into()], Fetch::One)
            .await
            .context("find user by username")?
            .into_row();
        row.map(|r| User::try_from(UserRow::from_row(&r)?))
            .transpose()
    }

    async fn create(&self, new_user: NewUser) -> anyhow::Result<Option<User>> {
        let sql = format!(
            "INSERT INTO users (username, email, password, password_scheme) VALUES (?, ?, ?, ?) RETURNING {}",
            USER_COLUMNS
        );
        let res = self
            .execute_query(
                &sql,
                vec![
                    new_user.username.as_str().into(),
                    new_user.email.into(),
                    new_user.password.value().into(),
                    new_user.password.scheme().into(),
                ],
                Fetch::One,
            )
            .await;

        match res {
            Ok(out) => {
                let row = out.into_row().context("insert returned no row")?;
                let user = User::try_from(UserRow::from_row(&row)?)?;
                info!(user_id = user.id, username = %user.username, "user created");
                Ok(Some(user))
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(username = %new_user.username, "username already exists");
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert user")),
        }
    }

    async fn update_password(
        &self,
        user_id: i64,
        password: &StoredPassword,
    ) -> anyhow::Result<()> {
        self.execute_query(
            "UPDATE users SET password = ?, password_scheme = ? WHERE id = ?",
            vec![
                password.value().into(),
                password.scheme().into(),
                user_id.into(),
            ],
            Fetch::None,
        )
        .await
        .context("update password")?;
        Ok(())
    }
}
