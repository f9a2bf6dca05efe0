use sqlx::FromRow;

use super::{now, Database};
use crate::access::Principal;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{User, PROPERTY_OWNERS_GROUP};
use crate::security::{hash_password, verify_password};

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    is_superuser: bool,
    date_joined: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            is_superuser: row.is_superuser,
            date_joined: row.date_joined,
        }
    }
}

impl Database {
    /// Create a regular account. A taken username is a `Conflict`.
    pub async fn create_user(&self, username: &str, email: &str, password: &str) -> AppResult<User> {
        self.insert_user(username, email, password, false).await
    }

    pub async fn create_superuser(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<User> {
        self.insert_user(username, email, password, true).await
    }

    /// Create the bootstrap superuser unless an account with that name exists.
    ///
    /// Returns `true` when an account was created.
    pub async fn ensure_superuser(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<bool> {
        if self.find_user_by_username(username).await?.is_some() {
            return Ok(false);
        }
        self.create_superuser(username, email, password).await?;
        Ok(true)
    }

    async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_superuser: bool,
    ) -> AppResult<User> {
        if username.is_empty() || username.chars().count() > 150 {
            return Err(ValidationError::new(
                "username",
                "Username must be between 1 and 150 characters.",
            )
            .into());
        }

        let password_hash =
            hash_password(password).map_err(|e| AppError::PasswordHash(e.to_string()))?;

        let id = sqlx::query(
            "INSERT INTO users (username, email, password_hash, is_superuser, date_joined)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .bind(is_superuser)
        .bind(now())
        .execute(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict(format!("Username '{}' is already taken", username))
            }
            other => other,
        })?
        .last_insert_rowid();

        self.get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", id)))
    }

    pub async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, is_superuser, date_joined FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    pub async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, is_superuser, date_joined FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Check credentials and build the principal for an admin request.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Option<Principal>> {
        let row: Option<(i64, String, bool)> = sqlx::query_as(
            "SELECT id, password_hash, is_superuser FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some((user_id, password_hash, is_superuser)) = row else {
            return Ok(None);
        };

        if !verify_password(password, &password_hash) {
            return Ok(None);
        }

        let is_property_owner = self.is_in_group(user_id, PROPERTY_OWNERS_GROUP).await?;

        Ok(Some(Principal {
            user_id,
            username: username.to_string(),
            is_superuser,
            is_property_owner,
        }))
    }

    /// Return the id of the group called `name`, creating it if needed.
    pub async fn get_or_create_group(&self, name: &str) -> AppResult<i64> {
        sqlx::query("INSERT OR IGNORE INTO groups (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        let group_id: i64 = sqlx::query_scalar("SELECT id FROM groups WHERE name = ?1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(group_id)
    }

    pub async fn add_user_to_group(&self, user_id: i64, group_id: i64) -> AppResult<()> {
        sqlx::query("INSERT OR IGNORE INTO user_groups (user_id, group_id) VALUES (?1, ?2)")
            .bind(user_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn is_in_group(&self, user_id: i64, group_name: &str) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_groups ug
             INNER JOIN groups g ON g.id = ug.group_id
             WHERE ug.user_id = ?1 AND g.name = ?2",
        )
        .bind(user_id)
        .bind(group_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Delete an account. Accommodations it owned become unowned.
    pub async fn delete_user(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
