//! # User Repository
//!
//! Minimal author directory: enough for foreign keys, ownership checks and
//! for the scheduler to enumerate authors.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use royalty_core::{Role, User};

const USER_COLUMNS: &str = "id, username, email, role, display_name, created_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Registers a user with a fresh id.
    ///
    /// `Conflict`-style `UniqueViolation` when the username or email is
    /// taken.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        role: Role,
        display_name: Option<&str>,
    ) -> DbResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.trim().to_string(),
            email: email.trim().to_lowercase(),
            role,
            display_name: display_name.map(str::to_string),
            created_at: Utc::now(),
        };

        debug!(
            id = %user.id,
            username = %user.username,
            role = user.role.as_str(),
            "Creating user"
        );

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, role, display_name, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role)
        .bind(&user.display_name)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } if field.contains("email") => {
                DbError::duplicate("email", &user.email)
            }
            DbError::UniqueViolation { .. } => DbError::duplicate("username", &user.username),
            other => other,
        })?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// All users with `role`, oldest first.
    pub async fn list_by_role(&self, role: Role) -> DbResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = ?1 ORDER BY created_at, rowid"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(role)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Ids of every author, for the monthly aggregation.
    pub async fn author_ids(&self) -> DbResult<Vec<String>> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM users WHERE role = ?1 ORDER BY created_at, rowid")
                .bind(Role::Author)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }
}
