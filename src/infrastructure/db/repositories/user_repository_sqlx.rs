use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::user_repository::{UniqueViolation, UserRepository};
use crate::domain::users::User;
use crate::infrastructure::db::PgPool;

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Postgres unique_violation; the constraint name tells the column apart.
fn map_write_error(e: sqlx::Error) -> anyhow::Error {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            match db.constraint() {
                Some(c) if c.contains("email") => return anyhow::Error::new(UniqueViolation::Email),
                Some(c) if c.contains("username") => {
                    return anyhow::Error::new(UniqueViolation::Username);
                }
                _ => {}
            }
        }
    }
    anyhow::Error::new(e)
}

fn map_user(r: &sqlx::postgres::PgRow) -> User {
    User {
        id: r.get("id"),
        username: r.get("username"),
        email: r.get("email"),
        image_file: r.get("image_file"),
        password_hash: r.try_get("password_hash").ok(),
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let row = sqlx::query(
            r#"INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3)
               RETURNING id, username, email, image_file"#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(map_user(&row))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(
            r#"SELECT id, username, email, image_file, password_hash FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_user))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(
            r#"SELECT id, username, email, image_file FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_user))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(r#"SELECT id, username, email, image_file FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_user))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
        image_file: Option<&str>,
    ) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(
            r#"UPDATE users
               SET username = $2, email = $3, image_file = COALESCE($4, image_file)
               WHERE id = $1
               RETURNING id, username, email, image_file"#,
        )
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(image_file)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(row.as_ref().map(map_user))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
