use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::post_repository::PostRepository;
use crate::domain::pagination::offset;
use crate::domain::posts::{NewPost, Post, PostUpdate, SearchFilter, SearchOrder};
use crate::infrastructure::db::PgPool;

pub struct SqlxPostRepository {
    pub pool: PgPool,
}

impl SqlxPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = r#"p.id, p.title, p.story, p.images, p.univ, p.city,
    p.cost_per_person, p.date_posted, p.user_id, u.username AS author"#;

fn map_post(r: &sqlx::postgres::PgRow) -> Post {
    let images: serde_json::Value = r.get("images");
    let images: Vec<String> = serde_json::from_value(images).unwrap_or_default();
    Post {
        id: r.get("id"),
        title: r.get("title"),
        story: r.get("story"),
        images,
        univ: r.get("univ"),
        city: r.get("city"),
        cost_per_person: r.get("cost_per_person"),
        date_posted: r.get("date_posted"),
        user_id: r.get("user_id"),
        author: r.get("author"),
    }
}

// ORDER BY fragments are fixed strings keyed off the enum; nothing
// user-supplied is ever spliced into SQL.
fn order_clause(order: SearchOrder) -> &'static str {
    match order {
        SearchOrder::CostAsc => "p.cost_per_person ASC",
        SearchOrder::DateDescCostDesc => "p.date_posted DESC, p.cost_per_person DESC",
        SearchOrder::DateDesc => "p.date_posted DESC",
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create_post(&self, user_id: Uuid, post: &NewPost) -> anyhow::Result<Post> {
        let images = serde_json::to_value(&post.images)?;
        let row = sqlx::query(&format!(
            r#"WITH inserted AS (
                   INSERT INTO posts (title, story, images, univ, city, cost_per_person, user_id)
                   VALUES ($1, $2, $3, $4, $5, $6, $7)
                   RETURNING *
               )
               SELECT {POST_COLUMNS} FROM inserted p JOIN users u ON u.id = p.user_id"#
        ))
        .bind(&post.title)
        .bind(&post.story)
        .bind(images)
        .bind(&post.univ)
        .bind(&post.city)
        .bind(post.cost_per_person)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_post(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query(&format!(
            r#"SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.user_id
               WHERE p.id = $1"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_post))
    }

    async fn update_post(&self, id: Uuid, update: &PostUpdate) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query(&format!(
            r#"WITH updated AS (
                   UPDATE posts
                   SET title = $2, story = $3, univ = $4, city = $5, cost_per_person = $6
                   WHERE id = $1
                   RETURNING *
               )
               SELECT {POST_COLUMNS} FROM updated p JOIN users u ON u.id = p.user_id"#
        ))
        .bind(id)
        .bind(&update.title)
        .bind(&update.story)
        .bind(&update.univ)
        .bind(&update.city)
        .bind(update.cost_per_person)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_post))
    }

    async fn delete_post(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_recent(&self, page: i64, per_page: i64) -> anyhow::Result<(Vec<Post>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(&format!(
            r#"SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.user_id
               ORDER BY p.date_posted DESC LIMIT $1 OFFSET $2"#
        ))
        .bind(per_page)
        .bind(offset(page, per_page))
        .fetch_all(&self.pool)
        .await?;
        Ok((rows.iter().map(map_post).collect(), total))
    }

    async fn list_latest(&self, limit: i64) -> anyhow::Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.user_id
               ORDER BY p.date_posted DESC LIMIT $1"#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_post).collect())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<Post>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(&format!(
            r#"SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.user_id
               WHERE p.user_id = $1
               ORDER BY p.date_posted DESC LIMIT $2 OFFSET $3"#
        ))
        .bind(user_id)
        .bind(per_page)
        .bind(offset(page, per_page))
        .fetch_all(&self.pool)
        .await?;
        Ok((rows.iter().map(map_post).collect(), total))
    }

    async fn list_by_tag(
        &self,
        tag: &str,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<Post>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE city = $1 OR univ = $1")
                .bind(tag)
                .fetch_one(&self.pool)
                .await?;
        let rows = sqlx::query(&format!(
            r#"SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.user_id
               WHERE p.city = $1 OR p.univ = $1
               ORDER BY p.date_posted DESC LIMIT $2 OFFSET $3"#
        ))
        .bind(tag)
        .bind(per_page)
        .bind(offset(page, per_page))
        .fetch_all(&self.pool)
        .await?;
        Ok((rows.iter().map(map_post).collect(), total))
    }

    async fn search(
        &self,
        filter: &SearchFilter,
        order: SearchOrder,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<Post>, i64)> {
        let (column, value) = match filter {
            SearchFilter::City(c) => ("city", c.as_str()),
            SearchFilter::Univ(u) => ("univ", u.as_str()),
        };
        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM posts WHERE {column} = $1"))
                .bind(value)
                .fetch_one(&self.pool)
                .await?;
        let rows = sqlx::query(&format!(
            r#"SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.user_id
               WHERE p.{column} = $1
               ORDER BY {order} LIMIT $2 OFFSET $3"#,
            order = order_clause(order),
        ))
        .bind(value)
        .bind(per_page)
        .bind(offset(page, per_page))
        .fetch_all(&self.pool)
        .await?;
        Ok((rows.iter().map(map_post).collect(), total))
    }
}
