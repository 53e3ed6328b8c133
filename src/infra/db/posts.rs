use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::PostRecord;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

/// Shared projection: author username and group slug are joined in so feed
/// rows come back ready for presentation.
const POST_COLUMNS: &str = "p.id, p.body, p.author_id, u.username AS author_username, \
     p.group_id, g.slug AS group_slug, p.image_path, p.created_at";

const POST_FROM: &str = "FROM posts p \
     INNER JOIN users u ON u.id = p.author_id \
     LEFT JOIN groups g ON g.id = p.group_id";

/// Newest first; equal timestamps keep insertion order via the sequential id.
const FEED_ORDER: &str = "ORDER BY p.created_at DESC, p.id ASC";

#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    body: String,
    author_id: Uuid,
    author_username: String,
    group_id: Option<Uuid>,
    group_slug: Option<String>,
    image_path: Option<String>,
    created_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            body: row.body,
            author_id: row.author_id,
            author_username: row.author_username,
            group_id: row.group_id,
            group_slug: row.group_slug,
            image_path: row.image_path,
            created_at: row.created_at,
        }
    }
}

fn into_records(rows: Vec<PostRow>) -> Vec<PostRecord> {
    rows.into_iter().map(PostRecord::from).collect()
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_all(&self) -> Result<Vec<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} {POST_FROM} {FEED_ORDER}");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(into_records(rows))
    }

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} {POST_FROM} WHERE p.group_id = $1 {FEED_ORDER}");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(group_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(into_records(rows))
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} {POST_FROM} WHERE p.author_id = $1 {FEED_ORDER}");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(author_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(into_records(rows))
    }

    async fn list_by_authors(&self, author_ids: &[Uuid]) -> Result<Vec<PostRecord>, RepoError> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql =
            format!("SELECT {POST_COLUMNS} {POST_FROM} WHERE p.author_id = ANY($1) {FEED_ORDER}");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(author_ids)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(into_records(rows))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} {POST_FROM} WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(PostRecord::from))
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        count
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO posts (body, author_id, group_id, image_path) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&params.body)
        .bind(params.author_id)
        .bind(params.group_id)
        .bind(&params.image_path)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::from_persistence("inserted post row vanished"))
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let updated = sqlx::query(
            "UPDATE posts SET body = $2, group_id = $3, image_path = $4 WHERE id = $1",
        )
        .bind(params.id)
        .bind(&params.body)
        .bind(params.group_id)
        .bind(&params.image_path)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if updated.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        self.find_by_id(params.id)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn delete_post(&self, id: i64) -> Result<(), RepoError> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if deleted.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
