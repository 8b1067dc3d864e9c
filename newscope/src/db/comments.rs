use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::models::{Comment, ModerationStatus};

use super::{now_str, parse_dt};

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    news_id: i64,
    user_id: i64,
    parent_comment_id: Option<i64>,
    content: String,
    moderation_status: String,
    created_at: String,
}

impl CommentRow {
    fn into_model(self) -> Result<Comment> {
        Ok(Comment {
            id: self.id,
            news_id: self.news_id,
            user_id: self.user_id,
            parent_comment_id: self.parent_comment_id,
            content: self.content,
            moderation_status: self.moderation_status.parse().unwrap_or(ModerationStatus::Pending),
            created_at: parse_dt(&self.created_at)?,
        })
    }
}

pub async fn add(pool: &SqlitePool, user_id: i64, news_id: i64, parent_comment_id: Option<i64>, content: &str) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO comments (news_id, user_id, parent_comment_id, content, moderation_status, created_at)
        VALUES (?, ?, ?, ?, 'pending', ?)
        RETURNING id
        "#,
    )
    .bind(news_id)
    .bind(user_id)
    .bind(parent_comment_id)
    .bind(content)
    .bind(now_str())
    .fetch_one(pool)
    .await
    .context("insert comment")?;
    Ok(id)
}

pub async fn list_approved_for_news(pool: &SqlitePool, news_id: i64) -> Result<Vec<Comment>> {
    let rows: Vec<CommentRow> = sqlx::query_as(
        r#"SELECT id, news_id, user_id, parent_comment_id, content, moderation_status, created_at
           FROM comments WHERE news_id = ? AND moderation_status = 'approved'
           ORDER BY created_at ASC"#,
    )
    .bind(news_id)
    .fetch_all(pool)
    .await
    .context("list approved comments")?;

    rows.into_iter().map(CommentRow::into_model).collect()
}

pub async fn set_moderation_status(pool: &SqlitePool, comment_id: i64, status: ModerationStatus) -> Result<()> {
    sqlx::query("UPDATE comments SET moderation_status = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(comment_id)
        .execute(pool)
        .await
        .context("set comment moderation status")?;
    Ok(())
}
