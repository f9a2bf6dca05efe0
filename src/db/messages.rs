use super::Database;
use crate::error::AppResult;
use crate::models::FlashMessage;

impl Database {
    /// Queue a one-shot message for a user's next admin page view.
    pub async fn push_message(&self, user_id: i64, level: &str, message: &str) -> AppResult<()> {
        sqlx::query("INSERT INTO flash_messages (user_id, level, message) VALUES (?1, ?2, ?3)")
            .bind(user_id)
            .bind(level)
            .bind(message)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Return the user's queued messages in order and clear the queue.
    pub async fn take_messages(&self, user_id: i64) -> AppResult<Vec<FlashMessage>> {
        let mut tx = self.pool.begin().await?;

        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT level, message FROM flash_messages WHERE user_id = ?1 ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM flash_messages WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(rows
            .into_iter()
            .map(|(level, message)| FlashMessage { level, message })
            .collect())
    }
}
