use async_trait::async_trait;
use sqlx::{Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::PgBookingStore;
use crate::{
    error::StoreResult,
    models::{ChatMessage, NewChatMessage},
    store::ChatStore,
};

const COLUMNS: &str = "id, room_id, sender_id, sender_name, text, created_at, is_read";

fn map_message(row: &PgRow) -> ChatMessage {
    ChatMessage {
        id: row.get("id"),
        room_id: row.get("room_id"),
        sender_id: row.get("sender_id"),
        sender_name: row.get("sender_name"),
        text: row.get("text"),
        created_at: row.get("created_at"),
        is_read: row.get("is_read"),
    }
}

#[async_trait]
impl ChatStore for PgBookingStore {
    async fn insert_message(&self, message: NewChatMessage) -> StoreResult<ChatMessage> {
        info!("Inserting chat message in room: {}", message.room_id);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO chat_messages (room_id, sender_id, sender_name, text)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(message.room_id)
        .bind(message.sender_id)
        .bind(&message.sender_name)
        .bind(&message.text)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_message(&row))
    }

    async fn room_messages(&self, room_id: Uuid) -> StoreResult<Vec<ChatMessage>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM chat_messages WHERE room_id = $1 ORDER BY created_at ASC",
            COLUMNS
        ))
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_message).collect())
    }

    async fn recent_messages(&self, limit: usize) -> StoreResult<Vec<ChatMessage>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM chat_messages ORDER BY created_at DESC LIMIT $1",
            COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_message).collect())
    }

    async fn delete_room(&self, room_id: Uuid) -> StoreResult<u64> {
        info!("Deleting chat room: {}", room_id);

        let result = sqlx::query("DELETE FROM chat_messages WHERE room_id = $1")
            .bind(room_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
