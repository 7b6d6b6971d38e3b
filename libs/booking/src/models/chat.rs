//! Chat message model
//!
//! Messages live in one flat collection; a room is the set of messages whose
//! `room_id` equals a customer's account id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewChatMessage {
    pub room_id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub text: String,
}

/// Admin inbox entry derived from the message collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRoom {
    pub room_id: Uuid,
    pub customer_name: String,
    pub last_message: String,
    pub last_message_at: DateTime<Utc>,
}
