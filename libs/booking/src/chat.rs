//! Customer ↔ administrator chat rooms

use std::{collections::HashMap, sync::Arc};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{BookingError, BookingResult},
    feed::{ChangeEvent, ChangeFeed},
    models::{ChatMessage, ChatRoom, NewChatMessage},
    session::Session,
    store::ChatStore,
};

/// How many recent messages the admin inbox is built from
const INBOX_WINDOW: usize = 100;
const MAX_MESSAGE_CHARS: usize = 1000;

#[derive(Clone)]
pub struct ChatService {
    chat: Arc<dyn ChatStore>,
    feed: ChangeFeed,
}

impl ChatService {
    pub fn new(chat: Arc<dyn ChatStore>, feed: ChangeFeed) -> Self {
        Self { chat, feed }
    }

    /// Post a message to a room; the room owner or an administrator may write
    pub async fn send(&self, session: &Session, room_id: Uuid, text: &str) -> BookingResult<ChatMessage> {
        session.require_owner_or_admin(room_id, "posting to this chat room")?;

        let text = text.trim();
        if text.is_empty() {
            return Err(BookingError::Validation("메시지를 입력해주세요.".to_string()));
        }
        if text.chars().count() > MAX_MESSAGE_CHARS {
            return Err(BookingError::Validation("메시지가 너무 깁니다.".to_string()));
        }
        info!("Posting chat message to room: {}", room_id);

        let sender_name = match session.display_name.trim() {
            "" if session.is_admin() => "관리자".to_string(),
            "" => "사용자".to_string(),
            name => name.to_string(),
        };

        let message = self
            .chat
            .insert_message(NewChatMessage {
                room_id,
                sender_id: session.account_id,
                sender_name,
                text: text.to_string(),
            })
            .await?;

        self.feed.publish(ChangeEvent::ChatMessage {
            message: message.clone(),
        });
        Ok(message)
    }

    /// Messages of a room, oldest first
    pub async fn messages(&self, session: &Session, room_id: Uuid) -> BookingResult<Vec<ChatMessage>> {
        session.require_owner_or_admin(room_id, "reading this chat room")?;
        Ok(self.chat.room_messages(room_id).await?)
    }

    /// Admin inbox: one entry per room, most recently active first
    pub async fn rooms(&self, session: &Session) -> BookingResult<Vec<ChatRoom>> {
        session.require_admin("listing chat rooms")?;
        let recent = self.chat.recent_messages(INBOX_WINDOW).await?;
        Ok(derive_rooms(&recent))
    }

    /// Remove every message of a room
    pub async fn delete_room(&self, session: &Session, room_id: Uuid) -> BookingResult<u64> {
        session.require_owner_or_admin(room_id, "deleting this chat room")?;
        info!("Deleting chat room: {}", room_id);

        let removed = self.chat.delete_room(room_id).await?;
        self.feed.publish(ChangeEvent::ChatRoomDeleted { room_id });
        Ok(removed)
    }
}

/// Group messages (newest first) into rooms
///
/// The room name is the sender name on the newest message the customer
/// wrote themselves; rooms where only staff have written fall back to the
/// newest sender name.
pub fn derive_rooms(newest_first: &[ChatMessage]) -> Vec<ChatRoom> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut rooms: HashMap<Uuid, ChatRoom> = HashMap::new();
    let mut named: HashMap<Uuid, bool> = HashMap::new();

    for message in newest_first {
        let from_owner = message.sender_id == message.room_id;
        match rooms.get_mut(&message.room_id) {
            None => {
                order.push(message.room_id);
                named.insert(message.room_id, from_owner);
                rooms.insert(
                    message.room_id,
                    ChatRoom {
                        room_id: message.room_id,
                        customer_name: message.sender_name.clone(),
                        last_message: message.text.clone(),
                        last_message_at: message.created_at,
                    },
                );
            }
            Some(room) => {
                if from_owner && named.get(&message.room_id) == Some(&false) {
                    room.customer_name = message.sender_name.clone();
                    named.insert(message.room_id, true);
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| rooms.remove(&id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn message(room_id: Uuid, sender_id: Uuid, sender_name: &str, text: &str, age_secs: i64) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4(),
            room_id,
            sender_id,
            sender_name: sender_name.to_string(),
            text: text.to_string(),
            created_at: Utc::now() - Duration::seconds(age_secs),
            is_read: false,
        }
    }

    #[test]
    fn test_derive_rooms_orders_and_names() {
        let admin = Uuid::new_v4();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let newest_first = vec![
            message(alice, admin, "관리자", "확인했습니다", 1),
            message(bob, bob, "박고객", "문의드립니다", 2),
            message(alice, alice, "김고객", "예약 문의", 3),
        ];

        let rooms = derive_rooms(&newest_first);
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].room_id, alice);
        assert_eq!(rooms[0].customer_name, "김고객");
        assert_eq!(rooms[0].last_message, "확인했습니다");
        assert_eq!(rooms[1].customer_name, "박고객");
    }
}
