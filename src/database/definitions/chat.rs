/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::database::definitions::partner::Partner;
use crate::database::definitions::request::TrainingRequest;
use crate::prelude::*;
use chrono::{DateTime, Utc};
use strum::{AsRefStr, EnumString};

/// Placeholder identity for the administrator side of a room.
pub const ADMIN_CLIENT_ID: &str = "admin";
pub const ADMIN_CLIENT_NAME: &str = "Admin - SafetyConnect";
/// Sender id for messages issued by the system itself.
pub const SYSTEM_SENDER_ID: &str = "system";

#[derive(
    Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    Client,
    Partner,
    Admin,
}

/// The side of a room an unread counter belongs to. The administrator reads
/// the client side, the partner its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSide {
    Client,
    Partner,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Default, Getters)]
#[get = "pub"]
pub struct UnreadCount {
    client: u64,
    partner: u64,
}

impl UnreadCount {
    pub fn side(&self, side: ChatSide) -> u64 {
        match side {
            ChatSide::Client => self.client,
            ChatSide::Partner => self.partner,
        }
    }
}

#[derive(
    Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Document,
    Pdf,
}

/// A single file hung onto a message.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub name: String,
    pub kind: AttachmentKind,
    /// size in bytes
    pub size: u64,
}

/// A conversation between the administrator and one partner about one
/// request. The (request, partner) pair is unique.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Getters)]
#[get = "pub"]
pub struct ChatRoom {
    id: Id,
    request: Relation<TrainingRequest>,
    partner: Relation<Partner>,
    client_id: String,
    client_name: String,
    partner_name: String,
    last_message: String,
    last_message_time: DateTime<Utc>,
    unread: UnreadCount,
    created_at: DateTime<Utc>,
}

impl Record for ChatRoom {
    fn id(&self) -> &Id {
        &self.id
    }
}

/// One chat line, append only.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Getters)]
#[get = "pub"]
pub struct ChatMessage {
    id: Id,
    room: Relation<ChatRoom>,
    sender_id: String,
    sender_name: String,
    sender_role: SenderRole,
    message: String,
    read: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    attachment: Option<Attachment>,
    created_at: DateTime<Utc>,
}

impl Record for ChatMessage {
    fn id(&self) -> &Id {
        &self.id
    }
}

impl ChatRoom {
    /// Looks the (request, partner) room up and lazily creates it, including
    /// the initial system message, when the partner contacts the
    /// administrator for the first time.
    #[instrument(skip_all)]
    pub async fn get_or_create(
        request: &TrainingRequest,
        partner: &Partner,
        connection: &DatabaseConnection,
    ) -> Result<Self> {
        let existing: Option<Self> = sql_span!(connection
            .query("SELECT * FROM chat_room WHERE request = $request AND partner = $partner")
            .bind(("request", request.id().to_thing()))
            .bind(("partner", partner.id().to_thing()))
            .await?
            .take(0)?);

        if let Some(room) = existing {
            return Ok(room);
        }

        let room: Option<Self> = sql_span!(connection
            .query(
                "CREATE chat_room CONTENT {
                    request: $request,
                    partner: $partner,
                    client_id: $client_id,
                    client_name: $client_name,
                    partner_name: $partner_name,
                    last_message: $last_message,
                    last_message_time: time::now(),
                    unread: { client: 0, partner: 0 }
                }"
            )
            .bind(("request", request.id().to_thing()))
            .bind(("partner", partner.id().to_thing()))
            .bind(("client_id", ADMIN_CLIENT_ID))
            .bind(("client_name", ADMIN_CLIENT_NAME))
            .bind(("partner_name", partner.display_name()))
            .bind(("last_message", t!("chat.room_created")))
            .await?
            .take(0)?);
        let room = room.ok_or(ApplicationError::InternalServerError)?;

        room.send(
            SYSTEM_SENDER_ID,
            t!("chat.system_sender").to_string().as_str(),
            SenderRole::Admin,
            t!(
                "chat.room_created_message",
                types = request.training_types().join(", ")
            )
            .to_string()
            .as_str(),
            None,
            connection,
        )
        .await?;

        Ok(room)
    }

    #[instrument(skip(connection))]
    pub async fn for_partner(
        partner: &Id,
        connection: &DatabaseConnection,
    ) -> Result<Vec<Self>> {
        let rooms: Vec<Self> = sql_span!(connection
            .query(
                "SELECT * FROM chat_room WHERE partner = $partner ORDER BY last_message_time DESC"
            )
            .bind(("partner", partner.to_thing()))
            .await?
            .take(0)?);

        Ok(rooms)
    }

    #[instrument(skip(connection))]
    pub async fn all(connection: &DatabaseConnection) -> Result<Vec<Self>> {
        let rooms: Vec<Self> = sql_span!(connection
            .query("SELECT * FROM chat_room ORDER BY last_message_time DESC")
            .await?
            .take(0)?);

        Ok(rooms)
    }

    /// Appends a message and moves the room forward: preview, timestamp and
    /// the unread counter of the side that has not written it.
    #[instrument(skip(self, attachment, connection))]
    pub async fn send(
        &self,
        sender_id: &str,
        sender_name: &str,
        sender_role: SenderRole,
        message: &str,
        attachment: Option<Attachment>,
        connection: &DatabaseConnection,
    ) -> Result<ChatMessage> {
        let created: Option<ChatMessage> = sql_span!(connection
            .query(
                "CREATE chat_message CONTENT {
                    room: $room,
                    sender_id: $sender_id,
                    sender_name: $sender_name,
                    sender_role: $sender_role,
                    message: $message,
                    read: false,
                    attachment: $attachment
                }"
            )
            .bind(("room", self.id.to_thing()))
            .bind(("sender_id", sender_id))
            .bind(("sender_name", sender_name))
            .bind(("sender_role", sender_role))
            .bind(("message", message))
            .bind(("attachment", attachment))
            .await?
            .take(0)?);
        let message = created.ok_or(ApplicationError::InternalServerError)?;

        // a partner message is unread for the administrator and vice versa
        let counter = match sender_role {
            SenderRole::Partner => "unread.client",
            _ => "unread.partner",
        };
        sql_span!(connection
            .query(format!(
                "UPDATE $room SET last_message = $preview, last_message_time = time::now(), {counter} += 1"
            ))
            .bind(("room", self.id.to_thing()))
            .bind(("preview", message.message()))
            .await?
            .check()?);

        Ok(message)
    }

    #[instrument(skip(connection))]
    pub async fn messages(&self, connection: &DatabaseConnection) -> Result<Vec<ChatMessage>> {
        let messages: Vec<ChatMessage> = sql_span!(connection
            .query("SELECT * FROM chat_message WHERE room = $room ORDER BY created_at ASC")
            .bind(("room", self.id.to_thing()))
            .await?
            .take(0)?);

        Ok(messages)
    }

    /// Resets the unread counter of the reading side and flags the other
    /// side's messages as read.
    #[instrument(skip(connection))]
    pub async fn mark_read(&self, side: ChatSide, connection: &DatabaseConnection) -> Result<()> {
        let (counter, foreign_role) = match side {
            ChatSide::Client => ("unread.client", SenderRole::Partner),
            ChatSide::Partner => ("unread.partner", SenderRole::Admin),
        };

        sql_span!(connection
            .query(format!("UPDATE $room SET {counter} = 0"))
            .query("UPDATE chat_message SET read = true WHERE room = $room AND sender_role = $role")
            .bind(("room", self.id.to_thing()))
            .bind(("role", foreign_role))
            .await?
            .check()?);

        Ok(())
    }
}
