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

use crate::auth::middleware::RoleGuard;
use crate::database::definitions::chat::{
    Attachment, ChatMessage, ChatRoom, ChatSide, SenderRole,
};
use crate::database::definitions::partner::Partner;
use crate::domain::stats;
use crate::prelude::*;
use aide::axum::routing::{get_with, post_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Extension;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/room",
            get_with(get_rooms, get_rooms_docs)
                .layer(require_session!(state, RoleGuard::ApprovedPartner)),
        )
        .api_route(
            "/room/:id/message",
            get_with(get_messages, get_messages_docs)
                .layer(require_session!(state, RoleGuard::ApprovedPartner)),
        )
        .api_route(
            "/room/:id/message",
            post_with(send_message, send_message_docs)
                .layer(require_session!(state, RoleGuard::ApprovedPartner)),
        )
        .api_route(
            "/unread",
            get_with(get_unread_total, get_unread_total_docs)
                .layer(require_session!(state, RoleGuard::ApprovedPartner)),
        )
        .with_state(state)
}

/// The side of the rooms the caller occupies. The administrator holds the
/// client seat of every room.
fn side_of(partner: &Partner) -> ChatSide {
    if *partner.admin() {
        ChatSide::Client
    } else {
        ChatSide::Partner
    }
}

/// Loads a room and refuses callers which are neither the administrator nor
/// the partner the room belongs to.
async fn authorized_room(
    id: &str,
    partner: &Partner,
    connection: &DatabaseConnection,
) -> Result<ChatRoom> {
    let id = Id::try_from(("chat_room", id))?;
    let room: Option<ChatRoom> = sql_span!(connection.select(&id).await?);
    let room = room.ok_or(ApplicationError::NotFound)?;

    if !*partner.admin() && room.partner().id() != partner.id() {
        return Err(ApplicationError::Unauthorized);
    }

    Ok(room)
}

async fn get_rooms(
    State(state): State<ApplicationState>,
    Extension(partner): Extension<Partner>,
) -> Result<Json<Vec<ChatRoom>>> {
    let rooms = if *partner.admin() {
        ChatRoom::all(state.connection()).await?
    } else {
        ChatRoom::for_partner(partner.id(), state.connection()).await?
    };

    Ok(Json(rooms))
}

fn get_rooms_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The callers chat rooms, most recently active first")
        .summary("List ChatRooms")
        .response::<200, Json<Vec<ChatRoom>>>()
}

async fn get_messages(
    State(state): State<ApplicationState>,
    Extension(partner): Extension<Partner>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>> {
    let room = authorized_room(id.as_str(), &partner, state.connection()).await?;

    let messages = room.messages(state.connection()).await?;
    // fetching the conversation is reading it
    room.mark_read(side_of(&partner), state.connection()).await?;

    Ok(Json(messages))
}

fn get_messages_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The conversation in creation order. Resets the callers unread counter")
        .summary("Read a ChatRoom")
        .response::<200, Json<Vec<ChatMessage>>>()
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
pub struct SendChatMessage {
    message: String,
    #[serde(default)]
    attachment: Option<Attachment>,
}

async fn send_message(
    State(state): State<ApplicationState>,
    Extension(partner): Extension<Partner>,
    Path(id): Path<String>,
    Json(data): Json<SendChatMessage>,
) -> Result<(StatusCode, Json<ChatMessage>)> {
    if data.message.trim().is_empty() {
        return Err(ApplicationError::BadRequest(
            t!("validate.empty_message").to_string(),
        ));
    }

    let room = authorized_room(id.as_str(), &partner, state.connection()).await?;
    let role = if *partner.admin() {
        SenderRole::Admin
    } else {
        SenderRole::Partner
    };

    let message = room
        .send(
            partner.id().to_string().as_str(),
            partner.display_name(),
            role,
            data.message.as_str(),
            data.attachment,
            state.connection(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

fn send_message_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description(
            "Append a message, optionally with one attachment. The other sides unread \
            counter moves up by one",
        )
        .summary("Send a ChatMessage")
        .response::<201, Json<ChatMessage>>()
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
pub struct UnreadResponse {
    pub total: u64,
}

async fn get_unread_total(
    State(state): State<ApplicationState>,
    Extension(partner): Extension<Partner>,
) -> Result<Json<UnreadResponse>> {
    let rooms = if *partner.admin() {
        ChatRoom::all(state.connection()).await?
    } else {
        ChatRoom::for_partner(partner.id(), state.connection()).await?
    };

    Ok(Json(UnreadResponse {
        total: stats::unread_total(&rooms, side_of(&partner)),
    }))
}

fn get_unread_total_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The callers unread messages summed over all of its rooms")
        .summary("Aggregate unread messages")
        .response::<200, Json<UnreadResponse>>()
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::chat::ChatRoom;
    use crate::routes::chat::UnreadResponse;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    /// Submits a quote to open the admin room for the suite partner.
    async fn open_room(suite: &TestSuite) -> Result<ChatRoom, BoxError> {
        let request = suite.create_request(&["An toàn điện"]).await?;
        let session = suite.login_partner().await.session;

        suite
            .client()
            .post("/quote")
            .header("authorization", session.id.to_string())
            .json(&json!({
                "request": request.id().id,
                "price": "1.000.000",
                "timeline": "1 tuần",
                "notes": "ghi chú"
            }))
            .send()
            .await;

        let rooms: Vec<ChatRoom> = suite.connection().select("chat_room").await?;
        Ok(rooms.into_iter().next().unwrap())
    }

    #[tokio::test]
    async fn test_unread_flow() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;
        let room = open_room(&suite).await?;

        // the quote message is unread for the admin, the system message is not
        let admin_session = suite.login_admin().await.session;
        let response = suite
            .client()
            .get("/chat/unread")
            .header("authorization", admin_session.id.to_string())
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let unread = response.json::<UnreadResponse>().await;
        assert_eq!(1, unread.total);

        // reading the room resets the counter
        let response = suite
            .client()
            .get(format!("/chat/room/{}/message", room.id().id).as_str())
            .header("authorization", admin_session.id.to_string())
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());

        let response = suite
            .client()
            .get("/chat/unread")
            .header("authorization", admin_session.id.to_string())
            .send()
            .await;
        let unread = response.json::<UnreadResponse>().await;
        assert_eq!(0, unread.total);

        Ok(())
    }

    #[tokio::test]
    async fn test_send_bumps_the_other_side() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;
        let room = open_room(&suite).await?;
        let admin_session = suite.login_admin().await.session;

        let response = suite
            .client()
            .post(format!("/chat/room/{}/message", room.id().id).as_str())
            .header("authorization", admin_session.id.to_string())
            .json(&json!({ "message": "Chúng tôi sẽ kiểm tra báo giá" }))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());

        let partner_session = suite.login_partner().await.session;
        let response = suite
            .client()
            .get("/chat/unread")
            .header("authorization", partner_session.id.to_string())
            .send()
            .await;
        let unread = response.json::<UnreadResponse>().await;
        // the system message and the admin reply
        assert_eq!(2, unread.total);

        Ok(())
    }

    #[tokio::test]
    async fn test_foreign_rooms_stay_hidden() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;
        let room = open_room(&suite).await?;

        let foreign = suite.register_approved_partner("other@example.com").await?;
        let session = suite.login(foreign.mail()).await.session;

        let response = suite
            .client()
            .get(format!("/chat/room/{}/message", room.id().id).as_str())
            .header("authorization", session.id.to_string())
            .send()
            .await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());

        let response = suite
            .client()
            .get("/chat/room")
            .header("authorization", session.id.to_string())
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let rooms = response.json::<Vec<ChatRoom>>().await;
        assert!(rooms.is_empty());

        Ok(())
    }
}
