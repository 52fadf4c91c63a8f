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
use crate::database::definitions::chat::{ChatRoom, SenderRole};
use crate::database::definitions::partner::Partner;
use crate::database::definitions::quote::{Quote, SubmitQuote, WriteQuote};
use crate::database::definitions::request::TrainingRequest;
use crate::domain::validate;
use crate::hook::{mail, template};
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
            "/",
            post_with(submit_quote, submit_quote_docs)
                .layer(require_session!(state, RoleGuard::ApprovedPartner)),
        )
        .api_route(
            "/for/:request",
            get_with(get_quotes_for_request, get_quotes_for_request_docs)
                .layer(require_session!(state, RoleGuard::ApprovedPartner)),
        )
        .with_state(state)
}

async fn submit_quote(
    State(state): State<ApplicationState>,
    Extension(partner): Extension<Partner>,
    Json(data): Json<SubmitQuote>,
) -> Result<(StatusCode, Json<Quote>)> {
    let price = validate::quote(&data)?;

    let request_id = Id::try_from(("training_request", data.request.as_str()))?;
    let request: Option<TrainingRequest> =
        sql_span!(state.connection().select(&request_id).await?);
    let request = request.ok_or(ApplicationError::NotFound)?;

    // one quote per (request, partner)
    if Quote::by_request_and_partner(&request_id, partner.id(), state.connection())
        .await?
        .is_some()
    {
        return Err(ApplicationError::BadRequest(
            t!("validate.duplicate_quote").to_string(),
        ));
    }

    let quote = WriteQuote::from(state.connection())
        .with_submission(&request, &partner, price, data)
        .to_owned()
        .await?;

    // the quote is durable at this point, chat and mail stay best effort
    if let Err(error) = notify_quote(&request, &partner, &quote, state.connection()).await {
        error!("Error while notifying about the quote: {}", error);
    }

    Ok((StatusCode::CREATED, Json(quote)))
}

fn submit_quote_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description(
            "Submit a price quote for a request. Opens the administrator chat room and \
            notifies the client by mail, both without endangering the stored quote",
        )
        .summary("Submit a Quote")
        .response::<201, Json<Quote>>()
}

/// The side effects hanging off a submitted quote: the administrator chat
/// with the system and quote messages, and the client notification mail.
async fn notify_quote(
    request: &TrainingRequest,
    partner: &Partner,
    quote: &Quote,
    connection: &DatabaseConnection,
) -> Result<()> {
    let room = ChatRoom::get_or_create(request, partner, connection).await?;
    room.send(
        partner.id().to_string().as_str(),
        partner.display_name(),
        SenderRole::Partner,
        t!(
            "chat.quote_submitted",
            price = template::format_price(*quote.price())
        )
        .to_string()
        .as_str(),
        None,
        connection,
    )
    .await?;

    mail::enqueue(
        vec![request.client_email().clone()],
        t!("mail.quote_notification.subject").to_string(),
        template::quote_notification(request, quote),
        connection,
    )
    .await
}

async fn get_quotes_for_request(
    State(state): State<ApplicationState>,
    Extension(partner): Extension<Partner>,
    Path(request): Path<String>,
) -> Result<Json<Vec<Quote>>> {
    let request = Id::try_from(("training_request", request.as_str()))?;
    let quotes = Quote::for_request(&request, state.connection()).await?;

    // partners only ever see their own quotes, the administrator all of them
    let quotes = if *partner.admin() {
        quotes
    } else {
        quotes
            .into_iter()
            .filter(|quote| quote.partner().id() == partner.id())
            .collect()
    };

    Ok(Json(quotes))
}

fn get_quotes_for_request_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The quotes filed for a request, the callers own ones unless it is the administrator")
        .summary("List Quotes of a TrainingRequest")
        .response::<200, Json<Vec<Quote>>>()
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::chat::ChatRoom;
    use crate::database::definitions::quote::Quote;
    use crate::hook::mail::MailJob;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_submit_creates_quote_chat_and_mail() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;
        let request = suite.create_request(&["An toàn điện"]).await?;
        let session = suite.login_partner().await.session;

        // drain the request-creation notification
        suite
            .connection()
            .query("DELETE FROM mail")
            .await?
            .check()?;

        let response = suite
            .client()
            .post("/quote")
            .header("authorization", session.id.to_string())
            .json(&json!({
                "request": request.id().id,
                "price": "1.500.000",
                "timeline": "3-5 ngày",
                "notes": "Đã bao gồm tài liệu và chứng chỉ"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());
        let quote = response.json::<Quote>().await;
        assert_eq!(&1_500_000, quote.price());
        assert_eq!("VND", quote.currency().as_str());

        // the chat room exists with the system and the quote message
        let rooms: Vec<ChatRoom> = suite.connection().select("chat_room").await?;
        assert_eq!(1, rooms.len());
        let messages = rooms[0].messages(suite.connection()).await?;
        assert_eq!(2, messages.len());
        assert!(messages[1].message().contains("1.500.000"));

        // the client got exactly one mail job
        let jobs: Vec<MailJob> = suite.connection().select("mail").await?;
        assert_eq!(1, jobs.len());
        assert_eq!(&vec![request.client_email().clone()], jobs[0].to());

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_is_unique_per_request() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;
        let request = suite.create_request(&["An toàn điện"]).await?;
        let session = suite.login_partner().await.session;

        let payload = json!({
            "request": request.id().id,
            "price": "2.000.000",
            "timeline": "1 tuần",
            "notes": "ghi chú"
        });
        let response = suite
            .client()
            .post("/quote")
            .header("authorization", session.id.to_string())
            .json(&payload)
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());

        let response = suite
            .client()
            .post("/quote")
            .header("authorization", session.id.to_string())
            .json(&payload)
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_quote_survives_broken_side_channel() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;
        let request = suite.create_request(&["An toàn điện"]).await?;
        let session = suite.login_partner().await.session;

        // break both side effects at once
        suite
            .connection()
            .query(
                "REMOVE TABLE mail; DEFINE TABLE mail SCHEMAFULL;
                REMOVE TABLE chat_room; DEFINE TABLE chat_room SCHEMAFULL;",
            )
            .await?
            .check()?;

        let response = suite
            .client()
            .post("/quote")
            .header("authorization", session.id.to_string())
            .json(&json!({
                "request": request.id().id,
                "price": "1.000.000",
                "timeline": "2 tuần",
                "notes": "ghi chú"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());
        let quote = response.json::<Quote>().await;

        let fetched: Option<Quote> = suite.connection().select(quote.id()).await?;
        assert!(fetched.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_price() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;
        let request = suite.create_request(&["An toàn điện"]).await?;
        let session = suite.login_partner().await.session;

        let response = suite
            .client()
            .post("/quote")
            .header("authorization", session.id.to_string())
            .json(&json!({
                "request": request.id().id,
                "price": "miễn phí",
                "timeline": "1 tuần",
                "notes": "ghi chú"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        Ok(())
    }
}
