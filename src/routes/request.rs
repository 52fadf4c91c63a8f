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
use crate::database::definitions::partner::Partner;
use crate::database::definitions::request::{
    CreateTrainingRequest, TrainingRequest, WriteTrainingRequest,
};
use crate::domain::filter::{FilterState, SortKey};
use crate::domain::{matching, validate};
use crate::hook::{mail, telegram, template};
use crate::prelude::*;
use aide::axum::routing::{delete_with, get_with, post_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Extension;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/", post_with(create_request, create_request_docs))
        .api_route(
            "/",
            get_with(get_request_page, get_request_page_docs)
                .layer(require_session!(state, RoleGuard::ApprovedPartner)),
        )
        .api_route(
            "/search",
            post_with(search_requests, search_requests_docs)
                .layer(require_session!(state, RoleGuard::ApprovedPartner)),
        )
        .api_route(
            "/:id/unlock",
            post_with(unlock_request, unlock_request_docs)
                .layer(require_session!(state, RoleGuard::ApprovedPartner)),
        )
        .api_route(
            "/:id/viewers",
            get_with(get_request_viewers, get_request_viewers_docs)
                .layer(require_session!(state, RoleGuard::Admin)),
        )
        .api_route(
            "/:id",
            delete_with(delete_request, delete_request_docs)
                .layer(require_session!(state, RoleGuard::Admin)),
        )
        .with_state(state)
}

async fn create_request(
    State(state): State<ApplicationState>,
    Json(data): Json<CreateTrainingRequest>,
) -> Result<(StatusCode, Json<TrainingRequest>)> {
    let details = validate::training_request(&data)?;
    let request = WriteTrainingRequest::from(state.connection())
        .with_form(data, details)
        .to_owned()
        .await?;

    // the request is durable at this point, everything below is best effort
    // and must never undo it
    if let Err(error) = notify_partners(&request, state.connection()).await {
        error!("Error while notifying partners: {}", error);
    }
    if let Err(error) = telegram::notify_new_request(&request).await {
        error!("Error while notifying the administrator: {}", error);
    }

    Ok((StatusCode::CREATED, Json(request)))
}

fn create_request_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("File a new training request and notify the matching partners")
        .summary("Create a new training request")
        .response::<201, Json<TrainingRequest>>()
}

/// Computes the matched partners and enqueues the one batch notification
/// addressed to all of them.
async fn notify_partners(
    request: &TrainingRequest,
    connection: &DatabaseConnection,
) -> Result<()> {
    let roster: Vec<Partner> = sql_span!(connection.select("partner").await?);
    let matched = matching::matching_partners(&request.training_types(), &roster);
    if matched.is_empty() {
        return Ok(());
    }

    let recipients = matched
        .iter()
        .map(|partner| partner.mail().clone())
        .collect::<Vec<_>>();
    mail::enqueue(
        recipients,
        t!(
            "mail.partner_notification.subject",
            types = request.training_types().join(", ")
        )
        .to_string(),
        template::partner_notification(request),
        connection,
    )
    .await
}

async fn get_request_page(
    State(state): State<ApplicationState>,
    Query(data): Query<PagingOptions>,
) -> Result<Json<Page<TrainingRequest>>> {
    let page = data
        .execute::<(&str, &str), TrainingRequest>(
            "SELECT * FROM training_request ORDER BY created_at DESC %%%",
            &[],
            state.connection(),
        )
        .await?;

    Ok(Json(page))
}

fn get_request_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a page from all TrainingRequests, newest first")
        .summary("Obtain a page of TrainingRequests")
        .response::<200, Json<Page<TrainingRequest>>>()
}

#[derive(Deserialize, JsonSchema, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchTrainingRequests {
    pub filter: FilterState,
    pub sort: SortKey,
}

async fn search_requests(
    State(state): State<ApplicationState>,
    Json(data): Json<SearchTrainingRequests>,
) -> Result<Json<Vec<TrainingRequest>>> {
    // the pipeline itself is pure, it only ever sees the snapshot
    let snapshot: Vec<TrainingRequest> = sql_span!(state
        .connection()
        .query("SELECT * FROM training_request ORDER BY created_at DESC")
        .await?
        .take(0)?);

    Ok(Json(crate::domain::filter::apply(
        snapshot, &data.filter, data.sort,
    )))
}

fn search_requests_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description(
            "Run the conjunctive filter pipeline and one of the three orderings \
            over the current request snapshot",
        )
        .summary("Search TrainingRequests")
        .response::<200, Json<Vec<TrainingRequest>>>()
}

async fn unlock_request(
    State(state): State<ApplicationState>,
    Extension(partner): Extension<Partner>,
    Path(id): Path<String>,
) -> Result<Json<TrainingRequest>> {
    let id = Id::try_from(("training_request", id.as_str()))?;
    let request: Option<TrainingRequest> = sql_span!(state.connection().select(&id).await?);
    let request = request.ok_or(ApplicationError::NotFound)?;

    let request = request.unlock(partner.id(), state.connection()).await?;

    Ok(Json(request))
}

fn unlock_request_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Record that the calling partner viewed the request contact details")
        .summary("Unlock a TrainingRequest")
        .response::<200, Json<TrainingRequest>>()
}

async fn get_request_viewers(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Partner>>> {
    let id = Id::try_from(("training_request", id.as_str()))?;
    let request: Option<TrainingRequest> = sql_span!(state.connection().select(&id).await?);
    let request = request.ok_or(ApplicationError::NotFound)?;

    Ok(Json(request.viewers(state.connection()).await?))
}

fn get_request_viewers_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The partner profiles which unlocked the request")
        .summary("List the viewers of a TrainingRequest")
        .response::<200, Json<Vec<Partner>>>()
}

async fn delete_request(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = Id::try_from(("training_request", id.as_str()))?;
    let deleted: Option<TrainingRequest> = sql_span!(state.connection().delete(&id).await?);

    deleted
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApplicationError::NotFound)
}

fn delete_request_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Remove a training request entirely. Quotes and chats are left untouched")
        .summary("Delete a TrainingRequest")
        .response::<204, StatusCode>()
}
