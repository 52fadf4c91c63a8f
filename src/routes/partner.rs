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
use crate::database::definitions::partner::{
    Partner, PartnerStatus, RegisterPartner, WritePartner,
};
use crate::domain::validate;
use crate::prelude::*;
use aide::axum::routing::{get_with, post_with, put_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/", post_with(register, register_docs))
        .api_route(
            "/",
            get_with(get_partner_page, get_partner_page_docs)
                .layer(require_session!(state, RoleGuard::Admin)),
        )
        .api_route(
            "/:id/status",
            put_with(update_status, update_status_docs)
                .layer(require_session!(state, RoleGuard::Admin)),
        )
        .with_state(state)
}

async fn register(
    State(state): State<ApplicationState>,
    Json(data): Json<RegisterPartner>,
) -> Result<(StatusCode, Json<Partner>)> {
    validate::registration(
        data.mail.as_str(),
        data.password.as_str(),
        data.tax_id.as_str(),
        &data.capabilities,
    )?;

    if Partner::from_mail(data.mail.as_str(), state.connection())
        .await?
        .is_some()
    {
        return Err(ApplicationError::BadRequest(
            t!("validate.duplicate_mail").to_string(),
        ));
    }

    let partner = WritePartner::from(state.connection())
        .with_registration(data)
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(partner)))
}

fn register_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Self-service partner registration. The profile starts pending until an administrator decides")
        .summary("Register a partner account")
        .response::<201, Json<Partner>>()
}

async fn get_partner_page(
    State(state): State<ApplicationState>,
    Query(data): Query<PagingOptions>,
) -> Result<Json<Page<Partner>>> {
    let page = data
        .execute::<(&str, &str), Partner>(
            "SELECT * FROM partner ORDER BY created_at DESC %%%",
            &[],
            state.connection(),
        )
        .await?;

    Ok(Json(page))
}

fn get_partner_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a page from the partner roster, newest first")
        .summary("Obtain a page of Partners")
        .response::<200, Json<Page<Partner>>>()
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
pub struct UpdatePartnerStatus {
    /// the administrator decision, approved or rejected
    status: PartnerStatus,
}

async fn update_status(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
    Json(data): Json<UpdatePartnerStatus>,
) -> Result<Json<Partner>> {
    let id = Id::try_from(("partner", id.as_str()))?;
    let partner: Option<Partner> = sql_span!(state.connection().select(&id).await?);
    let partner = partner.ok_or(ApplicationError::NotFound)?;

    let partner = partner
        .update_status(data.status, state.connection())
        .await?;

    Ok(Json(partner))
}

fn update_status_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Approve or reject a pending partner profile. Decided profiles stay decided")
        .summary("Decide on a partner profile")
        .response::<200, Json<Partner>>()
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::partner::{Partner, PartnerStatus};
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    fn registration() -> serde_json::Value {
        json!({
            "mail": "fresh@example.com",
            "password": "password",
            "taxId": "0312345678",
            "address": "Quận 1, Hồ Chí Minh",
            "phone": "0901112233",
            "capabilities": ["An toàn hóa chất"]
        })
    }

    #[tokio::test]
    async fn test_register_starts_pending() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/partner")
            .json(&registration())
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());
        let partner = response.json::<Partner>().await;
        assert_eq!(&PartnerStatus::Pending, partner.status());

        // the mail address is taken now
        let response = suite
            .client()
            .post("/partner")
            .json(&registration())
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_register_requires_capabilities() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;

        let mut payload = registration();
        payload["capabilities"] = json!([]);
        let response = suite.client().post("/partner").json(&payload).send().await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_status_decision_is_final() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;
        let session = suite.login_admin().await.session;

        let response = suite
            .client()
            .post("/partner")
            .json(&registration())
            .send()
            .await;
        let partner = response.json::<Partner>().await;

        let response = suite
            .client()
            .put(format!("/partner/{}/status", partner.id().id).as_str())
            .header("authorization", session.id.to_string())
            .json(&json!({ "status": "approved" }))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let partner = response.json::<Partner>().await;
        assert_eq!(&PartnerStatus::Approved, partner.status());

        // approved profiles cannot be flipped anymore
        let response = suite
            .client()
            .put(format!("/partner/{}/status", partner.id().id).as_str())
            .header("authorization", session.id.to_string())
            .json(&json!({ "status": "rejected" }))
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_roster_is_admin_only() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;

        let session = suite.login_partner().await.session;
        let response = suite
            .client()
            .get("/partner")
            .header("authorization", session.id.to_string())
            .send()
            .await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());

        let session = suite.login_admin().await.session;
        let response = suite
            .client()
            .get("/partner")
            .header("authorization", session.id.to_string())
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());

        Ok(())
    }
}
