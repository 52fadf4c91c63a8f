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

use crate::auth::middleware::{RoleGuard, SESSION_COOKIE};
use crate::auth::session::Session;
use crate::auth::Authenticate;
use crate::database::definitions::partner::Partner;
use crate::error::ApplicationErrorResponse;
use crate::prelude::*;
use aide::axum::routing::post_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/login", post_with(login, login_docs))
        .api_route("/refresh", post_with(refresh, refresh_docs))
        .api_route(
            "/logout",
            post_with(logout, logout_docs).layer(require_session!(state, RoleGuard::Any)),
        )
        .with_state(state)
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
pub struct LoginRequest {
    /// the registered mail address
    mail: String,
    /// the password
    password: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub session: Session,
}

async fn login(
    State(state): State<ApplicationState>,
    jar: CookieJar,
    Json(data): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    // fetch the account
    match Partner::from_mail(data.mail.as_str(), state.connection()).await? {
        Some(partner) => {
            // start the login process
            partner.login(data.password.as_str())?;

            // start a new session
            let session = partner.start_session(state.connection()).await?;
            // build the session cookie
            let cookie = Cookie::build(SESSION_COOKIE, session.id.to_string())
                .same_site(SameSite::Strict)
                .http_only(true)
                .secure(true)
                .domain(CONFIGURATION.domain.clone())
                .finish();

            Ok((jar.add(cookie), Json(LoginResponse { session })))
        }
        None => Err(ApplicationError::Unauthorized),
    }
}

fn login_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Start a new session in order to be able to authenticate and authorize further requests")
        .summary("Start a new session")
        .response_with::<200, Json<LoginResponse>, _>(|transform| transform.description("Login succeeded"))
        .response_with::<401, Json<ApplicationErrorResponse>, _>(|transform| transform.description("Invalid credentials"))
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// id of the expiring session
    session: String,
    refresh_token: String,
}

async fn refresh(
    State(state): State<ApplicationState>,
    jar: CookieJar,
    Json(data): Json<RefreshRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let session: Option<Session> = sql_span!(state
        .connection()
        .select(&Id::try_from(("session", data.session.as_str()))?)
        .await?);
    let session = session.ok_or(ApplicationError::Unauthorized)?;

    let session = session
        .refresh(data.refresh_token.as_str(), state.connection())
        .await?;
    let cookie = Cookie::build(SESSION_COOKIE, session.id.to_string())
        .same_site(SameSite::Strict)
        .http_only(true)
        .secure(true)
        .domain(CONFIGURATION.domain.clone())
        .finish();

    Ok((jar.add(cookie), Json(LoginResponse { session })))
}

fn refresh_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Exchange a refresh token for a fresh session")
        .summary("Refresh a session")
        .response_with::<200, Json<LoginResponse>, _>(|transform| {
            transform.description("The replacement session")
        })
        .response_with::<401, Json<ApplicationErrorResponse>, _>(|transform| {
            transform.description("Unknown session or wrong refresh token")
        })
}

async fn logout(
    State(state): State<ApplicationState>,
    Extension(partner): Extension<Partner>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    partner.logout(state.connection()).await?;

    Ok((jar.remove(Cookie::named(SESSION_COOKIE)), StatusCode::OK))
}

fn logout_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("End every active session of the calling account")
        .summary("End the current session")
        .response::<200, StatusCode>()
}

#[cfg(test)]
mod tests {
    use crate::routes::auth::LoginResponse;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_login() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/auth/login")
            .json(&json!({
                "mail": suite.partner().mail(),
                "password": "password"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let login = response.json::<LoginResponse>().await;
        assert_eq!(login.session.target(), suite.partner().id());

        let response = suite
            .client()
            .post("/auth/login")
            .json(&json!({
                "mail": suite.partner().mail(),
                "password": "wrong"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_refresh() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;
        let login = suite.login_partner().await;

        let response = suite
            .client()
            .post("/auth/refresh")
            .json(&json!({
                "session": login.session.id.to_string(),
                "refreshToken": login.session.refresh_token()
            }))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let refreshed = response.json::<LoginResponse>().await;
        assert_ne!(refreshed.session.id, login.session.id);

        Ok(())
    }
}
