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

use crate::auth::session::Session;
use crate::database::definitions::partner::{Partner, PartnerStatus};
use crate::prelude::*;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

pub const SESSION_COOKIE: &str = "session_id";

/// What a route demands from the caller beyond a valid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleGuard {
    /// any authenticated partner, whatever its status
    Any,
    /// an approved partner (the administrator passes as well)
    ApprovedPartner,
    /// the administrator account
    Admin,
}

impl RoleGuard {
    fn permits(self, partner: &Partner) -> bool {
        match self {
            Self::Any => true,
            Self::ApprovedPartner => {
                *partner.admin() || *partner.status() == PartnerStatus::Approved
            }
            Self::Admin => *partner.admin(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GuardedState {
    state: ApplicationState,
    guard: RoleGuard,
}

impl GuardedState {
    pub fn new(state: ApplicationState, guard: RoleGuard) -> Self {
        Self { state, guard }
    }
}

/// Attaches a [`require_session`] layer to a route.
#[macro_export]
macro_rules! require_session {
    ($state:expr, $guard:expr) => {
        axum::middleware::from_fn_with_state(
            $crate::auth::middleware::GuardedState::new($state.clone(), $guard),
            $crate::auth::middleware::require_session,
        )
    };
}

/// Resolves the session out of the authorization header (falling back to the
/// session cookie), loads the account behind it and enforces the guard. The
/// account and session land in the request extensions.
pub async fn require_session<B>(
    State(guarded): State<GuardedState>,
    jar: CookieJar,
    mut request: Request<B>,
    next: Next<B>,
) -> Response {
    let session_id = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
        .or_else(|| jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_owned()));

    let Some(session_id) = session_id else {
        return ApplicationError::Unauthorized.into_response();
    };

    let connection = guarded.state.connection();
    // verify the session
    if let Ok(session) = Session::validate_session(session_id.as_str(), connection).await {
        // fetch the account
        let partner: Option<Partner> = match connection.select(session.target()).await {
            Ok(partner) => partner,
            Err(error) => return ApplicationError::from(error).into_response(),
        };
        let Some(partner) = partner else {
            return ApplicationError::Unauthorized.into_response();
        };

        if !guarded.guard.permits(&partner) {
            return ApplicationError::Unauthorized.into_response();
        }

        let extensions = request.extensions_mut();
        extensions.insert(partner);
        extensions.insert(session);

        return next.run(request).await;
    };

    ApplicationError::Unauthorized.into_response()
}
