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
use crate::database::definitions::request::TrainingRequest;
use crate::domain::stats::{self, DashboardStats};
use crate::prelude::*;
use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use chrono::Utc;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/dashboard",
            get_with(get_dashboard, get_dashboard_docs)
                .layer(require_session!(state, RoleGuard::Admin)),
        )
        .with_state(state)
}

async fn get_dashboard(
    State(state): State<ApplicationState>,
) -> Result<Json<DashboardStats>> {
    let partners: Vec<Partner> = sql_span!(state.connection().select("partner").await?);
    let requests: Vec<TrainingRequest> =
        sql_span!(state.connection().select("training_request").await?);

    Ok(Json(stats::dashboard(&partners, &requests, Utc::now())))
}

fn get_dashboard_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description(
            "Totals, the three hottest training types and the items needing attention, \
            computed over the current snapshots",
        )
        .summary("Administrator dashboard")
        .response::<200, Json<DashboardStats>>()
}

#[cfg(test)]
mod tests {
    use crate::domain::stats::DashboardStats;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_dashboard() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let suite = TestSuite::init().await?;
        suite.create_request(&["An toàn điện", "Sơ cấp cứu"]).await?;
        suite.create_request(&["An toàn điện"]).await?;

        let session = suite.login_admin().await.session;
        let response = suite
            .client()
            .get("/admin/dashboard")
            .header("authorization", session.id.to_string())
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());

        let stats = response.json::<DashboardStats>().await;
        assert_eq!(2, stats.total_requests);
        assert_eq!(2, stats.unviewed_requests);
        assert_eq!("An toàn điện", stats.hot_training_types[0].ty.as_str());
        assert_eq!(2, stats.hot_training_types[0].count);

        Ok(())
    }
}
