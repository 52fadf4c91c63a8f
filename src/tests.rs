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

use crate::database::definitions::partner::{Membership, Partner, PartnerStatus, WritePartner};
use crate::database::definitions::request::TrainingRequest;
use crate::database::{ConnectionInfo, DatabaseConnection};
use crate::routes::auth::LoginResponse;
use axum::BoxError;
use axum_test_helper::TestClient;

/// Shared scaffolding for the route tests: the router served in process, a
/// throwaway database and the two default accounts (administrator and one
/// approved partner). Every test runs against its own database.
#[derive(Getters)]
#[get = "pub"]
pub struct TestSuite {
    client: TestClient,
    info: ConnectionInfo,
    admin: Partner,
    partner: Partner,
}

impl TestSuite {
    /// The suite needs a running surrealdb instance, tests bail out silently
    /// without one.
    pub fn unavailable() -> bool {
        std::env::var("SURREALDB_ENDPOINT").is_err()
    }

    pub async fn init() -> Result<Self, BoxError> {
        let info = crate::database::connect(None).await?;
        let client = TestClient::new(crate::server::router(info.clone()).await?);

        let admin = WritePartner::from(&info.connection)
            .set_mail(Some("admin@safetyconnect.vn".to_owned()))
            .set_password(Some("password".to_owned()))
            .set_tax_id(Some(String::new()))
            .set_address(Some(String::new()))
            .set_phone(Some(String::new()))
            .set_notable_clients(Some(String::new()))
            .set_capabilities(Some(Vec::new()))
            .set_subscribes_to_emails(Some(false))
            .set_status(Some(PartnerStatus::Approved))
            .set_membership(Some(Membership::Free))
            .set_admin(Some(true))
            .to_owned()
            .await?;

        let partner = WritePartner::from(&info.connection)
            .set_mail(Some("partner@example.com".to_owned()))
            .set_password(Some("password".to_owned()))
            .set_tax_id(Some("0100112233".to_owned()))
            .set_address(Some("Hà Nội".to_owned()))
            .set_phone(Some("0901234567".to_owned()))
            .set_notable_clients(Some(String::new()))
            .set_capabilities(Some(vec![
                "An toàn điện".to_owned(),
                "Sơ cấp cứu".to_owned(),
            ]))
            .set_subscribes_to_emails(Some(true))
            .set_status(Some(PartnerStatus::Approved))
            .set_membership(Some(Membership::Free))
            .set_admin(Some(false))
            .to_owned()
            .await?;

        Ok(Self {
            client,
            info,
            admin,
            partner,
        })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.info.connection
    }

    pub async fn login(&self, mail: &str) -> LoginResponse {
        let response = self
            .client
            .post("/auth/login")
            .json(&json!({
                "mail": mail,
                "password": "password"
            }))
            .send()
            .await;

        response.json::<LoginResponse>().await
    }

    pub async fn login_partner(&self) -> LoginResponse {
        self.login(self.partner.mail().as_str()).await
    }

    pub async fn login_admin(&self) -> LoginResponse {
        self.login(self.admin.mail().as_str()).await
    }

    /// A complete request form with one entry per given training type.
    pub fn request_payload(&self, types: &[&str]) -> serde_json::Value {
        let details = types
            .iter()
            .map(|ty| json!({ "type": ty, "group": "Không áp dụng", "participants": 10 }))
            .collect::<Vec<_>>();

        json!({
            "clientName": "Nguyễn Văn A",
            "clientEmail": "client@example.com",
            "clientPhone": "0901234567",
            "trainingDetails": details,
            "trainingDuration": "2 ngày",
            "preferredTime": "T11/2024",
            "description": "Huấn luyện định kỳ cho công nhân",
            "location": "Khu công nghiệp Thăng Long, Hà Nội"
        })
    }

    /// Files a request through the public route.
    pub async fn create_request(&self, types: &[&str]) -> Result<TrainingRequest, BoxError> {
        let response = self
            .client
            .post("/request")
            .json(&self.request_payload(types))
            .send()
            .await;

        Ok(response.json::<TrainingRequest>().await)
    }

    /// An additional approved partner account using the suite password.
    pub async fn register_approved_partner(&self, mail: &str) -> Result<Partner, BoxError> {
        let partner = WritePartner::from(self.connection())
            .set_mail(Some(mail.to_owned()))
            .set_password(Some("password".to_owned()))
            .set_tax_id(Some("0399887766".to_owned()))
            .set_address(Some("Đà Nẵng".to_owned()))
            .set_phone(Some("0905556677".to_owned()))
            .set_notable_clients(Some(String::new()))
            .set_capabilities(Some(vec!["An toàn xây dựng".to_owned()]))
            .set_subscribes_to_emails(Some(true))
            .set_status(Some(PartnerStatus::Approved))
            .set_membership(Some(Membership::Free))
            .set_admin(Some(false))
            .to_owned()
            .await?;

        Ok(partner)
    }
}
