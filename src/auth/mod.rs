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

use crate::auth::session::{EndSession, Session, WriteSession};
use crate::database::definitions::partner::Partner;
use crate::prelude::*;
use argon2::{Argon2, PasswordHash, PasswordVerifier};

pub mod middleware;
pub mod session;

#[async_trait]
pub trait Authenticate {
    /// Verifies the password against the stored argon2 hash.
    fn login(&self, password: &str) -> Result<()>;
    async fn logout(&self, connection: &DatabaseConnection) -> Result<()>;
    async fn start_session(&self, connection: &DatabaseConnection) -> Result<Session>;
}

#[async_trait]
impl Authenticate for Partner {
    #[instrument(skip_all)]
    fn login(&self, password: &str) -> Result<()> {
        Argon2::default()
            .verify_password(
                password.as_bytes(),
                &PasswordHash::new(self.password().as_str())?,
            )
            .map_err(|_| ApplicationError::Unauthorized)
    }

    async fn logout(&self, connection: &DatabaseConnection) -> Result<()> {
        EndSession::new(self.id(), connection).await
    }

    async fn start_session(&self, connection: &DatabaseConnection) -> Result<Session> {
        WriteSession::new(self.id(), connection).await
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::Authenticate;
    use crate::database::definitions::partner::{Membership, PartnerStatus, WritePartner};
    use crate::tests::TestSuite;
    use axum::BoxError;

    #[tokio::test]
    async fn test_login() -> Result<(), BoxError> {
        if TestSuite::unavailable() {
            return Ok(());
        }
        let connection = crate::database::connect(None).await?.connection;

        let partner = WritePartner::from(&connection)
            .set_mail(Some("partner@example.com".to_owned()))
            .set_password(Some("password".to_owned()))
            .set_tax_id(Some("0100112233".to_owned()))
            .set_address(Some("Hà Nội".to_owned()))
            .set_phone(Some("0901234567".to_owned()))
            .set_notable_clients(Some(String::new()))
            .set_capabilities(Some(vec!["An toàn điện".to_owned()]))
            .set_subscribes_to_emails(Some(true))
            .set_status(Some(PartnerStatus::Pending))
            .set_membership(Some(Membership::Free))
            .to_owned()
            .await?;

        // the stored value is a hash, not the password
        assert_ne!("password", partner.password().as_str());
        assert!(partner.login("password").is_ok());
        assert!(partner.login("password1").is_err());

        Ok(())
    }
}
