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

use crate::prelude::*;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use strum::{AsRefStr, EnumString};

/// Approval state of a partner profile. A profile starts pending and is moved
/// exactly once by an administrator.
#[derive(
    Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PartnerStatus {
    Pending,
    Approved,
    Rejected,
}

impl PartnerStatus {
    /// pending -> approved and pending -> rejected are the only transitions.
    pub fn may_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }
}

#[derive(
    Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    Free,
    Premium,
}

/// A training provider account. Identity and registration profile live in one
/// record, the password hash never leaves the database (skipped on
/// serialization).
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Getters)]
#[get = "pub"]
pub struct Partner {
    id: Id,
    mail: String,
    #[serde(skip_serializing, default)]
    password: String,
    tax_id: String,
    address: String,
    phone: String,
    notable_clients: String,
    capabilities: Vec<String>,
    subscribes_to_emails: bool,
    status: PartnerStatus,
    membership: Membership,
    #[serde(default)]
    admin: bool,
    created_at: DateTime<Utc>,
}

impl Record for Partner {
    fn id(&self) -> &Id {
        &self.id
    }
}

impl Partner {
    /// The name shown to clients and in chat, the registered tax id with the
    /// mail address as fallback.
    pub fn display_name(&self) -> &str {
        if self.tax_id.is_empty() {
            self.mail.as_str()
        } else {
            self.tax_id.as_str()
        }
    }

    #[instrument(skip(connection))]
    pub async fn from_mail(mail: &str, connection: &DatabaseConnection) -> Result<Option<Self>> {
        let partner: Option<Self> = sql_span!(connection
            .query("SELECT * FROM partner WHERE mail = $mail")
            .bind(("mail", mail))
            .await?
            .take(0)?);

        Ok(partner)
    }

    /// Applies an administrator decision. Anything but the two transitions out
    /// of pending is refused.
    #[instrument(skip(connection))]
    pub async fn update_status(
        &self,
        status: PartnerStatus,
        connection: &DatabaseConnection,
    ) -> Result<Self> {
        if !self.status.may_become(status) {
            return Err(ApplicationError::BadRequest(
                t!("validate.invalid_status_transition").to_string(),
            ));
        }

        let partner: Option<Self> = sql_span!(connection
            .update(self.id.to_thing())
            .merge(&json!({ "status": status }))
            .await?);

        partner.ok_or(ApplicationError::NotFound)
    }
}

/// The self-service registration payload.
#[derive(Deserialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPartner {
    pub mail: String,
    pub password: String,
    pub tax_id: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub notable_clients: String,
    pub capabilities: Vec<String>,
    #[serde(default = "default_subscribed")]
    pub subscribes_to_emails: bool,
}

fn default_subscribed() -> bool {
    true
}

#[derive(Clone, Serialize, Setters)]
#[set = "pub"]
pub struct WritePartner<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    mail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notable_clients: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capabilities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscribes_to_emails: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<PartnerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    membership: Option<Membership>,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin: Option<bool>,
    #[serde(skip)]
    connection: &'a DatabaseConnection,
    #[serde(skip)]
    target: Option<&'a Id>,
}

impl<'a> From<&'a DatabaseConnection> for WritePartner<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            mail: None,
            password: None,
            tax_id: None,
            address: None,
            phone: None,
            notable_clients: None,
            capabilities: None,
            subscribes_to_emails: None,
            status: None,
            membership: None,
            admin: None,
            connection,
            target: None,
        }
    }
}

impl<'a> WritePartner<'a> {
    /// Takes over a validated registration. Every profile starts pending on
    /// the free membership.
    pub fn with_registration(&mut self, registration: RegisterPartner) -> &mut Self {
        self.mail = Some(registration.mail);
        self.password = Some(registration.password);
        self.tax_id = Some(registration.tax_id);
        self.address = Some(registration.address);
        self.phone = Some(registration.phone);
        self.notable_clients = Some(registration.notable_clients);
        self.capabilities = Some(registration.capabilities);
        self.subscribes_to_emails = Some(registration.subscribes_to_emails);
        self.status = Some(PartnerStatus::Pending);
        self.membership = Some(Membership::Free);
        self.admin = Some(false);

        self
    }
}

impl<'a> IntoFuture for WritePartner<'a> {
    type Output = Result<Partner>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(mut self) -> Self::IntoFuture {
        Box::pin(async move {
            // the password is only ever stored as an argon2 hash
            if let Some(password) = self.password.take() {
                self.password = Some(
                    Argon2::default()
                        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))?
                        .to_string(),
                );
            }

            let partner: Partner = if let Some(target) = self.target {
                sql_span!(self
                    .connection
                    .update(target.to_thing())
                    .merge(&self)
                    .await?
                    .ok_or(ApplicationError::NotFound)?)
            } else {
                sql_span!(self
                    .connection
                    .create("partner")
                    .content(&self)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or(ApplicationError::InternalServerError)?)
            };

            Ok(partner)
        })
    }
}
