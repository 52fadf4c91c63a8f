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

use crate::database::definitions::partner::Partner;
use crate::prelude::*;
use chrono::{DateTime, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;

/// One requested training content. A request carries at least one of these.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct TrainingDetail {
    #[serde(rename = "type")]
    pub ty: String,
    pub group: String,
    pub participants: u32,
}

/// A training request as submitted by a (not necessarily authenticated)
/// client. Contact details stay hidden until a partner unlocks them, the
/// unlock is recorded in `viewed_by`.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Getters)]
#[get = "pub"]
pub struct TrainingRequest {
    id: Id,
    client_name: String,
    client_email: String,
    client_phone: String,
    training_details: Vec<TrainingDetail>,
    training_duration: String,
    preferred_time: String,
    description: String,
    location: String,
    urgent: bool,
    client_subscribes_to_emails: bool,
    viewed_by: Vec<Id>,
    created_at: DateTime<Utc>,
}

impl Record for TrainingRequest {
    fn id(&self) -> &Id {
        &self.id
    }
}

impl TrainingRequest {
    /// Participants summed over all contents, the figure the range filter and
    /// the participant ordering work with.
    pub fn participant_total(&self) -> u32 {
        self.training_details
            .iter()
            .map(|detail| detail.participants)
            .sum()
    }

    pub fn training_types(&self) -> Vec<String> {
        self.training_details
            .iter()
            .map(|detail| detail.ty.clone())
            .collect()
    }

    /// Records that the partner viewed the contact details. The id set keeps
    /// set semantics, unlocking twice is a no-op.
    #[instrument(skip_all)]
    pub async fn unlock(&self, partner: &Id, connection: &DatabaseConnection) -> Result<Self> {
        let request: Option<Self> = sql_span!(connection
            .query("UPDATE $request SET viewed_by = array::union(viewed_by, [$partner]) RETURN AFTER")
            .bind(("request", self.id.to_thing()))
            .bind(("partner", partner.to_thing()))
            .await?
            .take(0)?);

        request.ok_or(ApplicationError::NotFound)
    }

    /// The partner profiles behind `viewed_by`.
    #[instrument(skip_all)]
    pub async fn viewers(&self, connection: &DatabaseConnection) -> Result<Vec<Partner>> {
        let ids = self
            .viewed_by
            .iter()
            .map(Id::to_thing)
            .collect::<Vec<_>>();
        let viewers: Vec<Partner> = sql_span!(connection
            .query("SELECT * FROM partner WHERE id INSIDE $ids")
            .bind(("ids", ids))
            .await?
            .take(0)?);

        Ok(viewers)
    }
}

/// The public form payload. `training_details` still carries the raw entries,
/// the validation step turns them into [`TrainingDetail`]s.
#[derive(Deserialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainingRequest {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub training_details: Vec<TrainingDetailForm>,
    pub training_duration: String,
    pub preferred_time: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default = "default_subscribed")]
    pub client_subscribes_to_emails: bool,
}

#[derive(Deserialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainingDetailForm {
    #[serde(rename = "type")]
    pub ty: String,
    pub group: String,
    pub participants: u32,
    /// concrete content when the type is the custom entry
    #[serde(default)]
    pub custom_type: String,
}

fn default_subscribed() -> bool {
    true
}

#[derive(Clone, Serialize, Setters)]
#[set = "pub"]
pub struct WriteTrainingRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    training_details: Option<Vec<TrainingDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    training_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preferred_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    urgent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_subscribes_to_emails: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    viewed_by: Option<Vec<Id>>,
    #[serde(skip)]
    connection: &'a DatabaseConnection,
    #[serde(skip)]
    target: Option<&'a Id>,
}

impl<'a> From<&'a DatabaseConnection> for WriteTrainingRequest<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            client_name: None,
            client_email: None,
            client_phone: None,
            training_details: None,
            training_duration: None,
            preferred_time: None,
            description: None,
            location: None,
            urgent: None,
            client_subscribes_to_emails: None,
            viewed_by: None,
            connection,
            target: None,
        }
    }
}

impl<'a> WriteTrainingRequest<'a> {
    /// Takes over the validated form. `details` are the entries after the
    /// custom-type substitution.
    pub fn with_form(
        &mut self,
        form: CreateTrainingRequest,
        details: Vec<TrainingDetail>,
    ) -> &mut Self {
        self.client_name = Some(form.client_name);
        self.client_email = Some(form.client_email);
        self.client_phone = Some(form.client_phone);
        self.training_details = Some(details);
        self.training_duration = Some(form.training_duration);
        self.preferred_time = Some(form.preferred_time);
        self.description = Some(form.description);
        self.location = Some(form.location);
        self.urgent = Some(form.urgent);
        self.client_subscribes_to_emails = Some(form.client_subscribes_to_emails);
        self.viewed_by = Some(Vec::new());

        self
    }
}

impl<'a> IntoFuture for WriteTrainingRequest<'a> {
    type Output = Result<TrainingRequest>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let request: TrainingRequest = if let Some(target) = self.target {
                sql_span!(self
                    .connection
                    .update(target.to_thing())
                    .merge(&self)
                    .await?
                    .ok_or(ApplicationError::NotFound)?)
            } else {
                sql_span!(self
                    .connection
                    .create("training_request")
                    .content(&self)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or(ApplicationError::InternalServerError)?)
            };

            Ok(request)
        })
    }
}
