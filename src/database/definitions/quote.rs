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
use crate::database::definitions::request::TrainingRequest;
use crate::prelude::*;
use chrono::{DateTime, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use strum::{AsRefStr, EnumString};
use surrealdb::sql::Thing;

#[derive(
    Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A priced response of a partner to one training request. There is at most
/// one per (request, partner) pair and it is not edited afterwards.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Getters)]
#[get = "pub"]
pub struct Quote {
    id: Id,
    request: Relation<TrainingRequest>,
    partner: Relation<Partner>,
    partner_mail: String,
    partner_name: String,
    /// amount in the smallest unit of `currency`
    price: u64,
    currency: String,
    timeline: String,
    notes: String,
    status: QuoteStatus,
    created_at: DateTime<Utc>,
}

impl Record for Quote {
    fn id(&self) -> &Id {
        &self.id
    }
}

impl Quote {
    #[instrument(skip(connection))]
    pub async fn for_request(
        request: &Id,
        connection: &DatabaseConnection,
    ) -> Result<Vec<Self>> {
        let quotes: Vec<Self> = sql_span!(connection
            .query("SELECT * FROM quote WHERE request = $request ORDER BY created_at DESC")
            .bind(("request", request.to_thing()))
            .await?
            .take(0)?);

        Ok(quotes)
    }

    #[instrument(skip(connection))]
    pub async fn by_request_and_partner(
        request: &Id,
        partner: &Id,
        connection: &DatabaseConnection,
    ) -> Result<Option<Self>> {
        let quote: Option<Self> = sql_span!(connection
            .query("SELECT * FROM quote WHERE request = $request AND partner = $partner")
            .bind(("request", request.to_thing()))
            .bind(("partner", partner.to_thing()))
            .await?
            .take(0)?);

        Ok(quote)
    }
}

/// The form payload a partner submits. The price arrives as the dotted string
/// the form renders ("1.500.000"), validation turns it into the plain amount.
#[derive(Deserialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuote {
    /// id of the request the quote answers
    pub request: String,
    pub price: String,
    pub timeline: String,
    pub notes: String,
}

#[derive(Clone, Serialize, Setters)]
#[set = "pub"]
pub struct WriteQuote<'a> {
    // kept as Things so the stored fields stay record links
    #[serde(skip_serializing_if = "Option::is_none")]
    request: Option<Thing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partner: Option<Thing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partner_mail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<QuoteStatus>,
    #[serde(skip)]
    connection: &'a DatabaseConnection,
}

impl<'a> From<&'a DatabaseConnection> for WriteQuote<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            request: None,
            partner: None,
            partner_mail: None,
            partner_name: None,
            price: None,
            currency: None,
            timeline: None,
            notes: None,
            status: None,
            connection,
        }
    }
}

impl<'a> WriteQuote<'a> {
    /// Prepares the quote a partner submits for a request. Currency is fixed
    /// to VND, the status starts pending.
    pub fn with_submission(
        &mut self,
        request: &TrainingRequest,
        partner: &Partner,
        price: u64,
        submission: SubmitQuote,
    ) -> &mut Self {
        self.request = Some(request.id().to_thing());
        self.partner = Some(partner.id().to_thing());
        self.partner_mail = Some(partner.mail().clone());
        self.partner_name = Some(partner.display_name().to_owned());
        self.price = Some(price);
        self.currency = Some("VND".to_owned());
        self.timeline = Some(submission.timeline);
        self.notes = Some(submission.notes);
        self.status = Some(QuoteStatus::Pending);

        self
    }
}

impl<'a> IntoFuture for WriteQuote<'a> {
    type Output = Result<Quote>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let quote: Quote = sql_span!(self
                .connection
                .create("quote")
                .content(&self)
                .await?
                .into_iter()
                .next()
                .ok_or(ApplicationError::InternalServerError)?);

            Ok(quote)
        })
    }
}
