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

//! Form validation as plain functions returning results. The route layer maps
//! a failure onto the localized 400 response, nothing in here touches the
//! database or raises.

use crate::database::definitions::quote::SubmitQuote;
use crate::database::definitions::request::{CreateTrainingRequest, TrainingDetail};
use crate::domain::vocab;
use crate::error::ApplicationError;
use strum::AsRefStr;

#[derive(Error, Debug, Clone, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ValidationError {
    #[error("missing required contact fields")]
    MissingContact,
    #[error("a request needs at least one training content")]
    NoDetails,
    #[error("every content needs a type and a participant count")]
    IncompleteDetail,
    #[error("participant count must be positive")]
    NonPositiveParticipants,
    #[error("missing required quote fields")]
    MissingQuoteFields,
    #[error("price must be a positive amount")]
    InvalidPrice,
    #[error("missing required registration fields")]
    MissingRegistrationFields,
    #[error("capability set must not be empty")]
    EmptyCapabilities,
    #[error("unknown capability")]
    UnknownCapability,
}

impl From<ValidationError> for ApplicationError {
    fn from(error: ValidationError) -> Self {
        Self::BadRequest(t!(format!("validate.{}", error.as_ref()).as_str()).to_string())
    }
}

/// Checks the request form and resolves the entered contents: the custom
/// "Khác" entry is replaced by its concrete text before anything is stored or
/// matched.
pub fn training_request(
    form: &CreateTrainingRequest,
) -> Result<Vec<TrainingDetail>, ValidationError> {
    let required = [
        &form.client_name,
        &form.client_email,
        &form.client_phone,
        &form.description,
        &form.location,
        &form.training_duration,
        &form.preferred_time,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(ValidationError::MissingContact);
    }

    if form.training_details.is_empty() {
        return Err(ValidationError::NoDetails);
    }

    let mut details = Vec::with_capacity(form.training_details.len());
    for detail in &form.training_details {
        let ty = if detail.ty.starts_with(vocab::CUSTOM_TYPE_PREFIX) {
            detail.custom_type.trim()
        } else {
            detail.ty.trim()
        };
        if ty.is_empty() {
            return Err(ValidationError::IncompleteDetail);
        }
        if detail.participants == 0 {
            return Err(ValidationError::NonPositiveParticipants);
        }

        details.push(TrainingDetail {
            ty: ty.to_owned(),
            group: detail.group.clone(),
            participants: detail.participants,
        });
    }

    Ok(details)
}

/// Checks a quote submission and parses the price out of its form notation
/// with dotted thousands groups.
pub fn quote(form: &SubmitQuote) -> Result<u64, ValidationError> {
    if form.price.trim().is_empty()
        || form.timeline.trim().is_empty()
        || form.notes.trim().is_empty()
    {
        return Err(ValidationError::MissingQuoteFields);
    }

    let price = form
        .price
        .trim()
        .replace('.', "")
        .parse::<u64>()
        .map_err(|_| ValidationError::InvalidPrice)?;
    if price == 0 {
        return Err(ValidationError::InvalidPrice);
    }

    Ok(price)
}

/// Checks a partner registration: required identity fields plus a non-empty
/// capability selection out of the closed vocabulary.
pub fn registration(
    mail: &str,
    password: &str,
    tax_id: &str,
    capabilities: &[String],
) -> Result<(), ValidationError> {
    if mail.trim().is_empty() || password.trim().is_empty() || tax_id.trim().is_empty() {
        return Err(ValidationError::MissingRegistrationFields);
    }

    if capabilities.is_empty() {
        return Err(ValidationError::EmptyCapabilities);
    }
    if capabilities
        .iter()
        .any(|capability| !vocab::PARTNER_CAPABILITIES.contains(&capability.as_str()))
    {
        return Err(ValidationError::UnknownCapability);
    }

    Ok(())
}
