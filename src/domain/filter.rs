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

use crate::database::definitions::request::TrainingRequest;
use crate::domain::timeframe::PreferredMonth;
use schemars::JsonSchema;
use std::cmp::Ordering;
use strum::{AsRefStr, EnumString};

pub const PARTICIPANTS_MIN_DEFAULT: u32 = 0;
pub const PARTICIPANTS_MAX_DEFAULT: u32 = 1000;

/// The advanced-search state. Every criterion at its default is a no-op, the
/// active ones are combined conjunctively.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    /// keep requests containing at least one of these contents
    pub training_types: Vec<String>,
    /// substring match against the free-text location
    pub provinces: Vec<String>,
    pub participants_min: u32,
    pub participants_max: u32,
    /// restrict to urgent requests
    pub urgent: bool,
    /// month-input strings bounding the preferred month
    pub date_from: String,
    pub date_to: String,
    /// free-text search over location, description and contents
    pub query: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            training_types: Vec::new(),
            provinces: Vec::new(),
            participants_min: PARTICIPANTS_MIN_DEFAULT,
            participants_max: PARTICIPANTS_MAX_DEFAULT,
            urgent: false,
            date_from: String::new(),
            date_to: String::new(),
            query: String::new(),
        }
    }
}

#[derive(
    Deserialize,
    Serialize,
    JsonSchema,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    EnumString,
    AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// creation time descending
    #[default]
    Newest,
    /// summed participant count descending
    Participants,
    /// preferred month ascending, requests without a readable month last
    Soonest,
}

impl FilterState {
    pub fn matches(&self, request: &TrainingRequest) -> bool {
        self.matches_training_types(request)
            && self.matches_provinces(request)
            && self.matches_participants(request)
            && self.matches_urgency(request)
            && self.matches_date_range(request)
            && self.matches_query(request)
    }

    fn matches_training_types(&self, request: &TrainingRequest) -> bool {
        self.training_types.is_empty()
            || request
                .training_details()
                .iter()
                .any(|detail| self.training_types.contains(&detail.ty))
    }

    fn matches_provinces(&self, request: &TrainingRequest) -> bool {
        self.provinces.is_empty()
            || self
                .provinces
                .iter()
                .any(|province| request.location().contains(province.as_str()))
    }

    fn matches_participants(&self, request: &TrainingRequest) -> bool {
        let total = request.participant_total();

        total >= self.participants_min && total <= self.participants_max
    }

    fn matches_urgency(&self, request: &TrainingRequest) -> bool {
        !self.urgent || *request.urgent()
    }

    /// An active bound that does not parse is ignored. A request whose
    /// preferred time cannot be read fails any active bound, it cannot be
    /// scheduled into the asked-for window.
    fn matches_date_range(&self, request: &TrainingRequest) -> bool {
        let from = PreferredMonth::parse(self.date_from.as_str());
        let to = PreferredMonth::parse(self.date_to.as_str());

        if from.is_none() && to.is_none() {
            return true;
        }

        let Some(month) = PreferredMonth::parse(request.preferred_time().as_str()) else {
            return false;
        };

        from.map_or(true, |from| month >= from) && to.map_or(true, |to| month <= to)
    }

    fn matches_query(&self, request: &TrainingRequest) -> bool {
        if self.query.is_empty() {
            return true;
        }

        let needle = self.query.to_lowercase();
        request.location().to_lowercase().contains(&needle)
            || request.description().to_lowercase().contains(&needle)
            || request
                .training_details()
                .iter()
                .any(|detail| detail.ty.to_lowercase().contains(&needle))
    }
}

/// Runs the full pipeline over a snapshot: conjunctive filtering followed by
/// the requested total ordering. `sort_by` is stable, equal keys keep their
/// input order, so the result only depends on input and parameters.
pub fn apply(
    mut requests: Vec<TrainingRequest>,
    filter: &FilterState,
    sort: SortKey,
) -> Vec<TrainingRequest> {
    requests.retain(|request| filter.matches(request));

    match sort {
        SortKey::Newest => {
            requests.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        }
        SortKey::Participants => {
            requests.sort_by(|a, b| b.participant_total().cmp(&a.participant_total()));
        }
        SortKey::Soonest => {
            requests.sort_by(|a, b| {
                match (
                    PreferredMonth::parse(a.preferred_time().as_str()),
                    PreferredMonth::parse(b.preferred_time().as_str()),
                ) {
                    (Some(a), Some(b)) => a.cmp(&b),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        }
    }

    requests
}
