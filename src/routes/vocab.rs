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

use crate::domain::vocab;
use crate::prelude::*;
use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/", get_with(get_vocab, get_vocab_docs))
        .with_state(state)
}

/// The closed lists every form control and the matcher agree on.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VocabResponse {
    pub training_types: Vec<String>,
    pub training_groups: Vec<String>,
    pub partner_capabilities: Vec<String>,
    pub provinces: Vec<String>,
}

async fn get_vocab() -> Json<VocabResponse> {
    let collect = |list: &[&str]| list.iter().map(|entry| entry.to_string()).collect();

    Json(VocabResponse {
        training_types: collect(&vocab::TRAINING_TYPES),
        training_groups: collect(&vocab::TRAINING_GROUPS),
        partner_capabilities: collect(&vocab::PARTNER_CAPABILITIES),
        provinces: collect(&vocab::VIETNAM_PROVINCES),
    })
}

fn get_vocab_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The controlled vocabularies, the single source of truth for all clients")
        .summary("Fetch the vocabularies")
        .response::<200, Json<VocabResponse>>()
}
