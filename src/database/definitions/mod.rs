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

pub mod chat;
pub mod partner;
pub mod quote;
pub mod request;

/// Every persisted definition exposes its record id.
pub trait Record {
    fn id(&self) -> &Id;
}

/// A reference to another record, either as the plain foreign key or as the
/// fetched record itself (a `FETCH` clause in the query decides which).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum Relation<T> {
    ForeignKey(Id),
    Fetched(Box<T>),
}

impl<T> Relation<T>
where
    T: Record,
{
    pub fn id(&self) -> &Id {
        match self {
            Relation::ForeignKey(id) => id,
            Relation::Fetched(record) => record.id(),
        }
    }
}
