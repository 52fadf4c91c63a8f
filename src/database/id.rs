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

use crate::error::ApplicationError;
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use surrealdb::opt::{IntoResource, Resource};
use surrealdb::sql::Thing;

/// A record id in its `table:id` notation. Surrealdb answers either with the
/// plain string or with a full [`Thing`], so deserialization accepts both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id {
    pub table: String,
    pub id: String,
}

impl Id {
    pub fn new((table, id): (&str, &str)) -> Self {
        Self {
            table: table.to_string(),
            id: id.to_string(),
        }
    }

    pub fn to_thing(&self) -> Thing {
        Thing::from((self.table.as_str(), self.id.as_str()))
    }
}

impl From<Thing> for Id {
    fn from(thing: Thing) -> Self {
        Self {
            table: thing.tb,
            id: thing.id.to_string(),
        }
    }
}

impl TryFrom<(&str, &str)> for Id {
    type Error = ApplicationError;

    /// Parses `table:id` (or the bare id) while forcing the table name. Ids
    /// taken from a path parameter must never address a foreign table.
    fn try_from((force, raw): (&str, &str)) -> Result<Self, Self::Error> {
        match raw.split_once(':') {
            Some((table, id)) => {
                if !table.eq(force) {
                    return Err(ApplicationError::Unauthorized);
                }
                if id.is_empty() {
                    return Err(ApplicationError::BadRequest("invalid id".to_owned()));
                }

                Ok(Self::new((table, id)))
            }
            None if !raw.is_empty() => Ok(Self::new((force, raw))),
            None => Err(ApplicationError::BadRequest("invalid id".to_owned())),
        }
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", &self.table, &self.id)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw_value = serde_json::Value::deserialize(deserializer)?;

        if let Some(string) = raw_value.as_str() {
            let (table, id) = string
                .split_once(':')
                .ok_or(serde::de::Error::custom("Invalid id format"))?;

            // surrealdb escapes exotic ids with angle brackets
            return Ok(Self::new((table, id.trim_matches(['⟨', '⟩'].as_slice()))));
        }

        if raw_value.is_object() {
            let thing =
                serde_json::from_value::<Thing>(raw_value).map_err(serde::de::Error::custom)?;
            return Ok(Self::from(thing));
        }

        Err(serde::de::Error::custom("Invalid datatype"))
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl JsonSchema for Id {
    fn schema_name() -> String {
        "Id".to_owned()
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            format: Some("string".to_string()),
            ..Default::default()
        }
        .into()
    }
}

impl<R> IntoResource<Option<R>> for &Id {
    fn into_resource(self) -> surrealdb::Result<Resource> {
        Ok(Resource::RecordId(self.to_thing()))
    }
}
