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

use crate::database::definitions::chat::{ChatRoom, ChatSide};
use crate::database::definitions::partner::{Partner, PartnerStatus};
use crate::database::definitions::request::TrainingRequest;
use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use std::collections::BTreeMap;

/// Partners waiting longer than this show up as needing attention.
const STALE_PENDING_DAYS: i64 = 3;
const HOT_TYPE_LIMIT: usize = 3;

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct HotTrainingType {
    #[serde(rename = "type")]
    pub ty: String,
    /// occurrences over all request contents
    pub count: u64,
    /// rounded share measured against the request total
    pub share_percent: u64,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_requests: u64,
    pub approved_partners: u64,
    pub urgent_requests: u64,
    pub pending_partners: u64,
    pub hot_training_types: Vec<HotTrainingType>,
    /// pending partner profiles older than three days
    pub stale_pending_partners: u64,
    /// requests nobody has unlocked yet
    pub unviewed_requests: u64,
}

/// Folds the partner and request snapshots into the administrator dashboard
/// figures.
pub fn dashboard(
    partners: &[Partner],
    requests: &[TrainingRequest],
    now: DateTime<Utc>,
) -> DashboardStats {
    let pending = partners
        .iter()
        .filter(|partner| *partner.status() == PartnerStatus::Pending)
        .collect::<Vec<_>>();

    // occurrences per training type, deterministic over the btree order
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for request in requests {
        for detail in request.training_details() {
            *counts.entry(detail.ty.as_str()).or_default() += 1;
        }
    }
    let mut hot = counts.into_iter().collect::<Vec<_>>();
    hot.sort_by(|a, b| b.1.cmp(&a.1));

    let total_requests = requests.len() as u64;
    let hot_training_types = hot
        .into_iter()
        .take(HOT_TYPE_LIMIT)
        .map(|(ty, count)| HotTrainingType {
            ty: ty.to_owned(),
            count,
            share_percent: if total_requests == 0 {
                0
            } else {
                (count as f64 / total_requests as f64 * 100.0).round() as u64
            },
        })
        .collect();

    DashboardStats {
        total_requests,
        approved_partners: partners
            .iter()
            .filter(|partner| *partner.status() == PartnerStatus::Approved)
            .count() as u64,
        urgent_requests: requests.iter().filter(|request| *request.urgent()).count() as u64,
        pending_partners: pending.len() as u64,
        hot_training_types,
        stale_pending_partners: pending
            .iter()
            .filter(|partner| now - *partner.created_at() > Duration::days(STALE_PENDING_DAYS))
            .count() as u64,
        unviewed_requests: requests
            .iter()
            .filter(|request| request.viewed_by().is_empty())
            .count() as u64,
    }
}

/// The callers total of unread messages over its room snapshot.
pub fn unread_total(rooms: &[ChatRoom], side: ChatSide) -> u64 {
    rooms.iter().map(|room| room.unread().side(side)).sum()
}

#[cfg(test)]
mod tests {
    use super::{dashboard, unread_total};
    use crate::database::definitions::chat::{ChatRoom, ChatSide};
    use crate::database::definitions::partner::Partner;
    use crate::database::definitions::request::TrainingRequest;
    use chrono::{DateTime, Utc};

    fn partner(id: &str, status: &str, created_at: &str) -> Partner {
        serde_json::from_value(json!({
            "id": format!("partner:{id}"),
            "mail": format!("{id}@example.com"),
            "password": "",
            "tax_id": "0100112233",
            "address": "Hà Nội",
            "phone": "0901234567",
            "notable_clients": "",
            "capabilities": ["An toàn điện"],
            "subscribes_to_emails": true,
            "status": status,
            "membership": "free",
            "admin": false,
            "created_at": created_at,
        }))
        .unwrap()
    }

    fn request(id: &str, types: &[&str], urgent: bool, viewed: bool) -> TrainingRequest {
        let details = types
            .iter()
            .map(|ty| json!({ "type": ty, "group": "Không áp dụng", "participants": 5 }))
            .collect::<Vec<_>>();

        serde_json::from_value(json!({
            "id": format!("training_request:{id}"),
            "client_name": "Nguyễn Văn A",
            "client_email": "client@example.com",
            "client_phone": "0901234567",
            "training_details": details,
            "training_duration": "1 ngày",
            "preferred_time": "T11/2024",
            "description": "",
            "location": "Hà Nội",
            "urgent": urgent,
            "client_subscribes_to_emails": true,
            "viewed_by": if viewed { json!(["partner:a"]) } else { json!([]) },
            "created_at": "2024-09-01T08:00:00Z",
        }))
        .unwrap()
    }

    fn room(id: &str, client_unread: u64, partner_unread: u64) -> ChatRoom {
        serde_json::from_value(json!({
            "id": format!("chat_room:{id}"),
            "request": "training_request:one",
            "partner": "partner:a",
            "client_id": "admin",
            "client_name": "Admin - SafetyConnect",
            "partner_name": "0100112233",
            "last_message": "xin chào",
            "last_message_time": "2024-09-01T08:00:00Z",
            "unread": { "client": client_unread, "partner": partner_unread },
            "created_at": "2024-09-01T08:00:00Z",
        }))
        .unwrap()
    }

    #[test]
    fn test_dashboard_figures() {
        let now: DateTime<Utc> = "2024-09-10T00:00:00Z".parse().unwrap();
        let partners = vec![
            partner("a", "approved", "2024-09-01T00:00:00Z"),
            partner("b", "pending", "2024-09-09T00:00:00Z"),
            partner("c", "pending", "2024-09-01T00:00:00Z"),
        ];
        let requests = vec![
            request("one", &["An toàn điện", "Sơ cấp cứu"], true, true),
            request("two", &["An toàn điện"], false, false),
            request("three", &["Phòng cháy chữa cháy (PCCC)"], false, false),
            request("four", &["An toàn điện", "Sơ cấp cứu"], false, false),
        ];

        let stats = dashboard(&partners, &requests, now);
        assert_eq!(4, stats.total_requests);
        assert_eq!(1, stats.approved_partners);
        assert_eq!(1, stats.urgent_requests);
        assert_eq!(2, stats.pending_partners);
        assert_eq!(1, stats.stale_pending_partners);
        assert_eq!(3, stats.unviewed_requests);

        assert_eq!(3, stats.hot_training_types.len());
        assert_eq!("An toàn điện", stats.hot_training_types[0].ty.as_str());
        assert_eq!(3, stats.hot_training_types[0].count);
        assert_eq!(75, stats.hot_training_types[0].share_percent);
        assert_eq!("Sơ cấp cứu", stats.hot_training_types[1].ty.as_str());
    }

    #[test]
    fn test_unread_totals_per_side() {
        let rooms = vec![room("a", 2, 0), room("b", 1, 3)];

        assert_eq!(3, unread_total(&rooms, ChatSide::Client));
        assert_eq!(3, unread_total(&rooms, ChatSide::Partner));
    }
}
