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

use crate::database::definitions::partner::{Partner, PartnerStatus};
use crate::domain::vocab;

/// Selects the partners to notify about a request with the given training
/// types. A partner matches when it is approved, subscribed to mails and its
/// capability set intersects the requested types. Capability comparison is
/// exact and case sensitive, the vocabulary is closed.
///
/// Types outside the fixed vocabulary (the substituted "Khác" contents) only
/// reach partners carrying the literal string or the broad
/// "Huấn luyện chung" capability.
///
/// Pure read over the snapshot, no ordering guarantee. Issuing the actual
/// notifications is the caller's business.
pub fn matching_partners<'a>(types: &[String], roster: &'a [Partner]) -> Vec<&'a Partner> {
    roster
        .iter()
        .filter(|partner| {
            *partner.status() == PartnerStatus::Approved && *partner.subscribes_to_emails()
        })
        .filter(|partner| {
            let capabilities = partner.capabilities();

            types.iter().any(|ty| {
                capabilities.iter().any(|capability| capability == ty)
                    || (!vocab::is_enumerated_type(ty)
                        && capabilities
                            .iter()
                            .any(|capability| capability == vocab::GENERAL_CAPABILITY))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::matching_partners;
    use crate::database::definitions::partner::Partner;

    fn partner(id: &str, capabilities: &[&str], status: &str, subscribed: bool) -> Partner {
        serde_json::from_value(json!({
            "id": format!("partner:{id}"),
            "mail": format!("{id}@example.com"),
            "password": "",
            "tax_id": format!("01001{id}"),
            "address": "Hà Nội",
            "phone": "0901234567",
            "notable_clients": "",
            "capabilities": capabilities,
            "subscribes_to_emails": subscribed,
            "status": status,
            "membership": "free",
            "admin": false,
            "created_at": "2024-01-01T00:00:00Z",
        }))
        .unwrap()
    }

    fn matched_ids(types: &[&str], roster: &[Partner]) -> Vec<String> {
        let types = types.iter().map(|ty| ty.to_string()).collect::<Vec<_>>();
        let mut ids = matching_partners(&types, roster)
            .into_iter()
            .map(|partner| partner.id().id.clone())
            .collect::<Vec<_>>();
        ids.sort();
        ids
    }

    #[test]
    fn test_selection() {
        let roster = vec![
            partner("a", &["An toàn điện"], "approved", true),
            partner("b", &["Sơ cấp cứu"], "approved", true),
            partner("c", &["Phòng cháy chữa cháy (PCCC)"], "pending", true),
        ];

        let matched = matched_ids(
            &["An toàn điện", "Phòng cháy chữa cháy (PCCC)"],
            &roster,
        );
        assert_eq!(vec!["a"], matched);
    }

    #[test]
    fn test_unsubscribed_is_skipped() {
        let roster = vec![partner("a", &["An toàn điện"], "approved", false)];

        assert!(matched_ids(&["An toàn điện"], &roster).is_empty());
    }

    #[test]
    fn test_custom_type_reaches_general_capability() {
        let roster = vec![
            partner("a", &["An toàn điện"], "approved", true),
            partner("b", &["Huấn luyện chung (Nhiều lĩnh vực)"], "approved", true),
            partner("c", &["Đào tạo lái xe nâng"], "approved", true),
        ];

        // the custom content reaches the literal match and the broad tag
        let matched = matched_ids(&["Đào tạo lái xe nâng"], &roster);
        assert_eq!(vec!["b", "c"], matched);
    }

    #[test]
    fn test_general_capability_is_no_wildcard_for_enumerated_types() {
        let roster = vec![partner(
            "a",
            &["Huấn luyện chung (Nhiều lĩnh vực)"],
            "approved",
            true,
        )];

        assert!(matched_ids(&["An toàn điện"], &roster).is_empty());
    }

    #[test]
    fn test_rejected_is_skipped() {
        let roster = vec![partner("a", &["An toàn điện"], "rejected", true)];

        assert!(matched_ids(&["An toàn điện"], &roster).is_empty());
    }
}
