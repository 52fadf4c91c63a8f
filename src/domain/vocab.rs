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

//! The controlled vocabularies shared between form validation, the capability
//! matcher and the API consumers. These are closed lists, matching happens on
//! the exact strings.

/// Training contents a client can request. The last entry is the free-form
/// escape hatch, its concrete text gets substituted during validation.
pub const TRAINING_TYPES: [&str; 9] = [
    "An toàn điện",
    "An toàn xây dựng",
    "An toàn hóa chất",
    "Phòng cháy chữa cháy (PCCC)",
    "An toàn bức xạ",
    "Quan trắc môi trường",
    "Đánh giá phân loại lao động",
    "Sơ cấp cứu",
    "Khác (Vui lòng ghi rõ)",
];

/// Prefix marking the custom training type in a submitted form.
pub const CUSTOM_TYPE_PREFIX: &str = "Khác";

pub const TRAINING_GROUPS: [&str; 7] = [
    "Không áp dụng",
    "Nhóm 1 (NĐ 44)",
    "Nhóm 2 (NĐ 44)",
    "Nhóm 3 (NĐ 44)",
    "Nhóm 4 (NĐ 44)",
    "Nhóm 5 (NĐ 44)",
    "Nhóm 6 (NĐ 44)",
];

/// Capabilities a partner can register. The final entry is the broad tag
/// covering trainings outside the fixed list.
pub const PARTNER_CAPABILITIES: [&str; 9] = [
    "An toàn điện",
    "An toàn xây dựng",
    "An toàn hóa chất",
    "Phòng cháy chữa cháy (PCCC)",
    "An toàn bức xạ",
    "Quan trắc môi trường",
    "Đánh giá phân loại lao động",
    "Sơ cấp cứu",
    "Huấn luyện chung (Nhiều lĩnh vực)",
];

pub const GENERAL_CAPABILITY: &str = "Huấn luyện chung (Nhiều lĩnh vực)";

pub const VIETNAM_PROVINCES: [&str; 63] = [
    "Hà Nội",
    "Hồ Chí Minh",
    "Đà Nẵng",
    "Hải Phòng",
    "Cần Thơ",
    "An Giang",
    "Bà Rịa - Vũng Tàu",
    "Bắc Giang",
    "Bắc Kạn",
    "Bạc Liêu",
    "Bắc Ninh",
    "Bến Tre",
    "Bình Định",
    "Bình Dương",
    "Bình Phước",
    "Bình Thuận",
    "Cà Mau",
    "Cao Bằng",
    "Đắk Lắk",
    "Đắk Nông",
    "Điện Biên",
    "Đồng Nai",
    "Đồng Tháp",
    "Gia Lai",
    "Hà Giang",
    "Hà Nam",
    "Hà Tĩnh",
    "Hải Dương",
    "Hậu Giang",
    "Hòa Bình",
    "Hưng Yên",
    "Khánh Hòa",
    "Kiên Giang",
    "Kon Tum",
    "Lai Châu",
    "Lâm Đồng",
    "Lạng Sơn",
    "Lào Cai",
    "Long An",
    "Nam Định",
    "Nghệ An",
    "Ninh Bình",
    "Ninh Thuận",
    "Phú Thọ",
    "Phú Yên",
    "Quảng Bình",
    "Quảng Nam",
    "Quảng Ngãi",
    "Quảng Ninh",
    "Quảng Trị",
    "Sóc Trăng",
    "Sơn La",
    "Tây Ninh",
    "Thái Bình",
    "Thái Nguyên",
    "Thanh Hóa",
    "Thừa Thiên Huế",
    "Tiền Giang",
    "Trà Vinh",
    "Tuyên Quang",
    "Vĩnh Long",
    "Vĩnh Phúc",
    "Yên Bái",
];

/// Whether the given type belongs to the fixed training vocabulary. Custom
/// types substituted from the "Khác" entry never do.
pub fn is_enumerated_type(ty: &str) -> bool {
    TRAINING_TYPES.contains(&ty)
}
