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

//! The HTML bodies of the two transactional mails. Vietnamese copy, rendered
//! server side into self-contained documents.

use crate::database::definitions::quote::Quote;
use crate::database::definitions::request::TrainingRequest;
use crate::prelude::CONFIGURATION;

/// Formats an amount with the dotted thousands groups customary on
/// Vietnamese invoices (1500000 -> "1.500.000").
pub fn format_price(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    grouped
}

/// The batch notification sent to every matching partner when a request is
/// created.
pub fn partner_notification(request: &TrainingRequest) -> String {
    let details = request
        .training_details()
        .iter()
        .map(|detail| {
            format!(
                "<li><strong>{}</strong> - Nhóm: {}, Số lượng: {} học viên</li>",
                detail.ty, detail.group, detail.participants
            )
        })
        .collect::<String>();
    let urgent = if *request.urgent() {
        "<p style=\"color: red; font-weight: bold;\">Đây là yêu cầu khẩn cấp!</p>"
    } else {
        ""
    };

    format!(
        r#"<h2>Thông báo yêu cầu đào tạo mới</h2>
<p>Chúng tôi nhận được yêu cầu đào tạo mới với các nội dung sau:</p>
<ul>{details}</ul>
<p><strong>Thông tin khách hàng:</strong></p>
<ul>
  <li>Tên: {client_name}</li>
  <li>Email: {client_email}</li>
  <li>Điện thoại: {client_phone}</li>
  <li>Địa điểm: {location}</li>
  <li>Mô tả: {description}</li>
</ul>
<p>Thời lượng: {duration} | Thời gian mong muốn: {preferred_time}</p>
{urgent}
<p><a href="{public_url}/login">Vui lòng đăng nhập vào hệ thống</a> để xem chi tiết và phản hồi yêu cầu này.</p>"#,
        client_name = request.client_name(),
        client_email = request.client_email(),
        client_phone = request.client_phone(),
        location = request.location(),
        description = request.description(),
        duration = request.training_duration(),
        preferred_time = request.preferred_time(),
        public_url = CONFIGURATION.public_url,
    )
}

/// The notification sent to the client once a partner submitted a quote.
pub fn quote_notification(request: &TrainingRequest, quote: &Quote) -> String {
    let contents = request
        .training_details()
        .iter()
        .map(|detail| {
            format!(
                "<li>{} ({} học viên)</li>",
                detail.ty, detail.participants
            )
        })
        .collect::<String>();

    format!(
        r#"<h2>Bạn có báo giá mới từ đối tác đào tạo</h2>
<p>Chào {client_name},</p>
<p>Đơn vị <strong>{partner_name}</strong> vừa gửi báo giá cho yêu cầu của bạn:</p>
<ul>{contents}</ul>
<p><strong>Giá báo:</strong> {price} {currency}</p>
<p><strong>Thời gian thực hiện:</strong> {timeline}</p>
<p><strong>Ghi chú:</strong> {notes}</p>
<p>Bạn có thể liên hệ trực tiếp với đối tác qua email <a href="mailto:{partner_mail}">{partner_mail}</a>.</p>"#,
        client_name = request.client_name(),
        partner_name = quote.partner_name(),
        price = format_price(*quote.price()),
        currency = quote.currency(),
        timeline = quote.timeline(),
        notes = quote.notes(),
        partner_mail = quote.partner_mail(),
    )
}

#[cfg(test)]
mod tests {
    use super::format_price;

    #[test]
    fn test_format_price() {
        assert_eq!("0", format_price(0));
        assert_eq!("950", format_price(950));
        assert_eq!("1.500", format_price(1500));
        assert_eq!("1.500.000", format_price(1_500_000));
        assert_eq!("12.345.678", format_price(12_345_678));
    }
}
