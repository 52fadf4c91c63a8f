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
use crate::prelude::*;

/// Builds the administrator alert for a freshly created request.
fn format_request_message(request: &TrainingRequest) -> String {
    let contents = request
        .training_details()
        .iter()
        .map(|detail| format!("• {} ({} học viên)", detail.ty, detail.participants))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "🔔 <b>YÊU CẦU ĐÀO TẠO MỚI</b>\n\n{contents}\n\n\
        👤 <b>Người liên hệ:</b> {client_name}\n\
        📧 <b>Email:</b> {client_email}\n\
        📱 <b>Điện thoại:</b> {client_phone}\n\
        📍 <b>Địa điểm:</b> {location}\n\
        📅 <b>Thời gian mong muốn:</b> {preferred_time}\n\
        {urgent}\
        \n🔗 <a href=\"{public_url}/admin\">Xem chi tiết</a>",
        client_name = request.client_name(),
        client_email = request.client_email(),
        client_phone = request.client_phone(),
        location = request.location(),
        preferred_time = request.preferred_time(),
        urgent = if *request.urgent() {
            "\n⚡ <b>KHẨN CẤP - ƯU TIÊN CAO</b>\n"
        } else {
            ""
        },
        public_url = CONFIGURATION.public_url,
    )
}

/// Pushes the alert to the configured Telegram chat. Without a configured bot
/// this is a no-op, the caller treats the whole thing as best effort anyway.
#[instrument(skip_all)]
pub async fn notify_new_request(request: &TrainingRequest) -> Result<()> {
    let (Some(token), Some(chat_id)) = (
        CONFIGURATION.telegram_bot_token.as_ref(),
        CONFIGURATION.telegram_chat_id.as_ref(),
    ) else {
        debug!("Telegram notifications are not configured, skipping");
        return Ok(());
    };

    reqwest::Client::new()
        .post(format!("https://api.telegram.org/bot{token}/sendMessage"))
        .json(&json!({
            "chat_id": chat_id,
            "text": format_request_message(request),
            "parse_mode": "HTML"
        }))
        .send()
        .await?
        .error_for_status()?;

    Ok(())
}
