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
use lazy_static::lazy_static;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use strum::{AsRefStr, EnumString};
use surrealdb::sql::Thing;

lazy_static! {
    pub static ref TRANSPORT: AsyncSmtpTransport<Tokio1Executor> = {
        AsyncSmtpTransport::<Tokio1Executor>::relay(CONFIGURATION.smtp_host.as_str())
            .unwrap()
            .credentials(Credentials::new(
                CONFIGURATION.smtp_username.clone(),
                CONFIGURATION.smtp_password.clone(),
            ))
            .build()
    };
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, AsRefStr, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MailState {
    Pending,
    Processing,
    Delivered,
}

/// One outbound mail waiting in the queue. A batch notification addresses
/// several recipients through a single job.
#[derive(Deserialize, Serialize, Debug, Clone, Getters)]
#[get = "pub"]
pub struct MailJob {
    id: Thing,
    to: Vec<String>,
    subject: String,
    html: String,
    state: MailState,
}

/// Puts a mail job into the queue. This is the only mail operation the
/// request path ever performs, nothing here talks SMTP.
#[instrument(skip(html, connection))]
pub async fn enqueue(
    to: Vec<String>,
    subject: String,
    html: String,
    connection: &DatabaseConnection,
) -> Result<()> {
    sql_span!(connection
        .query("CREATE mail CONTENT { to: $to, subject: $subject, html: $html, state: $state }")
        .bind(("to", to))
        .bind(("subject", subject))
        .bind(("html", html))
        .bind(("state", MailState::Pending))
        .await?
        .check()?);

    Ok(())
}

#[instrument(skip_all)]
pub async fn mail_hook(connection: &DatabaseConnection) -> Result<()> {
    // collect all mail with the status "pending" and update them to "processing"
    let jobs: Vec<MailJob> = sql_span!(connection
        .query("SELECT * FROM mail WHERE state = $pending")
        .query("UPDATE mail SET state = $processing WHERE state = $pending")
        .bind(("pending", MailState::Pending))
        .bind(("processing", MailState::Processing))
        .await?
        .check()?
        .take(0)?);

    // send the mails
    for job in jobs {
        let id = job.id.clone();

        match send_job(job, connection).await {
            Ok(()) => {}
            Err(error) => {
                error!("Error while sending mail: {}", error);

                // put the failed job back into the queue
                let _: Option<MailJob> = connection
                    .update(id)
                    .merge(&json!({
                        "state": MailState::Pending
                    }))
                    .await?;
            }
        };
    }

    Ok(())
}

#[instrument(skip_all)]
async fn send_job(job: MailJob, connection: &DatabaseConnection) -> Result<()> {
    let mut builder = Message::builder()
        .from(CONFIGURATION.smtp_username.as_str().parse()?)
        .subject(job.subject.as_str())
        .header(ContentType::TEXT_HTML);
    for recipient in &job.to {
        builder = builder.to(recipient.as_str().parse()?);
    }
    let message = builder.body(job.html.clone())?;

    // send the mail
    TRANSPORT.send(message).await?;
    // set the status to delivered
    let _: Option<MailJob> = connection
        .update(job.id)
        .merge(&json!({
            "state": MailState::Delivered
        }))
        .await?;

    Ok(())
}
