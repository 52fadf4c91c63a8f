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
use aide::axum::ApiRouter;
use aide::openapi::OpenApi;
use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub mod state;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub surrealdb_endpoint: String,
    pub surrealdb_username: String,
    pub surrealdb_password: String,
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    /// cookie domain for the session cookie
    pub domain: String,
    /// base url rendered into outbound mails
    pub public_url: String,
    #[serde(default)]
    pub telegram_bot_token: Option<String>,
    #[serde(default)]
    pub telegram_chat_id: Option<String>,
}

lazy_static::lazy_static! {
    pub static ref CONFIGURATION: Config = envy::from_env::<Config>().unwrap();
}

const HOOK_INTERVAL: u64 = 10000;
const PORT: u16 = 8000;

pub fn init() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    lazy_static::initialize(&CONFIGURATION);
    rust_i18n::set_locale("vi");

    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(async move {
            tracing_subscriber::registry()
                .with(tracing_subscriber::EnvFilter::from_default_env())
                .with(tracing_subscriber::fmt::layer())
                .init();

            let (hook_sender, hook_receiver) = kanal::unbounded_async::<()>();
            let (axum_sender, axum_receiver) = kanal::unbounded_async::<()>();

            let info = crate::database::connect(None).await?;
            let connection = info.connection.clone();

            // as the surrealdb rust-sdk currently does not support live queries we have to adapt here
            // and are regularly checking for undelivered mail jobs.
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        result = crate::hook::tick(&connection) => {
                            match result {
                                Ok(()) => {},
                                Err(error) => error!("Error occurred during hook: {}", error),
                            }

                            tokio::time::sleep(std::time::Duration::from_millis(HOOK_INTERVAL)).await;
                        },
                        _ = hook_receiver.recv() => {
                            warn!("Received shutdown signal on kanal receiver");
                            break;
                        }
                    }
                }

                Ok::<(), ApplicationError>(())
            });

            let router = router(info).await?;
            tokio::spawn(async move {
                let addr = std::net::SocketAddr::from(([0, 0, 0, 0], PORT));

                axum::Server::bind(&addr)
                    .serve(router.into_make_service())
                    .with_graceful_shutdown(async {
                        axum_receiver.recv().await.ok();
                    })
                    .await
                    .unwrap();

                Ok::<(), ApplicationError>(())
            });

            match tokio::signal::ctrl_c().await {
                Ok(()) => {}
                Err(error) => {
                    error!("Unable to listen for shutdown signal: {}", error);
                    hook_sender.send(()).await?;
                    axum_sender.send(()).await?;
                }
            }

            info!("Received shutdown signal... Shutting down...");
            // shutdown
            hook_sender.send(()).await?;
            axum_sender.send(()).await?;
            Ok(())
        })
}

pub async fn router(info: ConnectionInfo) -> Result<Router> {
    let state = ApplicationState::from(info);

    let mut api = OpenApi::default();
    let router = ApiRouter::new()
        .nest_api_service("/auth", crate::routes::auth::router(state.clone()))
        .nest_api_service("/request", crate::routes::request::router(state.clone()))
        .nest_api_service("/partner", crate::routes::partner::router(state.clone()))
        .nest_api_service("/quote", crate::routes::quote::router(state.clone()))
        .nest_api_service("/chat", crate::routes::chat::router(state.clone()))
        .nest_api_service("/admin", crate::routes::admin::router(state.clone()))
        .nest_api_service("/vocab", crate::routes::vocab::router(state.clone()))
        .nest_api_service("/docs", crate::routes::openapi::router(state))
        .finish_api_with(&mut api, crate::routes::openapi::transform_api)
        .layer(Extension(Arc::new(api)))
        .layer(CompressionLayer::new().gzip(true));

    Ok(router)
}
