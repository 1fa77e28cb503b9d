//! Application state wiring the client stores to the concrete infra adapters.
//!
//! AppState restores the persisted session (tokens from the OS keychain) and
//! cart from the data directory, starts the persistence subscriber, and pins
//! the generic request layer and chat client to the reqwest and
//! tokio-tungstenite implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use fusion_core::api::ApiClient;
use fusion_core::chat::{ChatClient, ChatOptions};
use fusion_core::persistence::PersisterHandle;
use fusion_core::state::ClientState;
use fusion_infra::config::{load_client_config, resolve_data_dir};
use fusion_infra::http::ReqwestTransport;
use fusion_infra::keychain::KeychainStorage;
use fusion_infra::payment::StripeProcessor;
use fusion_infra::socket::TungsteniteConnector;
use fusion_infra::storage::JsonFileStorage;
use fusion_types::auth::Identity;
use fusion_types::config::ClientConfig;
use fusion_types::error::PaymentError;

pub type Api = ApiClient<ReqwestTransport>;

pub struct AppState {
    pub data_dir: PathBuf,
    pub config: ClientConfig,
    pub client: ClientState,
    pub api: Api,
    persister: PersisterHandle,
}

impl AppState {
    /// Resolve the data directory, load config and restore persisted state.
    pub async fn init() -> Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = load_client_config(&data_dir).await;
        let (client, persister) = match KeychainStorage::new(JsonFileStorage::new(&data_dir)) {
            Ok(storage) => ClientState::restore(Arc::new(storage)).await,
            Err(e) => {
                tracing::warn!(error = %e, "OS keychain unavailable, tokens stay in the data directory");
                ClientState::restore(Arc::new(JsonFileStorage::new(&data_dir))).await
            }
        };

        let transport = ReqwestTransport::new(&config.api_base_url)?;
        let api = ApiClient::new(transport, Arc::clone(&client.session));

        tracing::debug!(
            data_dir = %data_dir.display(),
            api = %config.api_base_url,
            "client initialized"
        );

        Ok(Self {
            data_dir,
            config,
            client,
            api,
            persister,
        })
    }

    /// Identity of the logged-in user, or an error telling them to log in.
    pub fn require_login(&self) -> Result<Identity> {
        match self.client.session.identity() {
            Some(identity) if self.client.session.is_logged_in() => Ok(identity),
            _ => anyhow::bail!("You are not logged in. Run: fusion login"),
        }
    }

    /// Like [`require_login`](Self::require_login), additionally requiring a staff account.
    pub fn require_admin(&self) -> Result<Identity> {
        let identity = self.require_login()?;
        if !identity.is_privileged {
            anyhow::bail!("This command requires a staff account.");
        }
        Ok(identity)
    }

    pub fn chat_client(&self) -> ChatClient<TungsteniteConnector> {
        ChatClient::new(
            Arc::new(TungsteniteConnector::new()),
            Arc::clone(&self.client.session),
            Arc::clone(&self.client.conversations),
            Arc::new(self.client.clone()),
            ChatOptions::from_config(&self.config),
        )
    }

    pub fn payment_processor(&self) -> Result<StripeProcessor, PaymentError> {
        StripeProcessor::new(&self.config.payment)
    }

    /// Flush pending store changes to disk.
    pub async fn shutdown(self) {
        self.persister.shutdown().await;
    }
}
