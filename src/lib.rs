pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use anyhow::Result;
use std::sync::Arc;

use crate::app::tokens::TokenCodec;
use crate::config::{AppConfig, StoreBackend};
use crate::infra::{db::Db, memory::MemoryStore, store::SharedStore};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub tokens: TokenCodec,
    pub body_limit_bytes: usize,
}

impl AppState {
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store: SharedStore = match config.store_backend {
            StoreBackend::Postgres => Arc::new(Db::connect(config).await?),
            StoreBackend::Memory => {
                tracing::warn!("using in-memory store, data is lost on shutdown");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self {
            store,
            tokens: TokenCodec::new(config.token_secret, config.token_ttl_minutes),
            body_limit_bytes: config.body_limit_bytes,
        })
    }
}
