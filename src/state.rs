//! Application state: the catalog, live preview and test sessions, the notification sink.
//!
//! This module owns:
//!   - the content catalog (buildings → passages → nodes → questions)
//!   - preview instances keyed by uuid
//!   - test runs keyed by uuid
//!   - the injected notification sink and the loaded configuration

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::{load_from_env, AppConfig};
use crate::error::ApiError;
use crate::notify::{self, NotificationSink};
use crate::question::preview::Preview;
use crate::runner::TestRun;
use crate::seeds::seed_demo;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<Catalog>>,
    pub previews: Arc<RwLock<HashMap<Uuid, Preview>>>,
    pub tests: Arc<RwLock<HashMap<Uuid, TestRun>>>,
    pub notifier: Arc<dyn NotificationSink>,
    pub config: AppConfig,
}

impl AppState {
    /// Build state from env: load config, wire notifications, optionally seed demo content.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_from_env().unwrap_or_default();
        let notifier = notify::from_config(&config.notifications);
        Self::with(config, notifier)
    }

    pub fn with(config: AppConfig, notifier: Arc<dyn NotificationSink>) -> Self {
        let mut catalog = Catalog::new(config.defaults.clone());
        if config.seed_demo {
            seed_demo(&mut catalog);
        }
        info!(
            target: "quest_admin",
            buildings = catalog.buildings(None).len(),
            seed_demo = config.seed_demo,
            pass_score = config.defaults.pass_score,
            "Startup catalog inventory"
        );

        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            previews: Arc::new(RwLock::new(HashMap::new())),
            tests: Arc::new(RwLock::new(HashMap::new())),
            notifier,
            config,
        }
    }

    /// Run `f` against a live preview instance.
    #[instrument(level = "debug", skip(self, f), fields(%id))]
    pub async fn with_preview<T>(&self, id: Uuid, f: impl FnOnce(&mut Preview) -> T) -> Result<T, ApiError> {
        let mut previews = self.previews.write().await;
        let p = previews.get_mut(&id).ok_or_else(|| ApiError::SessionNotFound { kind: "preview", id: id.to_string() })?;
        Ok(f(p))
    }

    /// Run `f` against a live test run.
    #[instrument(level = "debug", skip(self, f), fields(%id))]
    pub async fn with_test<T>(&self, id: Uuid, f: impl FnOnce(&mut TestRun) -> T) -> Result<T, ApiError> {
        let mut tests = self.tests.write().await;
        let t = tests.get_mut(&id).ok_or_else(|| ApiError::SessionNotFound { kind: "test", id: id.to_string() })?;
        Ok(f(t))
    }
}
