//! Application bootstrap shared by the `libris-app` binary and the CLI.

use anyhow::Context;
use axum::Router;
use libris_db::Db;
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// A fully wired application: settings, database handle and registered modules.
pub struct App {
    settings: Settings,
    db: Db,
    registry: ModuleRegistry,
}

impl App {
    /// Connect to the configured database and register every module
    pub async fn connect(settings: Settings) -> anyhow::Result<Self> {
        let db = Db::connect(&settings.database)
            .await
            .context("failed to open database")?;
        Self::with_db(settings, db)
    }

    /// Register every module against an existing database handle
    pub fn with_db(settings: Settings, db: Db) -> anyhow::Result<Self> {
        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db, &settings)
            .context("failed to register modules")?;

        Ok(Self {
            settings,
            db,
            registry,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Apply pending migrations from every module
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let applied = self
            .db
            .migrate(&self.registry.collect_migrations())
            .await
            .context("failed to apply migrations")?;
        tracing::info!(applied, "migrations complete");
        Ok(applied)
    }

    /// HTTP router with every module mounted
    pub fn router(&self) -> Router {
        libris_http::build_router(&self.registry, &self.settings)
    }

    /// Check the database, migrate, run module lifecycle hooks and serve until shutdown
    pub async fn run(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };

        self.db.ping().await?;
        self.registry.init_modules(&ctx).await?;
        self.migrate().await?;
        self.registry.start_modules(&ctx).await?;

        let served = libris_http::start_server(&self.registry, &self.settings).await;

        self.registry.stop_modules().await?;
        self.db.pool().close().await;
        served
    }
}
