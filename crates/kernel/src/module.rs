use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// Context handed to modules while the application boots
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// A single schema change contributed by a module.
///
/// `id` must be unique within the owning module; the runner records
/// `{module}:{id}` once applied and never runs it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A resource module mounted by the HTTP layer.
///
/// Modules own their storage handle; the registry only drives lifecycle and
/// collects routes, OpenAPI fragments and migrations.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name, also used as the mount point `/api/{name}`
    fn name(&self) -> &'static str;

    /// Called once at startup, before migrations are applied
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Axum router for this module; state must already be attached
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` and `components.schemas`) merged into the global document
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Schema migrations, applied in the order returned
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Called after migrations, right before the server starts accepting requests
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called after the server has shut down
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
