//! API 路由模块

mod collab;
mod config;
mod docs;
mod health;
mod search;
mod specs;
mod versions;

pub use collab::collab_routes;
pub use config::config_routes;
pub use docs::docs_routes;
pub use health::health_routes;
pub use search::search_routes;
pub use specs::specs_routes;
pub use versions::versions_routes;

use axum::Router;

use crate::state::AppState;
use std::sync::Arc;

/// 创建所有 API 路由
pub fn create_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(config_routes())
        .merge(docs_routes())
        .merge(versions_routes())
        .merge(search_routes())
        .merge(specs_routes())
        .merge(collab_routes())
        .with_state(state)
}
