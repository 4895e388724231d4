//! 应用状态管理
//!
//! 定义在请求处理器之间共享的状态。

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::services::collaboration::CollaborationHub;
use crate::services::doc_generator::{DocGenService, GenerationProgress, LlmSectionGenerator};
use crate::services::search::SearchIndexer;
use crate::services::spec_analyzer::{ChangeSpecAnalyzer, LlmDiffAnalyzer};
use crate::services::version_store::VersionStore;
use crate::store::MemoryStore;

/// 单仓库进度通道容量
const PROGRESS_CHANNEL_CAPACITY: usize = 100;

/// 仓库 ID -> 生成进度广播通道
pub type ProgressRegistry = DashMap<String, broadcast::Sender<GenerationProgress>>;

/// 应用共享状态
///
/// 使用 Arc 包裹以便在多个处理器之间安全共享
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub doc_gen: Arc<DocGenService>,
    pub versions: Arc<VersionStore>,
    pub search: Arc<SearchIndexer>,
    pub spec_analyzer: Arc<ChangeSpecAnalyzer>,
    pub collab: Arc<CollaborationHub>,
    /// 生成进度注册表，WebSocket 订阅端按仓库接入
    pub progress: ProgressRegistry,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            doc_gen: Arc::new(DocGenService::new(
                Arc::new(LlmSectionGenerator),
                store.clone(),
            )),
            versions: Arc::new(VersionStore::new(store.clone())),
            search: Arc::new(SearchIndexer::new(store.clone())),
            spec_analyzer: Arc::new(ChangeSpecAnalyzer::new(
                Arc::new(LlmDiffAnalyzer),
                store.clone(),
            )),
            collab: Arc::new(CollaborationHub::new()),
            progress: DashMap::new(),
            store,
        }
    }

    /// 取或建仓库的进度广播通道
    pub fn progress_channel(&self, repository_id: &str) -> broadcast::Sender<GenerationProgress> {
        self.progress
            .entry(repository_id.to_string())
            .or_insert_with(|| broadcast::channel(PROGRESS_CHANNEL_CAPACITY).0)
            .clone()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// 创建可共享的应用状态
pub fn create_shared_state() -> Arc<AppState> {
    Arc::new(AppState::new())
}
