//! 核心数据模型
//!
//! 定义文档、版本、规格与协作事件的数据结构，与前端 JSON 协议保持一致。

pub mod analysis;
pub mod collab;
pub mod section;
pub mod spec;
pub mod version;

pub use analysis::{AnalysisSummary, Repository, RepositoryAnalysis};
pub use collab::{CollabEvent, PresenceUser};
pub use section::{DocStatus, DocumentationSection, GeneratedDocumentation, SectionType};
pub use spec::{BusinessSpec, SpecChangeAnalysis, SpecPriority, SuggestedSpec};
pub use version::{DocumentationVersion, VersionAuthor};
