//! 业务服务层

pub mod collaboration;
pub mod doc_generator;
pub mod search;
pub mod spec_analyzer;
pub mod version_store;
