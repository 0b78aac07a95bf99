//! Session 模块
//!
//! 保存与恢复“对话 + UI”快照：
//! - `GenerationStore` trait: 可插拔的存储抽象
//! - `AuthProvider` trait: 当前用户
//! - `InMemoryStore` / `FileStore`: 参考实现
//! - `SessionService`: 按用户隔离的访问入口

pub mod file;
pub mod memory;
pub mod service;
pub mod snapshot;
pub mod store;

pub use file::FileStore;
pub use memory::InMemoryStore;
pub use service::{SessionError, SessionService};
pub use snapshot::{ChatMessage, Role, SessionSnapshot};
pub use store::{AuthProvider, GenerationStore, SnapshotFilter, StaticAuth};
