pub mod config_service;
pub mod http;
pub mod http_persona_store;
pub mod link_resolver;
pub mod paths;
pub mod storage;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::config_service::ConfigService;
pub use crate::http::ReqwestTransport;
pub use crate::http_persona_store::HttpRemotePersonaStore;
pub use crate::link_resolver::{LinkResolver, ShareLink};
pub use crate::paths::AlexiPaths;
pub use crate::storage::{FileLocalCache, InMemoryLocalCache};
