pub mod backup;
pub mod chat;
pub mod config;
pub mod credentials;
pub mod defaults;
pub mod domain;
pub mod http;
pub mod id;
pub mod merge;
pub mod notify;
pub mod storage;
pub mod store;
pub mod version;
