pub mod config;
pub mod embed;
pub mod error;
pub mod hls;
pub mod http_retry;
pub mod metrics;
pub mod player;
pub mod server;
pub mod text_join;
