// Service shell around genome-core: configuration files, the athlete pool,
// the JSON protocol and the WebSocket server.

pub mod config;
pub mod pool;
pub mod protocol;
pub mod service;
pub mod ws_server;
