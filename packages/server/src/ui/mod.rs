//! UI 層
//!
//! axum のルーティング、WebSocket / HTTP ハンドラ、共有状態、シャットダウン処理。

pub mod config;
pub mod handler;
pub mod heartbeat;
pub mod server;
pub mod signal;
pub mod state;

pub use config::HubConfig;
pub use server::{Server, ServerError};
pub use state::AppState;
