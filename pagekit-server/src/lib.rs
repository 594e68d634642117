//! Live-reloading development server.

pub mod browser;
pub mod client;
pub mod live;
pub mod message;
pub mod server;

pub use live::LiveServer;
pub use message::ReloadMessage;
pub use server::{create_router, AppState};
