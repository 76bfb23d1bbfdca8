pub mod chat;
pub mod health;

pub use chat::{chat, AppState};
pub use health::{health_check, HealthState};
