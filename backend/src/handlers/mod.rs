//! HTTP request handlers

pub mod chat;
pub mod crops;
pub mod form;
pub mod health;
pub mod history;
pub mod plant;
pub mod soil;
pub mod speech;
pub mod weather;

pub use chat::{chat, chat_history, clear_chat_history, save_chat_message};
pub use crops::{crop_recommendations, crop_timeline, list_crops};
pub use health::{health_check, root};
pub use history::{add_history, clear_history, delete_history_entry, history_stats, list_history};
pub use plant::{analyze_health, ar_scan, ar_scan_info};
pub use soil::analyze_soil;
pub use speech::{speak, transcribe};
pub use weather::{get_weather, soil_weather};
