//! Business logic services for CropMagix

pub mod chat;
pub mod chat_history;
pub mod farming;
pub mod history;
pub mod json_file;
pub mod plant;

pub use chat_history::ChatHistoryStore;
pub use history::{LocalHistory, RemoteHistory, RestHistory, ScanHistoryStore};
pub use plant::PlantService;
