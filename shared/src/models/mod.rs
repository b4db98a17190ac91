//! Domain models for CropMagix

mod advice;
mod chat;
mod climate;
mod crop_calendar;
mod history;
mod soil;
mod weather;

pub use advice::*;
pub use chat::*;
pub use climate::*;
pub use crop_calendar::*;
pub use history::*;
pub use soil::*;
pub use weather::*;
