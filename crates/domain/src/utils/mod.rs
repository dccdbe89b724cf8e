//! Pure helpers shared by services and adapters

pub mod duration;
pub mod geo;
pub mod phone;
pub mod timeline;
