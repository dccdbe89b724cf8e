//! Lead product lines and take/return tracking

pub mod ports;
pub mod service;

pub use service::ProductService;
