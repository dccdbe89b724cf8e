//! Lead to call-log correlation by phone tails

pub mod ports;
pub mod service;

pub use service::CallService;
