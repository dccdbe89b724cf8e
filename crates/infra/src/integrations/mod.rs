//! Outbound messaging adapters

pub mod sms;
pub mod telegram;

pub use sms::{build_sms_gateway, EskizSmsClient, PlayMobileSmsClient};
pub use telegram::TelegramClient;
