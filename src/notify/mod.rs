//! Notification fan-out: channel contract, concrete transports, dispatcher.

pub mod channel;
pub mod dispatch;
pub mod providers;
