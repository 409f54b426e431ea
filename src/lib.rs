// Host-side bridge for hoverboard motor boards running the FOC USART protocol

pub mod bridge;
pub mod config;
pub mod hoverboard;
pub mod messages;
pub mod motor;
pub mod runtime;
