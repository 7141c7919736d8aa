pub mod enums;
pub mod message_template;

pub use message_template::*;
