mod config;
mod decision;
mod message;

pub use config::*;
pub use decision::*;
pub use message::*;
