mod request_moderation;
mod session;

pub use request_moderation::*;
pub use session::*;
