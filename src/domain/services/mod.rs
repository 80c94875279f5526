mod interpreter;

pub use interpreter::*;
