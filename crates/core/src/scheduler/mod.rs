mod config;
mod worker;

pub use config::*;
pub use worker::*;
