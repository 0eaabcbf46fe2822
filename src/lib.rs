pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod session;

pub use config::Config;
pub use error::LvrError;
