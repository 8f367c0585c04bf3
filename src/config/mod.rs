pub mod environment;
pub mod loader;
pub mod resolver;
pub mod types;
