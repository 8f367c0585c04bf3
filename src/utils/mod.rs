pub mod constants;
pub mod logging;
