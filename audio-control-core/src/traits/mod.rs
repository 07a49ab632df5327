pub mod log_sink;
pub mod provider;
