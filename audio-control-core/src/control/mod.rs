pub(crate) mod boundary;
pub mod endpoint;
pub mod naming;
pub mod session;
pub mod system;
