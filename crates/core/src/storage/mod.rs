pub mod encryption;
pub mod format;
pub mod session_store;
