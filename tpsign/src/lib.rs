pub mod config;
pub mod raycast;
pub mod server;
pub mod sign;
pub mod snbt;
pub mod tp_sign;
pub mod watch;
