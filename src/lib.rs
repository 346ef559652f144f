// Netcache library
// Cache identity and record model for a network-serving process

pub mod cache;
pub mod logging;
