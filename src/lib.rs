//! Nearby Aid: register people with support needs and find the emergency and
//! medical facilities around them.

pub mod config;
pub mod location;
pub mod registry;
pub mod server;
