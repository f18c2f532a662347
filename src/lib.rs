pub mod components;
pub mod config;
pub mod error;
pub mod utils;

#[cfg(feature = "web-interface")]
pub mod handlers;
#[cfg(feature = "web-interface")]
pub mod shutdown;
#[cfg(feature = "web-interface")]
pub mod startup;
