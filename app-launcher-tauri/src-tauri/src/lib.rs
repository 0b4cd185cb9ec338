pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod settings;
pub mod shell;
pub mod store;
pub mod system;
pub mod tile;

#[cfg(feature = "desktop")]
mod commands;

#[cfg(test)]
mod testing;

#[cfg(feature = "desktop")]
pub use commands::run;
