mod auth;
mod data;
mod errors;
mod handlers;
mod menu;
pub mod workflows;

#[cfg(test)]
mod testing;

pub use auth::*;
pub use data::*;
pub use errors::*;
pub use menu::*;
