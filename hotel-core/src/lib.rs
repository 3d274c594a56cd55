mod config;
mod console;
mod executor;
mod query;
mod records;

pub use config::*;
pub use console::*;
pub use executor::*;
pub use query::*;
pub use records::*;
