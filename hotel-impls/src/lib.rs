mod mapper;
mod pg;

pub use pg::*;
