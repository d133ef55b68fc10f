mod filter;
mod search;

pub use filter::*;
pub use search::*;
