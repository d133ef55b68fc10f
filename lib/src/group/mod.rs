//! Groupings over a whole collection: by category path and by event date.

mod category;
mod dates;

pub use category::*;
pub use dates::*;
