mod value;
mod source;
mod format;

pub use value::*;
pub use source::*;
pub use format::*;
