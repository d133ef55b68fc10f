mod node;
mod record;
mod images;
mod markup;

pub use node::*;
pub use record::*;
pub use images::*;
pub use markup::*;
