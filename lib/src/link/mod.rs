mod encode;
mod locator;
mod identity;

pub use encode::*;
pub use locator::*;
pub use identity::*;
