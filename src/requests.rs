mod arguments;
mod parameter;
mod path;

pub use arguments::*;
pub use parameter::*;
pub use path::*;
