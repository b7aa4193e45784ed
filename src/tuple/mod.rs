pub use set::Set;
pub use tuple::{Tuple, EMPTY_IP, UNSET};

mod set;
mod tuple;
