//! Statement separator for GoogleSQL scripts

mod scan;
pub mod sql;

pub use scan::{Pos, Scanner};
