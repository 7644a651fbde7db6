//! Console rendering of command reports

pub mod human;
pub mod paths;

pub use human::{HumanFormatter, Message, Tone};
pub use paths::tildify;
