pub mod todo;

pub use todo::{Completion, Revision, Todo, parse_timestamp};
