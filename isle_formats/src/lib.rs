pub mod state_file;

pub use state_file::{FileMode, FormatError, StateFile};
