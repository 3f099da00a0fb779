// Storage operations
mod operations;
pub use operations::*;

// Models
mod members;
pub use members::*;

mod payments;
pub use payments::*;

mod posts;
pub use posts::*;

mod forms;
pub use forms::*;

mod obituaries;
pub use obituaries::*;

mod board;
pub use board::*;

mod admins;
pub use admins::*;

pub mod password;
