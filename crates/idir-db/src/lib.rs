pub mod connection;
pub use connection::Connection;

pub mod results;
pub mod schema;

pub mod members;
pub mod payments;
pub mod posts;
pub mod forms;
pub mod obituaries;
pub mod board;
pub mod admins;
