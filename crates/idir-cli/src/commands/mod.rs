mod members;
pub use members::Members;

mod payments;
pub use payments::Payments;

mod posts;
pub use posts::Posts;

mod forms;
pub use forms::Forms;

mod obituaries;
pub use obituaries::Obituaries;

mod board;
pub use board::Board;

mod admins;
pub use admins::Admins;

mod register;
pub use register::RegisterMember;
