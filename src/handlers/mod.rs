pub mod add;
pub mod fallback;
pub mod guess;

pub use add::add_handler;
pub use guess::guess_handler;
