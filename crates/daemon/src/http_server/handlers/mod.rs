mod not_found;

pub use not_found::{not_found_handler, not_found_page};
