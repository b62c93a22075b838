mod manager;
mod style;

pub use manager::ProgressManager;
pub use style::{colors, prefixes, templates};
