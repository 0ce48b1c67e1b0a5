mod entry;
mod settings;
mod timezone;

pub use entry::*;
pub use settings::*;
pub use timezone::*;
