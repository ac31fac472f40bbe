pub mod access;
pub mod dsl;
pub mod error;
pub mod model;
pub mod paths;
pub mod prompt;
pub mod registry;
pub mod session;
pub mod settings;
pub mod stage;
pub mod supervisor;

#[cfg(test)]
mod testing;

pub use access::AccessLevel;
pub use error::ScriptError;
pub use session::{Locale, Session};
pub use settings::ScriptSettings;
