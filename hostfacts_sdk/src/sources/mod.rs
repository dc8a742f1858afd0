//! Leaf components that read raw host content

pub mod command;
pub mod file;

pub use command::CommandOutputSource;
pub use file::{FileContentSource, MAX_FILE_SIZE};

use hostfacts_core::component::{ComponentError, Fact};

/// Raw text carried by a source fact (`content` for files, `stdout` for commands)
pub fn raw_text(fact: &Fact) -> Result<&str, ComponentError> {
    fact.get("content")
        .or_else(|| fact.get("stdout"))
        .and_then(Fact::as_str)
        .ok_or_else(|| ComponentError::invalid_input("source fact carries no text"))
}
