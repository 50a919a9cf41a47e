/// Command-line front end
///
/// Parses input lines and talks to the user. The registry logic itself lives
/// in `core`.

pub mod parser;
pub mod prompt;

pub use parser::{CliCommand, CommandParser};
pub use prompt::Prompter;
