// Turns one input line into a launcher command
//
// At most three parts: action, first argument, then the rest of the line
// verbatim so paths may contain spaces.

use crate::error::{Result, UrunError};
use crate::store::EntryKind;
use regex::Regex;

const LINE_PATTERN: &str = r"^(\S+)(?:\s+(\S+))?(?:\s+(.*\S))?\s*$";

pub const ADD_USAGE: &str = "Usage: add <alias> <path_to_file>\nExample: add mygame C:\\Games\\MyGame.exe";
pub const ADD_FOLDER_USAGE: &str =
    "Usage: add_folder <alias> <path_to_folder>\nExample: add_folder mydocs C:\\Users\\Me\\Documents";
pub const BROWSIFY_USAGE: &str = "Usage: browsify <alias>\nExample: browsify myimage";
pub const BROWSEFOLDER_USAGE: &str = "Usage: browsefolder <alias>\nExample: browsefolder myphotos";
pub const UPDATE_USAGE: &str = "Usage: update <alias> <new_path>\nExample: update mygame D:\\NewGames\\MyGame.exe";
pub const DELETE_USAGE: &str = "Usage: delete <alias>\nExample: delete mygame";
pub const RENAME_USAGE: &str = "Usage: rename <old_alias> <new_alias>\nExample: rename nfs nfs_shift";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Add { alias: String, path: String, kind: EntryKind },
    Browse { alias: String, kind: EntryKind },
    Update { alias: String, path: String },
    Delete { alias: String },
    Rename { old: String, new: String },
    List,
    SetPath,
    UnsetPath,
    Clear,
    Help,
    Version,
    Exit,
    /// Anything else is an alias or a search query
    Launch(String),
    /// Known action with the wrong arguments
    Usage(&'static str),
    Empty,
}

/// Line parser; compile once and reuse
pub struct CommandParser {
    line: Regex,
}

impl CommandParser {
    pub fn new() -> Result<Self> {
        let line = Regex::new(LINE_PATTERN)
            .map_err(|e| UrunError::Config(format!("Bad command pattern: {}", e)))?;
        Ok(Self { line })
    }

    pub fn parse(&self, input: &str) -> CliCommand {
        let trimmed = input.trim();
        let Some(caps) = self.line.captures(trimmed) else {
            return CliCommand::Empty;
        };

        let action = caps[1].to_lowercase();
        let first = caps.get(2).map(|m| m.as_str().to_string());
        let rest = caps.get(3).map(|m| m.as_str().to_string());

        match (action.as_str(), first, rest) {
            ("exit" | "quit", _, _) => CliCommand::Exit,
            ("add", Some(alias), Some(path)) => CliCommand::Add {
                alias,
                path: strip_quotes(&path),
                kind: EntryKind::File,
            },
            ("add", _, _) => CliCommand::Usage(ADD_USAGE),
            ("add_folder", Some(alias), Some(path)) => CliCommand::Add {
                alias,
                path: strip_quotes(&path),
                kind: EntryKind::Folder,
            },
            ("add_folder", _, _) => CliCommand::Usage(ADD_FOLDER_USAGE),
            ("browsify", Some(alias), None) => CliCommand::Browse {
                alias,
                kind: EntryKind::File,
            },
            ("browsify", _, _) => CliCommand::Usage(BROWSIFY_USAGE),
            ("browsefolder", Some(alias), None) => CliCommand::Browse {
                alias,
                kind: EntryKind::Folder,
            },
            ("browsefolder", _, _) => CliCommand::Usage(BROWSEFOLDER_USAGE),
            ("update", Some(alias), Some(path)) => CliCommand::Update {
                alias,
                path: strip_quotes(&path),
            },
            ("update", _, _) => CliCommand::Usage(UPDATE_USAGE),
            ("delete", Some(alias), None) => CliCommand::Delete { alias },
            ("delete", _, _) => CliCommand::Usage(DELETE_USAGE),
            ("rename", Some(old), Some(new)) => CliCommand::Rename { old, new },
            ("rename", _, _) => CliCommand::Usage(RENAME_USAGE),
            ("list", _, _) => CliCommand::List,
            ("setpath", _, _) => CliCommand::SetPath,
            ("unsetpath", _, _) => CliCommand::UnsetPath,
            ("clear", _, _) => CliCommand::Clear,
            ("help" | "-h" | "--help", _, _) => CliCommand::Help,
            ("version" | "-v" | "--version", _, _) => CliCommand::Version,
            _ => CliCommand::Launch(trimmed.to_string()),
        }
    }
}

/// Drop surrounding double quotes, then single quotes
pub fn strip_quotes(raw: &str) -> String {
    raw.trim_matches('"').trim_matches('\'').to_string()
}

/// Full help screen for `help` and the interactive banner
pub fn help_text() -> String {
    format!(
        r#"urun v{} - Your Custom Launcher

USAGE:
    urun                     Start the interactive prompt
    urun <COMMAND>           Run a single command and exit

COMMANDS:
    add <alias> <path>         Add a file entry (e.g. .exe, .mp4, .pdf)
    add_folder <alias> <path>  Add a folder entry
    browsify <alias>           Add a file entry, entering the path with Tab completion
    browsefolder <alias>       Add a folder entry, entering the path with Tab completion
    update <alias> <new_path>  Change the path of an existing entry
    delete <alias>             Remove an entry (asks for confirmation)
    rename <old> <new>         Rename an alias
    list                       List all entries
    setpath                    Add Urun to your PATH
    unsetpath                  Remove Urun from your PATH
    <alias>                    Launch an entry
    <partial_alias>            Search for entries matching the partial alias
    clear                      Clear the screen
    help                       Show this help
    exit / quit                Leave the launcher

EXAMPLES:
    add mygame C:\Games\MyGame.exe
    add_folder mydocs "C:\Users\Me\My Documents"
    rename mygame myfavoritegame
    mygame
"#,
        env!("CARGO_PKG_VERSION")
    )
}
