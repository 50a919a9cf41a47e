/// Interactive prompts
///
/// One line editor serves the command prompt, yes/no confirmations and the
/// path picker. Filenames tab-complete everywhere.

use crate::cli::parser::strip_quotes;
use crate::store::EntryKind;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::path::PathBuf;

pub const PROMPT: &str = "Urun> ";

/// Line-editor helper that only does filename completion
pub struct PathHelper {
    files: FilenameCompleter,
}

impl PathHelper {
    pub fn new() -> Self {
        Self {
            files: FilenameCompleter::new(),
        }
    }
}

impl Default for PathHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for PathHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.files.complete(line, pos, ctx)
    }
}

impl Hinter for PathHelper {
    type Hint = String;
}

impl Highlighter for PathHelper {}

impl Validator for PathHelper {}

impl Helper for PathHelper {}

/// Terminal front end for reading commands and answers
pub struct Prompter {
    editor: Editor<PathHelper, DefaultHistory>,
}

impl Prompter {
    pub fn new() -> rustyline::Result<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(PathHelper::new()));
        Ok(Self { editor })
    }

    /// Read one command line; errors carry Ctrl-C / Ctrl-D
    pub fn read_command(&mut self) -> Result<String, ReadlineError> {
        let line = self.editor.readline(PROMPT)?;
        if !line.trim().is_empty() {
            self.editor.add_history_entry(line.as_str())?;
        }
        Ok(line)
    }

    /// Ask a y/n question; anything but "y" (or a read failure) is a no
    pub fn confirm(&mut self, question: &str) -> bool {
        self.editor
            .readline(&format!("{} (y/n): ", question))
            .map(|answer| is_yes(&answer))
            .unwrap_or(false)
    }

    /// Terminal path picker; `None` means the user cancelled
    pub fn pick_path(&mut self, alias: &str, kind: EntryKind) -> Option<PathBuf> {
        let prompt = format!(
            "Enter the {} for alias '{}' (Tab completes, blank cancels): ",
            kind, alias
        );
        self.editor
            .readline(&prompt)
            .ok()
            .and_then(|answer| picked_path(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

fn picked_path(answer: &str) -> Option<PathBuf> {
    let cleaned = strip_quotes(answer.trim());
    if cleaned.is_empty() {
        None
    } else {
        Some(PathBuf::from(cleaned))
    }
}
