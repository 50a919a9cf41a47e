// urun - type a short alias, launch the file or folder behind it
//
// Entry point. With arguments it runs one command and exits; without, it
// starts the interactive prompt.

use rustyline::error::ReadlineError;
use std::env;
use std::path::Path;
use tracing::{debug, error, info};
use urun::{
    cli::{parser::help_text, CliCommand, CommandParser, Prompter},
    config::Config,
    core::{AddOutcome, Launcher, Registry, Resolution, Resolver},
    logging,
    shell::path_setup::{self, PathSetup, PathTarget, StartupAction},
    store::EntryKind,
    JsonFileStore, Result,
};

/// Whether the prompt should keep going after a command
enum Flow {
    Continue,
    Exit,
}

/// Everything one launcher session works with
struct Session {
    registry: Registry<JsonFileStore>,
    resolver: Resolver,
    launcher: Launcher,
    parser: CommandParser,
    prompter: Prompter,
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    config.ensure_dirs()?;
    logging::init(&config.log_file)?;

    let mut session = Session::open(&config)?;

    // Grab whatever the user typed
    let args: Vec<String> = env::args().skip(1).collect();
    if !args.is_empty() {
        if let Err(e) = session.dispatch(&args.join(" ")) {
            report_unexpected(&e);
        }
        return Ok(());
    }

    info!("Welcome to Urun - Your Custom Launcher!");
    session.startup_path_check();
    print_usage();
    session.run_loop();

    Ok(())
}

impl Session {
    fn open(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            registry: Registry::open(JsonFileStore::new(&config.registry_file)),
            resolver: Resolver::new(),
            launcher: Launcher::default(),
            parser: CommandParser::new()?,
            prompter: Prompter::new()?,
        })
    }

    fn run_loop(&mut self) {
        loop {
            let line = match self.prompter.read_command() {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    info!("\nExiting Urun. Goodbye!");
                    break;
                }
                Err(e) => {
                    error!("Could not read input: {}", e);
                    break;
                }
            };

            match self.dispatch(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                // Keep the session alive no matter what went wrong
                Err(e) => report_unexpected(&e),
            }
        }
    }

    fn dispatch(&mut self, line: &str) -> anyhow::Result<Flow> {
        match self.parser.parse(line) {
            CliCommand::Empty => {}
            CliCommand::Exit => {
                info!("Exiting Urun. Goodbye!");
                return Ok(Flow::Exit);
            }
            CliCommand::Add { alias, path, kind } => self.handle_add(&alias, Path::new(&path), kind),
            CliCommand::Browse { alias, kind } => self.handle_browse(&alias, kind),
            CliCommand::Update { alias, path } => {
                if let Some(report) = report(self.registry.update(&alias, Path::new(&path))) {
                    debug!("Previous path for '{}': {}", alias, report.value.display());
                }
            }
            CliCommand::Delete { alias } => self.handle_delete(&alias),
            CliCommand::Rename { old, new } => {
                report(self.registry.rename(&old, &new));
            }
            CliCommand::List => self.handle_list(),
            CliCommand::SetPath => self.handle_setpath()?,
            CliCommand::UnsetPath => self.handle_unsetpath()?,
            CliCommand::Clear => {
                print!("\x1B[2J\x1B[1;1H");
                debug!("Screen cleared.");
            }
            CliCommand::Help => print_usage(),
            CliCommand::Version => info!("urun v{}", env!("CARGO_PKG_VERSION")),
            CliCommand::Usage(usage) => {
                for usage_line in usage.lines() {
                    info!("{}", usage_line);
                }
            }
            CliCommand::Launch(query) => self.handle_launch(&query),
        }

        Ok(Flow::Continue)
    }

    fn handle_add(&mut self, alias: &str, path: &Path, kind: EntryKind) {
        if let Some(report) = report(self.registry.add(alias, path, kind)) {
            if let AddOutcome::Replaced { previous } = report.value {
                debug!("'{}' previously pointed at '{}'", alias, previous.display());
            }
        }
    }

    fn handle_browse(&mut self, alias: &str, kind: EntryKind) {
        info!("Please select the {} for alias '{}'...", kind, alias);
        match self.prompter.pick_path(alias, kind) {
            Some(path) => self.handle_add(alias, &path, kind),
            None => match kind {
                EntryKind::File => info!("File selection cancelled."),
                EntryKind::Folder => info!("Folder selection cancelled."),
            },
        }
    }

    fn handle_delete(&mut self, alias: &str) {
        let target = match self.registry.lookup(alias) {
            Ok(entry) => entry.target.clone(),
            Err(e) => {
                error!("{}", e.user_message());
                return;
            }
        };

        let question = format!(
            "Are you sure you want to delete '{}' (path: {})?",
            alias,
            target.display()
        );
        if self.prompter.confirm(&question) {
            report(self.registry.delete(alias));
        } else {
            info!("Deletion of '{}' cancelled.", alias);
        }
    }

    fn handle_list(&self) {
        if self.registry.is_empty() {
            info!("No entries registered yet. Use 'add <alias> <path>' or 'add_folder <alias> <path>' to add one.");
            return;
        }

        info!("\n--- Registered Entries ---");
        for listing in self.registry.list() {
            info!(
                "  {:<15} -> {} ({})",
                listing.alias.as_str(),
                listing.target.display(),
                listing.status
            );
        }
        info!("----------------------------\n");
        debug!("Listed all entries.");
    }

    fn handle_launch(&self, query: &str) {
        match self.resolver.resolve(&self.registry, query) {
            Resolution::Unique(entry) => {
                report(self.launcher.launch(&entry));
            }
            Resolution::Ambiguous(listing) => {
                info!("Multiple entries found matching '{}':", query);
                for item in &listing {
                    info!("  - {} ({}) ({})", item.alias, item.target.display(), item.status);
                }
                if let Some(first) = listing.first() {
                    info!(
                        "Please be more specific, or type the full alias to launch (e.g., '{}').",
                        first.alias
                    );
                }
            }
            Resolution::NotFound { suggestions } => {
                info!("No entries found matching '{}'.", query);
                if !suggestions.is_empty() {
                    let names: Vec<&str> = suggestions.iter().map(|a| a.as_str()).collect();
                    info!("Did you mean: {}?", names.join(", "));
                }
            }
        }
    }

    fn handle_setpath(&mut self) -> anyhow::Result<()> {
        let exe_dir = path_setup::current_exe_dir()?;
        let path_var = env::var_os("PATH");
        let setup = PathSetup::new()?;

        let prompter = &mut self.prompter;
        let result = setup.run(&mut self.registry, &exe_dir, path_var.as_deref(), |dir| {
            prompter.confirm(&format!(
                "Urun can be launched easily from anywhere by adding '{}' to your PATH. Do you want to do this now?",
                dir.display()
            ))
        });

        if let Err(e) = result {
            error!("{}", e.user_message());
            for guide_line in path_setup::troubleshooting_guide(&exe_dir, setup.target()).lines() {
                info!("{}", guide_line);
            }
        }
        Ok(())
    }

    fn handle_unsetpath(&mut self) -> anyhow::Result<()> {
        let exe_dir = path_setup::current_exe_dir()?;
        report(PathSetup::new()?.remove(&exe_dir));
        Ok(())
    }

    fn startup_path_check(&mut self) {
        let exe_dir = match path_setup::current_exe_dir() {
            Ok(dir) => dir,
            Err(e) => {
                debug!("Skipping PATH check: {}", e);
                return;
            }
        };
        let on_path = path_setup::dir_on_path(&exe_dir, env::var_os("PATH").as_deref());
        let attempted = self.registry.path_setup_attempted();

        match path_setup::startup_action(on_path, attempted) {
            StartupAction::Nothing => {
                if !attempted {
                    self.registry.mark_path_setup_attempted();
                }
                info!("Urun's directory '{}' is already in your PATH.", exe_dir.display());
            }
            StartupAction::Offer => {
                info!("\nUrun's directory is not currently in your PATH.");
                if let Err(e) = self.handle_setpath() {
                    report_unexpected(&e);
                }
            }
            StartupAction::ShowGuide => {
                let target = PathTarget::detect();
                for guide_line in path_setup::troubleshooting_guide(&exe_dir, target).lines() {
                    info!("{}", guide_line);
                }
            }
        }
    }
}

/// Log an expected failure the way the user should see it
fn report<T>(result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!("{}", e.user_message());
            debug!("{:?}", e);
            None
        }
    }
}

fn report_unexpected(e: &anyhow::Error) {
    error!("An unexpected error occurred: {}", e);
    info!("Please try again or restart Urun.");
    debug!("Unhandled error in command loop: {:?}", e);
}

fn print_usage() {
    for usage_line in help_text().lines() {
        info!("{}", usage_line);
    }
}
