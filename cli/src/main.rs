mod config;
mod persist;
mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use ctl::BlockStore;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "ctledit", version, about = "Block editor for NONMEM control files")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (defaults to ./ctledit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the blocks of a control file
    Blocks(FileArgs),

    /// Print the full text of one block
    Show(ShowArgs),

    /// Parse a control file and report ignored text
    Check(FileArgs),

    /// Replace blocks with the contents of files and save the result
    Edit(EditArgs),

    /// Replay a saved change log onto a control file
    Replay(ReplayArgs),

    /// Run .test.ctl test files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct FileArgs {
    /// Control file
    file: String,
}

#[derive(clap::Args)]
struct ShowArgs {
    /// Control file
    file: String,

    /// Block name, marker included (e.g. '$PK')
    block: String,
}

#[derive(clap::Args)]
struct EditArgs {
    /// Control file to edit
    file: String,

    /// Replace a block: NAME=PATH, where PATH holds the new block text. Repeatable.
    #[arg(short, long = "set", value_name = "NAME=PATH", required = true)]
    set: Vec<String>,

    /// Name of the saved model (defaults to the input file stem; never overwrites the input)
    #[arg(short, long)]
    name: Option<String>,
}

#[derive(clap::Args)]
struct ReplayArgs {
    /// Control file to replay onto
    file: String,

    /// Change log (JSON) to replay
    log: String,

    /// Save the result as NAME.ctl and NAME_log.json instead of printing it
    #[arg(short, long)]
    name: Option<String>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.ctl file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

/// Source files loaded for diagnostics, plus how to print them.
struct Reporter {
    files: SimpleFiles<String, String>,
    color_choice: ColorChoice,
}

impl Reporter {
    fn new(no_color: bool) -> Self {
        Reporter {
            files: SimpleFiles::new(),
            color_choice: if no_color {
                ColorChoice::Never
            } else {
                ColorChoice::Auto
            },
        }
    }

    /// Read a file and register it for diagnostics. Exits on failure.
    fn load(&mut self, path: &str) -> (usize, String) {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => fail(&format!("cannot read '{}': {}", path, e)),
        };
        let file_id = self.files.add(path.to_string(), source.clone());
        (file_id, source)
    }

    fn emit(&self, diagnostic: &Diagnostic<usize>) {
        let writer = StandardStream::stderr(self.color_choice);
        let config = term::Config::default();
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, &self.files, diagnostic);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    match cli.command {
        Command::Blocks(args) => do_blocks(args, &config, cli.no_color),
        Command::Show(args) => do_show(args, &config, cli.no_color),
        Command::Check(args) => do_check(args, &config, cli.no_color),
        Command::Edit(args) => do_edit(args, &config, cli.no_color),
        Command::Replay(args) => do_replay(args, &config, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code =
                test_runner::run_tests(path, cli.no_color, &test_args.category, config.marker);
            process::exit(exit_code);
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn fail(message: &str) -> ! {
    eprintln!("error: {}", message);
    process::exit(1);
}

fn load_blocks(reporter: &mut Reporter, path: &str, config: &Config) -> BlockStore {
    let (file_id, source) = reporter.load(path);
    let (store, warnings) = ctl::parser::Parser::new(source, file_id)
        .with_marker(config.marker)
        .parse_with_diagnostics();
    for warning in &warnings {
        reporter.emit(&warning.to_diagnostic());
    }
    store
}

fn do_blocks(args: FileArgs, config: &Config, no_color: bool) {
    let mut reporter = Reporter::new(no_color);
    let store = load_blocks(&mut reporter, &args.file, config);
    for block in store.iter() {
        let lines: usize = block.occurrences.iter().map(Vec::len).sum();
        match block.occurrence_count() {
            1 => println!("{} ({} lines)", block.name, lines),
            n => println!("{} ({} occurrences, {} lines)", block.name, n, lines),
        }
    }
}

fn do_show(args: ShowArgs, config: &Config, no_color: bool) {
    let mut reporter = Reporter::new(no_color);
    let store = load_blocks(&mut reporter, &args.file, config);
    match store.get(&args.block) {
        Some(block) => print!("{}", block.text()),
        None => fail(&ctl::StoreError::BlockNotFound(args.block).to_string()),
    }
}

fn do_check(args: FileArgs, config: &Config, no_color: bool) {
    let mut reporter = Reporter::new(no_color);
    let (file_id, source) = reporter.load(&args.file);
    let (store, warnings) = ctl::parser::Parser::new(source.clone(), file_id)
        .with_marker(config.marker)
        .parse_with_diagnostics();
    for warning in &warnings {
        reporter.emit(&warning.to_diagnostic());
    }

    if store.is_empty() {
        fail(&format!("{}: no blocks found", args.file));
    }
    if store.render() != source.trim() {
        eprintln!(
            "note: rendering {} does not reproduce the file byte for byte",
            args.file
        );
    }
    eprintln!("ok: {} parsed into {} block(s)", args.file, store.len());
}

fn do_edit(args: EditArgs, config: &Config, no_color: bool) {
    let mut reporter = Reporter::new(no_color);
    let store = load_blocks(&mut reporter, &args.file, config);

    let mut edits: Vec<(String, String)> = Vec::with_capacity(args.set.len());
    for assignment in &args.set {
        let Some((name, path)) = assignment.split_once('=') else {
            fail(&format!("invalid --set '{}': expected NAME=PATH", assignment));
        };
        match std::fs::read_to_string(path) {
            Ok(text) => edits.push((name.to_string(), text)),
            Err(e) => fail(&format!("cannot read '{}': {}", path, e)),
        }
    }

    let edited = ctl::edit::edit_blocks(
        &store,
        edits.iter().map(|(name, text)| (name.as_str(), text.as_str())),
    )
    .unwrap_or_else(|e| fail(&e.to_string()));

    let name = args.name.unwrap_or_else(|| file_stem(&args.file));
    if let Err(e) = persist::check_not_input(Path::new(&args.file), &config.output_dir, &name) {
        fail(&e.to_string());
    }
    match persist::save(&edited, &name, &config.output_dir, config.log_indent) {
        Ok((model, log)) => {
            eprintln!("model saved to '{}'", model.display());
            eprintln!("change log saved to '{}'", log.display());
        }
        Err(e) => fail(&format!("cannot save '{}': {}", name, e)),
    }
}

fn do_replay(args: ReplayArgs, config: &Config, no_color: bool) {
    let mut reporter = Reporter::new(no_color);
    let store = load_blocks(&mut reporter, &args.file, config);
    let (log_id, log_source) = reporter.load(&args.log);

    let replayed = match replay::replay(&store, &log_source, log_id) {
        Ok(replayed) => replayed,
        Err(error) => {
            reporter.emit(&error.to_diagnostic());
            process::exit(1);
        }
    };
    eprintln!("{} change(s) replayed", replayed.applied.len());

    match args.name {
        Some(name) => {
            if let Err(e) = persist::check_not_input(Path::new(&args.file), &config.output_dir, &name) {
                fail(&e.to_string());
            }
            if let Err(e) =
                persist::save(&replayed.store, &name, &config.output_dir, config.log_indent)
            {
                fail(&format!("cannot save '{}': {}", name, e));
            }
        }
        None => println!("{}", replayed.store.render()),
    }
}

fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model")
        .to_string()
}
