use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use foldscript::dsl;
use foldscript::model::ledger::LedgerBackend;
use foldscript::prompt::ConsolePrompter;
use foldscript::registry::{catalog, KeywordCategory};
use foldscript::{paths, settings};
use foldscript::{AccessLevel, ScriptError, ScriptSettings, Session};

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "foldscript-cli", about = "Paper-folding script interpreter", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding foldscript.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script file as one statement
    Run {
        file: PathBuf,
        /// Access level to run at
        #[arg(long, value_enum)]
        access: Option<AccessLevel>,
        /// Seconds before the first stop prompt
        #[arg(long)]
        wait: Option<u64>,
        /// Write the resulting history here
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Read statements from stdin, one per line
    Repl {
        #[arg(long, value_enum)]
        access: Option<AccessLevel>,
    },
    /// Print the canonical tokens of a script file
    Tokens { file: PathBuf },
    /// List the keyword vocabulary, or describe one keyword
    Keywords { word: Option<String> },
}

// ── Session setup ───────────────────────────────────────────────

fn load_config(dir: Option<&Path>) -> ScriptSettings {
    let Some(dir) = dir else {
        return ScriptSettings::default();
    };
    match settings::load_settings(dir) {
        Ok(Some(s)) => s,
        Ok(None) => ScriptSettings::default(),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn open_session(config: &ScriptSettings, access: Option<AccessLevel>) -> Session {
    let mut settings = config.clone();
    if let Some(level) = access {
        settings.default_access = level;
    }
    Session::with_settings(
        Arc::new(LedgerBackend),
        Arc::new(ConsolePrompter::default()),
        settings,
    )
}

// ── Output formatting ────────────────────────────────────────────

fn report(session: &mut Session, result: Result<(), ScriptError>, raw_json: bool) -> bool {
    let transcript = session.drain_transcript();
    if raw_json {
        let json = serde_json::json!({
            "ok": result.is_ok(),
            "error": result.as_ref().err(),
            "history": session.history(),
            "transcript": transcript,
        });
        println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        return result.is_ok();
    }
    for line in &transcript {
        println!("{line}");
    }
    match result {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Error: {e}");
            false
        }
    }
}

// ── Subcommands ─────────────────────────────────────────────────

fn run(
    config: &ScriptSettings,
    file: &Path,
    access: Option<AccessLevel>,
    wait: Option<u64>,
    history: Option<&Path>,
    raw_json: bool,
) {
    let source = std::fs::read_to_string(file).unwrap_or_else(|e| {
        eprintln!("Error: {}: {e}", file.display());
        process::exit(1);
    });
    let mut config = config.clone();
    if let Some(secs) = wait {
        config.initial_wait_secs = secs;
    }
    let mut session = open_session(&config, access);

    let result = session.execute_supervised(&source);
    let ok = report(&mut session, result, raw_json);

    if let Some(path) = history {
        if let Err(e) = session.save_history(path) {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
    if !ok {
        process::exit(1);
    }
}

fn repl(config: &ScriptSettings, access: Option<AccessLevel>, raw_json: bool) {
    let mut session = open_session(config, access);
    let stdin = io::stdin();
    let mut out = io::stdout();
    loop {
        print!("{}> ", session.access());
        let _ = out.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim();
        match line.split_once(' ').map_or((line, ""), |(a, b)| (a, b.trim())) {
            ("", _) => {}
            (":quit", _) => break,
            (":history", _) => {
                for statement in session.history() {
                    println!("{statement}");
                }
            }
            (":reset", _) => session.reset_history(),
            (":save", path) => {
                let path = if path.is_empty() {
                    paths::history_path(Path::new("."), "session")
                } else {
                    PathBuf::from(path)
                };
                match session.save_history(&path) {
                    Ok(()) => println!("saved {}", path.display()),
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
            _ => {
                let result = session.execute_supervised(line);
                report(&mut session, result, raw_json);
            }
        }
    }
}

fn tokens(file: &Path, raw_json: bool) {
    let source = std::fs::read_to_string(file).unwrap_or_else(|e| {
        eprintln!("Error: {}: {e}", file.display());
        process::exit(1);
    });
    let tokens = dsl::tokenize(&source);
    if raw_json {
        println!("{}", serde_json::to_string_pretty(&tokens).unwrap_or_default());
    } else {
        for token in tokens {
            println!("{token}");
        }
    }
}

fn keywords(word: Option<&str>, raw_json: bool) {
    if let Some(word) = word {
        match catalog::describe(word) {
            Some(text) => println!("{text}"),
            None => {
                eprintln!("Error: unknown keyword `{word}`");
                process::exit(1);
            }
        }
        return;
    }
    if raw_json {
        let entries = catalog::keyword_catalog();
        println!("{}", serde_json::to_string_pretty(&entries).unwrap_or_default());
        return;
    }
    for category in [
        KeywordCategory::Parameter,
        KeywordCategory::Fold,
        KeywordCategory::File,
        KeywordCategory::Export,
        KeywordCategory::Terminal,
    ] {
        println!("{}:", category.slug());
        for entry in catalog::by_category(category) {
            println!(
                "  {:<22} {:<5} {}",
                entry.name,
                entry.access.to_string(),
                entry.description
            );
        }
    }
}

// ── Main ─────────────────────────────────────────────────────────

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());
    let raw = cli.json;

    match &cli.command {
        Commands::Run {
            file,
            access,
            wait,
            history,
        } => run(&config, file, *access, *wait, history.as_deref(), raw),
        Commands::Repl { access } => repl(&config, *access, raw),
        Commands::Tokens { file } => tokens(file, raw),
        Commands::Keywords { word } => keywords(word.as_deref(), raw),
    }
}
