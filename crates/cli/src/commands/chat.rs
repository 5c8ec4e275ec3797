//! `docchat chat` — Interactive question-answer session.

use std::io::Write;
use std::path::PathBuf;

use docchat_chat::Session;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{build_session, load_config, load_into, CliResult};

/// One line of user input.
#[derive(Debug, PartialEq)]
enum Input {
    Exit,
    Clear,
    Summary,
    Files,
    Load(Vec<PathBuf>),
    Question(String),
    Blank,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    match line {
        "" => Input::Blank,
        "exit" | "quit" | "/exit" | "/quit" => Input::Exit,
        "/clear" => Input::Clear,
        "/summary" => Input::Summary,
        "/files" => Input::Files,
        _ => match line.strip_prefix("/load") {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                Input::Load(rest.split_whitespace().map(PathBuf::from).collect())
            }
            _ => Input::Question(line.to_string()),
        },
    }
}

pub async fn run(files: Vec<PathBuf>) -> CliResult {
    let config = load_config()?;
    let mut session = build_session(&config)?;
    load_into(&mut session, &files)?;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║          DocChat — Interactive Mode          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", docchat_providers::router::model_for(&config, &config.default_provider));
    println!("  Documents: {}", session.documents().join(", "));
    println!();
    println!("  Ask a question and press Enter.");
    println!("  Commands: /summary  /files  /clear  /load <files...>");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Exit => break,
            Input::Blank => {}
            Input::Clear => {
                session.clear_history();
                println!("  Chat history cleared.");
            }
            Input::Files => {
                for name in session.documents() {
                    println!("  - {name}");
                }
            }
            Input::Load(paths) => {
                if let Err(e) = load_into(&mut session, &paths) {
                    eprintln!("  [Error] {e}");
                }
            }
            Input::Summary => {
                eprint!("  ...");
                let summary = session.summarize().await;
                eprint!("\r     \r");
                print_reply(&session, summary);
            }
            Input::Question(question) => {
                eprint!("  ...");
                let answer = session.ask(&question).await;
                eprint!("\r     \r");
                print_reply(&session, answer);
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

fn prompt() -> CliResult {
    print!("  You > ");
    std::io::stdout().flush()?;
    Ok(())
}

fn print_reply(session: &Session, reply: Result<String, docchat_core::Error>) {
    match reply {
        Ok(text) => {
            println!();
            for line in text.lines() {
                println!("  Assistant > {line}");
            }
            println!();
        }
        Err(e) => {
            eprintln!("  [Error] {e}");
            if !session.has_context() {
                eprintln!("  Load documents with /load <files...>");
            }
            println!();
        }
    }
}
