//! `docchat ask` — One question, one answer.

use std::path::PathBuf;

use super::{build_session, load_config, load_into, CliResult};

pub async fn run(files: Vec<PathBuf>, question: String) -> CliResult {
    let config = load_config()?;
    let mut session = build_session(&config)?;
    load_into(&mut session, &files)?;

    eprint!("  Thinking...");
    let answer = session.ask(&question).await;
    eprint!("\r              \r");
    println!("{}", answer?);
    Ok(())
}
