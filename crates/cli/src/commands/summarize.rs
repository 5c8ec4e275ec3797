//! `docchat summarize` — Short summary of the documents.

use std::path::PathBuf;

use super::{build_session, load_config, load_into, CliResult};

pub async fn run(files: Vec<PathBuf>) -> CliResult {
    let config = load_config()?;
    let mut session = build_session(&config)?;
    load_into(&mut session, &files)?;

    eprint!("  Summarizing...");
    let summary = session.summarize().await;
    eprint!("\r                \r");
    println!("{}", summary?);
    Ok(())
}
