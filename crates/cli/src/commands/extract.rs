//! `docchat extract` — Print the document context without calling a model.

use std::path::PathBuf;

use super::{assembler, load_config, read_documents, CliResult};

pub async fn run(files: Vec<PathBuf>) -> CliResult {
    let config = load_config()?;
    let documents = read_documents(&files)?;
    let assembled = assembler(&config).assemble(&documents)?;

    for (name, error) in &assembled.failures {
        eprintln!("  [Skipped] {name}: {error}");
    }
    println!("{}", assembled.context);
    Ok(())
}
