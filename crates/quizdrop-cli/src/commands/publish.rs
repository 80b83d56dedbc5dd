//! The `quizdrop publish` command.

use std::path::PathBuf;

use anyhow::Result;

use quizdrop_client::config::{create_api, load_config_from};
use quizdrop_core::parser;

pub async fn execute(form_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let form = parser::parse_form(&form_path)?;

    for w in parser::validate_form(&form) {
        let prefix = w
            .question
            .map(|q| format!("[Q{}] ", q + 1))
            .unwrap_or_default();
        eprintln!("{prefix}WARNING: {}", w.message);
    }

    let prepared = form.prepare_for_save()?;
    let dropped = form.questions.len() - prepared.questions.len();
    if dropped > 0 {
        eprintln!("Dropped {dropped} question(s) without text.");
    }

    let api = create_api(&config.api)?;
    let id = api.create_form(&prepared).await?;
    println!("Published '{}' with id {id}", prepared.title);

    Ok(())
}
