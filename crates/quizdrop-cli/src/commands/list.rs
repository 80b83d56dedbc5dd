//! The `quizdrop list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizdrop_client::config::{create_api, load_config_from};

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let api = create_api(&config.api)?;
    let forms = api.list_forms().await?;

    if forms.is_empty() {
        println!("No forms found at {}.", config.api.base_url);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Questions"]);
    for form in &forms {
        table.add_row(vec![
            Cell::new(form.id.as_deref().unwrap_or("-")),
            Cell::new(&form.title),
            Cell::new(form.questions.len()),
        ]);
    }
    println!("{table}");

    Ok(())
}
