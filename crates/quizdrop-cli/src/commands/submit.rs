//! The `quizdrop submit` command.

use std::path::PathBuf;

use anyhow::Result;

use quizdrop_client::config::{create_api, load_config_from};
use quizdrop_core::parser;
use quizdrop_core::session::FormSession;

pub async fn execute(
    form_id: String,
    gestures_path: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let gestures = parser::load_gestures(&gestures_path)?;
    let api = create_api(&config.api)?;

    let mut form = api.fetch_form(&form_id).await?;
    if form.id.is_none() {
        form.id = Some(form_id.clone());
    }
    eprintln!("Answering '{}' ({} questions)", form.title, form.questions.len());

    let mut ids = config.id_strategy.id_source();
    let mut session = FormSession::new(form, ids.as_mut());
    super::replay(&mut session, &gestures)?;

    let response = session.to_response()?;
    api.create_response(&response).await?;

    if let Some(path) = output {
        response.save_json(&path)?;
        eprintln!("Response saved to {}", path.display());
    }
    println!("Submitted response {} for form {}", response.id, response.form_id);

    Ok(())
}
