//! The `quizdrop play` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizdrop_client::config::load_config_from;
use quizdrop_core::parser;
use quizdrop_core::response::FormResponse;
use quizdrop_core::session::FormSession;

pub fn execute(
    form_path: PathBuf,
    gestures_path: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let form = parser::parse_form(&form_path)?;
    let gestures = parser::load_gestures(&gestures_path)?;

    eprintln!(
        "Replaying {} gesture(s) on '{}' ({} questions)",
        gestures.len(),
        form.title,
        form.questions.len()
    );

    let mut ids = config.id_strategy.id_source();
    let mut session = FormSession::new(form, ids.as_mut());
    super::replay(&mut session, &gestures)?;

    match format.as_str() {
        "table" => print_table(&session),
        "json" => {
            let json = serde_json::to_string_pretty(session.answers())
                .context("failed to serialize answers")?;
            println!("{json}");
        }
        "markdown" | "md" => {
            let form_id = session.form().id.clone().unwrap_or_else(|| "(unsaved)".into());
            let response = FormResponse::new(form_id, session.answers().clone());
            print!("{}", response.to_markdown());
        }
        other => anyhow::bail!("unknown format: {other} (expected table, json, or markdown)"),
    }

    let unanswered = session.unanswered();
    if unanswered.is_empty() {
        eprintln!("All questions answered.");
    } else {
        let list: Vec<String> = unanswered.iter().map(|q| (q + 1).to_string()).collect();
        eprintln!("Unanswered: {}", list.join(", "));
    }

    Ok(())
}

fn print_table(session: &FormSession) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Type", "Question", "Answer", "Complete"]);

    for (pos, question) in session.form().questions.iter().enumerate() {
        let answer = session.answers().get(&pos);
        table.add_row(vec![
            Cell::new(pos + 1),
            Cell::new(question.kind()),
            Cell::new(question.question_text()),
            Cell::new(answer.map(|a| a.summary()).unwrap_or_else(|| "-".into())),
            Cell::new(if answer.is_some_and(|a| a.is_complete()) {
                "yes"
            } else {
                "no"
            }),
        ]);
    }

    println!("{table}");
}
