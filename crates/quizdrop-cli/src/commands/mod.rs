pub mod init;
pub mod list;
pub mod play;
pub mod publish;
pub mod submit;
pub mod validate;

use anyhow::{Context, Result};

use quizdrop_core::response::Answer;
use quizdrop_core::session::{AnswerSink, FormSession, Gesture};

/// Prints every answer the session pushes.
struct ConsoleSink;

impl AnswerSink for ConsoleSink {
    fn on_answer(&self, question: usize, answer: &Answer) {
        eprintln!("  Q{}: {}", question + 1, answer.summary());
    }
}

/// Feed a gesture script through a session, one gesture at a time.
fn replay(session: &mut FormSession, gestures: &[Gesture]) -> Result<()> {
    for (n, gesture) in gestures.iter().enumerate() {
        let changed = session
            .apply(gesture, &ConsoleSink)
            .with_context(|| format!("gesture {} failed", n + 1))?;
        if !changed {
            tracing::debug!(gesture = n + 1, "gesture left the answer unchanged");
        }
    }
    Ok(())
}
