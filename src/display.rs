//! Terminal rendering of the session state

use crate::conversation::{Role, Turn};
use crate::session::{PublishedSummary, SessionController};

/// Label printed in front of each turn
pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::Asker => "You",
        Role::Responder => "Bot",
    }
}

/// One transcript line, e.g. `[14:03:12] You: What is it about?`
pub fn render_turn(turn: &Turn) -> String {
    format!(
        "[{}] {}: {}",
        turn.created_at.format("%H:%M:%S"),
        role_label(turn.role),
        turn.content
    )
}

/// Summary block; newlines and leading spaces of the display text are kept as-is
pub fn render_summary(summary: &PublishedSummary) -> String {
    format!("Summary:\n{}", summary.display_text())
}

/// Full view of the session: active video, summary state and transcript
pub fn render_session(session: &SessionController) -> String {
    let mut out = Vec::new();

    if let Some(id) = session.video().and_then(|video| video.canonical_id.as_ref()) {
        out.push(format!("Video: {} ({})", id, id.embed_url()));
    }

    if session.is_loading() {
        out.push("Summarizing...".to_string());
    } else if let Some(summary) = session.summary() {
        out.push(render_summary(summary));
    }

    let turns = session.conversation().turns();
    if !turns.is_empty() {
        out.push(String::new());
        out.extend(turns.iter().map(render_turn));
    }

    out.join("\n")
}
