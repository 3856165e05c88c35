use dia_config::DialectusConfig;
use dia_core::entities::{Message, StoredSession};
use dia_core::ids::SessionId;
use dia_report::{DisplayDecision, ResultReconciler};
use serde::Serialize;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::ShowArgs;
use crate::output::{output, text};

#[derive(Debug, Serialize)]
struct SessionView {
    session: StoredSession,
    messages: Vec<Message>,
    decision: Option<DisplayDecision>,
}

/// Handle `dia show <id>`.
pub async fn handle(
    args: &ShowArgs,
    config: &DialectusConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let store = bootstrap::open_store(config).await?;
    let session_id = SessionId(args.id);

    let loaded = store.load_session(session_id).await?;
    let decision = ResultReconciler::new(&store, config.judging.expected_criteria())
        .reconcile(session_id)
        .await?;

    let view = SessionView {
        session: loaded.session,
        messages: loaded.messages.into_iter().map(|stored| stored.message).collect(),
        decision,
    };
    output(&view, flags.output, render)
}

fn render(view: &SessionView) -> String {
    let transcript = text::transcript(&view.session, &view.messages);
    match &view.decision {
        Some(decision) => format!("{transcript}\n{}", text::decision(decision)),
        None => format!("{transcript}\nNot judged"),
    }
}
