use std::collections::BTreeMap;
use std::io::{IsTerminal, Write};

use anyhow::Context;
use dia_config::DialectusConfig;
use dia_core::ids::{DecisionId, SessionId};
use dia_report::{DisplayDecision, ResultReconciler};
use dia_session::{
    DisplayEvent, JudgingPlan, Orchestrator, RemoteEngine, SessionRequest, display_channel,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::bootstrap;
use crate::cli::root_commands::DebateArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::{output, text};
use crate::progress::Progress;

/// What `dia debate` reports once the session is committed.
#[derive(Debug, Serialize)]
struct DebateReport {
    debate_id: String,
    session_id: SessionId,
    message_count: u32,
    decision_ids: Vec<DecisionId>,
    decision: Option<DisplayDecision>,
}

/// Handle `dia debate`.
pub async fn handle(
    args: &DebateArgs,
    mut config: DialectusConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    apply_overrides(args, &mut config);
    config.validate().context("invalid configuration")?;

    let request = SessionRequest::from_config(&config);
    if flags.is_live_text() {
        println!("{}\n", text::setup(&request));
    }
    if !args.yes && !confirm("Start the debate?").await? {
        eprintln!("Debate cancelled");
        return Ok(());
    }

    let store = bootstrap::open_store(&config).await?;
    let engine = RemoteEngine::from_config(&config).context("failed to build engine client")?;
    let plan = JudgingPlan::from_config(&config);
    let (sink, events) = display_channel(config.engine.display_queue_capacity);

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
    let presenter = tokio::spawn(present(events, speaker_names(&request), flags.clone()));

    let mut orchestrator = Orchestrator::new(&store, &engine, plan)
        .with_display(sink)
        .with_cancellation(cancel);
    let result = orchestrator.run(&request).await;
    // Dropping the orchestrator closes the display queue
    drop(orchestrator);
    interrupt.abort();
    presenter.await.context("display task failed")?;

    let outcome = result?;
    tracing::info!(
        session_id = %outcome.session_id,
        messages = outcome.message_count,
        "debate saved"
    );

    let decision = ResultReconciler::new(&store, config.judging.expected_criteria())
        .reconcile_expected(outcome.session_id, config.judging.judge_models.len())
        .await?;
    let report = DebateReport {
        debate_id: outcome.debate_id,
        session_id: outcome.session_id,
        message_count: outcome.message_count,
        decision_ids: outcome.decision_ids,
        decision,
    };
    output(&report, flags.output, render)
}

fn apply_overrides(args: &DebateArgs, config: &mut DialectusConfig) {
    if let Some(topic) = &args.topic {
        config.debate.topic.clone_from(topic);
    }
    if let Some(format) = args.format {
        config.debate.format = format;
    }
}

fn speaker_names(request: &SessionRequest) -> BTreeMap<String, String> {
    request
        .models
        .iter()
        .map(|(id, model)| (id.clone(), model.name.clone()))
        .collect()
}

fn render(report: &DebateReport) -> String {
    let saved = format!(
        "Saved session {} ({} messages, debate {})",
        report.session_id, report.message_count, report.debate_id
    );
    match &report.decision {
        Some(decision) => format!("{}\n\n{saved}", text::decision(decision)),
        None => saved,
    }
}

/// Render display events until the orchestrator lets go of the queue.
async fn present(
    mut events: mpsc::Receiver<DisplayEvent>,
    names: BTreeMap<String, String>,
    flags: GlobalFlags,
) {
    let live = flags.is_live_text();
    let progress = Progress::spinner(
        "Waiting for the debate to start",
        flags.output == OutputFormat::Json && !flags.quiet,
    );
    let mut shown = 0_u32;

    while let Some(event) = events.recv().await {
        match event {
            DisplayEvent::Message(message) => {
                shown += 1;
                if live {
                    progress.println(&text::message(&message, &names));
                }
                progress.set_message(&format!("{shown} messages"));
            }
            DisplayEvent::JudgingStarted => {
                if live {
                    progress.println("Judging...");
                }
                progress.set_message("Judging");
            }
            DisplayEvent::Decision(decision) => {
                if live {
                    progress.println(&text::live_decision(&decision));
                }
            }
            DisplayEvent::Completed => progress.set_message("Saving transcript"),
        }
    }
    progress.finish_clear();
}

async fn cancel_on_ctrl_c(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("interrupt received, cancelling session");
        token.cancel();
    }
}

async fn confirm(prompt: &str) -> anyhow::Result<bool> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("stdin is not interactive; pass --yes to start without confirmation");
    }
    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .context("failed to read confirmation")?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use dia_core::enums::DebateFormat;

    use super::*;

    #[test]
    fn only_yes_confirms() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative("no"));
    }

    #[test]
    fn flags_override_config() {
        let mut config = DialectusConfig::default();
        let args = DebateArgs {
            topic: Some("Is remote work better?".into()),
            format: Some(DebateFormat::Socratic),
            yes: true,
        };
        apply_overrides(&args, &mut config);
        assert_eq!(config.debate.topic, "Is remote work better?");
        assert_eq!(config.debate.format, DebateFormat::Socratic);
    }

    #[test]
    fn absent_flags_keep_config() {
        let mut config = DialectusConfig::default();
        let before = config.debate.topic.clone();
        apply_overrides(
            &DebateArgs {
                topic: None,
                format: None,
                yes: false,
            },
            &mut config,
        );
        assert_eq!(config.debate.topic, before);
    }
}
