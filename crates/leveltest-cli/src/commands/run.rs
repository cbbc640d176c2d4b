//! The `leveltest run` command: drive a full test session in the terminal.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::Table;

use leveltest_api::config::load_config_from;
use leveltest_api::questions::HttpQuestionSource;
use leveltest_api::submission::HttpSubmissionClient;
use leveltest_auth::guard::{RouteAccess, RouteGuard};
use leveltest_core::model::{Question, Role, SessionVariant};
use leveltest_core::session::{SessionResults, SessionStatus, TestSession};

use super::build_auth;

pub async fn execute(
    config_path: Option<&Path>,
    variant_arg: &str,
    test_id: Option<i64>,
) -> Result<()> {
    let variant = match variant_arg {
        "placement" => SessionVariant::Placement,
        "practice" => SessionVariant::Practice,
        "classroom" => SessionVariant::Classroom {
            test_id: test_id
                .context("--test-id is required with --variant classroom")?,
        },
        other => anyhow::bail!("unknown variant: {other} (expected placement, practice, or classroom)"),
    };

    let config = load_config_from(config_path)?;
    let auth = build_auth(&config)?;
    let identity = auth.restore()?;

    // The placement test is open to anyone; the other variants sit behind
    // the student guard.
    let route_guard = RouteGuard::new(Arc::clone(auth.context()));
    if let Some((destination, required_role)) = guarded_destination(variant) {
        match route_guard.check(&destination, required_role) {
            RouteAccess::Allow => {}
            RouteAccess::RedirectTo(path) => anyhow::bail!(
                "access denied for {destination} (redirected to {path}); \
                 log in with `leveltest login` first"
            ),
        }
    }

    let source = Arc::new(HttpQuestionSource::new(&config));
    let submitter = Arc::new(HttpSubmissionClient::new(&config));

    if variant == SessionVariant::Practice {
        if let Some(identity) = identity.as_ref() {
            // Mirrors the practice landing page: tell the learner when the
            // upcoming set is tailored to their history.
            match source.practice_preview(identity).await {
                Ok(preview) if preview.has_enough_data => {
                    println!("This practice set is personalized to how you learn.");
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(error = %e, "practice preview unavailable"),
            }
        }
    }

    let mut session = TestSession::new(source, submitter, variant);

    session
        .start(identity.as_ref())
        .await
        .context("failed to load questions")?;
    tracing::debug!(
        session = %session.session_id(),
        count = session.questions().len(),
        "session loaded"
    );

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let total = session.questions().len();

    while session.status() == SessionStatus::InProgress {
        let Some(question) = session.current_question().cloned() else {
            break;
        };
        print_question(&question, session.current_index(), total);

        let selected = loop {
            print!("> ");
            std::io::stdout().flush()?;
            let line = match lines.next() {
                Some(line) => line?,
                None => {
                    session.abandon();
                    anyhow::bail!("input closed before the test finished; nothing was submitted");
                }
            };
            match resolve_choice(&line, &question.options) {
                Some(choice) => break choice,
                None => println!("Pick one of the listed options (letter or full text)."),
            }
        };

        session
            .submit_answer(&selected)
            .context("answer rejected")?;
    }

    let submit_result = match identity.as_ref() {
        Some(identity) => session.submit_results(Some(identity)).await.map(|_| true),
        // The anonymous placement flow keeps its results local.
        None => Ok(false),
    };

    let results = session
        .results()
        .context("session finished without results")?;
    print_results(results, total);

    match submit_result {
        Ok(true) => println!("Results saved."),
        Ok(false) => println!("Log in before your next test to save your results."),
        Err(e) => {
            return Err(e).context("your results could not be saved (shown above)");
        }
    }
    Ok(())
}

/// Guarded destination and role requirement for a variant, if any.
fn guarded_destination(variant: SessionVariant) -> Option<(String, Option<Role>)> {
    match variant {
        SessionVariant::Placement => None,
        SessionVariant::Practice => Some(("/recommended-test".to_string(), Some(Role::Student))),
        SessionVariant::Classroom { test_id } => Some((
            format!("/classroom-test/{test_id}"),
            Some(Role::Student),
        )),
    }
}

fn print_question(question: &Question, index: usize, total: usize) {
    println!();
    println!(
        "Question {}/{} [{}]",
        index + 1,
        total,
        question.category
    );
    if !question.text.is_empty() {
        println!("{}", question.text);
    }
    if let Some(narration) = &question.narration_text {
        // No speakers in a terminal; show the sentence that would be read.
        println!("(listen) {narration}");
    }
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {}", Question::option_label(i), option);
    }
}

/// Map learner input to an option's display text: a single letter picks by
/// position, anything else must match an option exactly.
fn resolve_choice(input: &str, options: &[String]) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.len() == 1 {
        if let Some(letter) = trimmed.chars().next() {
            let letter = letter.to_ascii_uppercase();
            if letter.is_ascii_uppercase() {
                let index = (letter as u8 - b'A') as usize;
                if let Some(option) = options.get(index) {
                    return Some(option.clone());
                }
            }
        }
    }
    options.iter().find(|o| o.as_str() == trimmed).cloned()
}

fn print_results(results: &SessionResults, total: usize) {
    let summary = &results.summary;

    let mut table = Table::new();
    table.set_header(vec!["Correct", "Score", "Level", "Avg Time"]);
    table.add_row(vec![
        format!("{}/{}", summary.correct_count, total),
        format!("{:.1}%", summary.percentage),
        results.level.clone(),
        format!("{:.1}s", summary.avg_response_time),
    ]);
    println!();
    println!("{table}");

    if !summary.per_category_mistakes.is_empty() {
        let mut mistakes = Table::new();
        mistakes.set_header(vec!["Category", "Mistakes"]);
        for entry in &summary.per_category_mistakes {
            mistakes.add_row(vec![entry.category.to_string(), entry.count.to_string()]);
        }
        println!("{mistakes}");
    }
}
