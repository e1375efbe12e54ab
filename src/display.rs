//! Colored CLI display utilities for desk output.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;

use crate::client::{CallOutcome, CALLER_HOLD_MESSAGE};
use crate::desk::{HelpRequest, KnowledgeItem, RequestStatus};

/// Maximum length for truncated question and answer text.
const DEFAULT_MAX_LEN: usize = 80;

/// Truncate a string to a maximum number of characters, adding ellipsis if truncated.
#[must_use]
pub fn truncate(s: &str, max_len: usize, raw_mode: bool) -> String {
    if raw_mode || s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return "...".to_string();
    }
    let kept: String = s.chars().take(max_len - 3).collect();
    format!("{kept}...")
}

/// Format a timestamp the same way tracing does.
#[must_use]
pub fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Status label padded for column output.
#[must_use]
pub fn status_label(status: RequestStatus) -> String {
    let label = format!("[{}]", status.as_str().to_uppercase());
    match status {
        RequestStatus::Pending => label.yellow().bold().to_string(),
        RequestStatus::Resolved => label.green().bold().to_string(),
        RequestStatus::Unresolved => label.red().bold().to_string(),
    }
}

/// Print one help request.
pub fn print_request(request: &HelpRequest, raw_mode: bool) {
    println!(
        "{} {} {} {}",
        format_time(request.created_at).dimmed(),
        status_label(request.status),
        request.id.dimmed(),
        truncate(&request.question, DEFAULT_MAX_LEN, raw_mode).bold()
    );
    println!("    caller={}", request.caller_id.cyan());
    if let Some(answer) = &request.answer {
        println!(
            "    answer={}",
            truncate(answer, DEFAULT_MAX_LEN, raw_mode).green()
        );
    }
    if let Some(resolved_at) = request.resolved_at {
        println!("    closed={}", format_time(resolved_at).dimmed());
    }
    let _ = io::stdout().flush();
}

/// Print a list of requests, or a note when there are none.
pub fn print_requests(requests: &[HelpRequest], raw_mode: bool) {
    if requests.is_empty() {
        println!("{}", "No requests".dimmed());
    }
    for request in requests {
        print_request(request, raw_mode);
    }
    let _ = io::stdout().flush();
}

/// Print memorized answers.
pub fn print_knowledge(items: &[KnowledgeItem], raw_mode: bool) {
    if items.is_empty() {
        println!("{}", "Knowledge base is empty".dimmed());
    }
    for item in items {
        println!(
            "{} {} {}",
            format_time(item.created_at).dimmed(),
            "[Q]".blue().bold(),
            truncate(&item.question, DEFAULT_MAX_LEN, raw_mode)
        );
        println!(
            "{} {} {}",
            " ".repeat(24),
            "[A]".green().bold(),
            truncate(&item.answer, DEFAULT_MAX_LEN, raw_mode)
        );
    }
    let _ = io::stdout().flush();
}

/// Print what the caller hears.
pub fn print_call_outcome(caller_id: &str, outcome: &CallOutcome) {
    match outcome {
        CallOutcome::Answered { answer } => {
            println!("{} {} {}", "[ANSWERED]".green().bold(), caller_id.cyan(), answer);
        }
        CallOutcome::Escalated { request_id } => {
            println!(
                "{} {} {} {}",
                "[ESCALATED]".yellow().bold(),
                caller_id.cyan(),
                CALLER_HOLD_MESSAGE,
                format!("request={request_id}").dimmed()
            );
        }
    }
    let _ = io::stdout().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), message);
}
