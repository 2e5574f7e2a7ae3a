//! Console Commands - Operator surface of the headless client
//!
//! Mỗi dòng stdin là một lệnh: `predict k=v ...`, `batch <path>`, `ticket <path>`,
//! `features`, `status`, `help`, `quit`.

use std::path::{Path, PathBuf};

use super::app::App;
use crate::logic::flows::verdict::percent;
use crate::logic::flows::FlowError;
use crate::logic::types::SelectedFile;
use crate::logic::ui::{ResultView, Role};

pub const HELP: &str = "\
Commands:
  predict type=<TYPE> amount=<n> [field=<n> ...]   score one transaction
  batch <file.csv>                                  score a batch file
  ticket <file>                                     scan a ticket or invoice
  features                                          top feature importances
  status                                            dashboard and region state
  help                                              this text
  quit                                              exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Predict(Vec<(String, String)>),
    Batch(Option<PathBuf>),
    Ticket(Option<PathBuf>),
    Features,
    Status,
    Help,
    Quit,
}

/// Parse one console line
pub fn parse(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(Command::Help);
    };

    match verb.to_lowercase().as_str() {
        "predict" => {
            let mut fields = Vec::new();
            for token in parts {
                let (key, value) = token
                    .split_once('=')
                    .ok_or_else(|| format!("expected field=value, got '{}'", token))?;
                fields.push((key.to_string(), value.to_string()));
            }
            Ok(Command::Predict(fields))
        }
        "batch" => Ok(Command::Batch(parts.next().map(PathBuf::from))),
        "ticket" => Ok(Command::Ticket(parts.next().map(PathBuf::from))),
        "features" => Ok(Command::Features),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}' (try 'help')", other)),
    }
}

/// A path that cannot be read counts as "no file selected"
async fn select(path: Option<&Path>) -> Option<SelectedFile> {
    let path = path?;
    match SelectedFile::read(path).await {
        Ok(file) => Some(file),
        Err(e) => {
            log::warn!("Cannot read {}: {}", path.display(), e);
            None
        }
    }
}

/// Run a command and return the lines to print
pub async fn execute(app: &App, command: Command) -> Vec<String> {
    let mut out = Vec::new();

    match command {
        Command::Predict(fields) => match app.prediction().submit(&fields).await {
            Ok(outcome) => {
                out.push(format!("[predict #{}] {}", outcome.seq, outcome.message));
                if let ResultView::Verdict(v) = app.prediction().region().view() {
                    out.push(format!(
                        "  {} {} | {} {}",
                        v.slices.labels[0],
                        percent(v.slices.clean),
                        v.slices.labels[1],
                        percent(v.slices.fraud)
                    ));
                }
            }
            Err(FlowError::Validation(msg)) => out.push(format!("[predict] invalid form: {}", msg)),
            Err(e) => out.push(format!("[predict] {}", e)),
        },
        Command::Batch(path) => {
            let file = select(path.as_deref()).await;
            match app.batch().submit(file.as_ref()).await {
                Ok(outcome) => {
                    out.push(format!("[batch #{}] {}", outcome.seq, app.batch().region().view().text()));
                }
                Err(e) => out.push(prompt(app, e, "batch")),
            }
        }
        Command::Ticket(path) => {
            let file = select(path.as_deref()).await;
            match app.tickets().submit(file.as_ref()).await {
                Ok(outcome) => out.push(format!("[ticket #{}] {}", outcome.seq, outcome.message)),
                Err(e) => out.push(prompt(app, e, "ticket")),
            }
        }
        Command::Features => match app.backend().features().await {
            Ok(features) => {
                for f in features {
                    out.push(format!("  {:<20} {:.4}", f.name, f.importance));
                }
            }
            Err(e) => out.push(format!("[features] {}", e)),
        },
        Command::Status => out.extend(status_lines(app)),
        Command::Help => out.push(HELP.to_string()),
        Command::Quit => {}
    }

    out
}

/// Show this command's own validation prompt; alerts raised by other commands
/// stay queued for them
fn prompt(app: &App, error: FlowError, verb: &str) -> String {
    match error {
        FlowError::Validation(msg) => {
            app.alerts().dismiss(&msg);
            format!("! {}", msg)
        }
        other => format!("[{}] {}", verb, other),
    }
}

fn status_lines(app: &App) -> Vec<String> {
    let mut lines = Vec::new();
    let status = app.dashboard().status();

    if let Some(text) = status.fraud_rate_text {
        lines.push(text);
    }
    if let Some(text) = status.txn_per_hour_text {
        lines.push(text);
    }
    lines.push(format!(
        "Window: {}/{} samples | charts: {} points | pending: {}",
        status.window.current_size, status.window.capacity, status.chart_points, status.deferred
    ));

    let region = app.prediction().region();
    let result = match region.view() {
        ResultView::Empty if region.is_loading() => "loading...".to_string(),
        ResultView::Empty => "-".to_string(),
        ResultView::Verdict(v) => v.text.clone(),
        ResultView::Error(msg) => msg.clone(),
    };
    lines.push(format!("Result: {}", result));
    lines.push(format!("Batch: {}", app.batch().region().view().text()));

    for entry in app.tickets().transcript().entries() {
        let who = match entry.role {
            Role::User => "you",
            Role::Bot => "bot",
        };
        lines.push(format!("  [{} {}] {}", entry.at.format("%H:%M:%S"), who, entry.text));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::transport::fake::ScriptedBackend;
    use crate::logic::transport::ReconnectPolicy;
    use crate::logic::types::BatchResponse;
    use crate::logic::ui::MemorySurface;
    use crate::ClientConfig;
    use std::sync::Arc;

    #[test]
    fn test_parse_predict_fields() {
        let cmd = parse("predict type=TRANSFER amount=250").unwrap();
        assert_eq!(
            cmd,
            Command::Predict(vec![
                ("type".to_string(), "TRANSFER".to_string()),
                ("amount".to_string(), "250".to_string()),
            ])
        );
        assert!(parse("predict amount").is_err());
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(parse("batch data.csv").unwrap(), Command::Batch(Some(PathBuf::from("data.csv"))));
        assert_eq!(parse("ticket").unwrap(), Command::Ticket(None));
        assert_eq!(parse("  ").unwrap(), Command::Help);
        assert_eq!(parse("QUIT").unwrap(), Command::Quit);
        assert!(parse("launch").is_err());
    }

    #[tokio::test]
    async fn test_batch_without_file_prints_prompt() {
        let backend = Arc::new(ScriptedBackend::new());
        let config = ClientConfig {
            reconnect: ReconnectPolicy::never(),
            ..ClientConfig::default()
        };
        let (app, _pump) = App::with_backend(
            backend.clone(),
            &config,
            Box::new(MemorySurface::new()),
            Box::new(MemorySurface::new()),
        );

        let out = execute(&app, Command::Batch(Some(PathBuf::from("/definitely/missing.csv")))).await;

        assert_eq!(out, vec!["! Select a file".to_string()]);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        std::fs::write(&path, "amount\n5\n").unwrap();

        let backend = Arc::new(ScriptedBackend::new());
        backend.push_batch(Ok(BatchResponse { frauds_detected: 1 }));
        let (app, _pump) = App::with_backend(
            backend,
            &ClientConfig::default(),
            Box::new(MemorySurface::new()),
            Box::new(MemorySurface::new()),
        );

        let out = execute(&app, Command::Batch(Some(path))).await;
        assert_eq!(out, vec!["[batch #1] Frauds detected: 1".to_string()]);
    }

    #[tokio::test]
    async fn test_prompts_stay_with_their_command() {
        let backend = Arc::new(ScriptedBackend::new());
        let (app, _pump) = App::with_backend(
            backend,
            &ClientConfig::default(),
            Box::new(MemorySurface::new()),
            Box::new(MemorySurface::new()),
        );
        // Raised by a ticket command that has not printed yet
        app.alerts().push("Select a ticket or invoice");

        let out = execute(&app, Command::Batch(None)).await;
        assert_eq!(out, vec!["! Select a file".to_string()]);
        assert_eq!(app.alerts().drain(), vec!["Select a ticket or invoice".to_string()]);

        let out = execute(&app, Command::Features).await;
        assert!(out.iter().all(|line| !line.starts_with('!')));
    }
}
