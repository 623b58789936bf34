//! Chat with an OpenAI-compatible completion service from the terminal.

#[macro_use]
extern crate tracing;

use std::io::{IsTerminal, Write as _};
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use little_chat::core::SessionBuilder;
use little_chat::input::{Commit, commit_line};
use little_chat::model::{Role, Turn};
use little_chat::render::render_turn;
use little_chat_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::select;
use tokio::sync::mpsc;

const TITLE: &str = "🧠 AI Chatbot";
const EMPTY_PLACEHOLDER: &str =
    "Start the conversation by typing a message below...";
const WAITING_MESSAGE: &str = "Waiting for AI response...";

/// Chat with an OpenAI-compatible completion service.
#[derive(Debug, Parser)]
#[command(name = "little-chat", version, about)]
struct Args {
    /// Bearer credential for the completion service.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Model identifier sent with every request.
    #[arg(long, env = "CHAT_MODEL")]
    model: Option<String>,

    /// Base URL of the API, `/chat/completions` is appended to it.
    #[arg(long, env = "CHAT_BASE_URL")]
    base_url: Option<String>,

    /// Give up on a reply after this many seconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

enum SessionEvent {
    Turn(Turn),
    Pending(bool),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let colored = !args.no_color && std::io::stdout().is_terminal();

    let mut config = OpenAIConfigBuilder::with_api_key(args.api_key);
    if let Some(model) = args.model {
        config = config.with_model(model);
    }
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let config = config.build();
    debug!("using {config:?}");
    let model_provider = OpenAIProvider::new(config);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let session = SessionBuilder::with_model_provider(model_provider.clone())
        .on_turn({
            let event_tx = event_tx.clone();
            move |turn| {
                event_tx.send(SessionEvent::Turn(turn.clone())).ok();
            }
        })
        .on_pending(move |pending| {
            event_tx.send(SessionEvent::Pending(pending)).ok();
        })
        .build();

    print_banner(model_provider.config().model(), colored);

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")?
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let mut progress_bar: Option<ProgressBar> = None;
    let mut pending = false;

    let mut lines = BufReader::new(io::stdin()).lines();
    prompt();

    loop {
        select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(err) => {
                        error!("error reading input: {err}");
                        break;
                    }
                };
                let input = line.trim();

                match input {
                    "/quit" | "/exit" => break,
                    "/transcript" => {
                        let Some(view) = session.snapshot().await else {
                            break;
                        };
                        if view.turns.is_empty() {
                            println!("{}", dim(EMPTY_PLACEHOLDER, colored));
                        }
                        for turn in &view.turns {
                            println!("{}", render_turn(turn, colored));
                        }
                        if !view.pending {
                            prompt();
                        }
                    }
                    "" => {
                        if !pending {
                            prompt();
                        }
                    }
                    _ => match commit_line(&session, input).await {
                        Commit::Sent => {}
                        Commit::Discarded => {
                            let notice = dim(
                                "Still waiting for the last reply, input discarded.",
                                colored,
                            );
                            match &progress_bar {
                                Some(progress_bar) => progress_bar.println(notice),
                                None => println!("{notice}"),
                            }
                        }
                        Commit::Closed => break,
                    },
                }
            }
            event = event_rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                match event {
                    SessionEvent::Pending(true) => {
                        pending = true;
                        let bar = ProgressBar::new_spinner();
                        bar.set_style(progress_style.clone());
                        bar.set_message(WAITING_MESSAGE);
                        bar.enable_steady_tick(Duration::from_millis(100));
                        progress_bar = Some(bar);
                    }
                    SessionEvent::Pending(false) => {
                        pending = false;
                        if let Some(bar) = progress_bar.take() {
                            bar.finish_and_clear();
                        }
                        prompt();
                    }
                    SessionEvent::Turn(turn) => {
                        // User input is already on the screen.
                        if turn.role() == Role::Assistant {
                            if let Some(bar) = progress_bar.take() {
                                bar.finish_and_clear();
                            }
                            println!("{}\n", render_turn(&turn, colored));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_banner(model: &str, colored: bool) {
    if colored {
        println!("{}", TITLE.bold());
    } else {
        println!("{TITLE}");
    }
    println!("{}", dim(&format!("model: {model}, /quit to leave"), colored));
    println!();
    println!("{}", dim(EMPTY_PLACEHOLDER, colored));
}

fn dim(text: &str, colored: bool) -> String {
    if colored {
        text.dimmed().to_string()
    } else {
        text.to_owned()
    }
}

fn prompt() {
    print!("> ");
    if let Err(err) = std::io::stdout().flush() {
        warn!("failed to flush stdout: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        let args = ["little-chat", "--api-key", "test-key"];
        Args::try_parse_from(args.iter().chain(extra))
    }

    #[test]
    fn test_timeout_must_be_positive() {
        assert!(parse(&["--timeout-secs", "0"]).is_err());
        let args = parse(&["--timeout-secs", "30"]).unwrap();
        assert_eq!(args.timeout_secs, Some(30));
    }

    #[test]
    fn test_timeout_is_optional() {
        assert_eq!(parse(&[]).unwrap().timeout_secs, None);
    }
}
