//! Interactive chat command over the streaming agent.

use crate::agent::{AgentEvent, AgentSession, ChatMessage, Node};
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use futures::StreamExt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, thread: Option<String>, mut settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.model.name = model;
    }

    let session = Arc::new(AgentSession::from_settings(&settings)?);
    let thread_id = thread.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    println!("\n{}", style("Snakk Chat").bold().cyan());
    println!("{}", style(format!("Thread: {}", thread_id)).dim());
    println!(
        "{}\n",
        style("Type your messages, or 'exit' to quit. Use 'clear' to reset the thread, 'threads' to list threads.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("threads") {
            for id in session.thread_ids().await? {
                let marker = if id == thread_id { "*" } else { " " };
                println!("  {} {}", marker, id);
            }
            continue;
        }

        if input.eq_ignore_ascii_case("clear") {
            session.reset(Some(&thread_id)).await?;
            Output::info("Conversation history cleared.");
            continue;
        }

        let mut events = session.stream(vec![ChatMessage::user(input)], Some(thread_id.clone()));
        let mut answering = false;

        while let Some(event) = events.next().await {
            match event {
                Ok(AgentEvent::ModelToken {
                    text,
                    node: Node::Model,
                }) if !text.is_empty() => {
                    if !answering {
                        print!("\n{} ", style("Snakk:").cyan().bold());
                        answering = true;
                    }
                    print!("{}", text);
                    stdout.flush()?;
                }
                Ok(AgentEvent::ToolNotification { text }) => {
                    if answering {
                        println!();
                        answering = false;
                    }
                    Output::tool(&text);
                }
                Ok(_) => {}
                Err(e) => {
                    println!();
                    Output::error(&format!("Error: {}", e));
                }
            }
        }
        println!("\n");
    }

    Ok(())
}
