use anyhow::Result;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

use rag_assistant::config::Settings;
use rag_assistant::logging::init_logger;
use rag_assistant::services::ChatSession;

const PROMPT: &str = "> ";

enum Command<'a> {
    Quit,
    Role(&'a str),
    Ask(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if line == "/quit" || line == "/exit" {
        Command::Quit
    } else if line == "/role" {
        Command::Role("")
    } else if let Some(role) = line.strip_prefix("/role ") {
        Command::Role(role.trim())
    } else {
        Command::Ask(line)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;
    init_logger(&settings.logging)?;

    info!("Starting rag-assistant (model {})", settings.llm.model);

    let mut session = match ChatSession::from_settings(settings).await {
        Ok(session) => session,
        Err(e) => {
            error!("Startup failed: {}", e);
            return Err(e.into());
        }
    };

    let mut stdout = io::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();

    stdout
        .write_all(b"Type a question, /role <text> to change the assistant's role, /quit to leave.\n")
        .await?;

    loop {
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Command::Quit => break,
            Command::Role(role) => {
                session.set_system_role(role);
                let current = session.system_role().unwrap_or_default();
                stdout.write_all(format!("Role set: {}\n", current).as_bytes()).await?;
            }
            Command::Ask(prompt) => match session.chat(prompt).await {
                Ok(reply) if reply.is_empty() => {}
                Ok(reply) => stdout.write_all(format!("{}\n", reply).as_bytes()).await?,
                Err(e) => {
                    error!("Turn failed: {}", e);
                    stdout.write_all(format!("[error] {}\n", e).as_bytes()).await?;
                }
            },
        }
    }

    info!("Session {} closed", session.id());
    Ok(())
}
