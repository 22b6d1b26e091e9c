use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use mailprobe::relay::TelegramClient;
use tracing_subscriber::EnvFilter;

/// Send the content of a text file to a private Telegram chat through a bot.
#[derive(Parser)]
#[command(name = "tg-relay")]
struct Cli {
    /// path to the .txt file to send
    #[arg(long)]
    file: PathBuf,

    /// target chat id
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    chat_id: Option<String>,

    /// bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,

    /// more logs on stderr
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default = if cli.verbose > 0 { "mailprobe=debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();

    let Some(bot_token) = non_empty(cli.bot_token) else {
        bail!("bot token missing: pass --bot-token or set TELEGRAM_BOT_TOKEN");
    };
    let Some(chat_id) = non_empty(cli.chat_id) else {
        bail!("chat id missing: pass --chat-id or set TELEGRAM_CHAT_ID");
    };

    let text = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("read {}", cli.file.display()))?;
    let text = text.trim();
    if text.is_empty() {
        bail!("{} is empty: nothing to send", cli.file.display());
    }

    let client = TelegramClient::new(bot_token)?;
    let sent = client.send_message(&chat_id, text)?;
    println!("Message sent. message_id={}", sent.message_id);
    Ok(())
}
