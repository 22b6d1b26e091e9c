use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use mailprobe::{BatchOptions, ProbeOptions};

#[derive(Parser)]
#[command(
    name = "mailprobe-cli",
    about = "Check email addresses: DNS MX + SMTP handshake, no mail is sent"
)]
pub struct Cli {
    /// email addresses to check
    pub emails: Vec<String>,

    /// text file with one address per line
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// write the report to this file instead of stdout (replaced atomically)
    #[arg(long)]
    pub out: Option<String>,

    /// SMTP session timeout, in seconds
    #[arg(long = "timeout", default_value_t = 8, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// SMTP port on the MX host
    #[arg(long, default_value_t = 25)]
    pub port: u16,

    /// name sent with EHLO/HELO
    #[arg(long)]
    pub helo: Option<String>,

    /// MAIL FROM envelope sender
    #[arg(long = "from")]
    pub mail_from: Option<String>,

    /// addresses checked in parallel (output order is kept)
    #[arg(long, default_value_t = 1)]
    pub workers: usize,

    /// more logs on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn probe_options(&self) -> ProbeOptions {
        let mut options = ProbeOptions {
            port: self.port,
            timeout: Duration::from_secs(self.timeout_secs),
            ..ProbeOptions::default()
        };
        if let Some(helo) = &self.helo {
            options.helo_domain = helo.clone();
        }
        if let Some(from) = &self.mail_from {
            options.envelope_sender = from.clone();
        }
        options
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            workers: self.workers,
        }
    }

    /// File lines first, then positional addresses.
    pub fn raw_inputs(&self) -> Result<Vec<String>> {
        let mut raw = Vec::new();
        if let Some(path) = &self.file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("read {}", path.display()))?;
            raw.extend(content.lines().map(str::to_string));
        }
        raw.extend(self.emails.iter().cloned());
        Ok(raw)
    }
}
