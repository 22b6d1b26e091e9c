use std::io::Write;

use anyhow::{Context, Result, bail};

use crate::args::Cli;
use mailprobe::EmailCheckResult;
#[cfg(feature = "with-csv")]
use mailprobe::{SmtpCheck, SmtpVerdict};

/// Renders the report in `--format` and sends it to `--out` or stdout.
pub fn write_reports(rows: &[EmailCheckResult], cli: &Cli) -> Result<()> {
    let report = render(rows, &cli.format)?;
    match &cli.out {
        Some(path) => write_all_atomically(path, &report),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&report)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn render(rows: &[EmailCheckResult], format: &str) -> Result<Vec<u8>> {
    match format {
        "human" => Ok(render_human(rows)),
        "json" => render_json(rows),
        "ndjson" => render_ndjson(rows),
        "csv" => render_csv(rows),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

fn render_human(rows: &[EmailCheckResult]) -> Vec<u8> {
    let mut out = String::new();
    for row in rows {
        out.push_str(&row.to_string());
        out.push('\n');
    }
    out.into_bytes()
}

#[cfg(feature = "with-serde")]
fn render_json(rows: &[EmailCheckResult]) -> Result<Vec<u8>> {
    let mut out = serde_json::to_vec_pretty(rows)?;
    out.push(b'\n');
    Ok(out)
}

#[cfg(not(feature = "with-serde"))]
fn render_json(_: &[EmailCheckResult]) -> Result<Vec<u8>> {
    bail!("format=json requires the 'with-serde' feature")
}

#[cfg(feature = "with-serde")]
fn render_ndjson(rows: &[EmailCheckResult]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.push(b'\n');
    }
    Ok(out)
}

#[cfg(not(feature = "with-serde"))]
fn render_ndjson(_: &[EmailCheckResult]) -> Result<Vec<u8>> {
    bail!("format=ndjson requires the 'with-serde' feature")
}

#[cfg(feature = "with-csv")]
fn render_csv(rows: &[EmailCheckResult]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["email", "status", "mx_hosts", "smtp", "smtp_code", "smtp_detail"])?;
    for row in rows {
        wtr.write_record(csv_record(row))?;
    }
    Ok(wtr.into_inner()?)
}

#[cfg(not(feature = "with-csv"))]
fn render_csv(_: &[EmailCheckResult]) -> Result<Vec<u8>> {
    bail!("format=csv requires the 'with-csv' feature")
}

#[cfg(feature = "with-csv")]
fn csv_record(row: &EmailCheckResult) -> [String; 6] {
    let smtp = match row.smtp() {
        SmtpCheck::Skipped => "skipped",
        SmtpCheck::Probed(SmtpVerdict::Accepted(_)) => "accepted",
        SmtpCheck::Probed(SmtpVerdict::Rejected(_)) => "rejected",
        SmtpCheck::Probed(SmtpVerdict::Ambiguous(_)) => "ambiguous",
        SmtpCheck::Probed(SmtpVerdict::HandshakeError { .. }) => "handshake-error",
    };
    let verdict = row.smtp().verdict();
    [
        row.email().to_string(),
        row.status().to_string(),
        row.mx_hosts().join(";"),
        smtp.to_string(),
        verdict
            .and_then(SmtpVerdict::code)
            .map(|code| code.to_string())
            .unwrap_or_default(),
        verdict
            .map(|v| v.message().replace('\n', " "))
            .unwrap_or_default(),
    ]
}

fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
