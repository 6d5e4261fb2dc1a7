use std::io::Write;

use anyhow::{Context, Result, bail};

use crate::args::Cli;
use mailprobe_lib::{ProbeOutcome, VerificationResult};

/// Render `rows` in the requested format, then send them to `--out` or stdout.
pub fn write_reports(rows: &[VerificationResult], cli: &Cli) -> Result<()> {
    let rendered = match cli.format.as_str() {
        "human" => render_human(rows),
        "json" => render_json(rows)?,
        "ndjson" => render_ndjson(rows)?,
        "csv" => render_csv(rows)?,
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    };
    match &cli.out {
        Some(path) => write_all_atomically(path, &rendered),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&rendered).context("write stdout")?;
            stdout.flush().context("flush stdout")
        }
    }
}

pub fn any_not_valid(rows: &[VerificationResult]) -> bool {
    rows.iter().any(|row| !row.is_valid())
}

fn label(outcome: ProbeOutcome) -> &'static str {
    match outcome {
        ProbeOutcome::Valid => "[OK]",
        ProbeOutcome::Invalid => "[INVALID]",
        ProbeOutcome::Undetermined => "[UNKNOWN]",
    }
}

fn render_human(rows: &[VerificationResult]) -> Vec<u8> {
    rows.iter()
        .map(|row| format!("{:<11} {} :: {}\n", label(row.outcome), row.email, row.reason))
        .collect::<String>()
        .into_bytes()
}

#[cfg(feature = "with-serde")]
fn render_json(rows: &[VerificationResult]) -> Result<Vec<u8>> {
    let mut out = serde_json::to_vec_pretty(rows)?;
    out.push(b'\n');
    Ok(out)
}

#[cfg(feature = "with-serde")]
fn render_ndjson(rows: &[VerificationResult]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.push(b'\n');
    }
    Ok(out)
}

#[cfg(not(feature = "with-serde"))]
fn render_json(_: &[VerificationResult]) -> Result<Vec<u8>> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(not(feature = "with-serde"))]
fn render_ndjson(_: &[VerificationResult]) -> Result<Vec<u8>> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-csv")]
fn render_csv(rows: &[VerificationResult]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["email", "valid", "undetermined", "outcome", "reason"])?;
    for row in rows {
        wtr.write_record([
            row.email.clone(),
            row.is_valid().to_string(),
            row.is_undetermined().to_string(),
            row.outcome.to_string(),
            row.reason.to_string(),
        ])?;
    }
    wtr.into_inner().context("finish csv")
}

#[cfg(not(feature = "with-csv"))]
fn render_csv(_: &[VerificationResult]) -> Result<Vec<u8>> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

// tmp file + rename: a reader never sees a half-written report
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    let tmp = format!("{path}.tmp");
    let mut file = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))
}
