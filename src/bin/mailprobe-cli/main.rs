mod args;
mod output;

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands};
use mailprobe_lib::Verifier;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn read_stdin_addresses() -> Result<Vec<String>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = Vec::new();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
    }
    Ok(out)
}

// codes de sortie : 0 tout valide, 2 au moins une adresse non valide, 1 fatal
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let verifier = Verifier::from_system_conf(cli.probe.to_options())
        .context("initialise verifier")?;

    let rows = match &cli.cmd {
        Commands::Verify { email } => {
            vec![verifier.check_email_existence(email, None, None).await]
        }
        Commands::Batch { emails, stdin } => {
            let mut emails = emails.clone();
            if *stdin {
                emails.extend(read_stdin_addresses().await?);
            }
            if emails.is_empty() {
                bail!("no address given (arguments or --stdin)");
            }
            verifier.check_multiple_emails(emails, None, None).await
        }
    };

    output::write_reports(&rows, &cli)?;

    if output::any_not_valid(&rows) {
        std::process::exit(2);
    }
    Ok(())
}
