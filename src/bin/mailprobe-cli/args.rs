use clap::{Args, Parser, Subcommand};
use mailprobe_lib::VerifierOptions;

#[derive(Parser)]
#[command(name = "mailprobe-cli", about = "Vérifie l'existence de boîtes mail via SMTP (sans envoi)")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    #[command(flatten)]
    pub probe: ProbeArgs,

    /// format: human|json|ndjson|csv
    #[arg(long, global = true, default_value = "human")]
    pub format: String,

    /// write report to file (JSON/NDJSON/CSV selon --format)
    #[arg(long, global = true)]
    pub out: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// teste une seule adresse
    Verify { email: String },
    /// teste plusieurs adresses (arguments et/ou stdin)
    Batch {
        emails: Vec<String>,
        /// lit des adresses depuis stdin (une par ligne)
        #[arg(long)]
        stdin: bool,
    },
}

#[derive(Args)]
pub struct ProbeArgs {
    /// timeout par connexion (ms)
    #[arg(long = "timeout", global = true, default_value_t = 5_000)]
    pub timeout_ms: u64,
    /// enveloppe MAIL FROM (par défaut l'adresse testée)
    #[arg(long = "from", global = true)]
    pub mail_from: Option<String>,
    /// nom utilisé pour EHLO (par défaut le domaine de l'expéditeur)
    #[arg(long, global = true)]
    pub helo: Option<String>,
    /// tentatives par MX sur erreur temporaire
    #[arg(long = "max-attempts", global = true, default_value_t = 3)]
    pub max_attempts: u32,
    /// délai de base du backoff exponentiel (ms)
    #[arg(long = "backoff", global = true, default_value_t = 1_000)]
    pub backoff_ms: u64,
    /// connexions SMTP simultanées (toutes adresses confondues)
    #[arg(long = "probe-concurrency", global = true, default_value_t = 10)]
    pub probe_concurrency: usize,
    /// adresses vérifiées simultanément
    #[arg(long = "batch-concurrency", global = true, default_value_t = 10)]
    pub batch_concurrency: usize,
    /// nombre maximum d'MX interrogés
    #[arg(long = "max-mx", global = true)]
    pub max_mx: Option<usize>,
    /// motif (regex) de refus pour réputation/blocklist; répétable, remplace les défauts
    #[arg(long = "block-pattern", global = true)]
    pub block_patterns: Vec<String>,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

impl ProbeArgs {
    pub fn to_options(&self) -> VerifierOptions {
        let mut options = VerifierOptions {
            timeout_ms: self.timeout_ms,
            mail_from: self.mail_from.clone(),
            helo_domain: self.helo.clone(),
            probe_concurrency: self.probe_concurrency,
            batch_concurrency: self.batch_concurrency,
            max_mx: self.max_mx,
            ..VerifierOptions::default()
        };
        options.retry.max_attempts = self.max_attempts;
        options.retry.base_delay_ms = self.backoff_ms;
        if !self.block_patterns.is_empty() {
            options.policy_patterns = self.block_patterns.clone();
        }
        options
    }
}
