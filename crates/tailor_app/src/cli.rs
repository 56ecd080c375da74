use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "tailor", version, about = "Tailor one résumé against a batch of job postings")]
pub struct Cli {
    /// RON config file (defaults to ./tailor.ron when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the processing service.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Bearer token passed through to the service.
    #[arg(long, global = true, env = "TAILOR_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Log level: error, warn, info, debug or trace.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also log to the terminal.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a batch and wait for the tailored résumés.
    Run(RunArgs),
    /// List recent batch jobs known to the service.
    Jobs,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Résumé as plain text (.txt, .md) or a document the service extracts (.pdf, .docx).
    #[arg(long, short)]
    pub resume: PathBuf,

    /// Job posting URL; repeat for several postings.
    #[arg(long = "url", short = 'u')]
    pub urls: Vec<String>,

    /// File with one job posting URL per line.
    #[arg(long)]
    pub urls_file: Option<PathBuf>,

    /// Directory receiving the tailored résumés and manifest.
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,

    /// Tailoring intensity passed to the service (e.g. light, heavy).
    #[arg(long)]
    pub mode: Option<String>,

    /// Output format requested from the service (e.g. docx, pdf).
    #[arg(long)]
    pub format: Option<String>,

    #[arg(long)]
    pub no_rag: bool,

    #[arg(long)]
    pub compare_versions: bool,

    /// Download a PDF for every tailored résumé and cover letter.
    #[arg(long)]
    pub export_pdf: bool,

    /// Download one ZIP archive with every tailored résumé.
    #[arg(long)]
    pub export_zip: bool,
}

impl Cli {
    /// Command-line flags win over the config file.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(token) = &self.api_token {
            config.api_token = Some(token.clone());
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Command::Run(run) = &self.command {
            run.apply_to(config);
        }
    }
}

impl RunArgs {
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(mode) = &self.mode {
            config.options.tailoring_mode = mode.clone();
        }
        if let Some(format) = &self.format {
            config.options.output_format = format.clone();
        }
        if self.no_rag {
            config.options.use_rag = false;
        }
        if self.compare_versions {
            config.options.compare_versions = true;
        }
    }
}
