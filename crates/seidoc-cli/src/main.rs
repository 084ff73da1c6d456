//! seidoc CLI

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use seidoc::plugins::Plugin;
use seidoc::ocr::{PdftoppmRasterizer, TesseractCliBackend};
use seidoc::retrieval::WebDriverSession;
use seidoc::{
    Credentials, EphemeralSealer, ExtractedRecord, NationalIdentifier, Pipeline, PipelineConfig, RetrievalOrchestrator,
    SecretSealer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const USERNAME_ENV: &str = "SEIDOC_USERNAME";
const PASSWORD_ENV: &str = "SEIDOC_PASSWORD";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Labeled lines, as used on generated notices
    Text,
    /// The full record as JSON
    Json,
}

#[derive(Parser)]
#[command(name = "seidoc")]
#[command(version, about = "Retrieve SEI process PDFs and extract notification data", long_about = None)]
struct Cli {
    /// Config file (.toml, .yaml, .yml or .json). Defaults to a discovered seidoc.toml.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a record from a local PDF
    Extract {
        /// PDF file; its name is used to derive the process number
        file: PathBuf,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Skip the text layer and OCR every page
        #[arg(long)]
        force_ocr: bool,

        /// Keep diacritics in the normalized text
        #[arg(long)]
        keep_accents: bool,
    },

    /// Log in to the portal, download a process PDF and extract it
    Retrieve {
        /// Process number as typed into the portal search
        process_number: String,

        /// Portal user. Falls back to $SEIDOC_USERNAME. The password is read from $SEIDOC_PASSWORD.
        #[arg(short, long)]
        username: Option<String>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Show the browser window
        #[arg(long)]
        headful: bool,

        /// WebDriver endpoint, overriding the config
        #[arg(long)]
        webdriver_url: Option<String>,
    },

    /// Validate a CPF or CNPJ checksum
    Check {
        #[arg(value_enum)]
        kind: IdentifierArg,

        /// Digits, with or without punctuation
        value: String,
    },

    /// Validate the configuration and check that OCR tools are installed
    Doctor,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum IdentifierArg {
    Cpf,
    Cnpj,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("seidoc=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract {
            file,
            format,
            force_ocr,
            keep_accents,
        } => {
            config.strategy.force_ocr |= force_ocr;
            config.strip_accents &= !keep_accents;

            let pipeline = Pipeline::new(config);
            let record = pipeline
                .extract_file(&file)
                .await
                .with_context(|| format!("extracting {}", file.display()))?;
            print_record(&record, format)
        }

        Commands::Retrieve {
            process_number,
            username,
            format,
            headful,
            webdriver_url,
        } => {
            if headful {
                config.browser.headless = false;
            }
            if let Some(url) = webdriver_url {
                config.browser.webdriver_url = url;
            }

            let username = match username {
                Some(user) => user,
                None => std::env::var(USERNAME_ENV).with_context(|| format!("no --username and ${} unset", USERNAME_ENV))?,
            };
            let password = std::env::var(PASSWORD_ENV).with_context(|| format!("${} must hold the portal password", PASSWORD_ENV))?;

            let sealer: Arc<dyn SecretSealer> = Arc::new(EphemeralSealer::new()?);
            let credentials = Credentials::seal(sealer.as_ref(), &username, &password)?;
            drop(password);

            let orchestrator = RetrievalOrchestrator::new(config.portal.clone(), Arc::clone(&sealer));
            let mut session = WebDriverSession::start(&config.browser)
                .await
                .context("starting browser session")?;

            let pipeline = Pipeline::new(config);
            let record = pipeline
                .retrieve_and_extract(&orchestrator, &mut session, &credentials, &process_number)
                .await
                .with_context(|| format!("retrieving process {}", process_number))?;
            print_record(&record, format)
        }

        Commands::Check { kind, value } => {
            let identifier = match kind {
                IdentifierArg::Cpf => NationalIdentifier::cpf(&value),
                IdentifierArg::Cnpj => NationalIdentifier::cnpj(&value),
            };
            match identifier {
                Some(id) => {
                    println!("{}: valid", id);
                    Ok(())
                }
                None => bail!("{:?} {} fails its checksum", kind, value),
            }
        }

        Commands::Doctor => {
            config.validate()?;
            println!("config: ok");

            let tesseract = TesseractCliBackend::new(config.ocr.tesseract_path.clone(), config.ocr.process_timeout_secs);
            let pdftoppm = PdftoppmRasterizer::new(config.ocr.pdftoppm_path.clone(), config.ocr.process_timeout_secs);
            let mut missing = 0;
            for plugin in [&tesseract as &dyn Plugin, &pdftoppm as &dyn Plugin] {
                match plugin.initialize() {
                    Ok(()) => println!("{}: ok", plugin.name()),
                    Err(e) => {
                        missing += 1;
                        println!("{}: {}", plugin.name(), e);
                    }
                }
            }
            if missing > 0 {
                bail!("{} OCR tool(s) unavailable; scanned documents cannot be read", missing);
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::discover()?.unwrap_or_default(),
    };
    tracing::debug!(
        explicit = path.is_some(),
        force_ocr = config.strategy.force_ocr,
        dpi = config.ocr.dpi,
        "configuration loaded"
    );
    Ok(config)
}

fn print_record(record: &ExtractedRecord, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", record),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
    }
    Ok(())
}
