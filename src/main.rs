use anyhow::Result;
use auto_translator::config::Config;
use auto_translator::gateway::TranslationGateway;
use auto_translator::openai::OpenAiGenerator;
use auto_translator::runner::{Decision, Runner};
use auto_translator::settings::Settings;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file (ignored in CI)
    let _ = dotenvy::dotenv();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("An error has occurred: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("auto_translator=info".parse()?),
        )
        .init();
    Ok(())
}

async fn run() -> Result<()> {
    info!("Starting translation run");

    let config = Config::from_env()?;
    let settings = Settings::from_config(&config);
    let gateway = TranslationGateway::new(OpenAiGenerator::new(reqwest::Client::new(), &config));
    let runner = Runner::new(&settings, &gateway);

    if config.dry_run {
        info!("Dry run: nothing will be translated or recorded");
        for (filename, decision) in runner.plan()? {
            match decision {
                Decision::Excluded => info!("{}: excluded", filename),
                Decision::AlreadyRecorded => info!("{}: already in ledger", filename),
                Decision::Translate { reason, languages } => {
                    let codes: Vec<_> = languages.iter().map(|l| l.code).collect();
                    info!("{}: {:?} -> {}", filename, reason, codes.join(", "))
                }
            }
        }
        return Ok(());
    }

    let summary = runner.run().await?;
    info!(
        "Translated {} documents into {} files, {} new ledger entries",
        summary.translated.len(),
        summary.outputs.len(),
        summary.recorded
    );

    Ok(())
}
