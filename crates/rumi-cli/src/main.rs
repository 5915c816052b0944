//! `runner`: the CLI entrypoint wiring the rumi video fusion pipeline (§6).

use clap::Parser;
use rumi_cli::pipeline::{progress, progress_done, progress_failed};
use rumi_cli::{Acquisition, Cli, CliError, Command, Settings, UnavailableAcquisition};
use rumi_core::WarningCounters;
use rumi_llm::HttpSendPrompt;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider().install_default().expect("failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive("rumi=info".parse().unwrap()))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    let exit_code = match run(cli, &settings).await {
        Ok(()) => 0,
        Err(err) => {
            error!(error = %err, "runner failed");
            progress_failed("pipeline", &err.to_string());
            err.exit_code()
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli, settings: &Settings) -> rumi_cli::CliResult<()> {
    info!(data_dir = %cli.data_dir.display(), "starting runner");

    let (metadata, ml_results, warnings) = match cli.command {
        Command::Id { video_id } => {
            progress("loading pre-populated analyzer outputs", 5);
            let metadata = rumi_cli::raw_inputs::load_metadata(&cli.data_dir, &video_id)
                .await
                .map_err(|err| CliError::InvalidArguments(format!("no pre-populated raw output for video_id {video_id}: {err}")))?;
            let mut warnings = WarningCounters::new();
            let ml_results = rumi_cli::raw_inputs::load_ml_results(&cli.data_dir, &video_id, &mut warnings).await;
            (metadata, ml_results, warnings)
        }
        Command::Url { url } => {
            progress("acquiring video and running ML analyzers", 5);
            let acquisition = UnavailableAcquisition;
            let (metadata, ml_results) = acquisition.acquire(&url).await.map_err(CliError::ExternalApi)?;
            (metadata, ml_results, WarningCounters::new())
        }
    };

    if metadata.duration_seconds > settings.max_video_duration {
        return Err(CliError::InvalidArguments(format!(
            "video duration {:.1}s exceeds MAX_VIDEO_DURATION {:.1}s",
            metadata.duration_seconds, settings.max_video_duration
        )));
    }

    let api_key = settings.claude_api_key.clone().ok_or_else(|| CliError::MissingCredential("CLAUDE_API_KEY".to_string()))?;
    let capability = HttpSendPrompt::new(api_key);
    let summary = rumi_cli::pipeline::run(&cli.data_dir, settings, metadata, ml_results, warnings, capability).await?;
    progress_done(&format!("pipeline complete for {}", summary.video_id));

    let strict_fatal = settings.strict_mode && (summary.warnings.contains_key("InputShape") || summary.warnings.contains_key("SchemaViolation"));

    println!("{}", serde_json::to_string(&summary).expect("summary is always serializable"));

    if strict_fatal {
        return Err(CliError::MlPipeline("strict mode: InputShape or SchemaViolation warnings were recorded".to_string()));
    }

    Ok(())
}
