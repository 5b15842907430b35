//! Deploy Notifier - Entry Point
//!
//! Starts or observes an AWS build/deployment and streams its progress into
//! a single Slack message, finishing with a threaded summary.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use secrecy::SecretString;

use deploy_notifier::app::cli::{BuildArgs, Cli, Command, CommonArgs, DeployArgs};
use deploy_notifier::app::options::{DeployOptions, RunOptions};
use deploy_notifier::app::run::{run_build, run_deploy};
use deploy_notifier::app::settings::{load_settings, Settings};
use deploy_notifier::control::AwsCli;
use deploy_notifier::errors::NotifierError;
use deploy_notifier::logs::{init_logging, LogLevel, LogOptions};
use deploy_notifier::sink::{MessageSink, SlackClient, StdoutSink};
use deploy_notifier::utils::version_info;
use deploy_notifier::workers::poller::Outcome;

use tracing::{error, info, warn};

const EXIT_JOB_FAILED: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

/// A job to follow
enum Job {
    Build(BuildArgs),
    Deploy(DeployArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let job = match cli.command {
        Command::Build(args) => Job::Build(args),
        Command::Deploy(args) => Job::Deploy(args),
        Command::Version => {
            match serde_json::to_string_pretty(&version_info()) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize version info: {e}"),
            }
            return ExitCode::SUCCESS;
        }
    };

    // Retrieve the settings file
    let settings = match &cli.config {
        Some(path) => match load_settings(path).await {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Unable to read settings file: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    // Initialize logging
    let log_level = match cli.log_level.as_deref().map(str::parse::<LogLevel>) {
        Some(Ok(level)) => level,
        Some(Err(e)) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
        None => settings.log_level.clone(),
    };
    let log_options = LogOptions {
        log_level,
        log_dir: cli.log_dir.clone(),
        json_format: cli.log_json,
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    tokio::select! {
        result = execute(job, settings) => match result {
            Ok(outcome) if outcome.succeeded => {
                info!("Done: {}", outcome.status);
                ExitCode::SUCCESS
            }
            Ok(outcome) => {
                warn!("Job ended with status {}", outcome.status);
                ExitCode::from(EXIT_JOB_FAILED)
            }
            Err(e) => {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
        _ = await_shutdown_signal() => {
            warn!("Interrupted; the Slack message keeps its last state");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn execute(job: Job, settings: Settings) -> anyhow::Result<Outcome> {
    match job {
        Job::Build(args) => {
            let options = RunOptions::resolve(&args.common, &settings).context("Invalid options")?;
            let sink = make_sink(&args.common, &settings)?;
            let aws = AwsCli::new(&settings.aws.binary, &options.region);

            info!("Following build of {} in {}", options.project, options.channel);
            let outcome = run_build(&aws, &aws, sink, &options, tokio::time::sleep)
                .await
                .context("Build run failed")?;
            Ok(outcome)
        }
        Job::Deploy(args) => {
            let options = RunOptions::resolve(&args.common, &settings).context("Invalid options")?;
            let deploy = DeployOptions::resolve(&args, &settings).context("Invalid deploy options")?;
            let sink = make_sink(&args.common, &settings)?;
            let aws = AwsCli::new(&settings.aws.binary, &options.region);

            info!(
                "Following deployment of {} / {} in {}",
                options.project, deploy.deployment_group, options.channel
            );
            let outcome = run_deploy(&aws, &aws, sink, &options, &deploy, tokio::time::sleep)
                .await
                .context("Deploy run failed")?;
            Ok(outcome)
        }
    }
}

fn make_sink(args: &CommonArgs, settings: &Settings) -> Result<Arc<dyn MessageSink>, NotifierError> {
    if args.dry_run {
        return Ok(Arc::new(StdoutSink::new()));
    }

    let token = args
        .slack_token
        .clone()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| NotifierError::ConfigError("--slack-token or SLACK_TOKEN is required".to_string()))?;
    let client = SlackClient::new(&settings.slack.base_url, SecretString::from(token))?;
    Ok(Arc::new(client))
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (mut sigterm, mut sigint) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            _ => {
                error!("Unable to install signal handlers");
                return std::future::pending().await;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_err() {
            return std::future::pending().await;
        }
        info!("Ctrl+C received, shutting down...");
    }
}
