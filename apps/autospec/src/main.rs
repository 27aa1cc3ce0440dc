//! autospec - Generate RPM spec files from upstream source archives
//!
//! This is the CLI application; the pipeline itself lives in the ops crate.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, DraftArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use autospec_config::Config;
use autospec_events::EventReceiver;
use autospec_ops::{DraftRequest, ExtraArchive, OperationResult, OpsContextBuilder, OpsCtx};
use autospec_types::ColorChoice;
use clap::Parser;
use console::style;
use std::path::{Path, PathBuf};
use std::process;
use tokio::select;
use tracing::{error, info};

/// What the command line asked for
enum Operation {
    Draft(DraftRequest),
    LogCheck(PathBuf),
}

fn main() {
    let cli = Cli::parse();
    let color = cli.global.color;

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => fatal(color, &CliError::Io(e)),
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        error!("Application error: {}", e);
        fatal(color, &e);
    }
}

fn fatal(color: Option<ColorChoice>, e: &CliError) -> ! {
    let colors = match color.unwrap_or_default() {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let label = if colors {
        style("FATAL").red().bold().force_styling(true).to_string()
    } else {
        "FATAL".to_string()
    };
    eprintln!("{label}: {e}");
    process::exit(1);
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    // Configuration precedence: file (or defaults), environment, CLI flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli);

    let operation = operation_from_cli(cli.command, cli.draft)?;
    init_tracing(cli.global.debug, &log_dir(&operation, &config));
    info!("Starting autospec v{}", env!("CARGO_PKG_VERSION"));

    let (event_sender, event_receiver) = autospec_events::channel();
    let ops_ctx = OpsContextBuilder::new()
        .with_event_sender(event_sender)
        .with_config(config.clone())
        .build()?;

    let renderer = OutputRenderer::new(cli.global.json, config.general.color);
    let mut event_handler = EventHandler::new(renderer.colors_enabled(), cli.global.debug);

    let result =
        execute_command_with_events(operation, ops_ctx, event_receiver, &mut event_handler)
            .await?;

    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if let Some(color) = cli.global.color {
        config.general.color = color;
    }
    if cli.draft.no_pypi {
        config.metadata.pypi = false;
    }
    if cli.draft.whatrequires {
        config.metadata.whatrequires = true;
    }
}

fn operation_from_cli(command: Option<Commands>, args: DraftArgs) -> Result<Operation, CliError> {
    if let Some(Commands::Logcheck { pkg_dir }) = command {
        return Ok(Operation::LogCheck(pkg_dir));
    }

    let Some(url) = args.url else {
        return Err(CliError::Usage(
            "a source archive URL is required".to_string(),
        ));
    };

    let archives = args
        .archives
        .chunks(2)
        .map(|pair| match pair {
            [url, destination] => Ok(ExtraArchive {
                url: url.clone(),
                destination: destination.clone(),
            }),
            _ => Err(CliError::Usage(
                "--archives takes a URL and a destination".to_string(),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Operation::Draft(DraftRequest {
        url,
        recipes: args.recipes,
        output: args.output,
        name: args.name,
        version: args.version,
        archives,
        pypi: !args.no_pypi,
        whatrequires: args.whatrequires,
        build: args.build,
    }))
}

/// Debug logs go into the package directory when it is known up front
fn log_dir(operation: &Operation, config: &Config) -> PathBuf {
    match operation {
        Operation::LogCheck(pkg_dir) => pkg_dir.clone(),
        Operation::Draft(request) => request.output.clone().unwrap_or_else(|| {
            let name = request
                .name
                .clone()
                .unwrap_or_else(|| autospec_drafter::classify(&request.url).name);
            config.package_dir(&name)
        }),
    }
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    operation: Operation,
    ops_ctx: OpsCtx,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(operation, ops_ctx));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

async fn execute_command(operation: Operation, ctx: OpsCtx) -> Result<OperationResult, CliError> {
    match operation {
        Operation::Draft(request) => {
            let url = request.url.clone();
            let report = autospec_ops::draft(&ctx, request)
                .await
                .map_err(|source| CliError::Draft { url, source })?;
            Ok(OperationResult::Draft(report))
        }
        Operation::LogCheck(pkg_dir) => {
            let report = autospec_ops::logcheck(&ctx, &pkg_dir)
                .await
                .map_err(|source| CliError::LogCheck { pkg_dir, source })?;
            Ok(OperationResult::LogCheck(report))
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(debug_enabled: bool, log_dir: &Path) {
    if debug_enabled {
        // Debug mode: structured JSON logs to file
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!("Warning: Failed to create log directory: {e}");
        }

        let log_file = log_dir.join(format!(
            "autospec-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| tracing_subscriber::EnvFilter::new("info,autospec=debug"),
                        ),
                    )
                    .init();

                eprintln!("Debug logging enabled: {}", log_file.display());
                return;
            }
            Err(e) => eprintln!("Warning: Failed to create log file: {e}"),
        }
    }

    // Normal mode: events are already rendered, keep stderr for the rest
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("warn,autospec::events=off")
            }),
        )
        .init();
}
