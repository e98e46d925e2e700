#![warn(missing_docs)]
//! # ingredient-scan binary
//!
//! Submits product label images to the ingredient classifier and prints the
//! report of the most recent submission.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use ingredient_scan_app::{
    AppConfig, AppError, HttpClassifierTransport, RequestCoordinator, app_version, build_client,
    check_connectivity, init_tracing,
};
use ingredient_scan_report::{NoopExporter, ReportExporter, render_text};
use ingredient_scan_ui::SharedRenderState;
use ingredient_scan_upload::ImageUpload;

/// Command-line arguments. Flags override the environment.
#[derive(Debug, Parser)]
#[command(name = "ingredient-scan", version = ingredient_scan_app::APP_VERSION)]
#[command(about = "Analyze a product's ingredient label photo")]
struct Cli {
    /// Classifier base URL (overrides INGREDIENT_SCAN_API_URL).
    #[arg(long)]
    endpoint: Option<String>,

    /// Skip the startup liveness probe.
    #[arg(long)]
    no_probe: bool,

    /// Print the report as a JSON snapshot instead of text.
    #[arg(long)]
    json: bool,

    /// Hand the final report to the exporter.
    #[arg(long)]
    export: bool,

    /// Label images, submitted in order; only the last one's report is shown.
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

/// CLI entry point.
fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(stage = "startup", action = "run", error = %error, "ingredient-scan failed");
            eprintln!("ingredient-scan: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let mut config = AppConfig::from_env()?;
    if let Some(endpoint) = cli.endpoint {
        config = AppConfig::new(endpoint, config.probe_on_start)?;
    }
    if cli.no_probe {
        config.probe_on_start = false;
    }

    tracing::info!(
        stage = "startup",
        action = "configure",
        version = app_version(),
        endpoint = %config.endpoint,
        "ingredient-scan starting"
    );

    let client = build_client(&config, Arc::new(HttpClassifierTransport::new()?))?;
    if config.probe_on_start {
        check_connectivity(&client);
    }

    let mut uploads = Vec::with_capacity(cli.images.len());
    for path in &cli.images {
        match ImageUpload::from_path(path) {
            Ok(upload) => uploads.push(upload),
            Err(error) => {
                tracing::error!(stage = "input", action = "read_image", error = %error, "image skipped");
                eprintln!("skipping {}: {error}", path.display());
            }
        }
    }

    let render_state = Arc::new(SharedRenderState::new(app_version()));
    let coordinator = RequestCoordinator::new(render_state.clone());

    if uploads.is_empty() {
        // Surfaces the "no file selected" prompt through the normal path.
        let _ = coordinator.begin(None);
    }

    // Tickets are issued in argument order; replies may land in any order.
    std::thread::scope(|scope| {
        for upload in &uploads {
            let Ok(ticket) = coordinator.begin(Some(upload)) else {
                continue;
            };
            let client = &client;
            let coordinator = &coordinator;
            scope.spawn(move || {
                let outcome = client.analyze(upload);
                coordinator.resolve(ticket, outcome);
            });
        }
    });

    let state = render_state.snapshot();
    if let Some(prompt) = state.prompt.filter(|_| state.rendered_generation.is_none()) {
        eprintln!("{prompt}");
        return Ok(ExitCode::FAILURE);
    }

    match (state.report, state.error) {
        (Some(report), _) => {
            if cli.json {
                let bytes = report.to_json_bytes()?;
                println!("{}", String::from_utf8_lossy(&bytes));
            } else {
                println!("{}", render_text(&report));
            }
            if cli.export {
                NoopExporter.export(&report)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        (None, Some(error)) => {
            eprintln!("{error}");
            Ok(ExitCode::FAILURE)
        }
        (None, None) => Ok(ExitCode::FAILURE),
    }
}
