use std::{process, sync::Arc};

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

use tilebridge::{
    config::{self, Command, RenderArgs, Settings},
    dispatch::{Dispatcher, SubmitError},
    domain::Map,
    infra::telemetry::{self, TelemetryError},
    render::{RenderError, WireTileRenderer},
};

#[derive(Debug, Error)]
enum AppError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::LoadError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to build runtime: {0}")]
    Runtime(std::io::Error),
    #[error("failed to read map `{path}`: {source}")]
    ReadMap {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse map `{path}`: {source}")]
    ParseMap {
        path: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("completion channel closed before delivering a result")]
    CompletionLost,
    #[error("failed to write tile `{path}`: {source}")]
    WriteTile {
        path: String,
        source: std::io::Error,
    },
}

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

fn run() -> Result<(), AppError> {
    let (cli, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    let Command::Render(args) = cli.command;
    run_render(settings, args)
}

fn run_render(settings: Settings, args: RenderArgs) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(settings.dispatch.max_render_workers.get())
        .build()
        .map_err(AppError::Runtime)?;

    runtime.block_on(async move {
        let raw = tokio::fs::read_to_string(&args.map)
            .await
            .map_err(|source| AppError::ReadMap {
                path: args.map.display().to_string(),
                source,
            })?;
        let map: Map = serde_json::from_str(&raw).map_err(|source| AppError::ParseMap {
            path: args.map.display().to_string(),
            source,
        })?;
        let map = Arc::new(map);

        let bridge = Dispatcher::new(Arc::new(WireTileRenderer));
        let (result_tx, result_rx) = oneshot::channel();
        let job_id = bridge.submit_render(
            Arc::clone(&map),
            Box::new(move |result| {
                let _ = result_tx.send(result);
            }),
        )?;
        info!(job_id = %job_id, map_id = %map.id, map = %map.name, "render submitted");

        let tile = result_rx.await.map_err(|_| AppError::CompletionLost)??;
        tokio::fs::write(&args.out, &tile)
            .await
            .map_err(|source| AppError::WriteTile {
                path: args.out.display().to_string(),
                source,
            })?;
        info!(bytes = tile.len(), out = %args.out.display(), "tile written");

        Ok(())
    })
}
