use std::process::ExitCode;
use std::sync::Arc;

use tokio::task::LocalSet;

use route_server::config::Config;
use route_server::server::{start_signal_handler, RequestServer, ServerSettings, SignalHandler};
use route_server::{files, handler, logger};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&format!("Fatal: {e}"));
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = Config::load_from(&config_path)?;

    logger::init(&cfg)?;
    logger::log_config(&cfg);

    // Handlers and connections are local tasks, so a single-threaded
    // runtime driving a LocalSet is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    LocalSet::new().block_on(&runtime, async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    prepare_files(&cfg).await;

    let site = RequestServer::listen(
        cfg.site_addr()?,
        handler::site_router(&cfg.files)?,
        ServerSettings::from_config("site", &cfg),
    )?;
    let greeting = RequestServer::listen(
        cfg.greeting_addr()?,
        handler::greeting_router(cfg.logging.show_headers),
        ServerSettings::from_config("greeting", &cfg),
    )?;

    let signals = Arc::new(SignalHandler::new());
    start_signal_handler(Arc::clone(&signals));

    let (site_result, greeting_result) = tokio::join!(
        site.run(signals.wait()),
        greeting.run(signals.wait()),
    );
    site_result?;
    greeting_result?;

    logger::log_info("[SHUTDOWN] Servers stopped");
    Ok(())
}

/// Write the stylesheet and report on the image file
///
/// Failures are logged and never stop the servers.
async fn prepare_files(cfg: &Config) {
    let files = &cfg.files;

    match files::write_static(&files.stylesheet_path, &files.stylesheet_content).await {
        Ok(()) => logger::log_file_written(&files.stylesheet_path),
        Err(e) => logger::log_error(&format!("Could not write stylesheet: {e}")),
    }

    match files::read_status(&files.image_path).await {
        Ok(meta) => logger::log_file_status(&files.image_path, &meta),
        Err(e) => logger::log_error(&format!("Could not read file status: {e}")),
    }
}
