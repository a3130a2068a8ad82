use clap::Parser;
use kopy_watch::{Cli, Controller};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.worker {
        return run_worker(&cli);
    }

    if cli.once {
        kopy_watch::logging::init(&worker_log_path(&cli.config), cli.verbose)?;
        kopy_watch::controller::Controller::run_once(&cli.config)?;
        return Ok(());
    }

    kopy_watch::logging::init(&supervisor_log_path(), cli.verbose)?;
    kopy_watch::supervisor::run(&cli.config, cli.verbose)?;
    Ok(())
}

fn run_worker(cli: &Cli) -> anyhow::Result<()> {
    kopy_watch::resources::apply_caps();
    kopy_watch::logging::init(&worker_log_path(&cli.config), cli.verbose)?;

    let controller = Controller::new(cli.config.clone());
    controller.start()?;

    let shutdown = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let shutdown_handler = std::sync::Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        shutdown_handler.store(true, std::sync::atomic::Ordering::SeqCst);
    })?;

    while !shutdown.load(std::sync::atomic::Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(200));
    }

    controller.stop();
    Ok(())
}

fn worker_log_path(config_path: &std::path::Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."))
        .join("logs")
        .join("worker.log")
}

fn supervisor_log_path() -> PathBuf {
    PathBuf::from("logs").join("supervisor.log")
}
