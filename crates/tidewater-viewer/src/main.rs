mod app;
mod controls;
mod options;

use anyhow::Result;

use tidewater_engine::device::GpuInit;
use tidewater_engine::logging::{init_logging, LoggingConfig};
use tidewater_engine::window::{Runtime, RuntimeConfig};

use crate::app::WaterApp;
use crate::options::{ViewerOptions, USAGE};

fn main() -> Result<()> {
    let Some(options) = ViewerOptions::from_env()? else {
        print!("{USAGE}");
        return Ok(());
    };

    init_logging(LoggingConfig {
        env_filter: options.log_filter.clone(),
        ..LoggingConfig::default()
    });

    log::info!("assets from {}", options.asset_dir.display());

    Runtime::run(
        RuntimeConfig {
            title: "tidewater".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        WaterApp::new(options),
    )
}
