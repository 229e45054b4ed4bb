//! cymbal - strike a physically modeled cymbal from the terminal
//!
//! Run with: cargo run --bin cymbal
//! Set `CYMBAL_LOG=cymbal.log` to capture debug logs, the TUI owns stdout.

mod app;
mod ui;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use std::{fs::File, sync::Mutex};

use app::CymbalApp;
use cymbal_dsp::synth::CymbalParams;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let seed = std::env::var("CYMBAL_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed);

    CymbalApp::new(CymbalParams::default()).seed(seed).run()
}

fn init_logging() -> EyreResult<()> {
    let Some(path) = std::env::var_os("CYMBAL_LOG") else {
        return Ok(());
    };
    let file = File::create(&path)
        .wrap_err_with(|| format!("failed to create log file {}", path.to_string_lossy()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|err| eyre!("failed to install log subscriber: {err}"))
}
