//! touchpad-relay CLI: emulate one touchpad with another.
//!
//! Creates a virtual device from an evemu recording, grabs the physical
//! source device and relays its events into the virtual one, rescaling the
//! absolute X/Y axes so physical distances match.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use touchpad_relay_core::config::Config;
use touchpad_relay_core::{cancellation, setup, CancelHandle, Relay, RelayStats};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "touchpad-relay",
    about = "Relay a touchpad through a virtual device built from an evemu recording",
    long_about = "Uses the evemu recording to set up a uinput device and delivers \
                  events from the source device through it, rescaled to the \
                  recorded device's axis ranges and resolutions.",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(value_name = "dest", value_parser = ["dest"], hide_possible_values = true)]
    dest_keyword: String,

    /// evemu recording describing the device to emulate.
    #[arg(value_name = "RECORDING")]
    recording: PathBuf,

    #[arg(value_name = "source", value_parser = ["source"], hide_possible_values = true)]
    source_keyword: String,

    /// Event node of the physical touchpad, e.g. /dev/input/event4.
    #[arg(value_name = "DEVICE")]
    device: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().ok();
            return ExitCode::from(usage_exit_status(&e));
        }
    };

    let config = match setup::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, config)) {
        Ok(stats) => {
            info!(forwarded = stats.forwarded, "exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Exit status for a failed parse: `--help` and `--version` are not
/// failures, everything else is status 1.
fn usage_exit_status(err: &clap::Error) -> u8 {
    u8::from(err.use_stderr())
}

/// Run blocking device setup on the blocking pool so the single runtime
/// thread keeps driving the reactor.
async fn off_runtime<T, F>(setup: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(setup)
        .await
        .context("device setup task failed")?
}

#[cfg(feature = "linux")]
async fn run(cli: Cli, config: Config) -> anyhow::Result<RelayStats> {
    use touchpad_relay_input::linux::{EvdevSource, UinputSink};
    use touchpad_relay_input::recording::load_recording;
    use touchpad_relay_input::EventSink;

    let description = load_recording(&cli.recording)
        .with_context(|| format!("failed to read evemu recording {}", cli.recording.display()))?;
    let source = EvdevSource::open(&cli.device).context("failed to open source device")?;
    let sink = {
        let description = description.clone();
        let name = config.output.name.clone();
        off_runtime(move || {
            UinputSink::create(&description, name.as_deref())
                .context("failed to create destination device")
        })
        .await?
    };

    println!(
        "Mapping {} to {}",
        cli.device.display(),
        sink.devnode().display()
    );
    for warning in
        setup::check_sampling(&source, &description, config.mapping.min_sampling_ratio)
    {
        println!("Warning: {warning}");
        warn!(%warning, "source resolution too low");
    }

    let transforms =
        setup::build_transforms(&source, &description).context("cannot map source axes")?;

    let (handle, cancel) = cancellation();
    watch_signals(handle)?;

    let mut relay = Relay::new(
        Box::new(source),
        Box::new(sink),
        transforms,
        setup::observer(&config.mapping),
    );
    relay.run(cancel).await.context("relay stopped")
}

#[cfg(not(feature = "linux"))]
async fn run(_cli: Cli, _config: Config) -> anyhow::Result<RelayStats> {
    anyhow::bail!("built without Linux device support")
}

/// Cancel the relay on the first SIGINT or SIGTERM.
fn watch_signals(handle: CancelHandle) -> anyhow::Result<()> {
    let mut sigint = signal(SignalKind::interrupt()).context("failed to register SIGINT handler")?;
    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to register SIGTERM handler")?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => info!("received SIGINT, stopping"),
            _ = sigterm.recv() => info!("received SIGTERM, stopping"),
        }
        handle.cancel();
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_full_invocation() {
        let cli = Cli::try_parse_from([
            "touchpad-relay",
            "--config",
            "relay.toml",
            "dest",
            "t450.evemu",
            "source",
            "/dev/input/event4",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("relay.toml")));
        assert_eq!(cli.recording, PathBuf::from("t450.evemu"));
        assert_eq!(cli.device, PathBuf::from("/dev/input/event4"));
    }

    #[test]
    fn keywords_are_required_in_order() {
        let swapped = Cli::try_parse_from([
            "touchpad-relay",
            "source",
            "t450.evemu",
            "dest",
            "/dev/input/event4",
        ]);
        assert!(swapped.unwrap_err().use_stderr());

        let short = Cli::try_parse_from(["touchpad-relay", "dest", "t450.evemu"]);
        assert!(short.unwrap_err().use_stderr());
    }

    #[test]
    fn help_and_version_exit_zero() {
        for flag in ["--help", "--version"] {
            let err = Cli::try_parse_from(["touchpad-relay", flag]).unwrap_err();
            assert_eq!(usage_exit_status(&err), 0, "{flag}");
        }
    }

    #[test]
    fn usage_errors_exit_one() {
        let err = Cli::try_parse_from(["touchpad-relay", "dest"]).unwrap_err();
        assert_eq!(usage_exit_status(&err), 1);

        let err = Cli::try_parse_from(["touchpad-relay", "--bogus"]).unwrap_err();
        assert_eq!(usage_exit_status(&err), 1);
    }

    #[tokio::test]
    async fn blocking_setup_leaves_runtime_free() {
        let (tx, rx) = std::sync::mpsc::channel();
        // Needs the runtime thread while the setup closure is blocked.
        let ticker = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tx.send(()).unwrap();
        });

        let value = off_runtime(move || {
            rx.recv_timeout(Duration::from_secs(5))
                .context("runtime thread was stalled")?;
            Ok(7)
        })
        .await
        .unwrap();

        assert_eq!(value, 7);
        ticker.await.unwrap();
    }

    #[tokio::test]
    async fn blocking_setup_error_is_propagated() {
        let err = off_runtime(|| -> anyhow::Result<()> { anyhow::bail!("no uinput") })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no uinput");
    }
}
