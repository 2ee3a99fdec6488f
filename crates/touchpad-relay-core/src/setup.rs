//! Config loading and startup checks between the two devices.

use std::fmt;
use std::path::{Path, PathBuf};

use touchpad_relay_input::EventSource;
use touchpad_relay_types::{DeviceDescription, MappedAxis};
use tracing::{debug, info, warn};

use crate::config::{Config, MappingConfig};
use crate::dispatch::{MappingObserver, SilentObserver, TracingObserver};
use crate::error::RelayError;
use crate::transform::{AxisTransform, TransformTable};

/// Load configuration from the given path, or the default location.
///
/// A missing file at the default location yields the defaults; a missing
/// file that was asked for explicitly is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, RelayError> {
    let (config_path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (default_config_path(), false),
    };

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| RelayError::Config(format!("failed to read config: {e}")))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| RelayError::Config(format!("failed to parse config: {e}")))?;
        info!(path = %config_path.display(), "loaded config");
        Ok(config)
    } else if explicit {
        Err(RelayError::Config(format!(
            "config file not found: {}",
            config_path.display()
        )))
    } else {
        debug!("no config file found, using defaults");
        Ok(Config::default())
    }
}

/// Get the config directory path.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("touchpad-relay")
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Source resolution too coarse to address every destination position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingWarning {
    pub axis: MappedAxis,
    pub source_resolution: i32,
    pub dest_resolution: i32,
}

impl fmt::Display for SamplingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.axis {
            MappedAxis::X | MappedAxis::MtPositionX => "X",
            MappedAxis::Y | MappedAxis::MtPositionY => "Y",
        };
        write!(
            f,
            "Nyquist not met on {label}, have {} for emulation of {}",
            self.source_resolution, self.dest_resolution
        )
    }
}

/// Compare X and Y resolutions of both devices. Advisory only.
pub fn check_sampling(
    source: &dyn EventSource,
    dest: &DeviceDescription,
    ratio: u32,
) -> Vec<SamplingWarning> {
    [MappedAxis::X, MappedAxis::Y]
        .into_iter()
        .filter_map(|axis| {
            let src = source.calibration(axis.code())?.resolution;
            let dst = dest.axis_calibration(axis)?.resolution;
            (i64::from(src) < i64::from(ratio) * i64::from(dst)).then_some(SamplingWarning {
                axis,
                source_resolution: src,
                dest_resolution: dst,
            })
        })
        .collect()
}

/// Build the transform for every remapped axis both devices report.
///
/// An axis the source lacks never appears in its stream and is skipped. An
/// axis only the source has is forwarded unchanged. A calibration that
/// cannot be used (zero resolution, inverted range) fails setup.
pub fn build_transforms(
    source: &dyn EventSource,
    dest: &DeviceDescription,
) -> Result<TransformTable, RelayError> {
    let mut table = TransformTable::new();

    for axis in MappedAxis::ALL {
        let Some(src) = source.calibration(axis.code()) else {
            debug!(%axis, "source has no such axis, skipping");
            continue;
        };
        let Some(dst) = dest.axis_calibration(axis) else {
            warn!(%axis, "destination has no such axis, events pass through unchanged");
            continue;
        };

        let transform = AxisTransform::new(src, dst).map_err(|(side, source)| {
            RelayError::Calibration {
                axis,
                side: side.as_str(),
                source,
            }
        })?;
        info!(%axis, source = %src, dest = %dst, "axis mapping");
        table.insert(axis, transform);
    }

    if table.is_empty() {
        warn!("no axes to remap, relaying events unchanged");
    }
    Ok(table)
}

/// Observer matching the configured diagnostics level.
pub fn observer(mapping: &MappingConfig) -> Box<dyn MappingObserver> {
    if mapping.log_events {
        Box::new(TracingObserver)
    } else {
        Box::new(SilentObserver)
    }
}
