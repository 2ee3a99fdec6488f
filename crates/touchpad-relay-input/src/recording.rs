//! Parser for the descriptor part of an evemu recording.
//!
//! An evemu recording starts with a device description, one record per
//! line:
//!
//! ```text
//! # EVEMU 1.3
//! N: SynPS/2 Synaptics TouchPad
//! I: 0011 0002 0007 01b1
//! P: 05 00 00 00 00 00 00 00
//! B: 00 0b 00 00 00 00 00 00 00
//! A: 00 1472 5470 0 0 60
//! ```
//!
//! followed by optional `E:` event lines. Only the description is read
//! here; event lines are skipped.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use touchpad_relay_types::{AbsAxisInfo, AxisCalibration, DeviceDescription, InputId};
use tracing::{debug, info};

use crate::error::InputError;

/// Name used when a recording carries no `N:` line.
pub const DEFAULT_DEVICE_NAME: &str = "touchpad-relay virtual device";

/// Read and parse the recording at `path`.
pub fn load_recording(path: &Path) -> Result<DeviceDescription, InputError> {
    let file = File::open(path)
        .map_err(|e| InputError::DeviceOpen(format!("{}: {e}", path.display())))?;
    let description = parse_recording(BufReader::new(file))?;
    info!(
        path = %path.display(),
        name = %description.name,
        axes = description.axes.len(),
        "loaded device recording"
    );
    Ok(description)
}

/// Parse a recording from any buffered reader.
pub fn parse_recording<R: BufRead>(reader: R) -> Result<DeviceDescription, InputError> {
    let mut description = DeviceDescription::default();
    let mut name = None;
    let mut properties = Vec::new();
    let mut masks: BTreeMap<u16, Vec<u8>> = BTreeMap::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((tag, rest)) = line.split_once(':') else {
            return Err(malformed(lineno, "missing record tag"));
        };
        let rest = rest.trim();

        match tag {
            "N" => name = Some(rest.to_string()),
            "I" => description.id = parse_input_id(rest, lineno)?,
            "P" => properties.extend(parse_hex_bytes(rest.split_whitespace(), lineno)?),
            "B" => {
                let mut fields = rest.split_whitespace();
                let kind = fields
                    .next()
                    .ok_or_else(|| malformed(lineno, "missing event type"))?;
                let kind = parse_hex_u16(kind, lineno)?;
                let bytes = parse_hex_bytes(fields, lineno)?;
                masks.entry(kind).or_default().extend(bytes);
            }
            "A" => {
                let (code, info) = parse_axis(rest, lineno)?;
                description.axes.insert(code, info);
            }
            // LED/switch state and recorded events.
            "L" | "S" | "E" => {}
            other => debug!(line = lineno, tag = other, "skipping unknown recording record"),
        }
    }

    description.name = name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_string());
    description.properties = set_bits(&properties).collect();
    for (kind, bytes) in masks {
        // Type 0 lists the supported event types, implied by the masks below.
        if kind == 0 {
            continue;
        }
        description
            .codes
            .entry(kind)
            .or_default()
            .extend(set_bits(&bytes));
    }

    Ok(description)
}

fn malformed(line: usize, reason: impl Into<String>) -> InputError {
    InputError::Recording {
        line,
        reason: reason.into(),
    }
}

fn parse_hex_u16(field: &str, line: usize) -> Result<u16, InputError> {
    u16::from_str_radix(field, 16).map_err(|e| malformed(line, format!("bad hex '{field}': {e}")))
}

fn parse_hex_bytes<'a>(
    fields: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec<u8>, InputError> {
    fields
        .map(|f| {
            u8::from_str_radix(f, 16).map_err(|e| malformed(line, format!("bad byte '{f}': {e}")))
        })
        .collect()
}

fn parse_input_id(rest: &str, line: usize) -> Result<InputId, InputError> {
    let fields = rest
        .split_whitespace()
        .map(|f| parse_hex_u16(f, line))
        .collect::<Result<Vec<_>, _>>()?;
    match fields.as_slice() {
        [bustype, vendor, product, version] => Ok(InputId {
            bustype: *bustype,
            vendor: *vendor,
            product: *product,
            version: *version,
        }),
        _ => Err(malformed(line, "expected bustype, vendor, product, version")),
    }
}

fn parse_axis(rest: &str, line: usize) -> Result<(u16, AbsAxisInfo), InputError> {
    let mut fields = rest.split_whitespace();
    let code = fields
        .next()
        .ok_or_else(|| malformed(line, "missing axis code"))?;
    let code = parse_hex_u16(code, line)?;

    let values = fields
        .map(|f| {
            f.parse::<i32>()
                .map_err(|e| malformed(line, format!("bad axis value '{f}': {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Recordings older than evemu 1.1 carry no resolution.
    let (minimum, maximum, fuzz, flat, resolution) = match values.as_slice() {
        [min, max, fuzz, flat] => (*min, *max, *fuzz, *flat, 0),
        [min, max, fuzz, flat, res] => (*min, *max, *fuzz, *flat, *res),
        _ => return Err(malformed(line, "expected min, max, fuzz, flat [, resolution]")),
    };
    if maximum < minimum {
        return Err(malformed(
            line,
            format!("axis {code:#04x} has maximum {maximum} below minimum {minimum}"),
        ));
    }

    Ok((
        code,
        AbsAxisInfo {
            calibration: AxisCalibration::new(minimum, maximum, resolution),
            fuzz,
            flat,
        },
    ))
}

/// Indices of the set bits in a little-endian kernel bitmask.
fn set_bits(bytes: &[u8]) -> impl Iterator<Item = u16> + '_ {
    bytes.iter().enumerate().flat_map(|(index, byte)| {
        (0..8u16)
            .filter(move |bit| byte & (1 << bit) != 0)
            .filter_map(move |bit| u16::try_from(index * 8).ok().map(|base| base + bit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use touchpad_relay_types::event::{ABS_MT_POSITION_X, ABS_MT_SLOT, ABS_X, ABS_Y};
    use touchpad_relay_types::{EventKind, MappedAxis};

    const TOUCHPAD: &str = "\
# EVEMU 1.3
# Kernel: 4.8.0
N: SynPS/2 Synaptics TouchPad
I: 0011 0002 0007 01b1
P: 05 00 00 00 00 00 00 00
B: 00 0b 00 00 00 00 00 00 00
B: 01 00 00 00 00 00 00 00 00
B: 01 00 00 00 00 00 00 00 00
B: 01 00 00 00 00 00 00 00 00
B: 01 00 00 00 00 00 00 00 00
B: 01 00 00 01 00 00 00 00 00
B: 01 00 00 00 00 00 00 00 00
B: 03 03 00 00 01 00 80 60 02
A: 00 1472 5470 0 0 60
A: 01 1408 4498 0 0 85
A: 18 0 255 0 0 0
A: 2f 0 1 0 0 0
A: 35 1472 5470 0 0 60
A: 36 1408 4498 0 0 85
A: 39 0 65535 0 0 0
E: 0.000000 0003 0000 3000
E: 0.000000 0000 0000 0000
";

    fn parse(text: &str) -> Result<DeviceDescription, InputError> {
        parse_recording(text.as_bytes())
    }

    #[test]
    fn parses_header() {
        let desc = parse(TOUCHPAD).unwrap();
        assert_eq!(desc.name, "SynPS/2 Synaptics TouchPad");
        assert_eq!(
            desc.id,
            InputId {
                bustype: 0x11,
                vendor: 0x02,
                product: 0x07,
                version: 0x1b1,
            }
        );
        // INPUT_PROP_POINTER | INPUT_PROP_BUTTONPAD
        assert_eq!(desc.properties.iter().copied().collect::<Vec<_>>(), [0, 2]);
    }

    #[test]
    fn parses_axes() {
        let desc = parse(TOUCHPAD).unwrap();
        assert_eq!(desc.axes.len(), 7);
        assert_eq!(
            desc.axis_calibration(MappedAxis::X),
            Some(AxisCalibration::new(1472, 5470, 60))
        );
        assert_eq!(
            desc.axis_calibration(MappedAxis::MtPositionY),
            Some(AxisCalibration::new(1408, 4498, 85))
        );
    }

    #[test]
    fn bitmasks_continue_across_lines() {
        let desc = parse(TOUCHPAD).unwrap();
        // Byte 34 of the key mask, bit 0: BTN_LEFT (0x110).
        assert_eq!(desc.codes_for(EventKind::Key).next(), Some(0x110));
        assert_eq!(desc.codes_for(EventKind::Key).count(), 1);

        for code in [ABS_X, ABS_Y, 0x18, ABS_MT_SLOT, ABS_MT_POSITION_X, 0x36, 0x39] {
            assert!(
                desc.codes_for(EventKind::Absolute).any(|c| c == code),
                "{code:#x}"
            );
        }
        // The type mask itself is not recorded as codes.
        assert!(!desc.codes.contains_key(&0));
    }

    #[test]
    fn old_format_has_zero_resolution() {
        let desc = parse("N: old\nA: 00 0 100 0 0\n").unwrap();
        assert_eq!(desc.calibration(ABS_X), Some(AxisCalibration::new(0, 100, 0)));
    }

    #[test]
    fn missing_name_falls_back() {
        let desc = parse("A: 00 0 100 0 0 1\n").unwrap();
        assert_eq!(desc.name, DEFAULT_DEVICE_NAME);
    }

    #[test]
    fn unknown_records_are_skipped() {
        let desc = parse("N: dev\nR: 1 2 3\nA: 01 0 10 0 0 1\n").unwrap();
        assert_eq!(desc.axes.len(), 1);
    }

    #[test]
    fn bad_axis_reports_line() {
        let err = parse("N: dev\nA: 00 0 nope 0 0 1\n").unwrap_err();
        assert!(matches!(err, InputError::Recording { line: 2, .. }), "{err}");
    }

    #[test]
    fn inverted_axis_rejected() {
        let err = parse("A: 00 100 0 0 0 1\n").unwrap_err();
        assert!(matches!(err, InputError::Recording { line: 1, .. }), "{err}");
    }

    #[test]
    fn short_input_id_rejected() {
        let err = parse("N: dev\n\nI: 0011 0002\n").unwrap_err();
        assert!(matches!(err, InputError::Recording { line: 3, .. }), "{err}");
    }

    #[test]
    fn untagged_line_rejected() {
        let err = parse("N: dev\ngarbage\n").unwrap_err();
        assert!(matches!(err, InputError::Recording { line: 2, .. }), "{err}");
    }
}
