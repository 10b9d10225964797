//! Net Naming
//!
//! Ground nets are named `GND`, power nets after their normalized voltage,
//! and everything else gets a sequential signal name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::grouping::NetGroups;
use super::node::Node;
use crate::options::NetlistOptions;
use crate::project::PointId;

/// Net names keyed by root id, in net-group order
pub type NetNames = IndexMap<PointId, String>;

/// Electrical role of a net
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetRole {
    Ground,
    Power,
    Signal,
}

impl NetRole {
    /// Ground wins over power; power wins over signal
    pub fn of(members: &[Node]) -> Self {
        if members.iter().any(Node::is_grounded) {
            NetRole::Ground
        } else if members.iter().any(Node::is_powered) {
            NetRole::Power
        } else {
            NetRole::Signal
        }
    }
}

/// Deterministic net namer
#[derive(Debug, Clone)]
pub struct NetNamer {
    signal_prefix: String,
    ground_name: String,
}

impl Default for NetNamer {
    fn default() -> Self {
        Self::new(&NetlistOptions::default())
    }
}

impl NetNamer {
    pub fn new(options: &NetlistOptions) -> Self {
        Self {
            signal_prefix: options.signal_prefix.clone(),
            ground_name: options.ground_name.clone(),
        }
    }

    /// Name every net. Signal numbering follows the iteration order of
    /// `groups`, starting at 1.
    pub fn name(&self, groups: &NetGroups) -> NetNames {
        let mut names = NetNames::with_capacity(groups.len());
        let mut signal_counter = 0usize;

        for (&root, members) in groups {
            let name = match NetRole::of(members) {
                NetRole::Ground => self.ground_name.clone(),
                NetRole::Power => power_net_name(members),
                NetRole::Signal => {
                    signal_counter += 1;
                    format!("{}{}", self.signal_prefix, signal_counter)
                }
            };
            names.insert(root, name);
        }

        names
    }
}

/// Name of a power net: the first powered member's voltage, falling back to
/// its bus id when the bus carries no voltage
fn power_net_name(members: &[Node]) -> String {
    members
        .iter()
        .find(|n| n.is_powered())
        .and_then(|n| {
            n.voltage
                .as_deref()
                .map(normalize_voltage)
                .or_else(|| n.power_bus_ref.clone())
        })
        .unwrap_or_else(|| "PWR".to_string())
}

const UNIT_SUFFIXES: &[&str] = &["VDC", "VAC", "DC", "AC", "V"];

/// Normalize a voltage label.
///
/// `+3.3V`, `3.3 VDC` and `3V3` all become `+3V3`; `5V` becomes `+5V`;
/// `-12 VDC` becomes `-12V`. Strings without a numeral come back trimmed and
/// otherwise unchanged.
pub fn normalize_voltage(raw: &str) -> String {
    let trimmed = raw.trim();
    let body = strip_units(trimmed);

    let (sign, rest) = match body.chars().next() {
        Some(c @ ('+' | '-')) => (c, body[1..].trim_start()),
        _ => ('+', body),
    };

    let Some((integer, fraction)) = volt_point(rest).or_else(|| first_numeral(rest)) else {
        return trimmed.to_string();
    };

    let integer = match integer.trim_start_matches('0') {
        "" => "0",
        digits => digits,
    };
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        format!("{}{}V", sign, integer)
    } else {
        format!("{}{}V{}", sign, integer, fraction)
    }
}

/// Remove trailing unit tokens, case-insensitively, repeatedly
fn strip_units(value: &str) -> &str {
    let mut body = value.trim_end();
    loop {
        let upper = body.to_ascii_uppercase();
        let Some(suffix) = UNIT_SUFFIXES.iter().find(|s| upper.ends_with(*s)) else {
            return body;
        };
        body = body[..body.len() - suffix.len()].trim_end();
    }
}

/// Already in volt-point form, e.g. `3V3`
fn volt_point(value: &str) -> Option<(&str, &str)> {
    let split = value.find(|c: char| c == 'V' || c == 'v')?;
    let (integer, fraction) = (&value[..split], &value[split + 1..]);
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if digits(integer) && digits(fraction) {
        Some((integer, fraction))
    } else {
        None
    }
}

/// First decimal numeral in `value`, split at the decimal point
fn first_numeral(value: &str) -> Option<(&str, &str)> {
    let bytes = value.as_bytes();
    let start = (0..bytes.len()).find(|&i| {
        bytes[i].is_ascii_digit()
            || (bytes[i] == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    })?;

    let mut end = start;
    let mut dot = None;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {}
            b'.' if dot.is_none() && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) => {
                dot = Some(end)
            }
            _ => break,
        }
        end += 1;
    }

    Some(match dot {
        Some(d) => (&value[start..d], &value[d + 1..end]),
        None => (&value[start..end], ""),
    })
}
