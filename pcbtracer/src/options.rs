//! Engine configuration

use serde::{Deserialize, Serialize};

/// Options controlling grouping and naming.
///
/// Can be embedded in a project file under `"options"`; missing keys take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetlistOptions {
    /// Prefix of sequential signal net names (`N$1`, `N$2`, ...)
    pub signal_prefix: String,

    /// Name given to every ground net
    pub ground_name: String,

    /// Treat all ground buses as one common plane
    pub merge_ground_buses: bool,

    /// Bus id for ground symbols that carry no `groundBusId`
    pub default_ground_bus: String,
}

impl Default for NetlistOptions {
    fn default() -> Self {
        Self {
            signal_prefix: "N$".to_string(),
            ground_name: "GND".to_string(),
            merge_ground_buses: false,
            default_ground_bus: "GND".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_options_use_defaults() {
        let options: NetlistOptions =
            serde_json::from_str(r#"{"mergeGroundBuses": true}"#).unwrap();
        assert!(options.merge_ground_buses);
        assert_eq!(options.signal_prefix, "N$");
        assert_eq!(options.ground_name, "GND");
    }
}
