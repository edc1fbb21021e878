//! # Progress snapshot
//!
//! [`ProgressSnapshot`] is the immutable view of a tracker taken after an advance.
//! Field names on the wire follow the conventional progress-bar "format dict"
//! (`n`, `total`, `elapsed`, `rate`, ...), so browser-side renderers written for
//! that shape keep working.
//!
//! ## Rules
//! - `count` never decreases during one tracker's lifetime.
//! - `count` may exceed `total`; nothing clamps it.
//! - `extra` carries tracker-specific fields verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Point-in-time progress state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Iterations completed so far.
    #[serde(rename = "n")]
    pub count: u64,
    /// Expected number of iterations (`None` = unknown).
    pub total: Option<u64>,
    /// Seconds since the tracker started.
    pub elapsed: f64,
    /// Smoothed iterations per second, once at least one advance was measured.
    pub rate: Option<f64>,
    /// Optional description prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Unit label for one iteration.
    pub unit: String,
    /// Additional fields, flattened into the serialized record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProgressSnapshot {
    /// Snapshot of a tracker that has not advanced yet.
    pub fn empty(total: Option<u64>) -> Self {
        Self {
            count: 0,
            total,
            elapsed: 0.0,
            rate: None,
            desc: None,
            unit: "it".to_string(),
            extra: Map::new(),
        }
    }

    /// Completed fraction in `[0, ∞)`; `None` if the total is unknown or zero.
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some(self.count as f64 / total as f64),
            _ => None,
        }
    }

    /// True once `count` reached a known `total`.
    pub fn is_complete(&self) -> bool {
        self.total.is_some_and(|total| self.count >= total)
    }

    /// Iterations left until `total`, saturating at zero.
    pub fn remaining(&self) -> Option<u64> {
        self.total.map(|total| total.saturating_sub(self.count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_handles_unknown_and_zero_totals() {
        let mut snap = ProgressSnapshot::empty(None);
        assert_eq!(snap.fraction(), None);

        snap.total = Some(0);
        assert_eq!(snap.fraction(), None);

        snap.total = Some(4);
        snap.count = 1;
        assert_eq!(snap.fraction(), Some(0.25));
    }

    #[test]
    fn count_past_total_is_kept() {
        let mut snap = ProgressSnapshot::empty(Some(3));
        snap.count = 5;
        assert!(snap.is_complete());
        assert_eq!(snap.remaining(), Some(0));
        assert_eq!(snap.fraction(), Some(5.0 / 3.0));
    }

    #[test]
    fn wire_shape_uses_format_dict_names() {
        let mut snap = ProgressSnapshot::empty(Some(10));
        snap.count = 2;
        snap.extra.insert("position".into(), Value::from(1));

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["n"], 2);
        assert_eq!(json["total"], 10);
        assert_eq!(json["unit"], "it");
        assert_eq!(json["position"], 1);
        assert!(json.get("desc").is_none());
    }
}
