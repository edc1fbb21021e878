//! # Tagged updates
//!
//! [`TaggedUpdate`] is the message unit flowing through a
//! [`Handler`](crate::Handler): a snapshot plus the identity of the progress bar
//! that produced it and caller-supplied metadata.
//!
//! ## Wire shape
//! ```text
//! {
//!   "progress_bar_id": "6f1c…",
//!   "format_dict": { "n": 3, "total": 10, "elapsed": 0.31, "rate": 9.6, "unit": "it" },
//!   "request_id": "abc"            ◄── metadata, flattened
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ProgressBarId, ProgressSnapshot};

/// Metadata key conventionally used to route updates back to a request.
pub const REQUEST_ID_KEY: &str = "request_id";

/// Snapshot tagged with its origin and additional metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaggedUpdate {
    /// Identity of the publishing progress bar.
    pub progress_bar_id: ProgressBarId,
    /// Progress state at the time of the update.
    #[serde(rename = "format_dict")]
    pub format: ProgressSnapshot,
    /// Caller-supplied metadata merged into every message of one subscriber.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl TaggedUpdate {
    /// Creates an update without metadata.
    pub fn new(progress_bar_id: ProgressBarId, format: ProgressSnapshot) -> Self {
        Self {
            progress_bar_id,
            format,
            metadata: Map::new(),
        }
    }

    /// Replaces the metadata map.
    #[inline]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Inserts a single metadata entry.
    #[inline]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns a metadata value if it is a string.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Shorthand for the `request_id` metadata entry.
    pub fn request_id(&self) -> Option<&str> {
        self.metadata_str(REQUEST_ID_KEY)
    }
}
