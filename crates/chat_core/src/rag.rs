//! RagSources - knowledge-source toggles for a turn.
//!
//! The toggles only shape the request preamble; retrieval itself happens
//! behind the generative backend and is not this crate's concern.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RagSources {
    pub standards: bool,
    pub internal: bool,
    pub sensors: bool,
    pub workorders: bool,
}

impl RagSources {
    pub fn all_enabled() -> Self {
        Self {
            standards: true,
            internal: true,
            sensors: true,
            workorders: true,
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.standards || self.internal || self.sensors || self.workorders
    }

    /// Display labels for the enabled sources, in fixed order.
    pub fn enabled_labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.standards {
            labels.push("Engineering Standards");
        }
        if self.internal {
            labels.push("Internal Documentation");
        }
        if self.sensors {
            labels.push("Live Sensor Data");
        }
        if self.workorders {
            labels.push("Work Order History");
        }
        labels
    }

    /// The context preamble prepended to the user's literal input, or `None`
    /// when no source is enabled.
    pub fn context_preamble(&self) -> Option<String> {
        let labels = self.enabled_labels();
        if labels.is_empty() {
            return None;
        }
        Some(format!(
            "Consult the following knowledge sources when answering: {}.",
            labels.join(", ")
        ))
    }
}
