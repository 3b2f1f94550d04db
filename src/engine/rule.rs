//! Redirect rule definition.

use serde::{Deserialize, Serialize};

/// A single redirect rule: one request host name mapped to one destination.
///
/// The destination is either a literal `host[:port][/path]` string or, when
/// `is_template` is set, a template source that is compiled at table build
/// time and rendered against each matching request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Host name a request must match exactly (case-sensitive, no wildcards).
    pub host: String,

    /// Destination pattern, literal or templated.
    pub target: String,

    /// Whether `target` is compiled as a template.
    #[serde(default)]
    pub is_template: bool,
}

impl Rule {
    /// A rule whose target is used verbatim.
    pub fn literal(host: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            target: target.into(),
            is_template: false,
        }
    }

    /// A rule whose target is rendered per request.
    pub fn template(host: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            target: target.into(),
            is_template: true,
        }
    }
}
