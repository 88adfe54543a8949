//! Graph policy settings

use serde::{Deserialize, Serialize};

/// How many parents a member may have at once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentPolicy {
    /// A child may belong to at most one parent
    Single,
    /// A child may belong to any number of parents
    #[default]
    Multiple,
}

/// What adding an existing related object does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with `DuplicateEdge`
    #[default]
    Reject,
    /// Succeed without adding a second edge
    Ignore,
}

impl std::str::FromStr for ParentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multiple" => Ok(Self::Multiple),
            _ => Err(format!("unknown parent policy: {} (expected single|multiple)", s)),
        }
    }
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "ignore" => Ok(Self::Ignore),
            _ => Err(format!("unknown duplicate policy: {} (expected reject|ignore)", s)),
        }
    }
}

impl std::fmt::Display for ParentPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Multiple => write!(f, "multiple"),
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}

/// Policies applied by the aggregation graphs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Single or multi-parent membership
    #[serde(default)]
    pub parent_policy: ParentPolicy,

    /// Handling of repeated related objects
    #[serde(default)]
    pub related_duplicates: DuplicatePolicy,
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent_policy(mut self, policy: ParentPolicy) -> Self {
        self.parent_policy = policy;
        self
    }

    pub fn with_related_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.related_duplicates = policy;
        self
    }
}
