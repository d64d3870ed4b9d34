//! Explicit permission grants handed to the selector by its host.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Resource key that grants its actions on every resource.
pub const ANY_RESOURCE: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Resource → granted actions, e.g. `{"coupons": ["view", "edit"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    grants: BTreeMap<String, BTreeSet<Action>>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, resource: impl Into<String>, action: Action) -> Self {
        self.grants.entry(resource.into()).or_default().insert(action);
        self
    }

    pub fn allows(&self, resource: &str, action: Action) -> bool {
        [resource, ANY_RESOURCE].iter().any(|key| {
            self.grants
                .get(*key)
                .is_some_and(|actions| actions.contains(&action))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.grants.values().all(BTreeSet::is_empty)
    }
}
