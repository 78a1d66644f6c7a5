//! Route guard and row action buttons built on a capability bundle

use serde::Serialize;

use crate::caps::CapabilityBundle;
use crate::perm::Permission;

/// Where a denied route sends the user
pub const FORBIDDEN_PATH: &str = "/403";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "camelCase")]
pub enum Verdict {
    Allowed,
    Forbidden { redirect: &'static str },
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }
}

/// Decide whether a route guarded by `action` may render
pub fn guard(bundle: &CapabilityBundle, action: Permission) -> Verdict {
    if bundle.allows(action) {
        Verdict::Allowed
    } else {
        Verdict::Forbidden { redirect: FORBIDDEN_PATH }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ButtonState {
    Hidden,
    /// Rendered, but clicking does nothing
    Disabled,
    Enabled,
}

impl ButtonState {
    fn of(shown: bool, performable: bool) -> Self {
        match (shown, performable) {
            (false, _) => ButtonState::Hidden,
            (true, false) => ButtonState::Disabled,
            (true, true) => ButtonState::Enabled,
        }
    }
}

/// Edit/delete controls for a table row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionButtons {
    pub edit: ButtonState,
    pub delete: ButtonState,
}

impl ActionButtons {
    /// `None` when nothing should render: no Read, or neither button shown
    pub fn from_bundle(bundle: &CapabilityBundle) -> Option<Self> {
        if !bundle.can_read || (!bundle.show_edit_button && !bundle.show_delete_button) {
            return None;
        }
        Some(ActionButtons {
            edit: ButtonState::of(bundle.show_edit_button, bundle.can_perform_edit),
            delete: ButtonState::of(bundle.show_delete_button, bundle.can_perform_delete),
        })
    }
}
