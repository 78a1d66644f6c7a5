//! Capability bundles: the five checks for one screen, plus the global
//! read-only override

use serde::Serialize;

use crate::perm::{kinds_to_mask, Permission};
use crate::resolve::resolve;
use crate::session::Session;

/// Everything a screen needs to decide which controls to render and run.
///
/// `show_*` governs rendering, `can_perform_*` governs whether a handler runs.
/// They currently agree but callers check both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityBundle {
    pub can_read: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_full: bool,
    pub is_admin: bool,

    pub has_any_permission: bool,
    pub can_modify: bool,
    pub can_manage: bool,
    pub has_only_read_globally: bool,

    pub show_edit_button: bool,
    pub show_delete_button: bool,
    pub show_create_button: bool,

    pub can_perform_edit: bool,
    pub can_perform_delete: bool,
    pub can_perform_create: bool,
}

/// Compute the bundle for one module/sub-module pair
pub fn capabilities(session: &Session, module: &str, sub_module: &str) -> CapabilityBundle {
    let check = |p| resolve(session, module, sub_module, p);
    let (can_read, can_create, can_edit, can_delete, can_full) = (
        check(Permission::Read),
        check(Permission::Create),
        check(Permission::Edit),
        check(Permission::Delete),
        check(Permission::Full),
    );
    let is_admin = session.is_admin();
    let read_only = has_only_read_globally(session);
    let writable = |specific: bool| !read_only && (specific || can_full || is_admin);

    CapabilityBundle {
        can_read,
        can_create,
        can_edit,
        can_delete,
        can_full,
        is_admin,
        has_any_permission: can_read || can_create || can_edit || can_delete || can_full || is_admin,
        can_modify: can_edit || can_delete || can_full || is_admin,
        can_manage: can_full || is_admin,
        has_only_read_globally: read_only,
        show_edit_button: writable(can_edit),
        show_delete_button: writable(can_delete),
        show_create_button: writable(can_create),
        can_perform_edit: writable(can_edit),
        can_perform_delete: writable(can_delete),
        can_perform_create: writable(can_create),
    }
}

/// True when the user holds grants somewhere but no write-class grant anywhere.
/// Admins are never read-only.
pub fn has_only_read_globally(session: &Session) -> bool {
    !session.is_admin() && session.permissions().only_read_grants()
}

impl CapabilityBundle {
    /// Kinds held on this screen, before the read-only override
    pub fn granted(&self) -> Vec<Permission> {
        Permission::ALL.into_iter().filter(|p| self.holds(*p)).collect()
    }

    pub fn mask(&self) -> u8 {
        kinds_to_mask(&self.granted())
    }

    fn holds(&self, p: Permission) -> bool {
        match p {
            Permission::Read => self.can_read,
            Permission::Create => self.can_create,
            Permission::Edit => self.can_edit,
            Permission::Delete => self.can_delete,
            Permission::Full => self.can_full,
        }
    }

    /// Whether a route guarded by `action` may be entered
    pub fn allows(&self, action: Permission) -> bool {
        match action {
            Permission::Read => self.can_read,
            Permission::Create => self.can_perform_create,
            Permission::Edit => self.can_perform_edit,
            Permission::Delete => self.can_perform_delete,
            Permission::Full => self.can_manage,
        }
    }
}
