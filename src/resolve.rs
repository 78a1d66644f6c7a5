//! Single permission checks against a session snapshot
//!
//! Rule order matters:
//! 1. admins pass everything
//! 2. no usable data fails closed (a stale loading flag is ignored when data is there)
//! 3. with an empty map, Read is answered from the raw module list
//! 4. empty identifiers fail
//! 5. a sub-module key in the map grants Read, even with no permissions listed
//! 6. write kinds need the exact name in the sub-module's list
//! 7. Read on an unmapped sub-module is inherited from any granted sibling in the same module
//!
//! Write kinds are never inherited.

use tracing::trace;

use crate::error::Result;
use crate::map::PermissionMap;
use crate::perm::Permission;
use crate::record::{ModuleGrant, UserRecord};
use crate::session::{DataState, Session};

/// Decide whether the session may perform `permission` on `module`/`sub_module`
pub fn resolve(session: &Session, module: &str, sub_module: &str, permission: Permission) -> bool {
    if session.is_admin() {
        return true;
    }

    let state = session.data_state();
    let allowed = match state {
        DataState::Unloaded => false,
        DataState::Degraded => {
            permission == Permission::Read
                && session.user().is_some_and(|u| raw_read(u, session.permissions(), module, sub_module))
        }
        DataState::Ready => mapped(session, module, sub_module, permission),
    };
    trace!(module, sub_module, %permission, ?state, allowed, "resolve");
    allowed
}

/// Like [`resolve`], with the permission given by name. Unknown names are an error.
pub fn resolve_named(session: &Session, module: &str, sub_module: &str, permission: &str) -> Result<bool> {
    Ok(resolve(session, module, sub_module, permission.parse()?))
}

fn mapped(session: &Session, module: &str, sub_module: &str, permission: Permission) -> bool {
    if module.is_empty() || sub_module.is_empty() {
        return false;
    }
    let map = session.permissions();

    match permission {
        Permission::Read => {
            if map.contains(module, sub_module) {
                return true;
            }
            session.user().is_some_and(|u| raw_read(u, map, module, sub_module))
        }
        kind => map.has(module, sub_module, kind.as_str()),
    }
}

/// Read from the raw module list: the sub-module itself or any sibling holds a grant
fn raw_read(user: &UserRecord, map: &PermissionMap, module: &str, sub_module: &str) -> bool {
    let Some(parent) = user.module(module) else { return false };
    if parent.sub_module(sub_module).is_some_and(|s| s.has_any()) {
        return true;
    }
    parent.any_sub_module_granted() || mapped_sibling(parent, map)
}

// The map can be ahead of the raw record while a refetch lands
fn mapped_sibling(parent: &ModuleGrant, map: &PermissionMap) -> bool {
    parent
        .sub_modules
        .iter()
        .any(|s| map.get(&parent.module_name, &s.sub_module_name).is_some_and(|p| !p.is_empty()))
}
