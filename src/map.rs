//! Permission map: `module -> sub-module -> [permission]`
//!
//! Key presence carries meaning on its own. A sub-module listed in the user's
//! modules gets a key even when its permission list is empty, and that key is
//! what grants baseline Read.

use std::collections::BTreeMap;

use crate::perm::names_any_write;
use crate::record::UserRecord;

type SubModules = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionMap {
    modules: BTreeMap<String, SubModules>,
}

impl PermissionMap {
    /// Derive the map from a user record. Never fails; no record means no access.
    pub fn build(user: Option<&UserRecord>) -> Self {
        let mut modules: BTreeMap<String, SubModules> = BTreeMap::new();
        let Some(user) = user else { return PermissionMap { modules } };

        for m in &user.modules {
            if m.module_name.is_empty() { continue; }
            let subs = modules.entry(m.module_name.clone()).or_default();
            for s in &m.sub_modules {
                if s.sub_module_name.is_empty() { continue; }
                let perms = subs.entry(s.sub_module_name.clone()).or_default();
                perms.extend(s.permissions.iter().filter(|p| !p.is_empty()).cloned());
            }
        }
        PermissionMap { modules }
    }

    /// True when no module key exists at all
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    #[inline]
    pub fn contains(&self, module: &str, sub_module: &str) -> bool {
        self.get(module, sub_module).is_some()
    }

    /// Permission list for a sub-module, `None` when the key is absent
    pub fn get(&self, module: &str, sub_module: &str) -> Option<&[String]> {
        self.modules.get(module)?.get(sub_module).map(Vec::as_slice)
    }

    /// Whether the exact permission name is listed for the sub-module
    pub fn has(&self, module: &str, sub_module: &str, permission: &str) -> bool {
        self.get(module, sub_module).is_some_and(|p| p.iter().any(|n| n == permission))
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn sub_modules<'a>(&'a self, module: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.modules.get(module).into_iter().flat_map(|s| s.keys().map(String::as_str))
    }

    /// Every `(module, sub-module, permissions)` entry
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &[String])> {
        self.modules.iter().flat_map(|(m, subs)| {
            subs.iter().map(move |(s, p)| (m.as_str(), s.as_str(), p.as_slice()))
        })
    }

    /// At least one sub-module anywhere has a non-empty list, and none names a
    /// write-class permission.
    pub fn only_read_grants(&self) -> bool {
        let mut any_grant = false;
        for (_, _, perms) in self.entries() {
            if perms.is_empty() { continue; }
            if names_any_write(perms) { return false; }
            any_grant = true;
        }
        any_grant
    }
}
