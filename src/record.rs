//! Canonical user record and payload normalization
//!
//! The backend has shipped several shapes of the same grant payload:
//! camelCase and PascalCase field names, permission entries as objects or
//! bare strings, nulls or other non-list values in place of lists, and a flat `permissions` list
//! instead of nested `modules`. Every shape is folded into [`UserRecord`]
//! here so nothing downstream has to care.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GateError, Result};

/// One `(module, sub-module, permission)` triple a user holds
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Grant {
    pub module: String,
    pub sub_module: String,
    pub permission: String,
}

/// Authenticated user as the resolver sees it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct UserRecord {
    pub is_admin: bool,
    pub modules: Vec<ModuleGrant>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleGrant {
    pub module_name: String,
    pub sub_modules: Vec<SubModuleGrant>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubModuleGrant {
    pub sub_module_name: String,
    pub permissions: Vec<String>,
}

impl UserRecord {
    /// Parse a user record from JSON text
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse the body of `GET /users/me`, which wraps the record in `{ "user": ... }`
    pub fn from_me_response(body: Value) -> Result<Self> {
        let user = match body {
            Value::Object(mut o) if o.contains_key("user") => o.remove("user").unwrap_or(Value::Null),
            other => other,
        };
        UserRecord::try_from(user)
    }

    pub fn module(&self, name: &str) -> Option<&ModuleGrant> {
        self.modules.iter().find(|m| m.module_name == name)
    }

    /// Every grant triple, in payload order
    pub fn grants(&self) -> impl Iterator<Item = Grant> + '_ {
        self.modules.iter().flat_map(|m| {
            m.sub_modules.iter().flat_map(move |s| {
                s.permissions.iter().map(move |p| Grant {
                    module: m.module_name.clone(),
                    sub_module: s.sub_module_name.clone(),
                    permission: p.clone(),
                })
            })
        })
    }
}

impl ModuleGrant {
    pub fn sub_module(&self, name: &str) -> Option<&SubModuleGrant> {
        self.sub_modules.iter().find(|s| s.sub_module_name == name)
    }

    /// Whether any sub-module of this module carries at least one permission
    pub fn any_sub_module_granted(&self) -> bool {
        self.sub_modules.iter().any(SubModuleGrant::has_any)
    }
}

impl SubModuleGrant {
    #[inline]
    pub fn has_any(&self) -> bool {
        !self.permissions.is_empty()
    }
}

// ============================================================================
// Raw payload shapes
// ============================================================================

type Object = serde_json::Map<String, Value>;

/// First non-null value under any of `keys`
fn field<'a>(o: &'a Object, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| o.get(*k)).find(|v| !v.is_null())
}

/// Array contents of a list field; anything that is not an array counts as empty
fn items<'a>(o: &'a Object, keys: &[&str]) -> &'a [Value] {
    field(o, keys).and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default()
}

/// Non-empty string field
fn name(o: &Object, keys: &[&str]) -> Option<String> {
    field(o, keys).and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string)
}

fn permission_names(o: &Object) -> Vec<String> {
    items(o, &["permissions", "Permissions"])
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.as_str()),
            Value::Object(p) => field(p, &["permissionName", "PermissionName"]).and_then(Value::as_str),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn flag(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn sub_module(v: &Value) -> Option<SubModuleGrant> {
    let o = v.as_object()?;
    Some(SubModuleGrant {
        sub_module_name: name(o, &["subModuleName", "SubModuleName"])?,
        permissions: permission_names(o),
    })
}

fn module(v: &Value) -> Option<ModuleGrant> {
    let o = v.as_object()?;
    Some(ModuleGrant {
        module_name: name(o, &["moduleName", "ModuleName"])?,
        sub_modules: items(o, &["subModules", "SubModules"]).iter().filter_map(sub_module).collect(),
    })
}

impl TryFrom<Value> for UserRecord {
    type Error = GateError;

    fn try_from(v: Value) -> Result<Self> {
        let Value::Object(o) = v else {
            return Err(GateError::Decode("user record is not an object".into()));
        };
        let is_admin = flag(field(&o, &["isAdmin", "IsAdmin"]));
        // the flat variant wins whenever it is a list
        let modules = match field(&o, &["permissions", "Permissions"]).and_then(Value::as_array) {
            Some(flat) => group_flat(flat),
            None => items(&o, &["modules", "Modules"]).iter().filter_map(module).collect(),
        };
        Ok(UserRecord { is_admin, modules })
    }
}

fn group_flat(flat: &[Value]) -> Vec<ModuleGrant> {
    let mut modules: Vec<ModuleGrant> = Vec::new();
    for f in flat.iter().filter_map(Value::as_object) {
        let (Some(module_name), Some(sub_module_name)) =
            (name(f, &["moduleName", "ModuleName"]), name(f, &["subModuleName", "SubModuleName"]))
        else {
            continue;
        };
        let idx = match modules.iter().position(|m| m.module_name == module_name) {
            Some(i) => i,
            None => {
                modules.push(ModuleGrant { module_name, sub_modules: Vec::new() });
                modules.len() - 1
            }
        };
        let permissions = permission_names(f);
        let module = &mut modules[idx];
        match module.sub_modules.iter_mut().find(|s| s.sub_module_name == sub_module_name) {
            Some(s) => s.permissions.extend(permissions),
            None => module.sub_modules.push(SubModuleGrant { sub_module_name, permissions }),
        }
    }
    modules
}
