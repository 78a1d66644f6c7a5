//! Permission map builder tests

use capgate::*;
use serde_json::{json, Value};

fn user(v: Value) -> UserRecord {
    serde_json::from_value(v).unwrap()
}

fn sorted_entries(m: &PermissionMap) -> Vec<(String, String, Vec<String>)> {
    let mut v: Vec<_> = m
        .entries()
        .map(|(a, b, p)| {
            let mut p = p.to_vec();
            p.sort();
            (a.to_string(), b.to_string(), p)
        })
        .collect();
    v.sort();
    v
}

#[test]
fn no_record_builds_empty_map() {
    assert!(PermissionMap::build(None).is_empty());
    assert!(PermissionMap::build(Some(&user(json!({ "isAdmin": false })))).is_empty());
    assert!(PermissionMap::build(Some(&user(json!({ "modules": null })))).is_empty());
}

/// Key presence is what grants baseline Read, so it must survive empty lists
#[test]
fn sub_module_key_present_without_permissions() {
    let m = PermissionMap::build(Some(&user(json!({ "modules": [
        { "moduleName": "Admin Settings", "subModules": [{ "subModuleName": "Users", "permissions": [] }] }
    ]}))));
    assert!(m.contains("Admin Settings", "Users"));
    assert_eq!(m.get("Admin Settings", "Users"), Some(&[][..]));
    assert_eq!(m.get("Admin Settings", "Roles"), None);
}

#[test]
fn module_without_sub_modules_still_keyed() {
    let m = PermissionMap::build(Some(&user(json!({ "modules": [{ "moduleName": "Dashboard" }] }))));
    assert!(!m.is_empty());
    assert_eq!(m.modules().collect::<Vec<_>>(), vec!["Dashboard"]);
    assert_eq!(m.sub_modules("Dashboard").count(), 0);
}

/// Repeated modules merge and duplicate names are kept
#[test]
fn repeated_modules_merge_and_duplicates_stay() {
    // the same module can arrive once per role
    let m = PermissionMap::build(Some(&user(json!({ "modules": [
        { "moduleName": "Recruitment", "subModules": [
            { "subModuleName": "Candidates", "permissions": [{ "permissionName": "Read" }] }
        ]},
        { "moduleName": "Recruitment", "subModules": [
            { "subModuleName": "Candidates", "permissions": [{ "permissionName": "Read" }, { "permissionName": "Edit" }] },
            { "subModuleName": "CV Bank", "permissions": [] }
        ]}
    ]}))));
    assert_eq!(m.module_count(), 1);
    assert_eq!(m.get("Recruitment", "Candidates").unwrap(), ["Read", "Read", "Edit"]);
    assert!(m.contains("Recruitment", "CV Bank"));
    assert!(m.has("Recruitment", "Candidates", "Edit"));
    assert!(!m.has("Recruitment", "Candidates", "Delete"));
}

#[test]
fn names_kept_verbatim() {
    let m = PermissionMap::build(Some(&user(json!({ "modules": [
        { "moduleName": "Call Center", "subModules": [{ "subModuleName": "FAQ", "permissions": ["Read"] }] }
    ]}))));
    assert!(m.contains("Call Center", "FAQ"));
    assert!(!m.contains("call center", "FAQ"));
    assert!(!m.contains("Call Center", "faq"));
}

#[test]
fn build_is_idempotent() {
    let u = user(json!({ "modules": [
        { "moduleName": "Payroll", "subModules": [
            { "subModuleName": "Shifts", "permissions": [{ "permissionName": "Edit" }, { "permissionName": "Read" }] },
            { "subModuleName": "Medical Shifts", "permissions": [] }
        ]},
        { "moduleName": "Alerts", "subModules": [
            { "subModuleName": "Alerts", "permissions": [{ "permissionName": "Create" }] }
        ]}
    ]}));
    let a = PermissionMap::build(Some(&u));
    let b = PermissionMap::build(Some(&u));
    assert_eq!(sorted_entries(&a), sorted_entries(&b));
    assert_eq!(a, b);
}

#[test]
fn entries_match_grants() {
    let u = user(json!({ "modules": [
        { "moduleName": "Payroll", "subModules": [
            { "subModuleName": "Shifts", "permissions": [{ "permissionName": "Edit" }, { "permissionName": "Read" }] }
        ]}
    ]}));
    let m = PermissionMap::build(Some(&u));
    let from_map: Vec<_> = m.entries().flat_map(|(a, b, p)| p.iter().map(move |n| (a, b, n.as_str()))).collect();
    let grants: Vec<_> = u.grants().collect();
    assert_eq!(from_map.len(), grants.len());
    for g in &grants {
        assert!(m.has(&g.module, &g.sub_module, &g.permission));
    }
}

/// Empty lists alone never trigger the read-only override
#[test]
fn only_read_grants() {
    let read_only = PermissionMap::build(Some(&user(json!({ "modules": [
        { "moduleName": "A", "subModules": [{ "subModuleName": "a", "permissions": ["Read"] }, { "subModuleName": "b", "permissions": [] }] }
    ]}))));
    assert!(read_only.only_read_grants());

    let nothing = PermissionMap::build(Some(&user(json!({ "modules": [
        { "moduleName": "A", "subModules": [{ "subModuleName": "a", "permissions": [] }] }
    ]}))));
    assert!(!nothing.only_read_grants());

    let writer = PermissionMap::build(Some(&user(json!({ "modules": [
        { "moduleName": "A", "subModules": [{ "subModuleName": "a", "permissions": ["Read"] }] },
        { "moduleName": "B", "subModules": [{ "subModuleName": "b", "permissions": ["Delete"] }] }
    ]}))));
    assert!(!writer.only_read_grants());
}
