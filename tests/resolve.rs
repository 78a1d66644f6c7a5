//! Resolver rule tests: admin bypass, existence-implies-Read, explicit write
//! grants, sibling inheritance, loading race and degraded-map fallback

use capgate::*;
use serde_json::{json, Value};

fn user(v: Value) -> UserRecord {
    serde_json::from_value(v).unwrap()
}

fn hospital() -> UserRecord {
    user(json!({
        "isAdmin": false,
        "modules": [
            { "moduleName": "Admin Settings", "subModules": [
                { "subModuleName": "System Settings", "permissions": [{ "permissionName": "Read" }] },
                { "subModuleName": "Users", "permissions": [] }
            ]},
            { "moduleName": "Call Center", "subModules": [
                { "subModuleName": "Clinics", "permissions": [] },
                { "subModuleName": "Doctors", "permissions": [{ "permissionName": "Edit" }] }
            ]},
            { "moduleName": "Payroll", "subModules": [
                { "subModuleName": "Shifts", "permissions": [] }
            ]}
        ]
    }))
}

// ============================================================================
// Admin
// ============================================================================

#[test]
fn admin_passes_everything() {
    let s = Session::new(user(json!({ "isAdmin": true, "modules": [] })));
    for p in Permission::ALL {
        assert!(resolve(&s, "Recruitment", "Candidates", p));
        assert!(resolve(&s, "", "", p));
    }
}

#[test]
fn admin_passes_while_loading() {
    let s = Session::new(user(json!({ "isAdmin": true }))).with_loading(true);
    assert!(resolve(&s, "Payroll", "Shifts", Permission::Delete));
}

// ============================================================================
// Existence implies Read
// ============================================================================

/// A sub-module key with an empty list still grants Read
#[test]
fn mapped_sub_module_with_no_permissions_is_readable() {
    let s = Session::new(hospital());
    assert!(resolve(&s, "Admin Settings", "Users", Permission::Read));
    assert!(resolve(&s, "Payroll", "Shifts", Permission::Read));
}

/// Clinics is listed without permissions: readable, not editable
#[test]
fn call_center_clinics_readable_by_existence() {
    let s = Session::new(hospital());
    assert!(resolve(&s, "Call Center", "Clinics", Permission::Read));
    assert!(!resolve(&s, "Call Center", "Clinics", Permission::Edit));
    assert!(resolve(&s, "Call Center", "Doctors", Permission::Edit));
}

#[test]
fn absent_module_is_denied() {
    let s = Session::new(hospital());
    assert!(!resolve(&s, "X", "Y", Permission::Read));
    assert!(!resolve(&s, "Recruitment", "Candidates", Permission::Read));
}

#[test]
fn names_are_case_sensitive() {
    let s = Session::new(hospital());
    assert!(!resolve(&s, "call center", "Clinics", Permission::Read));
    assert!(resolve(&s, "Call Center", "Doctors", Permission::Read));
    assert!(!resolve(&s, "Call Center", "doctors", Permission::Edit));
}

// ============================================================================
// Write kinds need the exact name
// ============================================================================

/// Write kinds match the exact name only
#[test]
fn write_requires_explicit_grant() {
    let s = Session::new(user(json!({ "modules": [
        { "moduleName": "Recruitment", "subModules": [
            { "subModuleName": "Candidates", "permissions": [{ "permissionName": "Create" }, { "permissionName": "Delete" }] },
            { "subModuleName": "Schedule", "permissions": [{ "permissionName": "Full" }] }
        ]}
    ]})));
    assert!(resolve(&s, "Recruitment", "Candidates", Permission::Create));
    assert!(resolve(&s, "Recruitment", "Candidates", Permission::Delete));
    assert!(!resolve(&s, "Recruitment", "Candidates", Permission::Edit));
    assert!(!resolve(&s, "Recruitment", "Candidates", Permission::Full));
    // Full is its own grant, not a wildcard at this level
    assert!(resolve(&s, "Recruitment", "Schedule", Permission::Full));
    assert!(!resolve(&s, "Recruitment", "Schedule", Permission::Edit));
}

#[test]
fn write_grants_are_not_inherited() {
    let s = Session::new(hospital());
    // Doctors holds Edit; an unlisted sibling gets Read only
    assert!(resolve(&s, "Call Center", "FAQ", Permission::Read));
    assert!(!resolve(&s, "Call Center", "FAQ", Permission::Edit));
}

// ============================================================================
// Sibling inheritance
// ============================================================================

/// Unlisted sub-modules inherit Read from a granted sibling
#[test]
fn read_on_one_sub_module_covers_unlisted_siblings() {
    let s = Session::new(hospital());
    assert!(resolve(&s, "Admin Settings", "Branches", Permission::Read));
    assert!(resolve(&s, "Admin Settings", "Permissions", Permission::Read));
}

#[test]
fn inheritance_needs_a_granted_sibling() {
    let s = Session::new(hospital());
    // Payroll only has an empty Shifts entry
    assert!(!resolve(&s, "Payroll", "Medical Shifts", Permission::Read));
}

/// Grants in other modules never leak across
#[test]
fn inheritance_stays_inside_the_module() {
    let s = Session::new(hospital());
    assert!(!resolve(&s, "Recruitment", "System Settings", Permission::Read));
    assert!(!resolve(&s, "Recruitment", "Doctors", Permission::Read));
}

/// Raw record ahead of the map: Read still comes from siblings
#[test]
fn raw_sub_module_missing_from_stale_map_inherits_read() {
    let raw = user(json!({ "modules": [
        { "moduleName": "M", "subModules": [
            { "subModuleName": "A", "permissions": [{ "permissionName": "View" }] },
            { "subModuleName": "B", "permissions": [] }
        ]}
    ]}));
    let older = user(json!({ "modules": [
        { "moduleName": "M", "subModules": [
            { "subModuleName": "A", "permissions": [{ "permissionName": "View" }] }
        ]}
    ]}));
    let s = Session::new(raw).with_permissions(PermissionMap::build(Some(&older)));
    assert!(!s.permissions().contains("M", "B"));
    assert!(resolve(&s, "M", "B", Permission::Read));
    assert!(!resolve(&s, "M", "B", Permission::Edit));
}

// ============================================================================
// Identifiers and permission names
// ============================================================================

#[test]
fn empty_identifiers_are_denied() {
    let s = Session::new(hospital());
    assert!(!resolve(&s, "", "Users", Permission::Read));
    assert!(!resolve(&s, "Admin Settings", "", Permission::Read));
}

#[test]
fn unknown_permission_names_are_rejected() {
    let s = Session::new(hospital());
    assert_eq!(resolve_named(&s, "Call Center", "Doctors", "Edit"), Ok(true));
    assert_eq!(resolve_named(&s, "Call Center", "Doctors", "Delete"), Ok(false));
    assert_eq!(
        resolve_named(&s, "Call Center", "Doctors", "read"),
        Err(GateError::UnknownPermission("read".into()))
    );
    assert!(resolve_named(&s, "Call Center", "Doctors", "Manage").is_err());

    let admin = Session::new(user(json!({ "isAdmin": true })));
    assert!(resolve_named(&admin, "Call Center", "Doctors", "View").is_err());
}

// ============================================================================
// Loading race and degraded map
// ============================================================================

#[test]
fn pending_session_fails_closed() {
    let s = Session::pending();
    assert_eq!(s.data_state(), DataState::Unloaded);
    for p in Permission::ALL {
        assert!(!resolve(&s, "Admin Settings", "Users", p));
    }
}

/// A refetch in flight does not revoke access already loaded
#[test]
fn loading_flag_ignored_when_data_is_there() {
    let s = Session::new(hospital()).with_loading(true);
    assert!(s.is_loading());
    assert_eq!(s.data_state(), DataState::Ready);
    assert!(resolve(&s, "Admin Settings", "Users", Permission::Read));
    assert!(resolve(&s, "Call Center", "Doctors", Permission::Edit));
}

/// Loading with a user but no map yet denies everything
#[test]
fn loading_with_unbuilt_map_fails_closed() {
    let s = Session::new(hospital()).with_permissions(PermissionMap::default()).with_loading(true);
    assert_eq!(s.data_state(), DataState::Unloaded);
    assert!(!resolve(&s, "Admin Settings", "System Settings", Permission::Read));
}

/// Settled user with an empty map answers Read from the raw modules
#[test]
fn degraded_map_answers_read_from_raw_modules() {
    let s = Session::new(hospital()).with_permissions(PermissionMap::default());
    assert_eq!(s.data_state(), DataState::Degraded);
    assert!(resolve(&s, "Admin Settings", "System Settings", Permission::Read));
    // sibling of a granted sub-module
    assert!(resolve(&s, "Admin Settings", "Users", Permission::Read));
    assert!(resolve(&s, "Call Center", "Clinics", Permission::Read));
    // no sub-module of Payroll holds anything, so existence alone is not enough here
    assert!(!resolve(&s, "Payroll", "Shifts", Permission::Read));
    assert!(!resolve(&s, "X", "Y", Permission::Read));
    // writes are never answered from the raw list
    assert!(!resolve(&s, "Call Center", "Doctors", Permission::Edit));
}

#[test]
fn no_user_no_access() {
    let s = Session::anonymous();
    assert!(!s.is_loading());
    assert_eq!(s.data_state(), DataState::Unloaded);
    assert!(!resolve(&s, "Admin Settings", "Users", Permission::Read));
}
