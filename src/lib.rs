//! capgate - module/sub-module RBAC for admin consoles
//!
//! A user record lists modules, their sub-modules, and the permission names
//! granted on each. From it capgate answers two questions for the UI:
//! may this user do X on this screen ([`resolve`]), and which controls should
//! this screen render ([`capabilities`]).
//!
//! ```
//! use capgate::{capabilities, Session, UserRecord};
//!
//! let user = UserRecord::from_json(r#"{
//!     "isAdmin": false,
//!     "modules": [{ "moduleName": "Admin Settings", "subModules": [
//!         { "subModuleName": "Users", "permissions": [{ "permissionName": "Edit" }] }
//!     ]}]
//! }"#).unwrap();
//! let caps = capabilities(&Session::new(user), "Admin Settings", "Users");
//! assert!(caps.can_read && caps.show_edit_button && !caps.show_delete_button);
//! ```

pub mod cache;
pub mod caps;
pub mod config;
pub mod error;
pub mod guard;
pub mod map;
pub mod perm;
pub mod provider;
pub mod record;
pub mod resolve;
pub mod session;
pub mod source;

pub use cache::UserCache;
pub use caps::{capabilities, has_only_read_globally, CapabilityBundle};
pub use config::ProviderConfig;
pub use error::{GateError, Result};
pub use guard::{guard, ActionButtons, ButtonState, Verdict, FORBIDDEN_PATH};
pub use map::PermissionMap;
pub use perm::Permission;
pub use provider::SessionProvider;
pub use record::{Grant, ModuleGrant, SubModuleGrant, UserRecord};
pub use resolve::{resolve, resolve_named};
pub use session::{DataState, LoadState, Phase, Session};
pub use source::UserSource;

#[cfg(feature = "http")]
pub use source::HttpUserSource;
