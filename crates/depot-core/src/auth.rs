//! # Authorization Model
//!
//! Role-based authorization as a flat permission allow-list.
//!
//! ## Two Independent Checks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Authorization Surfaces                              │
//! │                                                                         │
//! │  1. Permission keys (fine-grained)                                     │
//! │     "products:update_stock" ∈ role's allow-list?                       │
//! │     └── Gates every mutating call into the stock ledger                │
//! │                                                                         │
//! │  2. Route prefixes (coarse)                                            │
//! │     "/products/edit" starts_with an allowed prefix?                    │
//! │     └── Independent of the permission map. A caller can be denied      │
//! │         at the route layer while permission keys would allow the       │
//! │         underlying action, and vice versa. This asymmetry is           │
//! │         intentional and preserved.                                     │
//! │                                                                         │
//! │  Unknown role name ⇒ no permissions, no routes (fail closed).          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design
//! - No wildcards, no hierarchy: membership in a precomputed static table.
//!   Two roles with overlapping needs each enumerate their keys in full.
//! - Pure lookup, no side effects, no I/O: checks are synchronous and
//!   impose no concurrency concerns.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Role
// =============================================================================

/// A user role. Closed set - the permission tables below are the sole
/// authority for what each role may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Staff,
}

// =============================================================================
// Static Permission Tables
// =============================================================================
// Flat "resource:action" keys. Kept sorted by resource for readability;
// lookup is a linear scan over a handful of entries, which beats a heap
// allocated set for tables this small.

const ADMIN_PERMISSIONS: &[&str] = &[
    "categories:create",
    "categories:delete",
    "categories:read",
    "categories:update",
    "dashboard:read",
    "locations:create",
    "locations:delete",
    "locations:read",
    "locations:update",
    "notifications:manage",
    "notifications:read",
    "products:create",
    "products:delete",
    "products:read",
    "products:update",
    "products:update_stock",
    "reports:read",
    "sales:create",
    "sales:read",
    "settings:update",
    "users:create",
    "users:delete",
    "users:read",
    "users:update",
];

const MANAGER_PERMISSIONS: &[&str] = &[
    "categories:create",
    "categories:read",
    "categories:update",
    "dashboard:read",
    "locations:create",
    "locations:read",
    "locations:update",
    "notifications:manage",
    "notifications:read",
    "products:create",
    "products:read",
    "products:update",
    "products:update_stock",
    "reports:read",
    "sales:create",
    "sales:read",
];

const STAFF_PERMISSIONS: &[&str] = &[
    "dashboard:read",
    "notifications:read",
    "products:read",
    "products:update_stock",
    "sales:create",
    "sales:read",
];

// Route prefix allow-lists. Deliberately independent of the permission
// tables above (see module docs).

const ADMIN_ROUTES: &[&str] = &["/"];

const MANAGER_ROUTES: &[&str] = &[
    "/dashboard",
    "/products",
    "/locations",
    "/categories",
    "/sales",
    "/reports",
    "/notifications",
];

const STAFF_ROUTES: &[&str] = &["/dashboard", "/products", "/sales", "/notifications"];

impl Role {
    /// Parses a collaborator-supplied role name, case-insensitively.
    ///
    /// Unknown names yield `None`: the caller gets no permissions and no
    /// route access rather than an error path that could bypass the check.
    pub fn parse(name: &str) -> Option<Role> {
        match name.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }

    /// Stable lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }

    /// The role's full permission key set.
    pub const fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Admin => ADMIN_PERMISSIONS,
            Role::Manager => MANAGER_PERMISSIONS,
            Role::Staff => STAFF_PERMISSIONS,
        }
    }

    /// Exact membership check against the role's flat allow-list.
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::auth::Role;
    ///
    /// assert!(Role::Admin.has_permission("products:delete"));
    /// assert!(!Role::Staff.has_permission("products:delete"));
    /// ```
    pub fn has_permission(&self, key: &str) -> bool {
        self.permissions().contains(&key)
    }

    /// Coarse route check: does `path` start with an allowed prefix?
    pub fn can_access_route(&self, path: &str) -> bool {
        let routes = match self {
            Role::Admin => ADMIN_ROUTES,
            Role::Manager => MANAGER_ROUTES,
            Role::Staff => STAFF_ROUTES,
        };
        routes.iter().any(|prefix| path.starts_with(prefix))
    }
}

// =============================================================================
// Free-Function Contract
// =============================================================================
// Mirrors the collaborator-facing contract: role arrives as a string and
// every failure resolves to denial.

/// `true` iff the named role exists and its allow-list contains the key.
pub fn has_permission(role_name: &str, key: &str) -> bool {
    Role::parse(role_name).is_some_and(|role| role.has_permission(key))
}

/// `true` iff the named role exists and may access the route.
pub fn can_access_route(role_name: &str, path: &str) -> bool {
    Role::parse(role_name).is_some_and(|role| role.can_access_route(path))
}

/// The named role's permission set; empty for unknown roles.
pub fn role_permissions(role_name: &str) -> &'static [&'static str] {
    Role::parse(role_name).map_or(&[], |role| role.permissions())
}

// =============================================================================
// Principal
// =============================================================================

/// An authenticated principal, as supplied by the authentication
/// collaborator. The core trusts this input and performs no independent
/// identity verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    /// Role name as supplied; resolved (and possibly rejected) at the
    /// authorization seam, not at construction.
    pub role_name: String,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role_name: impl Into<String>) -> Self {
        Principal {
            user_id: user_id.into(),
            role_name: role_name.into(),
        }
    }

    /// Resolves the role, failing closed on unknown names.
    pub fn role(&self) -> CoreResult<Role> {
        Role::parse(&self.role_name).ok_or(CoreError::Unauthorized)
    }

    /// Requires a permission key, short-circuiting before any business
    /// logic runs.
    ///
    /// ## Errors
    /// - `Unauthorized` - role name does not resolve
    /// - `Forbidden` - role resolves but lacks the key
    pub fn require(&self, key: &str) -> CoreResult<()> {
        let role = self.role()?;
        if role.has_permission(key) {
            Ok(())
        } else {
            Err(CoreError::forbidden(key))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
