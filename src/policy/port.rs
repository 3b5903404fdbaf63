//! The access policy port consumed by the compiler

use std::collections::BTreeMap;

/// Authenticated identity of the caller. Built by the hosting service from
/// verified credentials, never from request JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    pub user_id: String,
    pub roles: Vec<String>,
    /// Claims such as department or region, used by row-level predicates
    pub attributes: BTreeMap<String, String>,
}

impl CallerContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role(&self, roles: &[String]) -> bool {
        roles.iter().any(|r| self.has_role(r))
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// External authorization service.
///
/// Implementations decide what a caller may see; the compiler only enforces
/// the answers. Calls are read-only and may be made once per table and field
/// of every compilation, concurrently from many threads, so implementations
/// must tolerate concurrent reads and must not serve authorization data that
/// is stale relative to a committed permission change.
pub trait AccessPolicy: Send + Sync {
    fn table_allowed(&self, table: &str, caller: &CallerContext) -> bool;

    fn field_allowed(&self, table: &str, field: &str, caller: &CallerContext) -> bool;

    /// A trusted SQL boolean expression restricting visible rows, built only
    /// from the caller's identity and claims. `None` means no restriction
    /// beyond tenant isolation.
    fn row_level_predicate(&self, table: &str, caller: &CallerContext) -> Option<String>;
}

/// A policy bound to one caller for the duration of a compilation.
#[derive(Clone, Copy)]
pub struct AccessDecision<'a> {
    policy: &'a dyn AccessPolicy,
    caller: &'a CallerContext,
}

impl<'a> AccessDecision<'a> {
    pub fn new(policy: &'a dyn AccessPolicy, caller: &'a CallerContext) -> Self {
        Self { policy, caller }
    }

    pub fn caller(&self) -> &CallerContext {
        self.caller
    }

    pub fn table_allowed(&self, table: &str) -> bool {
        self.policy.table_allowed(table, self.caller)
    }

    pub fn field_allowed(&self, table: &str, field: &str) -> bool {
        self.policy.field_allowed(table, field, self.caller)
    }

    pub fn row_level_predicate(&self, table: &str) -> Option<String> {
        self.policy.row_level_predicate(table, self.caller)
    }
}

impl std::fmt::Debug for AccessDecision<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessDecision")
            .field("caller", &self.caller.user_id)
            .finish_non_exhaustive()
    }
}
