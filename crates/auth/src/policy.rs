//! Access Policy Table: static route-pattern → required-permission mapping.
//!
//! Loaded once at process start and never mutated. Bracketed path segments
//! (e.g. `/clinic/[branchId]/lab`) match any single concrete segment.

use std::borrow::Cow;

use crate::Permission;

/// One protected route pattern and the permission it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyEntry {
    pattern: Cow<'static, str>,
    permission: Permission,
}

impl PolicyEntry {
    pub fn new(pattern: impl Into<Cow<'static, str>>, permission: Permission) -> Self {
        Self {
            pattern: pattern.into(),
            permission,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn permission(&self) -> &Permission {
        &self.permission
    }
}

/// The static policy table consulted by the authorization engine.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    entries: Vec<PolicyEntry>,
}

impl AccessPolicy {
    pub fn new(entries: Vec<PolicyEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PolicyEntry] {
        &self.entries
    }

    /// Permission required for `route`, if any pattern matches.
    ///
    /// `None` means the route is unregistered and therefore NOT gated
    /// (default-allow). This default is deliberate and security-relevant;
    /// tests assert it explicitly.
    pub fn required_permission(&self, route: &str) -> Option<&Permission> {
        self.entries
            .iter()
            .find(|e| pattern_matches(&e.pattern, route))
            .map(|e| &e.permission)
    }
}

/// Segment-wise pattern match; `[name]` segments are single-segment wildcards.
fn pattern_matches(pattern: &str, route: &str) -> bool {
    let pattern = pattern.trim_end_matches('/');
    let route = route.trim_end_matches('/');

    let mut pat = pattern.split('/');
    let mut seg = route.split('/');

    loop {
        match (pat.next(), seg.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) => {
                let is_placeholder = p.starts_with('[') && p.ends_with(']') && p.len() > 2;
                if !is_placeholder && p != s {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AccessPolicy {
        AccessPolicy::new(vec![
            PolicyEntry::new("/clinic/[branchId]/lab", Permission::new("manage_lab")),
            PolicyEntry::new(
                "/clinic/[branchId]/lab/orders/[orderId]/validate",
                Permission::new("validate_lab_orders"),
            ),
            PolicyEntry::new("/admin/roles", Permission::new("manage_roles")),
        ])
    }

    #[test]
    fn placeholder_segment_matches_any_concrete_id() {
        let policy = policy();
        let required = policy
            .required_permission("/clinic/b-1234/lab")
            .expect("pattern should match");
        assert_eq!(required.as_str(), "manage_lab");
    }

    #[test]
    fn nested_placeholders_match() {
        let policy = policy();
        let required = policy
            .required_permission("/clinic/main/lab/orders/42/validate")
            .expect("pattern should match");
        assert_eq!(required.as_str(), "validate_lab_orders");
    }

    #[test]
    fn exact_segments_must_match() {
        let policy = policy();
        assert!(policy.required_permission("/clinic/main/pharmacy").is_none());
    }

    #[test]
    fn unregistered_route_is_not_gated() {
        let policy = policy();
        assert!(policy.required_permission("/reception/queue").is_none());
    }

    #[test]
    fn segment_count_must_match() {
        let policy = policy();
        assert!(policy.required_permission("/clinic/main/lab/extra").is_none());
        assert!(policy.required_permission("/clinic/main").is_none());
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let policy = policy();
        assert!(policy.required_permission("/admin/roles/").is_some());
    }
}
