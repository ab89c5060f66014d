//! Role → path access table.
//!
//! One table serves both the authorization check and the development
//! role inference, so the two can never disagree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::routing::matcher::has_segment_prefix;
use crate::routing::Role;

/// The portal area owned by one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleArea {
    /// Canonical area prefix (e.g. `/portal/teacher`).
    pub home: String,

    /// Unprefixed aliases served outside the portal root (e.g. `/teacher`).
    #[serde(default)]
    pub legacy: Vec<String>,

    /// Extra prefixes the role may visit without owning them.
    #[serde(default)]
    pub allow: Vec<String>,
}

impl RoleArea {
    pub fn new(home: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            legacy: Vec::new(),
            allow: Vec::new(),
        }
    }

    pub fn with_legacy(mut self, prefix: impl Into<String>) -> Self {
        self.legacy.push(prefix.into());
        self
    }

    pub fn with_allow(mut self, prefix: impl Into<String>) -> Self {
        self.allow.push(prefix.into());
        self
    }

    /// Prefixes that identify this role's own pages.
    pub fn owned(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.home.as_str()).chain(self.legacy.iter().map(String::as_str))
    }

    /// Every prefix this role may reach.
    pub fn reachable(&self) -> impl Iterator<Item = &str> {
        self.owned().chain(self.allow.iter().map(String::as_str))
    }
}

/// Static mapping from role to its allowed path prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessMap {
    areas: BTreeMap<Role, RoleArea>,
}

impl Default for AccessMap {
    fn default() -> Self {
        let mut areas = BTreeMap::new();
        areas.insert(Role::Admin, RoleArea::new("/portal/admin"));
        areas.insert(Role::StaffAccountant, RoleArea::new("/portal/staff-accountant"));
        areas.insert(Role::StaffManager, RoleArea::new("/portal/staff-manager"));
        areas.insert(
            Role::Teacher,
            RoleArea::new("/portal/teacher").with_legacy("/teacher"),
        );
        areas.insert(
            Role::Student,
            RoleArea::new("/portal/student").with_legacy("/student"),
        );
        areas.insert(Role::Parent, RoleArea::new("/portal/parent"));
        Self { areas }
    }
}

impl AccessMap {
    pub fn empty() -> Self {
        Self {
            areas: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, role: Role, area: RoleArea) -> Option<RoleArea> {
        self.areas.insert(role, area)
    }

    pub fn area(&self, role: Role) -> Option<&RoleArea> {
        self.areas.get(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &RoleArea)> {
        self.areas.iter().map(|(role, area)| (*role, area))
    }

    /// Whether `role` may reach the locale-stripped `path`.
    /// Roles without an entry reach nothing.
    pub fn permits(&self, role: Role, path: &str) -> bool {
        self.area(role)
            .is_some_and(|area| area.reachable().any(|p| has_segment_prefix(path, p)))
    }

    /// The role whose own area contains `path`. Longest prefix wins.
    pub fn infer_role(&self, path: &str) -> Option<Role> {
        self.iter()
            .flat_map(|(role, area)| area.owned().map(move |p| (role, p)))
            .filter(|(_, prefix)| has_segment_prefix(path, prefix))
            .max_by_key(|(_, prefix)| prefix.len())
            .map(|(role, _)| role)
    }

    /// All legacy aliases across roles.
    pub fn legacy_prefixes(&self) -> impl Iterator<Item = &str> {
        self.areas
            .values()
            .flat_map(|area| area.legacy.iter().map(String::as_str))
    }

    /// Every configured prefix, tagged with the role it belongs to.
    pub fn all_prefixes(&self) -> impl Iterator<Item = (Role, &str)> {
        self.iter()
            .flat_map(|(role, area)| area.reachable().map(move |p| (role, p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_permits_own_area() {
        let map = AccessMap::default();
        assert!(map.permits(Role::Admin, "/portal/admin/fees"));
        assert!(map.permits(Role::Teacher, "/portal/teacher/classes"));
        assert!(map.permits(Role::Teacher, "/teacher/assignments"));
        assert!(map.permits(Role::Student, "/student"));
    }

    #[test]
    fn test_default_denies_foreign_area() {
        let map = AccessMap::default();
        assert!(!map.permits(Role::Student, "/portal/admin/accounts"));
        assert!(!map.permits(Role::Admin, "/portal/teacher"));
        assert!(!map.permits(Role::Parent, "/teacher/assignments"));
    }

    #[test]
    fn test_segment_boundary_is_respected() {
        let map = AccessMap::default();
        assert!(!map.permits(Role::Admin, "/portal/admins"));
        assert!(!map.permits(Role::Teacher, "/teachers"));
    }

    #[test]
    fn test_allow_list_extends_reach() {
        let mut map = AccessMap::default();
        map.insert(
            Role::StaffManager,
            RoleArea::new("/portal/staff-manager").with_allow("/portal/staff-accountant/reports"),
        );
        assert!(map.permits(Role::StaffManager, "/portal/staff-accountant/reports/q3"));
        assert!(!map.permits(Role::StaffManager, "/portal/staff-accountant/fees"));
        // allow-listed prefixes do not make the role the owner
        assert_eq!(
            map.infer_role("/portal/staff-accountant/reports"),
            Some(Role::StaffAccountant)
        );
    }

    #[test]
    fn test_missing_entry_denies() {
        let mut map = AccessMap::empty();
        map.insert(Role::Admin, RoleArea::new("/portal/admin"));
        assert!(!map.permits(Role::Student, "/portal/student"));
    }

    #[test]
    fn test_infer_role() {
        let map = AccessMap::default();
        assert_eq!(map.infer_role("/portal/admin/rooms"), Some(Role::Admin));
        assert_eq!(map.infer_role("/teacher/assignments"), Some(Role::Teacher));
        assert_eq!(map.infer_role("/student"), Some(Role::Student));
        assert_eq!(map.infer_role("/portal/unknown"), None);
        assert_eq!(map.infer_role("/portal"), None);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let mut map = AccessMap::empty();
        map.insert(Role::Admin, RoleArea::new("/portal/staff"));
        map.insert(Role::StaffManager, RoleArea::new("/portal/staff/manager"));
        assert_eq!(map.infer_role("/portal/staff/manager/leads"), Some(Role::StaffManager));
        assert_eq!(map.infer_role("/portal/staff/other"), Some(Role::Admin));
    }

    #[test]
    fn test_toml_shape() {
        let raw = r#"
            [TEACHER]
            home = "/portal/teacher"
            legacy = ["/teacher"]

            [ADMIN]
            home = "/portal/admin"
        "#;
        let map: AccessMap = toml::from_str(raw).unwrap();
        assert_eq!(map.area(Role::Teacher).unwrap().legacy, vec!["/teacher"]);
        assert!(map.area(Role::Admin).unwrap().allow.is_empty());
        assert!(map.area(Role::Student).is_none());
    }
}
