use serde::{Deserialize, Serialize};

/// The roles every store is seeded with. Many users share one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Admin,
    Regular,
}

/// Role assigned to a user created without an explicit `role_id`.
pub const DEFAULT_ROLE: RoleKind = RoleKind::Regular;

impl RoleKind {
    pub const ALL: [RoleKind; 2] = [RoleKind::Admin, RoleKind::Regular];

    /// Primary key of the seeded `roles` row.
    pub fn id(&self) -> i64 {
        match self {
            RoleKind::Admin => 1,
            RoleKind::Regular => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoleKind::Admin => "admin",
            RoleKind::Regular => "regular",
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_role_is_id_two() {
        assert_eq!(DEFAULT_ROLE.id(), 2);
        assert_eq!(RoleKind::from_id(2), Some(RoleKind::Regular));
        assert_eq!(RoleKind::from_id(7), None);
    }
}
