use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    /// Tenants. Older tokens call this role `user`.
    #[serde(alias = "user")]
    Guest,
    Supplier,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Guest => "guest",
            Role::Supplier => "supplier",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "guest" | "user" => Ok(Role::Guest),
            "supplier" => Ok(Role::Supplier),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated caller, supplied by the identity layer and trusted as-is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn admin(id: Uuid) -> Self {
        Self::new(id, Role::Admin)
    }

    pub fn guest(id: Uuid) -> Self {
        Self::new(id, Role::Guest)
    }

    pub fn supplier(id: Uuid) -> Self {
        Self::new(id, Role::Supplier)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_accepts_legacy_user_name() {
        let role: Role = serde_json::from_str("\"user\"").expect("Failed to deserialize");
        assert_eq!(role, Role::Guest);

        let role: Role = serde_json::from_str("\"supplier\"").expect("Failed to deserialize");
        assert_eq!(role, Role::Supplier);

        assert!(serde_json::from_str::<Role>("\"owner\"").is_err());
        assert_eq!("USER".parse::<Role>(), Ok(Role::Guest));
    }
}
