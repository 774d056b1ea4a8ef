use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    Videographer,
    Photographer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Videographer => "VIDEOGRAPHER",
            Role::Photographer => "PHOTOGRAPHER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CLIENT" => Some(Role::Client),
            "VIDEOGRAPHER" => Some(Role::Videographer),
            "PHOTOGRAPHER" => Some(Role::Photographer),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn is_provider(&self) -> bool {
        match self {
            Role::Videographer | Role::Photographer => true,
            Role::Client | Role::Admin => false,
        }
    }
}

/// Provider check over a role that may be absent or unrecognised upstream.
pub fn is_provider_role(role: Option<Role>) -> bool {
    role.is_some_and(|r| r.is_provider())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_roles() {
        assert!(is_provider_role(Role::parse("VIDEOGRAPHER")));
        assert!(is_provider_role(Role::parse("PHOTOGRAPHER")));
    }

    #[test]
    fn test_non_provider_roles() {
        assert!(!is_provider_role(Role::parse("CLIENT")));
        assert!(!is_provider_role(Role::parse("ADMIN")));
    }

    #[test]
    fn test_absent_role_is_not_provider() {
        assert!(!is_provider_role(None));
        assert!(!is_provider_role(Role::parse("")));
        assert!(!is_provider_role(Role::parse("photographer")));
    }

    #[test]
    fn test_role_round_trips_through_label() {
        for role in [Role::Client, Role::Videographer, Role::Photographer, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_role_deserializes_from_wire_label() {
        let role: Role = serde_json::from_str("\"PHOTOGRAPHER\"").unwrap();
        assert_eq!(role, Role::Photographer);
        assert!(serde_json::from_str::<Role>("\"SPECTATOR\"").is_err());
    }
}
