use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Gender ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    /// Single-letter storage code.
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            "O" => Some(Gender::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
        }
    }
}

// --- Disposition ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Like,
    Dislike,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Like => "like",
            Disposition::Dislike => "dislike",
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Disposition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" => Ok(Disposition::Like),
            "dislike" | "pass" => Ok(Disposition::Dislike),
            _ => Err(format!("unknown disposition: {s}")),
        }
    }
}

// --- Profile ---

/// Read-only view of a profile from the directory. Only the attributes the
/// feed filters on are carried.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub age: i32,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
}

// --- Interest ---

/// Directional like/pass signal. One per ordered (actor, target) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interest {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub disposition: Disposition,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInterest {
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub disposition: Disposition,
}

// --- Match ---

/// Canonical undirected pairing. `member_low` precedes `member_high` under
/// the service's pair ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub id: Uuid,
    pub member_low: Uuid,
    pub member_high: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Match {
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.member_low == user_id || self.member_high == user_id
    }

    /// The member that is not `user_id`, or `None` if `user_id` is not a member.
    pub fn other_member(&self, user_id: Uuid) -> Option<Uuid> {
        if user_id == self.member_low {
            Some(self.member_high)
        } else if user_id == self.member_high {
            Some(self.member_low)
        } else {
            None
        }
    }
}
