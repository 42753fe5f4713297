//! Account roles.

use serde::{Deserialize, Serialize};

/// Kind of account a token was issued to.
///
/// Wire format: `u8` (0 = Parent, 1 = Teacher, 2 = Admin). Parents live in
/// their own table; teachers and admins share the staff table and store the
/// same wire value in `staff_users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Parent = 0,
    Teacher = 1,
    Admin = 2,
}

impl Role {
    /// Convert from `u8` wire value. Returns `None` for unknown values.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Parent),
            1 => Some(Self::Teacher),
            2 => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert to `u8` wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Staff roles are the ones stored in `staff_users`.
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Teacher | Self::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }
}
