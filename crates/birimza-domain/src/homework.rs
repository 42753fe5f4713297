//! Homework review status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Review state of a homework submission.
///
/// Transitions are one-way: `Pending` → `ReviewedOk` | `ReviewedIncomplete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeworkStatus {
    Pending,
    ReviewedOk,
    ReviewedIncomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown homework status: {0}")]
pub struct UnknownStatus(pub String);

impl HomeworkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ReviewedOk => "reviewed_ok",
            Self::ReviewedIncomplete => "reviewed_incomplete",
        }
    }

    /// Whether a teacher may move a homework from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::ReviewedOk) | (Self::Pending, Self::ReviewedIncomplete)
        )
    }

    pub fn is_review_outcome(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HomeworkStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "reviewed_ok" => Ok(Self::ReviewedOk),
            "reviewed_incomplete" => Ok(Self::ReviewedIncomplete),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Status filter for homework listings. `all` disables filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    PendingOnly,
    Only(HomeworkStatus),
    All,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Result<Self, UnknownStatus> {
        if s == "all" {
            return Ok(Self::All);
        }
        Ok(match s.parse::<HomeworkStatus>()? {
            HomeworkStatus::Pending => Self::PendingOnly,
            status => Self::Only(status),
        })
    }

    pub fn status(self) -> Option<HomeworkStatus> {
        match self {
            Self::PendingOnly => Some(HomeworkStatus::Pending),
            Self::Only(status) => Some(status),
            Self::All => None,
        }
    }
}
