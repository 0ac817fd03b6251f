//! Generation lifecycle states and the transition table.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::templates::Generation;

/// Lifecycle state of a generation.
///
/// Transitions: `Draft -> Active`, `Active -> Archived`, `Draft -> Archived`.
/// `Archived` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

impl GenerationStatus {
    /// Returns the database string representation (SCREAMING_SNAKE_CASE).
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            GenerationStatus::Draft => "DRAFT",
            GenerationStatus::Active => "ACTIVE",
            GenerationStatus::Archived => "ARCHIVED",
        }
    }

    pub fn from_db_str(value: &str) -> Result<Self> {
        match value {
            "DRAFT" => Ok(GenerationStatus::Draft),
            "ACTIVE" => Ok(GenerationStatus::Active),
            "ARCHIVED" => Ok(GenerationStatus::Archived),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown generation status '{}'",
                other
            ))
            .into()),
        }
    }

    pub fn can_transition_to(&self, target: GenerationStatus) -> bool {
        use GenerationStatus::*;
        match (self, target) {
            (Draft, Active) | (Active, Archived) | (Draft, Archived) => true,
            (Draft, Draft) | (Active, Draft) | (Active, Active) => false,
            (Archived, _) => false,
        }
    }

    /// Fails with `InvalidTransition` if `self -> target` is not allowed.
    pub fn ensure_transition(&self, target: GenerationStatus) -> Result<()> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(ValidationError::InvalidTransition {
                from: *self,
                to: target,
            }
            .into())
        }
    }

    /// Whether products pinned to this status still need migrating.
    pub fn is_current(&self) -> bool {
        matches!(self, GenerationStatus::Active)
    }
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationStatus::Draft => write!(f, "draft"),
            GenerationStatus::Active => write!(f, "active"),
            GenerationStatus::Archived => write!(f, "archived"),
        }
    }
}

/// Outcome of an activation: the new active generation and the predecessor
/// it superseded, if any.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivationResult {
    pub activated: Generation,
    pub archived: Option<Generation>,
}
