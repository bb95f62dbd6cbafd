//! Two-axis session status.
//!
//! A status is a [`Stage`] paired with a [`Phase`]. Only seven of the eight
//! combinations are reachable; the fields are private so the eighth
//! (handover + pending) cannot be built. Each legal pair maps to exactly one
//! wire string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Which half of the workflow the session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Handout,
    Handover,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Handout => "handout",
            Self::Handover => "handover",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress within a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing predicted yet.
    Pending,
    /// Latest prediction covered the catalog confidently.
    Auto,
    /// Latest prediction needs an operator to complete it.
    NeedsManual,
    /// Stage committed (issued / returned).
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionStatus {
    stage: Stage,
    phase: Phase,
}

impl SessionStatus {
    pub const DRAFT: Self = Self::new(Stage::Handout, Phase::Pending);
    pub const HANDOUT_AUTO: Self = Self::new(Stage::Handout, Phase::Auto);
    pub const HANDOUT_NEEDS_MANUAL: Self = Self::new(Stage::Handout, Phase::NeedsManual);
    pub const ISSUED: Self = Self::new(Stage::Handout, Phase::Closed);
    pub const HANDOVER_AUTO: Self = Self::new(Stage::Handover, Phase::Auto);
    pub const HANDOVER_NEEDS_MANUAL: Self = Self::new(Stage::Handover, Phase::NeedsManual);
    pub const RETURNED: Self = Self::new(Stage::Handover, Phase::Closed);

    pub const ALL: [Self; 7] = [
        Self::DRAFT,
        Self::HANDOUT_AUTO,
        Self::HANDOUT_NEEDS_MANUAL,
        Self::ISSUED,
        Self::HANDOVER_AUTO,
        Self::HANDOVER_NEEDS_MANUAL,
        Self::RETURNED,
    ];

    const fn new(stage: Stage, phase: Phase) -> Self {
        Self { stage, phase }
    }

    /// Status reached by a prediction in `stage`.
    pub fn predicted(stage: Stage, requires_manual: bool) -> Self {
        let phase = if requires_manual {
            Phase::NeedsManual
        } else {
            Phase::Auto
        };
        Self::new(stage, phase)
    }

    /// Status reached when `stage` is committed.
    pub fn closed(stage: Stage) -> Self {
        Self::new(stage, Phase::Closed)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True for `*_auto` and `*_needs_manual` of the given stage.
    pub fn is_awaiting_final(&self, stage: Stage) -> bool {
        self.stage == stage && matches!(self.phase, Phase::Auto | Phase::NeedsManual)
    }

    /// Ordinal along the workflow, used to assert transitions never go back.
    pub fn rank(&self) -> u8 {
        match (self.stage, self.phase) {
            (Stage::Handout, Phase::Pending) => 0,
            (Stage::Handout, Phase::Auto | Phase::NeedsManual) => 1,
            (Stage::Handout, Phase::Closed) => 2,
            (Stage::Handover, Phase::Pending) => 2,
            (Stage::Handover, Phase::Auto | Phase::NeedsManual) => 3,
            (Stage::Handover, Phase::Closed) => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match (self.stage, self.phase) {
            (Stage::Handout, Phase::Pending) => "draft",
            (Stage::Handout, Phase::Auto) => "handout_auto",
            (Stage::Handout, Phase::NeedsManual) => "handout_needs_manual",
            (Stage::Handout, Phase::Closed) => "issued",
            // Unconstructible; kept total so the match stays exhaustive.
            (Stage::Handover, Phase::Pending) => "issued",
            (Stage::Handover, Phase::Auto) => "handover_auto",
            (Stage::Handover, Phase::NeedsManual) => "handover_needs_manual",
            (Stage::Handover, Phase::Closed) => "returned",
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::DRAFT
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown session status '{s}'")))
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SessionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SessionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
