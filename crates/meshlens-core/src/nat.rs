//! NAT classification

use serde::{Deserialize, Serialize};

/// NAT classification reported by the engine's STUN probe
///
/// Codes 0..=9 map to fixed variants; anything else is kept as
/// [`NatType::Other`] so new engine codes never fail a decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NatType {
    #[default]
    Unknown,
    OpenInternet,
    NoPat,
    FullCone,
    RestrictedCone,
    PortRestrictedCone,
    Symmetric,
    SymmetricFirewall,
    SymmetricIncreasing,
    SymmetricDecreasing,
    Other(i64),
}

impl NatType {
    /// Map an engine code to its classification
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Unknown,
            1 => Self::OpenInternet,
            2 => Self::NoPat,
            3 => Self::FullCone,
            4 => Self::RestrictedCone,
            5 => Self::PortRestrictedCone,
            6 => Self::Symmetric,
            7 => Self::SymmetricFirewall,
            8 => Self::SymmetricIncreasing,
            9 => Self::SymmetricDecreasing,
            other => Self::Other(other),
        }
    }

    /// The engine code for this classification
    pub fn code(&self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::OpenInternet => 1,
            Self::NoPat => 2,
            Self::FullCone => 3,
            Self::RestrictedCone => 4,
            Self::PortRestrictedCone => 5,
            Self::Symmetric => 6,
            Self::SymmetricFirewall => 7,
            Self::SymmetricIncreasing => 8,
            Self::SymmetricDecreasing => 9,
            Self::Other(code) => *code,
        }
    }
}

impl std::fmt::Display for NatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::OpenInternet => write!(f, "Open Internet"),
            Self::NoPat => write!(f, "No PAT"),
            Self::FullCone => write!(f, "Full Cone"),
            Self::RestrictedCone => write!(f, "Restricted Cone"),
            Self::PortRestrictedCone => write!(f, "Port-Restricted Cone"),
            Self::Symmetric => write!(f, "Symmetric"),
            Self::SymmetricFirewall => write!(f, "Symmetric+Firewall"),
            Self::SymmetricIncreasing => write!(f, "Symmetric Increasing"),
            Self::SymmetricDecreasing => write!(f, "Symmetric Decreasing"),
            Self::Other(code) => write!(f, "Other({})", code),
        }
    }
}
