use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Plafond par défaut de tentatives avant d'abandonner.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 100_000;

/// Forme des dérangements proposés au validateur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Sampler {
    /// Un seul cycle sur un ordre mélangé. Biaisé, jamais de paires croisées.
    #[default]
    Cycle,
    /// Mélange uniforme rejeté tant qu'il reste un point fixe.
    Uniform,
}

impl fmt::Display for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sampler::Cycle => f.write_str("cycle"),
            Sampler::Uniform => f.write_str("uniform"),
        }
    }
}

impl FromStr for Sampler {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cycle" => Ok(Sampler::Cycle),
            "uniform" => Ok(Sampler::Uniform),
            other => Err(format!("unknown sampler: {other} (expected cycle|uniform)")),
        }
    }
}

/// Options de tirage
#[derive(Debug, Clone)]
pub struct DrawOptions {
    /// Colonne dont la valeur doit différer entre donneur et destinataire.
    pub group: Option<String>,
    pub max_attempts: u64,
    /// Graine fixe pour un tirage reproductible.
    pub seed: Option<u64>,
    pub sampler: Sampler,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            group: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
            sampler: Sampler::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    SameGroup,
    /// Index de la règle violée dans la liste fournie.
    Rule(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub giver: usize,
    pub recipient: usize,
    pub kind: ViolationKind,
}

#[derive(Error, Debug)]
pub enum DrawError {
    #[error("cannot draw with {0} participant(s): at least 2 are required")]
    DegenerateRoster(usize),
    #[error("no valid assignment found after {attempts} attempts")]
    Infeasible { attempts: u64 },
    #[error("max_attempts must be > 0")]
    NoAttempts,
    #[error("unknown column: {0}")]
    UnknownAttribute(String),
}
