use super::{shapes, Constraints, DrawError, Sampler};
use crate::model::{Assignment, Roster};
use rand::Rng;

/// Échantillonnage par rejet : chaque tentative est un tirage neuf et indépendant.
pub(super) fn constrained_draw<R: Rng + ?Sized>(
    roster: &Roster,
    constraints: &Constraints,
    sampler: Sampler,
    max_attempts: u64,
    rng: &mut R,
) -> Result<Assignment, DrawError> {
    let n = roster.len();
    if n < 2 {
        return Err(DrawError::DegenerateRoster(n));
    }
    if max_attempts == 0 {
        return Err(DrawError::NoAttempts);
    }

    for attempt in 1..=max_attempts {
        let candidate = Assignment::from_derangement(shapes::sample(sampler, n, rng));
        if constraints.is_satisfied_by(roster, &candidate) {
            tracing::debug!(attempt, %sampler, participants = n, "draw accepted");
            return Ok(candidate);
        }
        tracing::trace!(attempt, "candidate rejected");
    }

    tracing::warn!(
        max_attempts,
        %sampler,
        "no assignment satisfies the constraints"
    );
    Err(DrawError::Infeasible {
        attempts: max_attempts,
    })
}
