mod constraints;
mod shapes;
mod sampling;
mod types;

pub use constraints::{validate, Constraints};
pub use types::{DrawError, DrawOptions, Sampler, Violation, ViolationKind, DEFAULT_MAX_ATTEMPTS};

use crate::model::{Assignment, Roster};
use crate::rules::Rule;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Dérangement simple (cycle unique) de `0..n`, sans contrainte.
pub fn derangement<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Assignment, DrawError> {
    if n < 2 {
        return Err(DrawError::DegenerateRoster(n));
    }
    Ok(Assignment::from_derangement(shapes::single_cycle(n, rng)))
}

/// Drawer : associe un roster figé à ses contraintes
#[derive(Debug)]
pub struct Drawer<'a> {
    roster: &'a Roster,
    constraints: Constraints,
    opts: DrawOptions,
}

impl<'a> Drawer<'a> {
    /// Valide en amont la taille du roster et les colonnes référencées.
    pub fn new(roster: &'a Roster, rules: Vec<Rule>, opts: DrawOptions) -> Result<Self, DrawError> {
        if roster.len() < 2 {
            return Err(DrawError::DegenerateRoster(roster.len()));
        }
        let constraints = Constraints::new(opts.group.clone(), rules);
        constraints.check_columns(roster)?;
        Ok(Self {
            roster,
            constraints,
            opts,
        })
    }

    pub fn roster(&self) -> &Roster {
        self.roster
    }
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }
    pub fn options(&self) -> &DrawOptions {
        &self.opts
    }

    /// Tire avec la graine des options, sinon avec l'entropie de l'OS.
    pub fn draw(&self) -> Result<Assignment, DrawError> {
        let mut rng = match self.opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.draw_with_rng(&mut rng)
    }

    pub fn draw_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Assignment, DrawError> {
        sampling::constrained_draw(
            self.roster,
            &self.constraints,
            self.opts.sampler,
            self.opts.max_attempts,
            rng,
        )
    }

    pub fn is_valid(&self, assignment: &Assignment) -> bool {
        self.constraints.is_satisfied_by(self.roster, assignment)
    }

    pub fn violations(&self, assignment: &Assignment) -> Vec<Violation> {
        self.constraints.violations(self.roster, assignment)
    }
}
