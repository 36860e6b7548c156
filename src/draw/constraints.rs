use super::{DrawError, Violation, ViolationKind};
use crate::model::{Assignment, Participant, Roster};
use crate::rules::Rule;

/// Contraintes d'un tirage : exclusion de groupe + règles explicites.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub group: Option<String>,
    pub rules: Vec<Rule>,
}

impl Constraints {
    pub fn new(group: Option<String>, rules: Vec<Rule>) -> Self {
        Self { group, rules }
    }

    /// Toutes les colonnes référencées doivent exister dans le roster.
    pub fn check_columns(&self, roster: &Roster) -> Result<(), DrawError> {
        let referenced = self
            .group
            .iter()
            .chain(self.rules.iter().flat_map(|r| [&r.attr1, &r.attr2]));
        for attr in referenced {
            if !roster.has_column(attr) {
                return Err(DrawError::UnknownAttribute(attr.clone()));
            }
        }
        Ok(())
    }

    pub fn is_satisfied_by(&self, roster: &Roster, assignment: &Assignment) -> bool {
        if assignment.len() != roster.len() {
            return false;
        }
        assignment.pairs().all(|(g, r)| {
            match (roster.get(g), roster.get(r)) {
                (Some(giver), Some(recipient)) => self.first_broken(giver, recipient).is_none(),
                _ => false,
            }
        })
    }

    pub fn violations(&self, roster: &Roster, assignment: &Assignment) -> Vec<Violation> {
        let mut out = Vec::new();
        for (g, r) in assignment.pairs() {
            let (Some(giver), Some(recipient)) = (roster.get(g), roster.get(r)) else {
                continue;
            };
            if self.same_group(giver, recipient) {
                out.push(Violation {
                    giver: g,
                    recipient: r,
                    kind: ViolationKind::SameGroup,
                });
            }
            for (idx, rule) in self.rules.iter().enumerate() {
                if breaks(rule, giver, recipient) {
                    out.push(Violation {
                        giver: g,
                        recipient: r,
                        kind: ViolationKind::Rule(idx),
                    });
                }
            }
        }
        out
    }

    fn first_broken(&self, giver: &Participant, recipient: &Participant) -> Option<ViolationKind> {
        if self.same_group(giver, recipient) {
            return Some(ViolationKind::SameGroup);
        }
        self.rules
            .iter()
            .position(|rule| breaks(rule, giver, recipient))
            .map(ViolationKind::Rule)
    }

    fn same_group(&self, giver: &Participant, recipient: &Participant) -> bool {
        match &self.group {
            Some(col) => giver.get(col) == recipient.get(col),
            None => false,
        }
    }
}

/// Une règle ne concerne que les donneurs dont `attr1 == value1`.
fn breaks(rule: &Rule, giver: &Participant, recipient: &Participant) -> bool {
    if giver.get(&rule.attr1) != Some(rule.value1.as_str()) {
        return false;
    }
    let matches = recipient.get(&rule.attr2) == Some(rule.value2.as_str());
    matches != rule.must_match
}

/// Vérifie un tirage candidat. Fonction pure.
pub fn validate(
    roster: &Roster,
    assignment: &Assignment,
    group: Option<&str>,
    rules: &[Rule],
) -> bool {
    let constraints = Constraints::new(group.map(str::to_owned), rules.to_vec());
    constraints.is_satisfied_by(roster, assignment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        let cols = ["name", "email", "group", "dept"].map(String::from).to_vec();
        let rows = [
            ["A", "a@x", "X", "Sales"],
            ["B", "b@x", "X", "Ops"],
            ["C", "c@x", "Y", "Marketing"],
            ["D", "d@x", "Y", "Ops"],
        ]
        .into_iter()
        .map(|r| r.map(String::from).to_vec())
        .collect();
        Roster::new(cols, rows).unwrap()
    }

    #[test]
    fn group_exclusion_flags_same_group_pairs() {
        let r = roster();
        let crossed = Assignment::new(vec![2, 3, 1, 0]).unwrap();
        let inside = Assignment::new(vec![1, 0, 3, 2]).unwrap();
        assert!(validate(&r, &crossed, Some("group"), &[]));
        assert!(!validate(&r, &inside, Some("group"), &[]));
        assert!(validate(&r, &inside, None, &[]));
    }

    #[test]
    fn must_match_rule_only_binds_selected_givers() {
        let r = roster();
        let rule = Rule::new("dept", "Sales", "dept", "Marketing", true);
        let ok = Assignment::new(vec![2, 0, 3, 1]).unwrap();
        let ko = Assignment::new(vec![3, 2, 0, 1]).unwrap();
        assert!(validate(&r, &ok, None, std::slice::from_ref(&rule)));
        assert!(!validate(&r, &ko, None, std::slice::from_ref(&rule)));
    }

    #[test]
    fn violations_list_every_broken_pair() {
        let r = roster();
        let rule = Rule::new("dept", "Ops", "dept", "Ops", false);
        let c = Constraints::new(Some("group".into()), vec![rule]);
        let a = Assignment::new(vec![1, 3, 0, 2]).unwrap();
        let v = c.violations(&r, &a);
        // A→B groupe X, B→D Ops→Ops, C→A ok, D→C groupe Y
        assert_eq!(
            v,
            vec![
                Violation { giver: 0, recipient: 1, kind: ViolationKind::SameGroup },
                Violation { giver: 1, recipient: 3, kind: ViolationKind::Rule(0) },
                Violation { giver: 3, recipient: 2, kind: ViolationKind::SameGroup },
            ]
        );
        assert!(!c.is_satisfied_by(&r, &a));
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let r = roster();
        let c = Constraints::new(None, vec![Rule::new("dept", "Ops", "site", "Lyon", false)]);
        assert!(matches!(c.check_columns(&r), Err(DrawError::UnknownAttribute(a)) if a == "site"));
    }
}
