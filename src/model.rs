use std::collections::{BTreeMap, HashSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Colonne obligatoire : adresse du destinataire du message.
pub const EMAIL_COLUMN: &str = "email";
/// Colonne facultative utilisée pour l'affichage.
pub const NAME_COLUMN: &str = "name";

/// Participant au tirage : sa position dans le roster + ses attributs libres.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Participant {
    pub position: usize,
    pub attributes: BTreeMap<String, String>,
}

impl Participant {
    pub fn new(position: usize, attributes: BTreeMap<String, String>) -> Self {
        Self { position, attributes }
    }

    pub fn get(&self, attr: &str) -> Option<&str> {
        self.attributes.get(attr).map(String::as_str)
    }

    pub fn email(&self) -> &str {
        self.get(EMAIL_COLUMN).unwrap_or_default()
    }

    /// Nom lisible : `name` si présent et non vide, sinon l'email.
    pub fn label(&self) -> &str {
        match self.get(NAME_COLUMN) {
            Some(name) if !name.is_empty() => name,
            _ => self.email(),
        }
    }
}

/// Roster complet, ordonné ; les positions vont de `0` à `n - 1`.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Roster {
    columns: Vec<String>,
    participants: Vec<Participant>,
}

impl Roster {
    /// Construit un roster à partir d'un en-tête et de lignes de valeurs.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, String> {
        let mut seen = HashSet::new();
        for col in &columns {
            if col.is_empty() {
                return Err("empty column name in header".to_string());
            }
            if !seen.insert(col.as_str()) {
                return Err(format!("duplicate column: {col}"));
            }
        }

        let mut participants = Vec::with_capacity(rows.len());
        for (position, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(format!(
                    "row {} has {} fields, expected {}",
                    position + 1,
                    row.len(),
                    columns.len()
                ));
            }
            let attributes = columns.iter().cloned().zip(row).collect();
            participants.push(Participant::new(position, attributes));
        }

        Ok(Self { columns, participants })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }
    pub fn len(&self) -> usize {
        self.participants.len()
    }
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
    pub fn get(&self, position: usize) -> Option<&Participant> {
        self.participants.get(position)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<(), String> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(format!("unknown column: {name}"))
        }
    }

    pub fn find_by_email<'a>(&'a self, email: &str) -> Option<&'a Participant> {
        self.participants.iter().find(|p| p.email() == email)
    }
}

/// Résultat du tirage : `recipients[i]` est la position de la personne à qui `i` offre.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<usize>", into = "Vec<usize>"))]
pub struct Assignment {
    recipients: Vec<usize>,
}

impl Assignment {
    /// Valide qu'il s'agit bien d'un dérangement (bijection sans point fixe).
    pub fn new(recipients: Vec<usize>) -> Result<Self, String> {
        let a = Self { recipients };
        if !a.is_bijection() {
            return Err("assignment is not a permutation".to_string());
        }
        if let Some(i) = a.fixed_point() {
            return Err(format!("participant {i} would give to themselves"));
        }
        Ok(a)
    }

    pub(crate) fn from_derangement(recipients: Vec<usize>) -> Self {
        debug_assert!(Self::new(recipients.clone()).is_ok());
        Self { recipients }
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
    pub fn recipient_of(&self, giver: usize) -> Option<usize> {
        self.recipients.get(giver).copied()
    }
    pub fn as_slice(&self) -> &[usize] {
        &self.recipients
    }

    /// Paires `(donneur, destinataire)` dans l'ordre du roster.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.recipients.iter().copied().enumerate()
    }

    pub fn is_bijection(&self) -> bool {
        let n = self.recipients.len();
        let mut seen = vec![false; n];
        for &r in &self.recipients {
            if r >= n || seen[r] {
                return false;
            }
            seen[r] = true;
        }
        true
    }

    fn fixed_point(&self) -> Option<usize> {
        self.pairs().find(|(g, r)| g == r).map(|(g, _)| g)
    }
}

impl TryFrom<Vec<usize>> for Assignment {
    type Error = String;

    fn try_from(recipients: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(recipients)
    }
}

impl From<Assignment> for Vec<usize> {
    fn from(a: Assignment) -> Self {
        a.recipients
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn roster_rejects_ragged_rows() {
        let err = Roster::new(cols(&["name", "email"]), vec![cols(&["Alice"])]).unwrap_err();
        assert!(err.contains("row 1"));
    }

    #[test]
    fn label_falls_back_to_email() {
        let r = Roster::new(cols(&["email"]), vec![cols(&["a@x.org"])]).unwrap();
        assert_eq!(r.get(0).unwrap().label(), "a@x.org");
    }

    #[test]
    fn assignment_rejects_fixed_points_and_duplicates() {
        assert!(Assignment::new(vec![1, 0]).is_ok());
        assert!(Assignment::new(vec![0, 1]).is_err());
        assert!(Assignment::new(vec![1, 1]).is_err());
        assert!(Assignment::new(vec![2, 0]).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_assignment_is_validated() {
        let ok: Assignment = serde_json::from_str("[2, 0, 1]").unwrap();
        assert_eq!(ok.as_slice(), &[2, 0, 1]);
        assert_eq!(serde_json::to_string(&ok).unwrap(), "[2,0,1]");
        assert!(serde_json::from_str::<Assignment>("[0, 1]").is_err());
        assert!(serde_json::from_str::<Assignment>("[1, 1]").is_err());
    }
}
