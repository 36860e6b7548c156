//! Langage de règles d'exclusion.
//!
//! Une règle par ligne : `attr1 valeur1 mode attr2 valeur2`. Les jetons sont séparés
//! par des blancs ou des `:`, les segments entre guillemets doubles peuvent contenir
//! ces séparateurs. `mode == "gets"` impose l'égalité, tout autre mot l'interdit.
//!
//! ```text
//! # les commerciaux offrent au marketing
//! dept "Sales" gets dept "Marketing"
//! team:"Back office":never:team:"Back office"
//! ```

use std::fs;
use std::path::Path;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mot-clé imposant la correspondance.
pub const MATCH_KEYWORD: &str = "gets";

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rule {
    pub attr1: String,
    pub value1: String,
    pub attr2: String,
    pub value2: String,
    pub must_match: bool,
}

impl Rule {
    pub fn new(
        attr1: impl Into<String>,
        value1: impl Into<String>,
        attr2: impl Into<String>,
        value2: impl Into<String>,
        must_match: bool,
    ) -> Self {
        Self {
            attr1: attr1.into(),
            value1: value1.into(),
            attr2: attr2.into(),
            value2: value2.into(),
            must_match,
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = if self.must_match { "gets" } else { "never gets" };
        write!(
            f,
            "{}={:?} {mode} {}={:?}",
            self.attr1, self.value1, self.attr2, self.value2
        )
    }
}

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("malformed rule on line {line}: expected 5 tokens, found {found} in {content:?}")]
    Malformed {
        line: usize,
        found: usize,
        content: String,
    },
    #[error("unterminated quote on line {line}")]
    UnterminatedQuote { line: usize },
    #[error("reading rules file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parse un fichier de règles complet ; la première ligne invalide interrompt tout.
pub fn parse_rules(text: &str) -> Result<Vec<Rule>, RuleError> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        out.push(parse_rule_line(line, idx + 1)?);
    }
    Ok(out)
}

pub fn load_rules_file<P: AsRef<Path>>(path: P) -> Result<Vec<Rule>, RuleError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| RuleError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_rules(&text)
}

fn parse_rule_line(line: &str, line_no: usize) -> Result<Rule, RuleError> {
    let tokens = tokenize(line).ok_or(RuleError::UnterminatedQuote { line: line_no })?;
    let [attr1, value1, mode, attr2, value2]: [String; 5] =
        tokens.try_into().map_err(|t: Vec<String>| RuleError::Malformed {
            line: line_no,
            found: t.len(),
            content: line.to_string(),
        })?;
    Ok(Rule {
        attr1,
        value1,
        must_match: mode == MATCH_KEYWORD,
        attr2,
        value2,
    })
}

/// Découpe sur blancs / `:` hors guillemets. `None` si un guillemet reste ouvert.
pub fn tokenize(line: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // un jeton `""` est légitime : on suit s'il a été ouvert
    let mut started = false;
    let mut in_quote = false;

    for c in line.chars() {
        if in_quote {
            if c == '"' {
                in_quote = false;
            } else {
                current.push(c);
            }
            continue;
        }
        match c {
            '"' => {
                in_quote = true;
                started = true;
            }
            c if c.is_whitespace() || c == ':' => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }

    if in_quote {
        return None;
    }
    if started {
        tokens.push(current);
    }
    Some(tokens)
}
