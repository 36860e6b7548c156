use crate::model::{Participant, Roster};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Séquence qui, dans une valeur d'attribut, devient un saut de ligne.
pub const LINE_BREAK_MARKER: &str = "||";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(String),
}

/// Gabarit de message : objet sur la première ligne, corps ensuite.
///
/// Le corps accepte des champs `{colonne}` remplis avec les attributs du destinataire.
/// `{{` et `}}` produisent des accolades littérales.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub subject: String,
    segments: Vec<Segment>,
}

impl MessageTemplate {
    pub fn parse(text: &str) -> Result<Self> {
        let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
        let subject = first.trim().to_string();
        if subject.is_empty() {
            bail!("message subject (first line) cannot be empty");
        }
        let segments = parse_segments(rest.trim())?;
        Ok(Self { subject, segments })
    }

    /// Noms de colonnes utilisés par le corps, dans l'ordre d'apparition.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Échoue si un champ ne correspond à aucune colonne du roster.
    pub fn validate_against(&self, roster: &Roster) -> Result<()> {
        for field in self.fields() {
            if !roster.has_column(field) {
                bail!("template field {{{field}}} is not a roster column");
            }
        }
        Ok(())
    }

    pub fn render(&self, recipient: &Participant) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Field(name) => {
                    let value = recipient
                        .get(name)
                        .with_context(|| format!("recipient has no attribute {name}"))?;
                    out.push_str(&value.replace(LINE_BREAK_MARKER, "\n"));
                }
            }
        }
        Ok(out)
    }
}

pub fn load_template_from_file<P: AsRef<Path>>(path: P) -> Result<MessageTemplate> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading message template {}", path.display()))?;
    MessageTemplate::parse(&text).with_context(|| format!("parsing {}", path.display()))
}

fn parse_segments(body: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                text.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                text.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => bail!("unclosed '{{' in message body"),
                        Some(c) => name.push(c),
                    }
                }
                let name = name.trim().to_string();
                if name.is_empty() {
                    bail!("empty field '{{}}' in message body");
                }
                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                segments.push(Segment::Field(name));
            }
            '}' => bail!("single '}}' in message body (use '}}}}' for a literal brace)"),
            c => text.push(c),
        }
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    Ok(segments)
}
