use crate::model::{Assignment, Roster, EMAIL_COLUMN};
use anyhow::{bail, Context};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use lettre::Address;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Import des participants depuis CSV : en-tête libre, colonne `email` obligatoire.
pub fn import_roster_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Roster> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_roster(file).with_context(|| format!("reading roster {}", path.display()))
}

pub fn read_roster<R: Read>(reader: R) -> anyhow::Result<Roster> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        rows.push(rec.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let roster = Roster::new(columns, rows).map_err(anyhow::Error::msg)?;
    roster
        .require_column(EMAIL_COLUMN)
        .map_err(anyhow::Error::msg)?;

    let mut seen = HashSet::new();
    for p in roster.participants() {
        let email = p.email();
        if email.is_empty() {
            bail!("row {} has an empty email", p.position + 1);
        }
        if email.parse::<Address>().is_err() {
            bail!("row {} has an invalid email: {email:?}", p.position + 1);
        }
        if !seen.insert(email.to_ascii_lowercase()) {
            bail!("duplicate email: {email}");
        }
    }
    tracing::debug!(
        participants = roster.len(),
        columns = roster.columns().len(),
        "roster loaded"
    );
    Ok(roster)
}

#[derive(Debug, Serialize)]
pub struct PairRow<'a> {
    pub giver: &'a str,
    pub giver_email: &'a str,
    pub recipient: &'a str,
    pub recipient_email: &'a str,
}

/// Lignes lisibles du tirage, dans l'ordre du roster.
pub fn pair_rows<'a>(roster: &'a Roster, assignment: &Assignment) -> Vec<PairRow<'a>> {
    assignment
        .pairs()
        .filter_map(|(g, r)| {
            let giver = roster.get(g)?;
            let recipient = roster.get(r)?;
            Some(PairRow {
                giver: giver.label(),
                giver_email: giver.email(),
                recipient: recipient.label(),
                recipient_email: recipient.email(),
            })
        })
        .collect()
}

/// Export CSV du tirage : header `giver,giver_email,recipient,recipient_email`
pub fn export_assignment_csv<P: AsRef<Path>>(
    path: P,
    roster: &Roster,
    assignment: &Assignment,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    for row in pair_rows(roster, assignment) {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

/// Export JSON du tirage (jolie mise en forme)
pub fn assignment_to_json(roster: &Roster, assignment: &Assignment) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&pair_rows(roster, assignment))?)
}
