use crate::notification::{Mailer, Message};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Dossier d'envoi : un fichier `.eml` par participant, écrit de manière atomique.
#[derive(Debug, Clone)]
pub struct OutboxMailer {
    dir: PathBuf,
}

impl OutboxMailer {
    pub fn open<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_context(|| format!("creating outbox {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `003-alice_example.org.eml` : position sur 3 chiffres + adresse assainie.
    pub fn file_name(message: &Message) -> String {
        let safe: String = message
            .to
            .email
            .to_string()
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '+' => c,
                _ => '_',
            })
            .collect();
        format!("{:03}-{safe}.eml", message.giver)
    }
}

impl Mailer for OutboxMailer {
    fn deliver(&mut self, message: &Message, now: DateTime<Utc>) -> anyhow::Result<()> {
        let path = self.dir.join(Self::file_name(message));
        let mut tmp = NamedTempFile::new_in(&self.dir).with_context(|| "creating temp file")?;
        tmp.write_all(message.to_eml(now)?.as_bytes())?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)
            .with_context(|| format!("atomic rename to {}", path.display()))?;
        Ok(())
    }
}
