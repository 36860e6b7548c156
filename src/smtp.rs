use crate::notification::{Mailer, Message};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use std::fs;
use std::path::Path;

pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
/// Port de soumission, chiffré via STARTTLS.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Identifiants SMTP : utilisateur sur la première ligne, mot de passe ensuite.
#[derive(Clone)]
pub struct SmtpCredentials {
    pub username: String,
    password: String,
}

impl SmtpCredentials {
    pub fn parse(text: &str) -> Result<Self> {
        let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
        let username = first.trim().to_string();
        let password = rest.trim().to_string();
        if username.is_empty() || password.is_empty() {
            bail!("credentials file must hold the username then the password on separate lines");
        }
        Ok(Self { username, password })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading credentials {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }
}

impl std::fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Envoi SMTP authentifié (STARTTLS obligatoire).
pub struct SmtpMailer {
    server: String,
    transport: SmtpTransport,
}

impl SmtpMailer {
    /// Prépare le transport sans ouvrir de connexion.
    pub fn new(server: &str, port: u16, credentials: SmtpCredentials) -> Result<Self> {
        let transport = SmtpTransport::starttls_relay(server)
            .with_context(|| format!("configuring SMTP relay {server}"))?
            .port(port)
            .credentials(Credentials::new(credentials.username, credentials.password))
            .build();
        Ok(Self {
            server: server.to_string(),
            transport,
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Se connecte une fois avant tout envoi pour échouer tôt.
    pub fn verify(&self) -> Result<()> {
        let ok = self
            .transport
            .test_connection()
            .with_context(|| format!("connecting to {}", self.server))?;
        if !ok {
            bail!("SMTP server {} did not accept the connection", self.server);
        }
        Ok(())
    }
}

impl Mailer for SmtpMailer {
    fn deliver(&mut self, message: &Message, now: DateTime<Utc>) -> Result<()> {
        let email = message.to_email(now)?;
        self.transport
            .send(&email)
            .with_context(|| format!("sending through {}", self.server))?;
        Ok(())
    }
}
