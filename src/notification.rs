use crate::model::{Assignment, Roster};
use crate::template::MessageTemplate;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Body, Mailbox};
use lettre::Address;
use std::io::Write;
use std::time::SystemTime;
use uuid::Uuid;

/// Séparateur imprimé entre deux messages.
pub const PRINT_SEPARATOR: &str = "-----------------------";

/// Message destiné à un donneur, décrivant la personne à qui il offre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub giver: usize,
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub body: String,
}

impl Message {
    /// Courriel RFC 5322 ; les en-têtes non ASCII sont encodés (RFC 2047).
    pub fn to_email(&self, now: DateTime<Utc>) -> Result<lettre::Message> {
        let body = Body::new_with_encoding(self.body.clone(), ContentTransferEncoding::EightBit)
            .unwrap_or_else(Body::new);
        lettre::Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.subject.as_str())
            .date(SystemTime::from(now))
            .message_id(Some(format!("<{}@lutin.local>", Uuid::new_v4())))
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .with_context(|| format!("building message for {}", self.to))
    }

    pub fn to_eml(&self, now: DateTime<Utc>) -> Result<String> {
        let bytes = self.to_email(now)?.formatted();
        String::from_utf8(bytes).context("message is not valid UTF-8")
    }
}

/// Canal de livraison des messages (impression, dossier d'envoi, SMTP).
pub trait Mailer {
    fn deliver(&mut self, message: &Message, now: DateTime<Utc>) -> Result<()>;
}

/// Imprime chaque message, suivi d'un séparateur.
#[derive(Debug)]
pub struct PrintMailer<W: Write> {
    out: W,
}

impl<W: Write> PrintMailer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Mailer for PrintMailer<W> {
    fn deliver(&mut self, message: &Message, now: DateTime<Utc>) -> Result<()> {
        let eml = message.to_eml(now)?.replace("\r\n", "\n");
        write!(self.out, "{eml}")?;
        if !eml.ends_with('\n') {
            writeln!(self.out)?;
        }
        writeln!(self.out, "{PRINT_SEPARATOR}")?;
        Ok(())
    }
}

/// Adresse seule (sans nom affiché) ; refuse tout ce qui n'est pas une adresse valide.
pub fn parse_mailbox(raw: &str) -> Result<Mailbox> {
    let address = raw
        .parse::<Address>()
        .with_context(|| format!("invalid email address {raw:?}"))?;
    Ok(Mailbox::new(None, address))
}

/// Construit tous les messages avant toute livraison : une erreur n'en envoie aucun.
pub fn prepare_messages(
    roster: &Roster,
    assignment: &Assignment,
    template: &MessageTemplate,
    from: &str,
) -> Result<Vec<Message>> {
    if assignment.len() != roster.len() {
        bail!(
            "assignment covers {} participant(s), roster has {}",
            assignment.len(),
            roster.len()
        );
    }
    template.validate_against(roster)?;
    let from = parse_mailbox(from).context("sender address")?;

    let mut out = Vec::with_capacity(roster.len());
    for (g, r) in assignment.pairs() {
        let giver = roster
            .get(g)
            .with_context(|| format!("unknown giver position {g}"))?;
        let recipient = roster
            .get(r)
            .with_context(|| format!("unknown recipient position {r}"))?;
        let to = parse_mailbox(giver.email())
            .with_context(|| format!("participant {}", giver.position + 1))?;
        let body = template
            .render(recipient)
            .with_context(|| format!("rendering message for {}", giver.email()))?;
        out.push(Message {
            giver: g,
            from: from.clone(),
            to,
            subject: template.subject.clone(),
            body,
        });
    }
    Ok(out)
}

/// Livre les messages dans l'ordre ; retourne le nombre de messages livrés.
pub fn deliver_all(
    messages: &[Message],
    mailer: &mut dyn Mailer,
    now: DateTime<Utc>,
) -> Result<usize> {
    for message in messages {
        mailer
            .deliver(message, now)
            .with_context(|| format!("delivering message to {}", message.to))?;
        tracing::debug!(to = %message.to, "message delivered");
    }
    tracing::info!(count = messages.len(), "messages delivered");
    Ok(messages.len())
}
