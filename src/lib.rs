#![forbid(unsafe_code)]
//! Lutin — bibliothèque de tirage au sort pour Père Noël secret (sans BD).
//!
//! - Roster CSV à colonnes libres, colonne `email` obligatoire.
//! - Dérangement aléatoire (personne ne se tire soi-même).
//! - Exclusion par groupe + règles `attr valeur gets|never attr valeur`.
//! - Échantillonnage par rejet borné : échec explicite plutôt que boucle infinie.
//! - Messages gabarits imprimés, déposés dans un dossier d'envoi ou envoyés en SMTP.

pub mod draw;
#[cfg(feature = "serde")]
pub mod io;
pub mod model;
pub mod notification;
pub mod rules;
pub mod smtp;
pub mod storage;
pub mod template;

pub use draw::{
    derangement, validate, Constraints, DrawError, DrawOptions, Drawer, Sampler, Violation,
    ViolationKind,
};
pub use model::{Assignment, Participant, Roster};
pub use notification::{deliver_all, parse_mailbox, prepare_messages, Mailer, Message, PrintMailer};
pub use rules::{load_rules_file, parse_rules, Rule, RuleError};
pub use smtp::{SmtpCredentials, SmtpMailer};
pub use storage::OutboxMailer;
pub use template::{load_template_from_file, MessageTemplate};
