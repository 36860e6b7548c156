#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use lutin::{
    draw::{Constraints, DrawOptions, Drawer, Sampler, DEFAULT_MAX_ATTEMPTS},
    io,
    model::{Assignment, Roster},
    notification::{deliver_all, prepare_messages, PrintMailer},
    rules::{load_rules_file, Rule},
    smtp::{SmtpCredentials, SmtpMailer, DEFAULT_SMTP_PORT, DEFAULT_SMTP_SERVER},
    storage::OutboxMailer,
    template::load_template_from_file,
};
use std::io::{BufRead, Write};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// Expéditeur des dossiers d'envoi et impressions sans identifiants SMTP.
const DEFAULT_FROM: &str = "lutin@lutin.local";

/// CLI minimaliste de Père Noël secret
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args, Debug)]
struct DrawArgs {
    /// CSV des participants (colonne `email` obligatoire)
    #[arg(long)]
    players: String,
    /// Colonne : personne n'offre à quelqu'un de son groupe
    #[arg(long)]
    group: Option<String>,
    /// Fichier de règles `attr valeur gets|never attr valeur`
    #[arg(long)]
    rules: Option<String>,
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u64,
    /// Graine pour un tirage reproductible
    #[arg(long)]
    seed: Option<u64>,
    /// cycle | uniform
    #[arg(long, default_value_t = Sampler::Cycle)]
    sampler: Sampler,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tirer au sort et afficher les paires
    Draw {
        #[command(flatten)]
        draw: DrawArgs,
        /// Export CSV des paires (débogage)
        #[arg(long)]
        out: Option<String>,
        /// Affichage JSON plutôt que tableau
        #[arg(long)]
        json: bool,
    },

    /// Tirer au sort puis livrer un message à chaque participant
    Send {
        #[command(flatten)]
        draw: DrawArgs,
        /// Gabarit : objet sur la première ligne, corps ensuite
        #[arg(long)]
        message: String,
        /// Adresse d'expédition (par défaut : l'utilisateur SMTP)
        #[arg(long)]
        from: Option<String>,
        /// Dossier où déposer un fichier .eml par participant
        #[arg(long)]
        outbox: Option<String>,
        /// Identifiants SMTP : utilisateur puis mot de passe, une ligne chacun
        #[arg(long)]
        credfile: Option<String>,
        #[arg(long, default_value = DEFAULT_SMTP_SERVER)]
        server: String,
        #[arg(long, default_value_t = DEFAULT_SMTP_PORT)]
        port: u16,
        /// Imprimer les messages sur la sortie standard
        #[arg(long)]
        print: bool,
        /// Ne pas demander de confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Vérifier un fichier de règles
    CheckRules {
        #[arg(long)]
        rules: String,
        /// Valide aussi les colonnes contre ce roster
        #[arg(long)]
        players: Option<String>,
        /// Colonne de groupe à valider avec les règles
        #[arg(long, requires = "players")]
        group: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let code = match cli.cmd {
        Commands::Draw { draw, out, json } => {
            let (roster, rules) = load_inputs(&draw)?;
            let assignment = run_draw(&roster, rules, &draw)?;
            if let Some(path) = out {
                io::export_assignment_csv(&path, &roster, &assignment)?;
            }
            if json {
                println!("{}", io::assignment_to_json(&roster, &assignment)?);
            } else {
                print_pairs(&roster, &assignment, draw.group.as_deref());
            }
            0
        }
        Commands::Send {
            draw,
            message,
            from,
            outbox,
            credfile,
            server,
            port,
            print,
            yes,
        } => {
            if outbox.is_none() && credfile.is_none() && !print {
                bail!("nothing to deliver: pass --outbox <dir>, --credfile <file> and/or --print");
            }
            let credentials = credfile.map(SmtpCredentials::load).transpose()?;
            let from = from
                .or_else(|| credentials.as_ref().map(|c| c.username.clone()))
                .unwrap_or_else(|| DEFAULT_FROM.to_string());
            let template = load_template_from_file(&message)?;
            let (roster, rules) = load_inputs(&draw)?;
            template.validate_against(&roster)?;
            let assignment = run_draw(&roster, rules, &draw)?;
            let messages = prepare_messages(&roster, &assignment, &template, &from)?;
            let now = Utc::now();

            if let Some(credentials) = credentials {
                let prompt = format!("Send {} email(s) via {server}:{port}?", messages.len());
                if yes || confirm(&prompt)? {
                    let mut mailer = SmtpMailer::new(&server, port, credentials)?;
                    mailer.verify()?;
                    let n = deliver_all(&messages, &mut mailer, now)?;
                    println!("{n} email(s) sent via {}", mailer.server());
                } else {
                    println!("Aborting");
                }
            }

            if let Some(dir) = outbox {
                if yes || confirm(&format!("Write {} message(s) to {dir}?", messages.len()))? {
                    let mut mailer = OutboxMailer::open(&dir)?;
                    let n = deliver_all(&messages, &mut mailer, now)?;
                    println!("{n} message(s) written to {}", mailer.dir().display());
                } else {
                    println!("Aborting");
                }
            }
            if print {
                let stdout = std::io::stdout();
                let mut mailer = PrintMailer::new(stdout.lock());
                deliver_all(&messages, &mut mailer, now)?;
            }
            0
        }
        Commands::CheckRules {
            rules,
            players,
            group,
        } => {
            let parsed = load_rules_file(&rules)?;
            for (idx, rule) in parsed.iter().enumerate() {
                println!("{:3}: {rule}", idx + 1);
            }
            if let Some(path) = players {
                let roster = io::import_roster_csv(path)?;
                let count = parsed.len();
                Constraints::new(group, parsed).check_columns(&roster)?;
                println!("OK: {count} rule(s) match the roster columns");
            }
            0
        }
    };

    std::process::exit(code);
}

fn load_inputs(args: &DrawArgs) -> Result<(Roster, Vec<Rule>)> {
    let roster = io::import_roster_csv(&args.players)?;
    let rules = match &args.rules {
        Some(path) => load_rules_file(path)?,
        None => Vec::new(),
    };
    Ok((roster, rules))
}

fn run_draw(roster: &Roster, rules: Vec<Rule>, args: &DrawArgs) -> Result<Assignment> {
    let opts = DrawOptions {
        group: args.group.clone(),
        max_attempts: args.max_attempts,
        seed: args.seed,
        sampler: args.sampler,
    };
    let drawer = Drawer::new(roster, rules, opts)?;
    let assignment = drawer.draw().with_context(|| {
        format!(
            "drawing {} participant(s) with sampler {}",
            roster.len(),
            args.sampler
        )
    })?;
    Ok(assignment)
}

fn print_pairs(roster: &Roster, assignment: &Assignment, group: Option<&str>) {
    for (g, r) in assignment.pairs() {
        let (Some(giver), Some(recipient)) = (roster.get(g), roster.get(r)) else {
            continue;
        };
        match group {
            Some(col) => println!(
                "({g:2}, {:>10.10}) in group {} got ({r:2}, {:>10.10}) in group {}",
                giver.label(),
                giver.get(col).unwrap_or("-"),
                recipient.label(),
                recipient.get(col).unwrap_or("-"),
            ),
            None => println!(
                "({g:2}, {:>10.10}) got ({r:2}, {:>10.10})",
                giver.label(),
                recipient.label()
            ),
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/n]: ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().chars().next(), Some('y' | 'Y')))
}
