//! Barangay Admin - command-line dashboard
//!
//! Signs the operator in, then works the records service: document requests,
//! residents, officials, statistics, and composing and mailing signed
//! certificates.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod strokes;

use config::Settings;

#[derive(Parser, Debug)]
#[command(name = "barangay-admin")]
#[command(version, about = "Barangay records dashboard and certificate composer")]
struct Args {
    #[command(flatten)]
    settings: Settings,

    /// Log at DEBUG level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a signed certificate for a request and write it to the output directory
    Compose(commands::CertificateArgs),

    /// Render, e-mail to the requester, and mark the request completed
    Send(commands::CertificateArgs),

    /// Mark a request completed and e-mailed without sending anything
    MarkDelivered {
        #[arg(long)]
        document: String,
    },

    /// Record that the requester was e-mailed, leaving the status alone
    MarkNotified {
        #[arg(long)]
        document: String,
    },

    /// List document requests
    Documents {
        /// Case-insensitive match on requester name or document type
        #[arg(long, default_value = "")]
        search: String,

        /// "All" or an exact status
        #[arg(long, default_value = "All")]
        status: cert_core::StatusFilter,
    },

    /// Change the status of a request
    SetStatus {
        #[arg(long)]
        document: String,

        #[arg(long)]
        status: String,
    },

    /// Delete a request
    DeleteDocument {
        #[arg(long)]
        document: String,
    },

    /// List residents
    Residents {
        /// Only residents awaiting acceptance
        #[arg(long)]
        pending: bool,
    },

    /// Accept a pending resident
    AcceptResident {
        #[arg(long)]
        resident: String,
    },

    /// List officials
    Officials,

    /// Appoint a resident as an official
    AddOfficial(commands::NewOfficialArgs),

    /// Remove an official and restore the resident's standing
    RemoveOfficial {
        #[arg(long)]
        official: String,
    },

    /// Totals and distributions
    Dashboard {
        /// Year for the monthly request counts (default: this year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Print an Argon2 hash for BARANGAY_ADMIN_PASSWORD_HASH
    HashPassword {
        #[arg(value_name = "PASSWORD")]
        plain: String,
    },
}

fn init_tracing(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().or_else(|_| {
            EnvFilter::try_new("barangay_admin=info,cert_core=info,records_client=info")
        })?
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.verbose)?;

    if let Command::HashPassword { plain } = &args.command {
        let hash = cert_core::hash_password(plain).map_err(anyhow::Error::msg)?;
        println!("{}", hash);
        return Ok(());
    }

    let app = commands::App::connect(&args.settings)?;

    match args.command {
        Command::Compose(cert) => app.compose(&cert).await,
        Command::Send(cert) => app.send(&cert).await,
        Command::MarkDelivered { document } => app.mark_delivered(&document).await,
        Command::MarkNotified { document } => app.mark_notified(&document).await,
        Command::Documents { search, status } => app.documents(&search, &status).await,
        Command::SetStatus { document, status } => app.set_status(&document, &status).await,
        Command::DeleteDocument { document } => app.delete_document(&document).await,
        Command::Residents { pending } => app.residents(pending).await,
        Command::AcceptResident { resident } => app.accept_resident(&resident).await,
        Command::Officials => app.officials().await,
        Command::AddOfficial(official) => app.add_official(&official).await,
        Command::RemoveOfficial { official } => app.remove_official(&official).await,
        Command::Dashboard { year } => app.dashboard(year).await,
        Command::HashPassword { .. } => Ok(()),
    }
}
