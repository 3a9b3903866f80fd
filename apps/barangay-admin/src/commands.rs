//! Subcommand implementations

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use barangay_types::{DocumentRequest, NewOfficial, RequestStatus};
use cert_core::{
    deliver_by_email, filter_documents, mark_delivered, partition_residents, summarize,
    AuthContext, CertError, Clock, Composer, CompositionSession, RenderedCertificate,
    SessionStore, SignatureImage, StatusFilter, SystemClock, TempFileViewer,
};
use chrono::Datelike;
use clap::Args;
use records_client::RecordsClient;

use crate::config::Settings;
use crate::strokes::StrokeRecording;

#[derive(Args, Debug, Clone)]
pub struct CertificateArgs {
    /// Document request id
    #[arg(long)]
    pub document: String,

    /// Recorded signature strokes (JSON)
    #[arg(long, conflicts_with = "signature")]
    pub strokes: Option<PathBuf>,

    /// Signature image already captured as PNG
    #[arg(long)]
    pub signature: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct NewOfficialArgs {
    #[arg(long)]
    pub resident: String,

    #[arg(long)]
    pub position: String,

    /// Start of term, e.g. 2026-07-01
    #[arg(long, default_value = "")]
    pub start_term: String,

    /// End of term
    #[arg(long, default_value = "")]
    pub end_term: String,
}

pub struct App {
    settings: Settings,
    // Holds the sign-in that `auth` was issued from.
    _session: SessionStore,
    auth: AuthContext,
    client: RecordsClient,
    clock: Arc<dyn Clock>,
}

impl App {
    /// Sign in and build the records client.
    pub fn connect(settings: &Settings) -> Result<Self> {
        let credentials = settings.credentials()?;
        let email = credentials.email.clone();
        let session = SessionStore::new(credentials);
        let auth = session.login(&email, settings.password()?)?;
        let client = RecordsClient::new(&settings.client_config())?;
        Ok(Self {
            settings: settings.clone(),
            _session: session,
            auth,
            client,
            clock: Arc::new(SystemClock),
        })
    }

    fn composer(&self) -> Result<Composer> {
        let viewer = TempFileViewer::new(self.settings.output_dir());
        Ok(Composer::new(self.settings.assets()?)
            .with_clock(self.clock.clone())
            .with_viewer(Arc::new(viewer)))
    }

    async fn find_document(&self, id: &str) -> Result<DocumentRequest> {
        self.client
            .list_documents(&self.auth)
            .await?
            .into_iter()
            .find(|doc| doc.document_id == id)
            .ok_or_else(|| anyhow!("Document request {} not found", id))
    }

    /// Compose through a signing session, or directly from a PNG signature.
    async fn render(
        &self,
        composer: Arc<Composer>,
        request: DocumentRequest,
        args: &CertificateArgs,
    ) -> Result<Certificate> {
        if let Some(path) = &args.signature {
            let png = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let signature = SignatureImage::from_png(png)?;
            let resident = match request.resident_id.as_deref() {
                Some(id) => cert_core::RecordsApi::fetch_resident(&self.client, id)
                    .await
                    .map_err(|e| tracing::warn!("Failed to fetch resident {}: {}", id, e))
                    .ok()
                    .flatten(),
                None => None,
            };
            let rendered =
                composer.compose_document(&request, resident.as_ref(), Some(&signature))?;
            return Ok(Certificate::Direct {
                composer,
                request,
                rendered,
            });
        }

        let recording = match &args.strokes {
            Some(path) => StrokeRecording::load(path)?,
            None => return Err(CertError::MissingSignature.into()),
        };
        let mut session = CompositionSession::new(
            composer,
            self.auth.clone(),
            request,
            recording.width,
            recording.height,
        )?;
        session.load_resident(&self.client).await?;
        recording.replay(&mut session);
        session.compose()?;
        Ok(Certificate::Session(Box::new(session)))
    }

    pub async fn compose(&self, args: &CertificateArgs) -> Result<()> {
        let request = self.find_document(&args.document).await?;
        let certificate = self.render(Arc::new(self.composer()?), request, args).await?;
        let rendered = certificate.rendered()?;
        match &rendered.view {
            Some(view) => println!("{}", view.path.display()),
            None => println!("Rendered {} bytes (not saved)", rendered.bytes.len()),
        }
        Ok(())
    }

    pub async fn send(&self, args: &CertificateArgs) -> Result<()> {
        let request = self.find_document(&args.document).await?;
        let certificate = self.render(Arc::new(self.composer()?), request, args).await?;

        let outcome = match certificate {
            Certificate::Session(mut session) => session.deliver(&self.client, &self.client).await,
            Certificate::Direct {
                composer,
                request,
                rendered,
            } => {
                deliver_by_email(
                    &self.client,
                    &self.client,
                    &request,
                    &rendered,
                    composer.jurisdiction(),
                    self.clock.today(),
                )
                .await
            }
        };

        match outcome {
            Ok(receipt) => {
                println!(
                    "Sent to {} on {}; request {} marked Completed",
                    receipt.recipient, receipt.email_sent_date, receipt.document_id
                );
                Ok(())
            }
            Err(CertError::StatusUpdateFailure {
                document_id,
                reason,
            }) => bail!(
                "E-mail was sent but {} was not marked completed ({}). \
                 Run `barangay-admin mark-delivered --document {}` to retry.",
                document_id,
                reason,
                document_id
            ),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn mark_delivered(&self, document: &str) -> Result<()> {
        self.auth.ensure_active()?;
        mark_delivered(&self.client, document, self.clock.today()).await?;
        println!("{} marked Completed", document);
        Ok(())
    }

    pub async fn mark_notified(&self, document: &str) -> Result<()> {
        let update = self
            .client
            .mark_notified(&self.auth, document, self.clock.today())
            .await?;
        println!(
            "{} notified on {}",
            document,
            update.email_sent_date.unwrap_or_default()
        );
        Ok(())
    }

    pub async fn documents(&self, search: &str, status: &StatusFilter) -> Result<()> {
        let documents = self.client.list_documents(&self.auth).await?;
        let shown = filter_documents(&documents, search, status);
        for doc in &shown {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                doc.document_id,
                doc.requester_display_name().unwrap_or_default(),
                doc.document_kind().unwrap_or_default(),
                doc.status,
                doc.recipient_email().unwrap_or_default(),
                doc.contact().unwrap_or_default(),
            );
        }
        tracing::info!("{} of {} requests shown", shown.len(), documents.len());
        Ok(())
    }

    pub async fn set_status(&self, document: &str, status: &str) -> Result<()> {
        let status = RequestStatus::from(status.trim());
        let update = self
            .client
            .set_status(&self.auth, document, status, self.clock.today())
            .await?;
        match update.approval_date {
            Some(date) => println!("{} is now Completed (approved {})", document, date),
            None => println!(
                "{} is now {}",
                document,
                update.status.map(String::from).unwrap_or_default()
            ),
        }
        Ok(())
    }

    pub async fn delete_document(&self, document: &str) -> Result<()> {
        self.client.delete_document(&self.auth, document).await?;
        println!("Deleted {}", document);
        Ok(())
    }

    pub async fn residents(&self, pending_only: bool) -> Result<()> {
        let residents = self.client.list_residents(&self.auth).await?;
        let (pending, accepted) = partition_residents(&residents);
        let shown = if pending_only {
            pending
        } else {
            accepted.into_iter().chain(pending).collect()
        };
        for entry in shown {
            let profile = &entry.profile;
            println!(
                "{}\t{}\t{}\t{}\t{}",
                entry.id,
                profile.full_name(),
                profile.email.as_deref().unwrap_or_default(),
                profile.contact_number.as_deref().unwrap_or_default(),
                profile.registration().as_str(),
            );
        }
        Ok(())
    }

    pub async fn accept_resident(&self, resident: &str) -> Result<()> {
        self.client.accept_resident(&self.auth, resident).await?;
        println!("Accepted {}", resident);
        Ok(())
    }

    pub async fn officials(&self) -> Result<()> {
        for official in self.client.list_officials(&self.auth).await? {
            println!(
                "{}\t{}\t{}\t{} - {}\t{}",
                official.official_id,
                official.full_name(),
                official.position,
                official.start_term,
                official.end_term,
                official.status,
            );
        }
        Ok(())
    }

    pub async fn add_official(&self, args: &NewOfficialArgs) -> Result<()> {
        let official = NewOfficial::active(&args.resident, &args.position)
            .with_term(&args.start_term, &args.end_term);
        self.client.add_official(&self.auth, &official).await?;
        println!("{} appointed {}", args.resident, args.position);
        Ok(())
    }

    pub async fn remove_official(&self, official_id: &str) -> Result<()> {
        let official = self
            .client
            .list_officials(&self.auth)
            .await?
            .into_iter()
            .find(|o| o.official_id == official_id)
            .ok_or_else(|| anyhow!("Official {} not found", official_id))?;
        self.client.remove_official(&self.auth, &official).await?;
        println!("Removed {} ({})", official.full_name(), official.position);
        Ok(())
    }

    pub async fn dashboard(&self, year: Option<i32>) -> Result<()> {
        let residents = self.client.list_residents(&self.auth).await?;
        let officials = self.client.list_officials(&self.auth).await?;
        let documents = self.client.list_documents(&self.auth).await?;
        let year = year.unwrap_or_else(|| self.clock.today().year());
        let summary = summarize(&residents, &officials, &documents, year);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}

/// A rendered certificate and what is needed to deliver it.
enum Certificate {
    Session(Box<CompositionSession>),
    Direct {
        composer: Arc<Composer>,
        request: DocumentRequest,
        rendered: RenderedCertificate,
    },
}

impl Certificate {
    fn rendered(&self) -> Result<&RenderedCertificate> {
        match self {
            Certificate::Session(session) => session
                .composed()
                .ok_or_else(|| CertError::MissingSignature.into()),
            Certificate::Direct { rendered, .. } => Ok(rendered),
        }
    }
}
