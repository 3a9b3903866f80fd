//! Certificate composition
//!
//! [`Composer`] turns a request snapshot, optional resident details and a
//! finished signature into a one-page PDF. [`CompositionSession`] owns the
//! signature surface for one request and sequences compose and deliver.

use std::path::Path;
use std::sync::Arc;

use barangay_types::{DocumentRequest, ResidentProfile};
use cert_pdf::ImageAsset;
use chrono::NaiveDate;

use crate::clock::{Clock, SystemClock};
use crate::delivery::{deliver_by_email, DeliveryReceipt};
use crate::error::CertError;
use crate::jurisdiction::Jurisdiction;
use crate::layout;
use crate::remote::{DeliveryEndpoint, RecordsApi};
use crate::session::AuthContext;
use crate::signature::{SignatureCapture, SignatureImage, SignaturePad, SurfacePoint};
use crate::text::CertificateText;
use crate::viewer::{DocumentViewer, ViewHandle};

pub const CERTIFICATE_FILE_NAME: &str = "barangay_certification.pdf";

/// Emblem (watermark) and seal printed on every certificate.
#[derive(Debug, Clone)]
pub struct CertificateAssets {
    pub emblem: ImageAsset,
    pub seal: ImageAsset,
}

impl CertificateAssets {
    /// Decode PNG or JPEG bytes.
    pub fn from_bytes(emblem: &[u8], seal: &[u8]) -> Result<Self, CertError> {
        Ok(Self {
            emblem: ImageAsset::from_bytes(emblem)?,
            seal: ImageAsset::from_bytes(seal)?,
        })
    }

    pub fn load(emblem: &Path, seal: &Path) -> Result<Self, CertError> {
        let read = |path: &Path| {
            std::fs::read(path).map_err(|e| {
                CertError::RenderFailure(format!("Failed to read {}: {}", path.display(), e))
            })
        };
        Self::from_bytes(&read(emblem)?, &read(seal)?)
    }
}

/// A finished certificate.
#[derive(Debug, Clone)]
pub struct RenderedCertificate {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub issued_on: NaiveDate,
    pub text: CertificateText,
    /// Where the certificate was presented, when a viewer is configured and
    /// presenting succeeded.
    pub view: Option<ViewHandle>,
}

pub struct Composer {
    jurisdiction: Jurisdiction,
    assets: CertificateAssets,
    clock: Arc<dyn Clock>,
    viewer: Option<Arc<dyn DocumentViewer>>,
}

impl Composer {
    pub fn new(assets: CertificateAssets) -> Self {
        Self {
            jurisdiction: Jurisdiction::default(),
            assets,
            clock: Arc::new(SystemClock),
            viewer: None,
        }
    }

    pub fn with_jurisdiction(mut self, jurisdiction: Jurisdiction) -> Self {
        self.jurisdiction = jurisdiction;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_viewer(mut self, viewer: Arc<dyn DocumentViewer>) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Render the certificate and hand it to the viewer.
    ///
    /// Fails with `MissingSignature` before any rendering when `signature` is
    /// absent or empty. A viewer failure is logged and leaves `view` empty.
    pub fn compose_document(
        &self,
        request: &DocumentRequest,
        resident: Option<&ResidentProfile>,
        signature: Option<&SignatureImage>,
    ) -> Result<RenderedCertificate, CertError> {
        let signature = match signature {
            Some(sig) if !sig.is_empty() => sig,
            _ => return Err(CertError::MissingSignature),
        };

        let issued_on = self.clock.today();
        let text = CertificateText::assemble(request, resident, &self.jurisdiction, issued_on);

        let bytes = self.render(&text, signature).map_err(|e| {
            tracing::error!(
                "Failed to render certificate for {}: {}",
                request.document_id,
                e
            );
            e
        })?;

        tracing::info!(
            "Rendered certificate for {} ({} bytes)",
            request.document_id,
            bytes.len()
        );

        let view = self.viewer.as_ref().and_then(|viewer| {
            viewer
                .present(CERTIFICATE_FILE_NAME, &bytes)
                .map_err(|e| tracing::warn!("{}", e))
                .ok()
        });

        Ok(RenderedCertificate {
            bytes,
            file_name: CERTIFICATE_FILE_NAME.to_string(),
            issued_on,
            text,
            view,
        })
    }

    fn render(&self, text: &CertificateText, signature: &SignatureImage) -> Result<Vec<u8>, CertError> {
        let signature = ImageAsset::from_png(signature.png())?;
        Ok(layout::render_page(
            text,
            &self.assets.emblem,
            &self.assets.seal,
            &signature,
        )?)
    }
}

/// One request being certified: its signature surface, the resident details
/// joined into the text, and the last composed certificate.
///
/// Operations take `&mut self`, so a session runs one operation at a time.
pub struct CompositionSession {
    composer: Arc<Composer>,
    auth: AuthContext,
    request: DocumentRequest,
    resident: Option<ResidentProfile>,
    pad: SignaturePad,
    /// Certificate plus the signature revision it was rendered from.
    composed: Option<(u64, RenderedCertificate)>,
}

impl CompositionSession {
    /// A blank session whose signature surface is `width` x `height` surface units.
    pub fn new(
        composer: Arc<Composer>,
        auth: AuthContext,
        request: DocumentRequest,
        width: f32,
        height: f32,
    ) -> Result<Self, CertError> {
        Ok(Self {
            composer,
            auth,
            request,
            resident: None,
            pad: SignaturePad::new(width, height)?,
            composed: None,
        })
    }

    pub fn request(&self) -> &DocumentRequest {
        &self.request
    }

    pub fn resident(&self) -> Option<&ResidentProfile> {
        self.resident.as_ref()
    }

    pub fn signature_pad(&self) -> &SignaturePad {
        &self.pad
    }

    pub fn set_resident(&mut self, resident: Option<ResidentProfile>) {
        self.resident = resident;
        self.composed = None;
    }

    /// Look up the linked resident. A failed or empty lookup leaves the
    /// resident unset, and the certificate falls back to placeholders.
    pub async fn load_resident(&mut self, records: &dyn RecordsApi) -> Result<(), CertError> {
        self.auth.ensure_active()?;
        let resident = match self.request.resident_id.as_deref() {
            Some(id) if !id.trim().is_empty() => match records.fetch_resident(id).await {
                Ok(Some(profile)) => Some(profile),
                Ok(None) => {
                    tracing::warn!("Resident {} not found; using placeholders", id);
                    None
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch resident {}: {}; using placeholders", id, e);
                    None
                }
            },
            _ => None,
        };
        self.set_resident(resident);
        Ok(())
    }

    /// Discard every stroke and the finished signature.
    pub fn clear_signature(&mut self) {
        self.pad.clear_signature();
        self.composed = None;
    }

    /// The certificate from the last `compose`, unless the signature changed since.
    pub fn composed(&self) -> Option<&RenderedCertificate> {
        self.composed
            .as_ref()
            .filter(|(revision, _)| *revision == self.pad.revision())
            .map(|(_, certificate)| certificate)
    }

    pub fn compose(&mut self) -> Result<&RenderedCertificate, CertError> {
        self.auth.ensure_active()?;
        let certificate = self.composer.compose_document(
            &self.request,
            self.resident.as_ref(),
            self.pad.signature(),
        )?;
        let (_, certificate) = self.composed.insert((self.pad.revision(), certificate));
        Ok(certificate)
    }

    /// Mail the certificate, composing it first if needed, then mark the
    /// request completed. The request snapshot reflects the update on success.
    pub async fn deliver(
        &mut self,
        endpoint: &dyn DeliveryEndpoint,
        records: &dyn RecordsApi,
    ) -> Result<DeliveryReceipt, CertError> {
        self.auth.ensure_active()?;
        if self.composed().is_none() {
            self.compose()?;
        }
        let certificate = self.composed().ok_or(CertError::MissingSignature)?;

        let receipt = deliver_by_email(
            endpoint,
            records,
            &self.request,
            certificate,
            self.composer.jurisdiction(),
            self.composer.today(),
        )
        .await?;

        self.request.apply(&receipt.update);
        Ok(receipt)
    }
}

impl SignatureCapture for CompositionSession {
    fn begin_stroke(&mut self, point: SurfacePoint) {
        self.pad.begin_stroke(point);
    }

    fn capture_stroke(&mut self, point: SurfacePoint) {
        self.pad.capture_stroke(point);
    }

    fn end_stroke(&mut self) {
        self.pad.end_stroke();
    }
}
