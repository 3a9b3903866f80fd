//! In-memory fakes shared by the unit tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use barangay_types::{ApiAck, DocumentRequest, DocumentUpdate, ResidentProfile};
use cert_pdf::ImageAsset;
use chrono::NaiveDate;

use crate::clock::FixedClock;
use crate::composer::{CertificateAssets, Composer};
use crate::error::RemoteError;
use crate::remote::{DeliveryEndpoint, OutgoingEmail, RecordsApi};
use crate::session::{hash_password, AuthContext, OperatorCredentials, SessionStore};
use crate::signature::{SignatureCapture, SignaturePad, SurfacePoint};

/// Calls observed by the fakes, in order.
pub type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
pub struct FakeRecords {
    pub residents: Vec<(String, ResidentProfile)>,
    pub fail_lookup: bool,
    pub update_error: Option<RemoteError>,
    pub update_ack: Option<ApiAck>,
    pub updates: Mutex<Vec<(String, DocumentUpdate)>>,
    pub log: CallLog,
}

impl FakeRecords {
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn updates(&self) -> Vec<(String, DocumentUpdate)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordsApi for FakeRecords {
    async fn fetch_resident(
        &self,
        resident_id: &str,
    ) -> Result<Option<ResidentProfile>, RemoteError> {
        self.log.lock().unwrap().push(format!("fetch {}", resident_id));
        if self.fail_lookup {
            return Err(RemoteError::Transport("connection reset".to_string()));
        }
        Ok(self
            .residents
            .iter()
            .find(|(id, _)| id == resident_id)
            .map(|(_, profile)| profile.clone()))
    }

    async fn update_document(
        &self,
        document_id: &str,
        update: &DocumentUpdate,
    ) -> Result<ApiAck, RemoteError> {
        self.log.lock().unwrap().push(format!("update {}", document_id));
        if let Some(err) = &self.update_error {
            return Err(err.clone());
        }
        self.updates
            .lock()
            .unwrap()
            .push((document_id.to_string(), update.clone()));
        Ok(self.update_ack.clone().unwrap_or_else(ApiAck::ok))
    }
}

pub struct FakeMailer {
    pub reply: Result<ApiAck, RemoteError>,
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub log: CallLog,
}

impl FakeMailer {
    pub fn replying(reply: Result<ApiAck, RemoteError>, log: CallLog) -> Self {
        Self {
            reply,
            sent: Mutex::new(Vec::new()),
            log,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryEndpoint for FakeMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<ApiAck, RemoteError> {
        self.log.lock().unwrap().push(format!("send {}", email.to));
        self.sent.lock().unwrap().push(email.clone());
        self.reply.clone()
    }
}

pub fn october_16() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

pub fn assets() -> CertificateAssets {
    let emblem = ImageAsset::from_rgba(4, 4, &[0x20; 64]).unwrap();
    let seal = ImageAsset::from_rgba(2, 2, &[0x80; 16]).unwrap();
    CertificateAssets { emblem, seal }
}

pub fn composer() -> Composer {
    Composer::new(assets()).with_clock(Arc::new(FixedClock(october_16())))
}

pub fn auth() -> AuthContext {
    let store = SessionStore::new(OperatorCredentials {
        email: "captain@lamintak.gov.ph".to_string(),
        password_hash: hash_password("pw").unwrap(),
    });
    store.login("captain@lamintak.gov.ph", "pw").unwrap()
}

pub fn juan() -> DocumentRequest {
    DocumentRequest {
        document_id: "doc-1".to_string(),
        requester_name: Some("Juan Dela Cruz".to_string()),
        requester_email: Some("juan@example.com".to_string()),
        document_type: Some("Barangay Clearance".to_string()),
        resident_id: Some("res-7".to_string()),
        ..Default::default()
    }
}

pub fn juan_profile() -> ResidentProfile {
    serde_json::from_value(serde_json::json!({
        "age": 34,
        "civil_status": "Single",
        "barangay": "Purok 2",
        "yearsResidency": 2010
    }))
    .unwrap()
}

pub fn sign<C: SignatureCapture + ?Sized>(target: &mut C) {
    target.begin_stroke(SurfacePoint::new(10.0, 30.0));
    target.capture_stroke(SurfacePoint::new(80.0, 10.0));
    target.capture_stroke(SurfacePoint::new(150.0, 40.0));
    target.end_stroke();
}

pub fn signed_pad() -> SignaturePad {
    let mut pad = SignaturePad::new(300.0, 128.0).unwrap();
    sign(&mut pad);
    pad
}
