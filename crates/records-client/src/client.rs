//! `reqwest` client for the records API and the delivery endpoint

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use barangay_types::{
    ApiAck, DocumentRequest, DocumentUpdate, NewOfficial, Official, RequestStatus, ResidentEntry,
    ResidentProfile,
};
use cert_core::{AuthContext, DeliveryEndpoint, OutgoingEmail, RecordsApi, RemoteError};
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{transport, ClientError};

pub const DEFAULT_BASE_URL: &str = "https://barangayapi.vercel.app";
pub const DEFAULT_DELIVERY_PATH: &str = "send-email";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Delivery endpoint, relative to `base_url`.
    pub delivery_path: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            delivery_path: DEFAULT_DELIVERY_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// `GET residents` returns residents keyed by id; older deployments return a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ResidentListing {
    Keyed(BTreeMap<String, ResidentProfile>),
    Listed(Vec<ResidentProfile>),
}

impl ResidentListing {
    fn into_entries(self) -> Vec<ResidentEntry> {
        match self {
            ResidentListing::Keyed(map) => map
                .into_iter()
                .map(|(id, profile)| ResidentEntry { id, profile })
                .collect(),
            ResidentListing::Listed(list) => list
                .into_iter()
                .enumerate()
                .map(|(index, profile)| ResidentEntry {
                    id: profile
                        .resident_id
                        .clone()
                        .unwrap_or_else(|| index.to_string()),
                    profile,
                })
                .collect(),
        }
    }
}

/// How an acknowledgement body without a `success` flag is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AckReading {
    /// Only an explicit `"success": true` confirms the call.
    Strict,
    /// Resident and official endpoints answer with a bare message, so a 2xx
    /// status is enough.
    Lenient,
}

fn parse_ack(body: &str, reading: AckReading) -> ApiAck {
    let assumed = reading == AckReading::Lenient;
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            return ApiAck {
                success: assumed,
                message: None,
            }
        }
    };
    let text = |key: &str| value.get(key).and_then(|v| v.as_str()).map(str::to_string);
    ApiAck {
        success: value
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(assumed),
        message: text("message").or_else(|| text("error")),
    }
}

fn accepted(operation: &str, ack: ApiAck) -> Result<ApiAck, ClientError> {
    if ack.success {
        Ok(ack)
    } else {
        Err(ClientError::Rejected {
            operation: operation.to_string(),
            message: ack
                .message
                .unwrap_or_else(|| "no message from service".to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecordsClient {
    http: reqwest::Client,
    base: Url,
    delivery: Url,
}

impl RecordsClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: config.base_url.clone(),
            reason,
        };
        let base = Url::parse(config.base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        let segments: Vec<&str> = config
            .delivery_path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let delivery = join(&base, &segments).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            http,
            base,
            delivery,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn delivery_url(&self) -> &Url {
        &self.delivery
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        join(&self.base, segments)
    }

    /// Send, passing 2xx and 404 responses through as status and body.
    async fn execute(&self, request: RequestBuilder) -> Result<(StatusCode, String), RemoteError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        tracing::debug!("Records API answered {}", status);
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok((status, body))
        } else {
            Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn success_body(&self, request: RequestBuilder) -> Result<String, RemoteError> {
        match self.execute(request).await? {
            (StatusCode::NOT_FOUND, body) => Err(RemoteError::Status { status: 404, body }),
            (_, body) => Ok(body),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, RemoteError> {
        let url = self.endpoint(segments)?;
        tracing::debug!("GET {}", url);
        let body = self.success_body(self.http.get(url)).await?;
        serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn ack(
        &self,
        request: RequestBuilder,
        reading: AckReading,
    ) -> Result<ApiAck, RemoteError> {
        let body = self.success_body(request).await?;
        Ok(parse_ack(&body, reading))
    }

    async fn put_document(&self, id: &str, update: &DocumentUpdate) -> Result<ApiAck, RemoteError> {
        let url = self.endpoint(&["document", id])?;
        tracing::debug!("PUT {}", url);
        self.ack(self.http.put(url).json(update), AckReading::Strict)
            .await
    }

    pub async fn list_documents(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<DocumentRequest>, ClientError> {
        auth.ensure_active()?;
        let documents: Option<Vec<DocumentRequest>> = self.get_json(&["document"]).await?;
        Ok(documents.unwrap_or_default())
    }

    /// Change a request's status. Completing it also stamps `approval_date`.
    pub async fn set_status(
        &self,
        auth: &AuthContext,
        document_id: &str,
        status: RequestStatus,
        today: NaiveDate,
    ) -> Result<DocumentUpdate, ClientError> {
        auth.ensure_active()?;
        tracing::info!("Setting document {} to {}", document_id, status);
        let update = DocumentUpdate::status_change(status, today);
        accepted("Status update", self.put_document(document_id, &update).await?)?;
        Ok(update)
    }

    /// Record that the requester was e-mailed, without touching the status.
    pub async fn mark_notified(
        &self,
        auth: &AuthContext,
        document_id: &str,
        today: NaiveDate,
    ) -> Result<DocumentUpdate, ClientError> {
        auth.ensure_active()?;
        let update = DocumentUpdate::notified(today);
        accepted("Notification update", self.put_document(document_id, &update).await?)?;
        Ok(update)
    }

    pub async fn delete_document(
        &self,
        auth: &AuthContext,
        document_id: &str,
    ) -> Result<(), ClientError> {
        auth.ensure_active()?;
        let url = self.endpoint(&["document", document_id])?;
        tracing::debug!("DELETE {}", url);
        accepted(
            "Delete",
            self.ack(self.http.delete(url), AckReading::Strict).await?,
        )?;
        tracing::info!("Deleted document {}", document_id);
        Ok(())
    }

    pub async fn list_residents(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<ResidentEntry>, ClientError> {
        auth.ensure_active()?;
        let listing: Option<ResidentListing> = self.get_json(&["residents"]).await?;
        Ok(listing.map(ResidentListing::into_entries).unwrap_or_default())
    }

    async fn put_resident_status(&self, resident_id: &str, status: &str) -> Result<ApiAck, RemoteError> {
        let url = self.endpoint(&["residents", resident_id])?;
        tracing::debug!("PUT {}", url);
        self.ack(
            self.http.put(url).json(&serde_json::json!({ "status": status })),
            AckReading::Lenient,
        )
        .await
    }

    pub async fn accept_resident(
        &self,
        auth: &AuthContext,
        resident_id: &str,
    ) -> Result<(), ClientError> {
        auth.ensure_active()?;
        accepted(
            "Accept resident",
            self.put_resident_status(resident_id, "Accepted").await?,
        )?;
        tracing::info!("Accepted resident {}", resident_id);
        Ok(())
    }

    pub async fn list_officials(&self, auth: &AuthContext) -> Result<Vec<Official>, ClientError> {
        auth.ensure_active()?;
        let officials: Option<Vec<Official>> = self.get_json(&["officials"]).await?;
        Ok(officials.unwrap_or_default())
    }

    pub async fn add_official(
        &self,
        auth: &AuthContext,
        official: &NewOfficial,
    ) -> Result<(), ClientError> {
        auth.ensure_active()?;
        let url = self.endpoint(&["officials"])?;
        tracing::debug!("POST {}", url);
        accepted(
            "Add official",
            self.ack(self.http.post(url).json(official), AckReading::Lenient)
                .await?,
        )?;
        tracing::info!(
            "Added {} as {}",
            official.resident_id,
            official.position
        );
        Ok(())
    }

    /// Return the official's resident to `Accepted`, then delete the official.
    pub async fn remove_official(
        &self,
        auth: &AuthContext,
        official: &Official,
    ) -> Result<(), ClientError> {
        auth.ensure_active()?;
        accepted(
            "Restore resident",
            self.put_resident_status(&official.resident_id, "Accepted")
                .await?,
        )?;

        let url = self.endpoint(&["officials", &official.official_id])?;
        tracing::debug!("DELETE {}", url);
        accepted(
            "Remove official",
            self.ack(self.http.delete(url), AckReading::Lenient).await?,
        )?;
        tracing::info!("Removed official {}", official.official_id);
        Ok(())
    }
}

fn join(base: &Url, segments: &[&str]) -> Result<Url, RemoteError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| RemoteError::Transport(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[async_trait]
impl RecordsApi for RecordsClient {
    async fn fetch_resident(
        &self,
        resident_id: &str,
    ) -> Result<Option<ResidentProfile>, RemoteError> {
        let url = self.endpoint(&["residents", resident_id])?;
        tracing::debug!("GET {}", url);
        match self.execute(self.http.get(url)).await? {
            (StatusCode::NOT_FOUND, _) => Ok(None),
            (_, body) => serde_json::from_str::<Option<ResidentProfile>>(&body)
                .map_err(|e| RemoteError::Decode(e.to_string())),
        }
    }

    async fn update_document(
        &self,
        document_id: &str,
        update: &DocumentUpdate,
    ) -> Result<ApiAck, RemoteError> {
        self.put_document(document_id, update).await
    }
}

#[async_trait]
impl DeliveryEndpoint for RecordsClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<ApiAck, RemoteError> {
        let attachment = Part::bytes(email.attachment.bytes.clone())
            .file_name(email.attachment.file_name.clone())
            .mime_str(&email.attachment.content_type)
            .map_err(transport)?;
        let form = Form::new()
            .text("to", email.to.clone())
            .text("subject", email.subject.clone())
            .text("message", email.message.clone())
            .part("attachment", attachment);

        tracing::debug!("POST {} to {}", self.delivery, email.to);
        self.ack(
            self.http.post(self.delivery.clone()).multipart(form),
            AckReading::Strict,
        )
        .await
    }
}
