//! E-mail delivery and the follow-up status update
//!
//! Delivery and marking are two separate steps. When the mail goes out but
//! the update fails, the request is left delivered-but-unmarked and
//! [`mark_delivered`] can be retried on its own.

use barangay_types::{long_date, ApiAck, DocumentRequest, DocumentUpdate};
use chrono::NaiveDate;

use crate::composer::RenderedCertificate;
use crate::error::CertError;
use crate::jurisdiction::Jurisdiction;
use crate::remote::{Attachment, DeliveryEndpoint, OutgoingEmail, RecordsApi};

pub const SUBJECT: &str = "Barangay Certification";

/// Greeting used when the request carries no requester name.
pub const FALLBACK_GREETING: &str = "Sir/Madam";

/// Outcome of a delivery that was sent and recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub document_id: String,
    pub recipient: String,
    /// Message returned by the delivery endpoint, if any.
    pub message: Option<String>,
    pub delivered_on: NaiveDate,
    /// `delivered_on` as stored on the request, e.g. "October 16, 2026".
    pub email_sent_date: String,
    /// The update written to the request.
    pub update: DocumentUpdate,
}

/// Build the e-mail carrying `certificate` to the requester.
pub fn certificate_email(
    request: &DocumentRequest,
    certificate: &RenderedCertificate,
    jurisdiction: &Jurisdiction,
) -> Result<OutgoingEmail, CertError> {
    let to = request.recipient_email().ok_or_else(|| {
        CertError::DeliveryFailure(format!(
            "Request {} has no requester email",
            request.document_id
        ))
    })?;
    let name = request
        .requester_display_name()
        .unwrap_or_else(|| FALLBACK_GREETING.to_string());

    Ok(OutgoingEmail {
        to: to.to_string(),
        subject: SUBJECT.to_string(),
        message: format!(
            "Dear {},\n\nPlease find attached your requested Barangay Certification.\n\n\
             Regards,\nBarangay {} Office",
            name, jurisdiction.barangay
        ),
        attachment: Attachment::pdf(certificate.file_name.clone(), certificate.bytes.clone()),
    })
}

/// Record a delivery on the request: status `Completed`, `email_sent`, and
/// the delivery date. Writing the same values again is harmless, so this can
/// be retried after a `StatusUpdateFailure`.
pub async fn mark_delivered(
    records: &dyn RecordsApi,
    document_id: &str,
    on: NaiveDate,
) -> Result<ApiAck, CertError> {
    let update = DocumentUpdate::delivered(on);
    let failure = |reason: String| {
        tracing::error!("Failed to mark {} delivered: {}", document_id, reason);
        CertError::StatusUpdateFailure {
            document_id: document_id.to_string(),
            reason,
        }
    };

    match records.update_document(document_id, &update).await {
        Ok(ack) if ack.success => {
            tracing::info!("Marked {} completed", document_id);
            Ok(ack)
        }
        Ok(ack) => Err(failure(
            ack.message
                .unwrap_or_else(|| "update was not acknowledged".to_string()),
        )),
        Err(e) => Err(failure(e.to_string())),
    }
}

/// Send the certificate, and only once the endpoint confirms, mark the
/// request delivered.
pub async fn deliver_by_email(
    endpoint: &dyn DeliveryEndpoint,
    records: &dyn RecordsApi,
    request: &DocumentRequest,
    certificate: &RenderedCertificate,
    jurisdiction: &Jurisdiction,
    today: NaiveDate,
) -> Result<DeliveryReceipt, CertError> {
    let email = certificate_email(request, certificate, jurisdiction)?;

    let ack = match endpoint.send(&email).await {
        Ok(ack) if ack.success => ack,
        Ok(ack) => {
            let reason = ack
                .message
                .unwrap_or_else(|| "delivery was not acknowledged".to_string());
            tracing::error!("Delivery to {} refused: {}", email.to, reason);
            return Err(CertError::DeliveryFailure(reason));
        }
        Err(e) => {
            tracing::error!("Delivery to {} failed: {}", email.to, e);
            return Err(CertError::DeliveryFailure(e.to_string()));
        }
    };
    tracing::info!(
        "Certificate for {} sent to {}",
        request.document_id,
        email.to
    );

    mark_delivered(records, &request.document_id, today).await?;

    let update = DocumentUpdate::delivered(today);
    Ok(DeliveryReceipt {
        document_id: request.document_id.clone(),
        recipient: email.to,
        message: ack.message,
        delivered_on: today,
        email_sent_date: long_date(today),
        update,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::testing::*;
    use barangay_types::RequestStatus;
    use pretty_assertions::assert_eq;

    fn certificate() -> RenderedCertificate {
        let pad = signed_pad();
        composer()
            .compose_document(&juan(), Some(&juan_profile()), pad.signature())
            .unwrap()
    }

    #[test]
    fn test_email_contents() {
        let cert = certificate();
        let email = certificate_email(&juan(), &cert, &Jurisdiction::default()).unwrap();
        assert_eq!(email.to, "juan@example.com");
        assert_eq!(email.subject, "Barangay Certification");
        assert_eq!(
            email.message,
            "Dear Juan Dela Cruz,\n\nPlease find attached your requested Barangay \
             Certification.\n\nRegards,\nBarangay Lamintak Sur Office"
        );
        assert_eq!(email.attachment.file_name, "barangay_certification.pdf");
        assert_eq!(email.attachment.content_type, "application/pdf");
        assert_eq!(email.attachment.bytes, cert.bytes);
    }

    #[test]
    fn test_missing_recipient_is_delivery_failure() {
        let mut request = juan();
        request.requester_email = None;
        let err = certificate_email(&request, &certificate(), &Jurisdiction::default())
            .unwrap_err();
        assert!(matches!(err, CertError::DeliveryFailure(_)));
    }

    #[tokio::test]
    async fn test_success_sends_then_updates() {
        let log = CallLog::default();
        let records = FakeRecords::with_log(log.clone());
        let mailer = FakeMailer::replying(
            Ok(ApiAck {
                success: true,
                message: Some("Email sent".to_string()),
            }),
            log.clone(),
        );

        let receipt = deliver_by_email(
            &mailer,
            &records,
            &juan(),
            &certificate(),
            &Jurisdiction::default(),
            october_16(),
        )
        .await
        .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["send juan@example.com", "update doc-1"]
        );
        assert_eq!(receipt.message.as_deref(), Some("Email sent"));
        let (id, update) = records.updates().remove(0);
        assert_eq!(id, "doc-1");
        assert_eq!(update.status, Some(RequestStatus::Completed));
        assert_eq!(update.email_sent, Some(true));
        assert_eq!(update.email_sent_date.as_deref(), Some("October 16, 2026"));
        assert_eq!(update.approval_date, None);
    }

    #[tokio::test]
    async fn test_unacknowledged_delivery_skips_update() {
        let log = CallLog::default();
        let records = FakeRecords::with_log(log.clone());
        let mailer = FakeMailer::replying(Ok(ApiAck::rejected("quota exceeded")), log.clone());

        let err = deliver_by_email(
            &mailer,
            &records,
            &juan(),
            &certificate(),
            &Jurisdiction::default(),
            october_16(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CertError::DeliveryFailure(ref m) if m == "quota exceeded"));
        assert_eq!(*log.lock().unwrap(), vec!["send juan@example.com"]);
        assert!(records.updates().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_skips_update() {
        let log = CallLog::default();
        let records = FakeRecords::with_log(log.clone());
        let mailer = FakeMailer::replying(
            Err(RemoteError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            }),
            log.clone(),
        );

        let err = deliver_by_email(
            &mailer,
            &records,
            &juan(),
            &certificate(),
            &Jurisdiction::default(),
            october_16(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CertError::DeliveryFailure(_)));
        assert!(records.updates().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_after_send_is_status_update_failure() {
        let log = CallLog::default();
        let records = FakeRecords {
            update_error: Some(RemoteError::Transport("timed out".to_string())),
            ..FakeRecords::with_log(log.clone())
        };
        let mailer = FakeMailer::replying(Ok(ApiAck::ok()), log.clone());

        let err = deliver_by_email(
            &mailer,
            &records,
            &juan(),
            &certificate(),
            &Jurisdiction::default(),
            october_16(),
        )
        .await
        .unwrap_err();

        match err {
            CertError::StatusUpdateFailure { document_id, .. } => assert_eq!(document_id, "doc-1"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_mark_delivered_is_repeatable() {
        let records = FakeRecords::default();
        mark_delivered(&records, "doc-1", october_16()).await.unwrap();
        mark_delivered(&records, "doc-1", october_16()).await.unwrap();

        let updates = records.updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0], updates[1]);
    }

    #[tokio::test]
    async fn test_mark_delivered_rejected_ack() {
        let records = FakeRecords {
            update_ack: Some(ApiAck::rejected("Document not found")),
            ..FakeRecords::default()
        };
        let err = mark_delivered(&records, "doc-9", october_16())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CertError::StatusUpdateFailure { ref reason, .. } if reason == "Document not found"
        ));
    }
}
