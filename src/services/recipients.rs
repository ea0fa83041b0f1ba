//! Recipients service.

use super::FieldsService;
use crate::client::{RequestExecutor, RequestOptions};
use crate::errors::MailUpResult;
use crate::pagination::Record;
use crate::transport::HttpMethod;
use crate::types::RecipientRequest;
use std::sync::Arc;

/// Service for recipient details.
pub struct RecipientsService {
    executor: Arc<RequestExecutor>,
}

impl RecipientsService {
    /// Creates a new recipients service.
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Updates the fields of the recipient with the given email and returns
    /// the updated recipient.
    pub async fn update_fields<K, V>(
        &self,
        name: &str,
        email: &str,
        fields: &[(K, V)],
    ) -> MailUpResult<Record>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = FieldsService::new(self.executor.clone())
            .build_recipient_fields(fields)
            .await?;
        let body = RecipientRequest {
            name: name.to_string(),
            email: email.to_string(),
            fields,
        };

        self.executor
            .execute_json(
                HttpMethod::Put,
                &self.executor.endpoint("Recipient/Detail"),
                RequestOptions::json(&body)?,
            )
            .await
    }
}
