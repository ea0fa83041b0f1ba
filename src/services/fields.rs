//! Recipient dynamic fields service.

use crate::client::RequestExecutor;
use crate::errors::MailUpResult;
use crate::pagination::{AggregatedResult, Pager};
use crate::types::{DynamicField, RecipientField};
use std::collections::HashMap;
use std::sync::Arc;

/// Service for recipient field definitions.
pub struct FieldsService {
    executor: Arc<RequestExecutor>,
    pager: Pager,
}

impl FieldsService {
    /// Creates a new fields service.
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self {
            pager: Pager::new(executor.clone()),
            executor,
        }
    }

    /// Lists every dynamic field of the account.
    pub async fn list(&self) -> MailUpResult<AggregatedResult> {
        self.pager
            .paginate(&self.executor.endpoint("Recipient/DynamicFields"))
            .await
    }

    /// Maps field names to MailUp field ids.
    ///
    /// Names with no matching field are skipped. No request is sent when
    /// `values` is empty.
    pub async fn build_recipient_fields<K, V>(
        &self,
        values: &[(K, V)],
    ) -> MailUpResult<Vec<RecipientField>>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let available: AggregatedResult<DynamicField> = self
            .pager
            .paginate(&self.executor.endpoint("Recipient/DynamicFields"))
            .await?;
        let ids: HashMap<String, i64> = available
            .items
            .into_iter()
            .map(|f| (f.description, f.id))
            .collect();

        let fields = values
            .iter()
            .filter_map(|(name, value)| {
                let name = name.as_ref();
                match ids.get(name) {
                    Some(id) => Some(RecipientField {
                        description: name.to_string(),
                        id: *id,
                        value: value.as_ref().to_string(),
                    }),
                    None => {
                        tracing::debug!(field = name, "Skipping unknown recipient field");
                        None
                    }
                }
            })
            .collect();

        Ok(fields)
    }
}
