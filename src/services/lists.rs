//! Lists service.

use super::{is_ok, FieldsService};
use crate::client::{RequestExecutor, RequestOptions};
use crate::errors::MailUpResult;
use crate::pagination::{AggregatedResult, Page, Pager};
use crate::transport::HttpMethod;
use crate::types::{ListScope, RecipientRequest};
use std::sync::Arc;

/// Service for list groups, list recipients and list subscriptions.
pub struct ListsService {
    executor: Arc<RequestExecutor>,
    pager: Pager,
}

impl ListsService {
    /// Creates a new lists service.
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self {
            pager: Pager::new(executor.clone()),
            executor,
        }
    }

    fn groups_url(&self, list_id: i64) -> String {
        self.executor.endpoint(&format!("List/{}/Groups", list_id))
    }

    fn recipients_url(&self, list_id: i64) -> String {
        self.executor
            .endpoint(&format!("List/{}/Recipients/EmailOptins", list_id))
    }

    /// Lists every group of a list.
    pub async fn groups(&self, list_id: i64) -> MailUpResult<AggregatedResult> {
        self.pager.paginate(&self.groups_url(list_id)).await
    }

    /// Fetches one page of the groups of a list.
    pub async fn groups_page(&self, list_id: i64, page: u64) -> MailUpResult<Page> {
        self.pager
            .paginate_single(&self.groups_url(list_id), page)
            .await
    }

    /// Lists every opted-in recipient of a list.
    pub async fn recipients(&self, list_id: i64) -> MailUpResult<AggregatedResult> {
        self.pager.paginate(&self.recipients_url(list_id)).await
    }

    /// Fetches one page of the opted-in recipients of a list.
    pub async fn recipients_page(&self, list_id: i64, page: u64) -> MailUpResult<Page> {
        self.pager
            .paginate_single(&self.recipients_url(list_id), page)
            .await
    }

    /// Subscribes a recipient to a list and returns the recipient id.
    ///
    /// `fields` are field names and values; see
    /// [`FieldsService::build_recipient_fields`].
    pub async fn subscribe<K, V>(
        &self,
        list_id: i64,
        name: &str,
        email: &str,
        fields: &[(K, V)],
    ) -> MailUpResult<i64>
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

        let url = self.executor.endpoint(&format!("List/{}/Recipient", list_id));
        self.executor
            .execute_json(HttpMethod::Post, &url, RequestOptions::json(&body)?)
            .await
    }

    /// Unsubscribes a recipient from a list.
    pub async fn unsubscribe(&self, list_id: i64, recipient_id: i64) -> MailUpResult<bool> {
        let url = self
            .executor
            .endpoint(&format!("List/{}/Unsubscribe/{}", list_id, recipient_id));
        let response = self
            .executor
            .execute(HttpMethod::Delete, &url, RequestOptions::new())
            .await?;
        Ok(is_ok(&response))
    }

    /// Removes a recipient from one list or from every list.
    pub async fn remove_recipient(
        &self,
        scope: ListScope,
        recipient_id: i64,
    ) -> MailUpResult<bool> {
        let path = match scope {
            ListScope::All => format!("Recipients/{}", recipient_id),
            ListScope::List(list_id) => format!("List/{}/Recipient/{}", list_id, recipient_id),
        };
        let response = self
            .executor
            .execute(HttpMethod::Delete, &self.executor.endpoint(&path), RequestOptions::new())
            .await?;
        Ok(is_ok(&response))
    }
}
