//! Email messages service.

use super::is_ok;
use crate::client::{RequestExecutor, RequestOptions};
use crate::errors::MailUpResult;
use crate::pagination::{AggregatedResult, Page, Pager};
use crate::transport::HttpMethod;
use crate::types::SendMessageRequest;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::sync::Arc;

/// Characters escaped inside listing filter values.
const FILTER_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Service for list email messages.
pub struct MessagesService {
    executor: Arc<RequestExecutor>,
    pager: Pager,
}

impl MessagesService {
    /// Creates a new messages service.
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self {
            pager: Pager::new(executor.clone()),
            executor,
        }
    }

    fn subject_url(&self, list_id: i64, subject: &str) -> String {
        let subject = utf8_percent_encode(subject, FILTER_VALUE);
        self.executor.endpoint(&format!(
            "List/{}/Emails?filterby=\"Subject.Contains(%27{}%27)\"",
            list_id, subject
        ))
    }

    fn tags_url<S: AsRef<str>>(&self, list_id: i64, tags: &[S]) -> String {
        let tags = tags
            .iter()
            .map(|tag| utf8_percent_encode(tag.as_ref(), FILTER_VALUE).to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.executor
            .endpoint(&format!("List/{}/Emails?tags=\"{}\"", list_id, tags))
    }

    /// Lists every message of a list whose subject contains `subject`.
    pub async fn by_subject(&self, list_id: i64, subject: &str) -> MailUpResult<AggregatedResult> {
        self.pager.paginate(&self.subject_url(list_id, subject)).await
    }

    /// Fetches one page of the messages whose subject contains `subject`.
    pub async fn by_subject_page(
        &self,
        list_id: i64,
        subject: &str,
        page: u64,
    ) -> MailUpResult<Page> {
        self.pager
            .paginate_single(&self.subject_url(list_id, subject), page)
            .await
    }

    /// Lists every message of a list carrying the given tags.
    pub async fn by_tags<S: AsRef<str>>(
        &self,
        list_id: i64,
        tags: &[S],
    ) -> MailUpResult<AggregatedResult> {
        self.pager.paginate(&self.tags_url(list_id, tags)).await
    }

    /// Fetches one page of the messages carrying the given tags.
    pub async fn by_tags_page<S: AsRef<str>>(
        &self,
        list_id: i64,
        tags: &[S],
        page: u64,
    ) -> MailUpResult<Page> {
        self.pager
            .paginate_single(&self.tags_url(list_id, tags), page)
            .await
    }

    /// Sends a message to one address.
    pub async fn send(&self, email: &str, message_id: i64) -> MailUpResult<bool> {
        let body = SendMessageRequest {
            email: email.to_string(),
            message_id,
        };
        let response = self
            .executor
            .execute(
                HttpMethod::Post,
                &self.executor.endpoint("Email/Send"),
                RequestOptions::json(&body)?,
            )
            .await?;

        tracing::debug!(message_id, "Sent MailUp message");
        Ok(is_ok(&response))
    }
}
