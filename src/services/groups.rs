//! Groups service.

use super::{is_ok, FieldsService, ListsService};
use crate::client::{RequestExecutor, RequestOptions};
use crate::errors::MailUpResult;
use crate::pagination::{AggregatedResult, Page, Pager, Record};
use crate::transport::HttpMethod;
use crate::types::{CreateGroupRequest, GroupLookup, RecipientRequest};
use std::sync::Arc;

/// Service for groups and group subscriptions.
pub struct GroupsService {
    executor: Arc<RequestExecutor>,
    pager: Pager,
}

impl GroupsService {
    /// Creates a new groups service.
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self {
            pager: Pager::new(executor.clone()),
            executor,
        }
    }

    fn recipients_url(&self, group_id: i64) -> String {
        self.executor
            .endpoint(&format!("Group/{}/Recipients", group_id))
    }

    /// Lists every recipient of a group.
    pub async fn recipients(&self, group_id: i64) -> MailUpResult<AggregatedResult> {
        self.pager.paginate(&self.recipients_url(group_id)).await
    }

    /// Fetches one page of the recipients of a group.
    pub async fn recipients_page(&self, group_id: i64, page: u64) -> MailUpResult<Page> {
        self.pager
            .paginate_single(&self.recipients_url(group_id), page)
            .await
    }

    /// Creates a group in a list and returns the created group.
    pub async fn create(&self, list_id: i64, name: &str, notes: &str) -> MailUpResult<Record> {
        let body = CreateGroupRequest {
            name: name.to_string(),
            notes: notes.to_string(),
        };
        let url = self.executor.endpoint(&format!("List/{}/Group", list_id));
        let group = self
            .executor
            .execute_json(HttpMethod::Post, &url, RequestOptions::json(&body)?)
            .await?;

        tracing::info!(list_id, name, "Created MailUp group");
        Ok(group)
    }

    /// Finds a group of a list by name, creating it if none matches.
    pub async fn get_or_create(&self, list_id: i64, name: &str) -> MailUpResult<GroupLookup> {
        let groups = ListsService::new(self.executor.clone())
            .groups(list_id)
            .await?;

        let existing = groups
            .items
            .iter()
            .find(|group| group.get("Name").and_then(|n| n.as_str()) == Some(name));
        if let Some(group) = existing {
            return Ok(GroupLookup {
                id: group_id(group),
                created: false,
            });
        }

        let group = self.create(list_id, name, "").await?;
        let id = group_id(&group);
        Ok(GroupLookup {
            id,
            created: id.is_some(),
        })
    }

    /// Subscribes a recipient to a group and returns the recipient id.
    pub async fn subscribe<K, V>(
        &self,
        group_id: i64,
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

        let url = self.executor.endpoint(&format!("Group/{}/Recipient", group_id));
        self.executor
            .execute_json(HttpMethod::Post, &url, RequestOptions::json(&body)?)
            .await
    }

    /// Unsubscribes a recipient from a group.
    pub async fn unsubscribe(&self, group_id: i64, recipient_id: i64) -> MailUpResult<bool> {
        let url = self
            .executor
            .endpoint(&format!("Group/{}/Unsubscribe/{}", group_id, recipient_id));
        let response = self
            .executor
            .execute(HttpMethod::Delete, &url, RequestOptions::new())
            .await?;
        Ok(is_ok(&response))
    }
}

fn group_id(group: &Record) -> Option<i64> {
    group.get("idGroup").and_then(|id| id.as_i64())
}
