//! Type definitions for the MailUp Console API.

use serde::{Deserialize, Serialize};

/// A recipient field value addressed by MailUp field id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientField {
    /// Field name as shown in the console (for example `nome`).
    #[serde(rename = "Description")]
    pub description: String,

    /// MailUp field id.
    #[serde(rename = "Id")]
    pub id: i64,

    /// Field value.
    #[serde(rename = "Value")]
    pub value: String,
}

/// A dynamic field definition from `Recipient/DynamicFields`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DynamicField {
    /// Field name.
    #[serde(rename = "Description")]
    pub description: String,

    /// MailUp field id.
    #[serde(rename = "Id")]
    pub id: i64,
}

/// Body for creating or updating a recipient.
#[derive(Debug, Clone, Serialize)]
pub struct RecipientRequest {
    /// Recipient display name.
    #[serde(rename = "Name")]
    pub name: String,

    /// Recipient email address.
    #[serde(rename = "Email")]
    pub email: String,

    /// Recipient field values.
    #[serde(rename = "Fields")]
    pub fields: Vec<RecipientField>,
}

/// Body for creating a group.
#[derive(Debug, Clone, Serialize)]
pub struct CreateGroupRequest {
    /// Group name.
    #[serde(rename = "Name")]
    pub name: String,

    /// Free-text notes.
    #[serde(rename = "Notes")]
    pub notes: String,
}

/// Body for sending a message to one address.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    /// Destination address.
    #[serde(rename = "Email")]
    pub email: String,

    /// Message id.
    #[serde(rename = "idMessage")]
    pub message_id: i64,
}

/// Outcome of a group lookup that may create the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLookup {
    /// Group id, if one was found or the created group reported it.
    pub id: Option<i64>,

    /// True if the group was created by this call.
    pub created: bool,
}

/// Which lists a recipient is removed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Every list of the account.
    All,
    /// A single list.
    List(i64),
}
