//! MailUp Integration Module
//!
//! This module provides a type-safe client for the MailUp Console REST API
//! (v1.1). It authenticates with OAuth 2.0 password and refresh grants,
//! keeps the token pair current, and exposes the Console resources as
//! named operations.
//!
//! # Features
//!
//! - **Authentication**: Password grant login, transparent refresh on 401
//! - **Rate Limits**: Bounded back-off on 429, honouring `Retry-After`
//! - **Pagination**: Zero-based `pageNumber` listings aggregated in page order
//! - **Resources**: Fields, lists, groups, recipients and messages
//! - **Diagnostics**: Pluggable sink for failed requests (tracing or file)
//!
//! # Example
//!
//! ```no_run
//! use integrations_mailup::{MailUpClient, MailUpConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads MAILUP_USERNAME, MAILUP_PASSWORD, MAILUP_CLIENT_ID, MAILUP_CLIENT_SECRET
//! let config = MailUpConfig::from_env()?;
//!
//! let client = MailUpClient::connect(config).await?;
//!
//! let groups = client.lists().groups(1).await?;
//! for group in &groups.items {
//!     println!("{}: {}", group["idGroup"], group["Name"]);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod auth;
pub mod client;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod pagination;
pub mod resilience;
pub mod services;
pub mod transport;
pub mod types;

// Internal modules (not part of public API)
#[cfg(test)]
mod mocks;

// Re-exports for convenience
pub use auth::{Credentials, TokenPair, TokenStore};
pub use client::{MailUpClient, MailUpClientBuilder};
pub use config::{MailUpConfig, MailUpConfigBuilder};
pub use errors::{MailUpError, MailUpResult};
pub use pagination::{AggregatedResult, Page, Record};

/// Prelude module with commonly used types and traits.
///
/// ```no_run
/// use integrations_mailup::prelude::*;
/// ```
pub mod prelude {
    // Client
    pub use crate::client::{MailUpClient, MailUpClientBuilder, RequestExecutor, RequestOptions};

    // Configuration
    pub use crate::config::{MailUpConfig, MailUpConfigBuilder};
    pub use crate::resilience::RetryConfig;

    // Authentication
    pub use crate::auth::{Credentials, TokenPair, TokenStore};

    // Services
    pub use crate::services::{
        FieldsService, GroupsService, ListsService, MessagesService, RecipientsService,
    };

    // Common types
    pub use crate::types::{GroupLookup, ListScope, RecipientField};

    // Diagnostics
    pub use crate::diagnostics::{DiagnosticRecord, DiagnosticSink, FileSink, TracingSink};

    // Errors
    pub use crate::errors::{
        ApiError, AuthenticationError, MailUpError, MailUpResult, TransportError,
    };

    // Pagination
    pub use crate::pagination::{AggregatedResult, Page, PageIterator, Pager, Record};
}
