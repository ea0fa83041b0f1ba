//! MailUp Console resource services.
//!
//! Each service is a thin set of named operations over the
//! [`RequestExecutor`](crate::client::RequestExecutor) and the
//! [`Pager`](crate::pagination::Pager). Obtain them from
//! [`MailUpClient`](crate::MailUpClient) accessors.

mod fields;
mod groups;
mod lists;
mod messages;
mod recipients;

pub use fields::*;
pub use groups::*;
pub use lists::*;
pub use messages::*;
pub use recipients::*;

use crate::transport::HttpResponse;
use reqwest::StatusCode;

/// Maps a successful response to the boolean MailUp operations report.
pub(crate) fn is_ok(response: &HttpResponse) -> bool {
    response.status == StatusCode::OK
}
