//! Pagination handling for MailUp listings.
//!
//! MailUp listings are page-numbered from zero. Every page carries the
//! `{TotalElementsCount, PageSize, Items}` envelope and the page number is
//! passed as the `pageNumber` query parameter.

use crate::client::RequestExecutor;
use crate::errors::{MailUpError, MailUpResult};
use futures::Stream;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// An uninterpreted MailUp resource object.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// One page of a MailUp listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T = Record> {
    /// The items in this page.
    #[serde(rename = "Items", default = "Vec::new")]
    pub items: Vec<T>,
    /// Number of elements in the whole listing.
    #[serde(rename = "TotalElementsCount")]
    pub total_count: u64,
    /// Page size the server used.
    #[serde(rename = "PageSize")]
    pub page_size: u64,
}

impl<T> Page<T> {
    /// Returns the number of pages past page 0 the listing declares.
    pub fn remaining_pages(&self) -> u64 {
        remaining_pages(self.total_count, self.page_size)
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if this page is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Every item of a listing, in page order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult<T = Record> {
    /// `floor(TotalElementsCount / PageSize)` as reported by the last page.
    #[serde(rename = "WrappedPages")]
    pub page_count: u64,
    /// Items of every fetched page.
    #[serde(rename = "Items")]
    pub items: Vec<T>,
}

/// Number of pages past page 0: `floor(total_count / page_size)`, 0 for an empty page size.
pub fn remaining_pages(total_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        0
    } else {
        total_count / page_size
    }
}

/// Appends the page number to a listing URL.
pub fn page_url(template: &str, page_number: u64) -> String {
    let spacer = if template.contains('?') { '&' } else { '?' };
    format!("{}{}pageNumber={}", template, spacer, page_number)
}

/// Fetches MailUp listings page by page through the executor.
#[derive(Clone)]
pub struct Pager {
    executor: Arc<RequestExecutor>,
}

impl Pager {
    /// Creates a new pager.
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Fetches every page of a listing and concatenates the items.
    pub async fn paginate<T: DeserializeOwned>(
        &self,
        url_template: &str,
    ) -> MailUpResult<AggregatedResult<T>> {
        self.pages(url_template).collect_all().await
    }

    /// Fetches one page of a listing.
    pub async fn paginate_single<T: DeserializeOwned>(
        &self,
        url_template: &str,
        page_number: u64,
    ) -> MailUpResult<Page<T>> {
        self.executor
            .get_json(&page_url(url_template, page_number))
            .await
    }

    /// Returns a page-at-a-time iterator over a listing.
    pub fn pages<T: DeserializeOwned>(&self, url_template: &str) -> PageIterator<T> {
        PageIterator::new(self.executor.clone(), url_template)
    }
}

/// Iterator over the pages of a listing.
///
/// Pages are requested strictly in order, starting at page 0. Fetching stops
/// after page `floor(TotalElementsCount / PageSize)`, or earlier once every
/// declared element has been received.
pub struct PageIterator<T> {
    executor: Arc<RequestExecutor>,
    url_template: String,
    next_page: u64,
    page_count: u64,
    fetched: u64,
    done: bool,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> PageIterator<T> {
    /// Creates a new page iterator starting at page 0.
    pub fn new(executor: Arc<RequestExecutor>, url_template: impl Into<String>) -> Self {
        Self {
            executor,
            url_template: url_template.into(),
            next_page: 0,
            page_count: 0,
            fetched: 0,
            done: false,
            _marker: PhantomData,
        }
    }

    /// Fetches the next page of results.
    pub async fn next_page(&mut self) -> MailUpResult<Option<Page<T>>> {
        if self.done {
            return Ok(None);
        }

        let current = self.next_page;
        let page: Page<T> = self
            .executor
            .get_json(&page_url(&self.url_template, current))
            .await?;

        self.page_count = page.remaining_pages();
        self.fetched += page.items.len() as u64;

        if current >= self.page_count || self.fetched >= page.total_count {
            self.done = true;
        } else {
            self.next_page = current + 1;
        }

        tracing::debug!(
            page = current,
            items = page.items.len(),
            page_count = self.page_count,
            "Fetched listing page"
        );

        Ok(Some(page))
    }

    /// Collects the items of every remaining page.
    pub async fn collect_all(mut self) -> MailUpResult<AggregatedResult<T>> {
        let mut items = Vec::new();

        while let Some(page) = self.next_page().await? {
            items.extend(page.items);
        }

        Ok(AggregatedResult {
            page_count: self.page_count,
            items,
        })
    }

    /// Returns true if there are more pages to fetch.
    pub fn has_next(&self) -> bool {
        !self.done
    }

    /// Converts the iterator into a stream of pages.
    pub fn into_stream(self) -> impl Stream<Item = MailUpResult<Page<T>>> {
        futures::stream::try_unfold(self, |mut pages| async move {
            let next = pages.next_page().await?;
            Ok::<_, MailUpError>(next.map(|page| (page, pages)))
        })
    }
}
