// Cursor pagination over backend list endpoints
use crate::application::monitoring_backend::BackendError;
use crate::domain::evaluation::TimeWindow;
use std::collections::HashSet;
use std::future::Future;

/// Full query sent with the first page only.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    pub selector: String,
    pub window: TimeWindow,
    pub fields: Vec<String>,
}

/// A cursor request cannot carry selector, time range or fields.
#[derive(Debug, Clone, PartialEq)]
pub enum PageRequest {
    Initial(PageQuery),
    Cursor(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage<T> {
    pub total_count: u64,
    pub page_size: u64,
    pub next_page_key: Option<String>,
    pub items: Vec<T>,
}

impl<T> QueryPage<T> {
    fn next_cursor(&mut self) -> Option<String> {
        self.next_page_key.take().filter(|key| !key.is_empty())
    }
}

/// Follow `nextPageKey` until it is empty and return every item in page order.
///
/// Pages are requested strictly one after another. The accumulated count must
/// match the first page's `totalCount`; a cursor that comes back twice is
/// treated as a protocol violation instead of looping.
pub async fn fetch_all_pages<T, F, Fut>(query: PageQuery, mut fetch: F) -> Result<Vec<T>, BackendError>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<QueryPage<T>, BackendError>>,
{
    let mut page = fetch(PageRequest::Initial(query)).await?;
    let expected = page.total_count;
    let mut requested = HashSet::new();
    let mut next = page.next_cursor();
    let mut items = page.items;

    while let Some(cursor) = next {
        if !requested.insert(cursor.clone()) {
            return Err(BackendError::PaginationProtocol(format!(
                "page key '{}' was handed out twice",
                cursor
            )));
        }

        tracing::debug!(cursor = %cursor, fetched = items.len(), expected, "Requesting next page");
        let mut page = fetch(PageRequest::Cursor(cursor)).await?;
        next = page.next_cursor();
        items.append(&mut page.items);
    }

    if items.len() as u64 != expected {
        return Err(BackendError::PaginationProtocol(format!(
            "retrieved {} items but totalCount was {}",
            items.len(),
            expected
        )));
    }

    Ok(items)
}
