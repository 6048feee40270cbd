//! Paginated enumeration
//!
//! Child collections are listed in fixed windows of [`PAGE_SIZE`] items
//! (`range=[begin-end]`) after asking the array for a `/count`. The count
//! is a budget, not a promise: it is decremented by a full window per page
//! whatever the page held, and an empty page ends the scan early. Share
//! lookups keep scanning while the budget is zero, so a reported count of
//! 0 or an exact multiple of 100 still reaches one more window.

use crate::client::ArrayClient;
use crate::constants::PAGE_SIZE;
use crate::domain::ports::HttpMethod;
use crate::envelope::field_i64;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A filtered child collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    resource: String,
    filter: Option<String>,
    body: Option<Value>,
    inclusive_budget: bool,
}

impl PageQuery {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            filter: None,
            body: None,
            inclusive_budget: false,
        }
    }

    /// Restrict to children of `parent_id`
    pub fn with_parent(mut self, parent_id: &str) -> Self {
        self.filter = Some(format!("PARENTID::{}", parent_id));
        self
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    /// Keep scanning until the budget goes negative instead of reaching zero
    pub fn with_inclusive_budget(mut self) -> Self {
        self.inclusive_budget = true;
        self
    }

    fn budget_left(&self, remaining: i64) -> bool {
        if self.inclusive_budget {
            remaining >= 0
        } else {
            remaining > 0
        }
    }

    pub fn count_path(&self) -> String {
        match &self.filter {
            Some(filter) => format!("/{}/count?filter={}", self.resource, filter),
            None => format!("/{}/count", self.resource),
        }
    }

    pub fn page_path(&self, range_begin: u64) -> String {
        let range = format!("range=[{}-{}]", range_begin, range_begin + PAGE_SIZE);
        match &self.filter {
            Some(filter) => format!("/{}?filter={}&{}", self.resource, filter, range),
            None => format!("/{}?{}", self.resource, range),
        }
    }
}

impl ArrayClient {
    /// Number of items the array reports for the collection
    pub(crate) async fn count_items(&self, query: &PageQuery, context: &str) -> Result<i64> {
        let data = self
            .call(&query.count_path(), query.body.clone(), HttpMethod::Get)
            .await?
            .assert_success(context)?
            .assert_data(context)?;

        field_i64(&data, "COUNT")
            .ok_or_else(|| Error::Internal(format!("{}: COUNT missing from {}", context, data)))
    }

    pub(crate) async fn fetch_page<T: DeserializeOwned>(
        &self,
        query: &PageQuery,
        range_begin: u64,
        context: &str,
    ) -> Result<Vec<T>> {
        self.call_list(
            &query.page_path(range_begin),
            query.body.clone(),
            HttpMethod::Get,
            context,
        )
        .await
    }

    /// First item satisfying `matches`, scanning at most `count` items
    pub(crate) async fn find_paged<T, P>(
        &self,
        query: &PageQuery,
        count: i64,
        context: &str,
        mut matches: P,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        P: FnMut(&T) -> bool,
    {
        let mut remaining = count;
        let mut range_begin = 0;

        while query.budget_left(remaining) {
            let page: Vec<T> = self.fetch_page(query, range_begin, context).await?;
            if page.is_empty() {
                break;
            }
            if let Some(found) = page.into_iter().find(|item| matches(item)) {
                return Ok(Some(found));
            }
            range_begin += PAGE_SIZE;
            remaining -= PAGE_SIZE as i64;
        }

        Ok(None)
    }

    /// Every item of the collection, scanning at most `count` items
    pub(crate) async fn collect_paged<T: DeserializeOwned>(
        &self,
        query: &PageQuery,
        count: i64,
        context: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut remaining = count;
        let mut range_begin = 0;

        while query.budget_left(remaining) {
            let page: Vec<T> = self.fetch_page(query, range_begin, context).await?;
            if page.is_empty() {
                break;
            }
            items.extend(page);
            range_begin += PAGE_SIZE;
            remaining -= PAGE_SIZE as i64;
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{count, logged_in_client, ok, ScriptedTransport};
    use crate::domain::AccessRecord;
    use serde_json::json;

    fn access_page(range: std::ops::Range<usize>) -> crate::envelope::Envelope {
        let items: Vec<Value> = range
            .map(|i| json!({"ID": i.to_string(), "NAME": format!("10.0.0.{}", i)}))
            .collect();
        ok(Value::Array(items))
    }

    #[test]
    fn test_paths() {
        let query = PageQuery::new("NFS_SHARE_AUTH_CLIENT").with_parent("41");
        assert_eq!(query.count_path(), "/NFS_SHARE_AUTH_CLIENT/count?filter=PARENTID::41");
        assert_eq!(
            query.page_path(100),
            "/NFS_SHARE_AUTH_CLIENT?filter=PARENTID::41&range=[100-200]"
        );
        assert_eq!(PageQuery::new("NFSHARE").page_path(0), "/NFSHARE?range=[0-100]");
    }

    #[tokio::test]
    async fn test_find_in_second_window() {
        let (client, transport) = logged_in_client(
            ScriptedTransport::new()
                .on(HttpMethod::Get, "/NFS_SHARE_AUTH_CLIENT/count", count(250))
                .on(HttpMethod::Get, "range=[0-100]", access_page(0..100))
                .on(HttpMethod::Get, "range=[100-200]", access_page(100..200))
                .on(HttpMethod::Get, "range=[200-300]", access_page(200..250)),
        )
        .await;

        let query = PageQuery::new("NFS_SHARE_AUTH_CLIENT").with_parent("41");
        let total = client.count_items(&query, "count").await.unwrap();
        let found: Option<AccessRecord> = client
            .find_paged(&query, total, "page", |item: &AccessRecord| item.name == "10.0.0.150")
            .await
            .unwrap();

        assert_eq!(found.unwrap().id, "150");
        assert_eq!(transport.count(HttpMethod::Get, "range=["), 2);
        assert_eq!(transport.count(HttpMethod::Get, "range=[200-300]"), 0);
    }

    #[tokio::test]
    async fn test_collect_walks_every_window() {
        let (client, transport) = logged_in_client(
            ScriptedTransport::new()
                .on(HttpMethod::Get, "range=[0-100]", access_page(0..100))
                .on(HttpMethod::Get, "range=[100-200]", access_page(100..200))
                .on(HttpMethod::Get, "range=[200-300]", access_page(200..250)),
        )
        .await;

        let query = PageQuery::new("NFS_SHARE_AUTH_CLIENT").with_parent("41");
        let items: Vec<AccessRecord> = client.collect_paged(&query, 250, "page").await.unwrap();

        assert_eq!(items.len(), 250);
        assert_eq!(transport.count(HttpMethod::Get, "range=["), 3);
    }

    #[tokio::test]
    async fn test_short_page_keeps_scanning_until_budget_or_empty_page() {
        let (client, transport) = logged_in_client(
            ScriptedTransport::new()
                .on(HttpMethod::Get, "range=[0-100]", access_page(0..40))
                .on(HttpMethod::Get, "range=[100-200]", ok(json!([])))
                .on(HttpMethod::Get, "range=[200-300]", access_page(200..210)),
        )
        .await;

        let query = PageQuery::new("NFS_SHARE_AUTH_CLIENT").with_parent("41");
        let items: Vec<AccessRecord> = client.collect_paged(&query, 300, "page").await.unwrap();

        assert_eq!(items.len(), 40);
        assert_eq!(transport.count(HttpMethod::Get, "range=["), 2);
    }

    #[tokio::test]
    async fn test_inclusive_budget_scans_one_window_past_count() {
        let (client, transport) = logged_in_client(
            ScriptedTransport::new()
                .on(HttpMethod::Get, "range=[0-100]", access_page(0..100))
                .on(HttpMethod::Get, "range=[100-200]", access_page(100..110)),
        )
        .await;

        let query = PageQuery::new("NFSHARE").with_inclusive_budget();
        let found: Option<AccessRecord> = client
            .find_paged(&query, 0, "page", |item: &AccessRecord| item.id == "7")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, "7");

        let found: Option<AccessRecord> = client
            .find_paged(&query, 100, "page", |item: &AccessRecord| item.id == "105")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, "105");
        assert_eq!(transport.count(HttpMethod::Get, "range=[100-200]"), 1);
    }

    #[tokio::test]
    async fn test_zero_count_issues_no_page_query() {
        let (client, transport) = logged_in_client(ScriptedTransport::new()).await;

        let query = PageQuery::new("CIFS_SHARE_AUTH_CLIENT").with_parent("3");
        let found: Option<AccessRecord> = client
            .find_paged(&query, 0, "page", |_: &AccessRecord| true)
            .await
            .unwrap();

        assert!(found.is_none());
        assert_eq!(transport.count(HttpMethod::Get, "range=["), 0);
    }
}
