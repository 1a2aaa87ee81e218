use std::collections::BTreeMap;

use async_trait::async_trait;
use ltk_schemas::{CollectionKind, EnrollmentRecord, OrderRecord, PageEnvelope, TimelineItem};
use serde::de::DeserializeOwned;

use crate::source::{filter_signature, CollectionSource, SourcePage};
use crate::FetchError;

const ORDERS_PATH: &str = "/api/v1.0/orders/";
const ENROLLMENTS_PATH: &str = "/api/v1.0/enrollments/";

/// Orders endpoint client.
///
/// Base URL and bearer token are passed in by the caller (session layer);
/// do not log the token.
#[derive(Debug, Clone)]
pub struct OrdersClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: String,
    filters: BTreeMap<String, String>,
}

impl OrdersClient {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
            filters: BTreeMap::new(),
        }
    }

    /// Add caller-side filters (e.g. product id, state). Replaces any
    /// previous value for the same key.
    pub fn with_filters(mut self, filters: BTreeMap<String, String>) -> Self {
        self.filters.extend(filters);
        self
    }
}

#[async_trait]
impl CollectionSource for OrdersClient {
    fn kind(&self) -> CollectionKind {
        CollectionKind::Order
    }

    fn filter_signature(&self) -> String {
        filter_signature(&self.filters)
    }

    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<SourcePage, FetchError> {
        let url = endpoint_url(&self.base_url, ORDERS_PATH);
        let query = page_query(&self.filters, page, page_size);
        let body: PageEnvelope<OrderRecord> =
            fetch_envelope(&self.http, url, &self.bearer_token, &query).await?;
        Ok(SourcePage {
            has_next: !body.is_last_page(),
            count: body.count,
            items: body.results.into_iter().map(TimelineItem::Order).collect(),
        })
    }
}

/// Enrollments endpoint client.
///
/// Always pins `was_created_by_order=false`: enrollments created through an
/// order already appear on the timeline as that order.
#[derive(Debug, Clone)]
pub struct EnrollmentsClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: String,
    filters: BTreeMap<String, String>,
}

impl EnrollmentsClient {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        let mut filters = BTreeMap::new();
        filters.insert("was_created_by_order".to_string(), "false".to_string());
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
            filters,
        }
    }

    /// Add caller-side filters. The `was_created_by_order` pin cannot be
    /// overridden.
    pub fn with_filters(mut self, filters: BTreeMap<String, String>) -> Self {
        self.filters.extend(filters);
        self.filters
            .insert("was_created_by_order".to_string(), "false".to_string());
        self
    }
}

#[async_trait]
impl CollectionSource for EnrollmentsClient {
    fn kind(&self) -> CollectionKind {
        CollectionKind::Enrollment
    }

    fn filter_signature(&self) -> String {
        filter_signature(&self.filters)
    }

    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<SourcePage, FetchError> {
        let url = endpoint_url(&self.base_url, ENROLLMENTS_PATH);
        let query = page_query(&self.filters, page, page_size);
        let body: PageEnvelope<EnrollmentRecord> =
            fetch_envelope(&self.http, url, &self.bearer_token, &query).await?;
        Ok(SourcePage {
            has_next: !body.is_last_page(),
            count: body.count,
            items: body
                .results
                .into_iter()
                .map(TimelineItem::Enrollment)
                .collect(),
        })
    }
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

fn page_query(
    filters: &BTreeMap<String, String>,
    page: u32,
    page_size: u32,
) -> Vec<(String, String)> {
    let mut query: Vec<(String, String)> = filters
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    query.push(("page".to_string(), page.to_string()));
    query.push(("page_size".to_string(), page_size.to_string()));
    query
}

async fn fetch_envelope<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: String,
    bearer_token: &str,
    query: &[(String, String)],
) -> Result<PageEnvelope<T>, FetchError> {
    let resp = http
        .get(&url)
        .bearer_auth(bearer_token)
        .query(query)
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(FetchError::Api {
            status: status.as_u16(),
            message,
        });
    }

    resp.json::<PageEnvelope<T>>()
        .await
        .map_err(|e| FetchError::Decode(e.to_string()))
}

// -----------------
// Tests (mock server, no live endpoints)
// -----------------

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn order_page_body() -> serde_json::Value {
        json!({
            "count": 2,
            "next": "https://example.com/api/v1.0/orders/?page=2",
            "previous": null,
            "results": [
                {
                    "id": "ord-1",
                    "created_on": "2024-03-01T12:00:00Z",
                    "state": "validated",
                    "product_title": "Course A",
                    "total": "89.00",
                    "total_currency": "EUR"
                }
            ]
        })
    }

    #[tokio::test]
    async fn orders_client_decodes_page() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1.0/orders/")
                    .query_param("page", "1")
                    .query_param("page_size", "10")
                    .header("authorization", "Bearer sekret");
                then.status(200).json_body(order_page_body());
            })
            .await;

        let client = OrdersClient::new(server.base_url(), "sekret");
        let page = client.fetch_page(1, 10).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.count, 2);
        assert!(page.has_next);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].kind(), CollectionKind::Order);
        assert_eq!(page.items[0].id(), "ord-1");
    }

    #[tokio::test]
    async fn non_2xx_maps_to_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1.0/orders/");
                then.status(503).body("maintenance");
            })
            .await;

        let client = OrdersClient::new(server.base_url(), "sekret");
        let err = client.fetch_page(1, 10).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Api {
                status: 503,
                message: "maintenance".to_string()
            }
        );
    }

    #[tokio::test]
    async fn malformed_body_maps_to_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1.0/orders/");
                then.status(200).json_body(json!({"unexpected": true}));
            })
            .await;

        let client = OrdersClient::new(server.base_url(), "sekret");
        let err = client.fetch_page(1, 10).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn enrollments_client_pins_order_created_filter() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1.0/enrollments/")
                    .query_param("was_created_by_order", "false")
                    .query_param("page", "3");
                then.status(200).json_body(json!({
                    "count": 0,
                    "next": null,
                    "previous": null,
                    "results": []
                }));
            })
            .await;

        let mut filters = BTreeMap::new();
        filters.insert("was_created_by_order".to_string(), "true".to_string());
        let client = EnrollmentsClient::new(server.base_url(), "sekret").with_filters(filters);

        let page = client.fetch_page(3, 50).await.unwrap();
        mock.assert_async().await;
        assert!(!page.has_next);
        assert!(client.filter_signature().contains(r#""was_created_by_order":"false""#));
    }
}
