//! # HTTP Catalog
//!
//! Stock and product lookups against the storefront API.
//!
//! ## Endpoints
//! ```text
//! GET {base_url}/stock/{id}     → 200 { "id": 1, "amount": 5 }
//! GET {base_url}/products/{id}  → 200 { "id": 1, "title": ..., "price": ..., "image": ... }
//!                               → 404 for unknown products
//! ```
//!
//! Every request carries the client-wide timeout from `[api]
//! request_timeout_secs`; a request that runs past it becomes
//! `LookupError::Timeout`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use stockcart_core::{Product, ProductId, Stock};

use crate::config::ApiSettings;
use crate::error::LookupError;
use crate::ports::{ProductCatalog, StockOracle};

/// Only `amount` is read from the stock payload; the id is ours.
#[derive(Debug, Deserialize)]
struct StockPayload {
    amount: i64,
}

/// Catalog and stock client for the storefront API.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
}

impl HttpCatalog {
    /// Creates a client for `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(HttpCatalog { client, base_url })
    }

    /// Creates a client from the `[api]` config section.
    pub fn from_settings(settings: &ApiSettings) -> Result<Self, LookupError> {
        Self::new(settings.base_url.clone(), settings.request_timeout())
    }

    /// Returns the base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: ProductId,
    ) -> Result<T, LookupError> {
        let url = format!("{}/{}/{}", self.base_url, resource, id);
        debug!(url = %url, "Lookup request");

        let response = self.client.get(&url).send().await.map_err(transport_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(LookupError::UnknownProduct(id)),
            status if !status.is_success() => {
                Err(LookupError::Transport(format!("{} returned {}", url, status)))
            }
            _ => response
                .json::<T>()
                .await
                .map_err(|e| LookupError::InvalidResponse(e.to_string())),
        }
    }
}

#[async_trait]
impl StockOracle for HttpCatalog {
    async fn get_stock(&self, id: ProductId) -> Result<Stock, LookupError> {
        let payload: StockPayload = self.get_json("stock", id).await?;
        Ok(Stock::new(id, payload.amount))
    }
}

#[async_trait]
impl ProductCatalog for HttpCatalog {
    async fn get_product(&self, id: ProductId) -> Result<Product, LookupError> {
        let product: Product = self.get_json("products", id).await?;

        if product.id != id {
            return Err(LookupError::InvalidResponse(format!(
                "asked for product {}, got {}",
                id, product.id
            )));
        }

        Ok(product)
    }
}

fn transport_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::Timeout
    } else {
        LookupError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn stock(Path(id): Path<i64>) -> Result<Json<Value>, AxumStatus> {
        match id {
            1 => Ok(Json(json!({ "id": 1, "amount": 3 }))),
            2 => Err(AxumStatus::INTERNAL_SERVER_ERROR),
            3 => {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok(Json(json!({ "id": 3, "amount": 1 })))
            }
            _ => Err(AxumStatus::NOT_FOUND),
        }
    }

    async fn product(Path(id): Path<i64>) -> Result<Json<Value>, AxumStatus> {
        match id {
            1 => Ok(Json(json!({
                "id": 1,
                "title": "Tênis de Caminhada Leve Confortável",
                "price": 179.9,
                "image": "https://example.com/1.jpg"
            }))),
            4 => Ok(Json(json!({ "title": "no id", "price": "free" }))),
            5 => Ok(Json(json!({
                "id": 5,
                "title": "Sandália",
                "price": 89.9,
                "brand": "Rocket",
                "colors": ["red", "black"]
            }))),
            _ => Err(AxumStatus::NOT_FOUND),
        }
    }

    async fn serve() -> String {
        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}/", addr)
    }

    async fn client() -> HttpCatalog {
        HttpCatalog::new(serve().await, Duration::from_millis(300)).unwrap()
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash_trimmed() {
        let catalog = HttpCatalog::new("http://localhost:3333/", Duration::from_secs(1)).unwrap();
        assert_eq!(catalog.base_url(), "http://localhost:3333");
    }

    #[tokio::test]
    async fn test_get_stock() {
        let catalog = client().await;

        let stock = catalog.get_stock(ProductId(1)).await.unwrap();
        assert_eq!(stock, Stock::new(ProductId(1), 3));
    }

    #[tokio::test]
    async fn test_get_product() {
        let catalog = client().await;

        let product = catalog.get_product(ProductId(1)).await.unwrap();
        assert_eq!(product.id, ProductId(1));
        assert_eq!(product.price, 179.9);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let catalog = client().await;

        assert_eq!(
            catalog.get_product(ProductId(99)).await.unwrap_err(),
            LookupError::UnknownProduct(ProductId(99))
        );
        assert_eq!(
            catalog.get_stock(ProductId(99)).await.unwrap_err(),
            LookupError::UnknownProduct(ProductId(99))
        );
    }

    #[tokio::test]
    async fn test_server_error_is_transport() {
        let catalog = client().await;

        assert!(matches!(
            catalog.get_stock(ProductId(2)).await.unwrap_err(),
            LookupError::Transport(_)
        ));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let catalog = client().await;

        assert_eq!(
            catalog.get_stock(ProductId(3)).await.unwrap_err(),
            LookupError::Timeout
        );
    }

    #[tokio::test]
    async fn test_product_without_image_keeps_extra_fields() {
        let catalog = client().await;

        let product = catalog.get_product(ProductId(5)).await.unwrap();
        assert_eq!(product.image, "");
        assert_eq!(product.extra["brand"], "Rocket");
        assert_eq!(product.extra["colors"], json!(["red", "black"]));
    }

    #[tokio::test]
    async fn test_incomplete_product_is_invalid_response() {
        let catalog = client().await;

        assert!(matches!(
            catalog.get_product(ProductId(4)).await.unwrap_err(),
            LookupError::InvalidResponse(_)
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let catalog =
            HttpCatalog::new(format!("http://{}", addr), Duration::from_millis(300)).unwrap();

        assert!(matches!(
            catalog.get_stock(ProductId(1)).await.unwrap_err(),
            LookupError::Transport(_)
        ));
    }
}
