mod error;
mod routes;

use std::fmt::{Debug, Display};
use std::marker::PhantomData;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::models::{DashboardSummary, Project};

pub use error::{ApiError, Operation};
pub use routes::{expand, RouteOverrides, RouteTable, Routes};

/// A backend-managed collection element.
pub trait Resource: Clone + Debug + Send + Sync + DeserializeOwned + 'static {
    type Id: Copy + PartialEq + Display + Debug + Send + Sync + 'static;
    /// Request body for create and update.
    type Draft: Serialize + Clone + Debug + Send + Sync + 'static;

    /// Singular name used in logs and error messages.
    const NAME: &'static str;

    fn id(&self) -> Self::Id;

    fn decode_list(body: Value) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_value(body)
    }

    /// Extra `:name` substitutions for the create route.
    fn route_params(_draft: &Self::Draft) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// CRUD round trips against one resource collection. Nothing is retried.
#[async_trait]
pub trait ResourceClient<R: Resource>: Send + Sync {
    async fn list(&self) -> Result<Vec<R>, ApiError>;

    /// Returns the created entity when the backend echoes it.
    async fn create(&self, draft: &R::Draft) -> Result<Option<R>, ApiError>;

    async fn update(&self, id: R::Id, draft: &R::Draft) -> Result<Option<R>, ApiError>;

    async fn delete(&self, id: R::Id) -> Result<(), ApiError>;
}

/// Connection to the REST backend
pub struct Backend {
    http: reqwest::Client,
    base_url: String,
    routes: RouteTable,
}

impl Backend {
    /// Build the HTTP client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.backend_url().trim_end_matches('/').to_string(),
            routes: config.routes.clone(),
        })
    }

    fn resource<R: Resource>(&self, routes: &Routes) -> HttpResource<R> {
        HttpResource {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            routes: routes.clone(),
            _resource: PhantomData,
        }
    }

    pub fn projects(&self) -> HttpResource<Project> {
        self.resource(&self.routes.projects)
    }

    pub fn documents(&self) -> HttpResource<crate::models::Document> {
        self.resource(&self.routes.documents)
    }

    pub fn finance(&self) -> HttpResource<crate::models::FinanceRecord> {
        self.resource(&self.routes.finance)
    }

    pub fn summary(&self) -> SummaryClient {
        SummaryClient {
            http: self.http.clone(),
            dashboard_url: format!("{}{}", self.base_url, self.routes.dashboard),
            upcoming_url: format!("{}{}", self.base_url, self.routes.upcoming_events),
        }
    }
}

/// Sends `request` and returns the body of a 2xx response.
async fn send(request: reqwest::RequestBuilder) -> Result<String, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::from_response(status.as_u16(), &body));
    }
    Ok(body)
}

/// `reqwest` implementation of [`ResourceClient`].
pub struct HttpResource<R> {
    http: reqwest::Client,
    base_url: String,
    routes: Routes,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpResource<R> {
    fn url(&self, template: &str, params: &[(&str, String)]) -> String {
        format!("{}{}", self.base_url, expand(template, params))
    }

    fn route(&self, template: &Option<String>, operation: Operation) -> Result<String, ApiError> {
        template.clone().ok_or(ApiError::Unsupported {
            resource: R::NAME,
            operation,
        })
    }

    /// The echoed entity, if the body is one.
    fn echoed(body: &str) -> Option<R> {
        serde_json::from_str::<R>(body).ok()
    }
}

#[async_trait]
impl<R: Resource> ResourceClient<R> for HttpResource<R> {
    async fn list(&self) -> Result<Vec<R>, ApiError> {
        let url = self.url(&self.routes.list, &[]);
        tracing::debug!(resource = R::NAME, %url, "GET");
        let body = send(self.http.get(&url)).await?;
        let value: Value = serde_json::from_str(&body)?;
        Ok(R::decode_list(value)?)
    }

    async fn create(&self, draft: &R::Draft) -> Result<Option<R>, ApiError> {
        let template = self.route(&self.routes.create, Operation::Create)?;
        let url = self.url(&template, &R::route_params(draft));
        tracing::debug!(resource = R::NAME, %url, "POST");
        let body = send(self.http.post(&url).json(draft)).await?;
        Ok(Self::echoed(&body))
    }

    async fn update(&self, id: R::Id, draft: &R::Draft) -> Result<Option<R>, ApiError> {
        let template = self.route(&self.routes.update, Operation::Update)?;
        let url = self.url(&template, &[("id", id.to_string())]);
        tracing::debug!(resource = R::NAME, %url, "PUT");
        let body = send(self.http.put(&url).json(draft)).await?;
        Ok(Self::echoed(&body))
    }

    async fn delete(&self, id: R::Id) -> Result<(), ApiError> {
        let template = self.route(&self.routes.delete, Operation::Delete)?;
        let url = self.url(&template, &[("id", id.to_string())]);
        tracing::debug!(resource = R::NAME, %url, "DELETE");
        send(self.http.delete(&url)).await?;
        Ok(())
    }
}

/// Read-only aggregate endpoints shown on the dashboard.
#[derive(Clone)]
pub struct SummaryClient {
    http: reqwest::Client,
    dashboard_url: String,
    upcoming_url: String,
}

impl SummaryClient {
    pub async fn dashboard(&self) -> Result<DashboardSummary, ApiError> {
        tracing::debug!(url = %self.dashboard_url, "GET");
        let body = send(self.http.get(&self.dashboard_url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// The next planned project; the backend returns a list and only the
    /// first entry matters.
    pub async fn upcoming_project(&self) -> Result<Option<Project>, ApiError> {
        tracing::debug!(url = %self.upcoming_url, "GET");
        let body = send(self.http.get(&self.upcoming_url)).await?;
        first_project(serde_json::from_str(&body)?)
    }
}

fn first_project(body: Value) -> Result<Option<Project>, ApiError> {
    let first = match body {
        Value::Array(mut rows) if !rows.is_empty() => rows.swap_remove(0),
        Value::Array(_) | Value::Null => return Ok(None),
        single => single,
    };
    Ok(Some(serde_json::from_value(first)?))
}
