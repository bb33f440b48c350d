use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::app::config::Config;
use crate::error::{ApiErrorResponse, ProcessorError};
use crate::models::card::{CardDetails, Token};
use crate::models::payment::{Charge, ChargeRequest, List, ListParams, Refund};

const REQUEST_ID_HEADER: &str = "request-id";
const API_VERSION_HEADER: &str = "Stripe-Version";

/// Remote calls the gateway needs from a card processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_token(&self, card: &CardDetails) -> Result<Token, ProcessorError>;

    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, ProcessorError>;

    async fn list_charges(&self, params: &ListParams) -> Result<List<Charge>, ProcessorError>;

    async fn retrieve_charge(&self, charge_id: &str) -> Result<Charge, ProcessorError>;

    async fn create_refund(&self, charge_id: &str) -> Result<Refund, ProcessorError>;

    async fn list_refunds(&self, params: &ListParams) -> Result<List<Refund>, ProcessorError>;
}

/// Stripe REST client: form encoded requests, JSON responses, bearer key.
pub struct StripeClient {
    client: Client,
    base_url: Url,
    secret_key: SecretString,
    api_version: Option<String>,
}

impl StripeClient {
    pub fn new(config: &Config) -> Result<Self, ProcessorError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base.clone(),
            secret_key: SecretString::new(config.secret_key.expose_secret().clone()),
            api_version: config.api_version.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProcessorError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProcessorError::Unexpected("processor base URL cannot take a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .bearer_auth(self.secret_key.expose_secret());

        match &self.api_version {
            Some(version) => builder.header(API_VERSION_HEADER, version),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ProcessorError> {
        let url = self.endpoint(segments)?;
        debug!("GET {}", url.path());
        self.send(self.request(Method::GET, url).query(query)).await
    }

    async fn post<T, F>(&self, segments: &[&str], form: &F) -> Result<T, ProcessorError>
    where
        T: DeserializeOwned,
        F: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        debug!("POST {}", url.path());
        self.send(self.request(Method::POST, url).form(form)).await
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ProcessorError> {
        let response = builder.send().await?;
        let status = response.status();
        let request_id = request_id(&response);
        let bytes = response.bytes().await?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let body = serde_json::from_slice::<ApiErrorResponse>(&bytes)
            .ok()
            .map(|r| r.error);

        warn!(
            status = status.as_u16(),
            request_id = request_id.as_deref().unwrap_or("-"),
            "processor rejected request"
        );

        Err(ProcessorError::Api {
            status: status.as_u16(),
            request_id,
            body,
        })
    }
}

fn request_id(response: &Response) -> Option<String> {
    response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_token(&self, card: &CardDetails) -> Result<Token, ProcessorError> {
        self.post(&["v1", "tokens"], &card.form_fields()).await
    }

    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, ProcessorError> {
        self.post(&["v1", "charges"], request).await
    }

    async fn list_charges(&self, params: &ListParams) -> Result<List<Charge>, ProcessorError> {
        self.get(&["v1", "charges"], &params.query()).await
    }

    async fn retrieve_charge(&self, charge_id: &str) -> Result<Charge, ProcessorError> {
        self.get(&["v1", "charges", charge_id], &[]).await
    }

    async fn create_refund(&self, charge_id: &str) -> Result<Refund, ProcessorError> {
        self.post(&["v1", "refunds"], &[("charge", charge_id)]).await
    }

    async fn list_refunds(&self, params: &ListParams) -> Result<List<Refund>, ProcessorError> {
        self.get(&["v1", "refunds"], &params.query()).await
    }
}
