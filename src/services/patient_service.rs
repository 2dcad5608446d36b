//! Patient Service
//!
//! reqwest client for the patients REST endpoint. Every request carries the
//! session's bearer token.

use std::num::NonZeroUsize;
use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, Url};

use super::api::PatientsApi;
use crate::connection::{ClientConfig, TokenSource};
use crate::constants::PATIENTS_PATH;
use crate::domain::{Cursor, PageRequest, Patient, PatientEnvelope, PatientsPage, PaymentsPage};
use crate::error::{Error, Result};

/// HTTP client for `<base>/patients`
#[derive(Clone)]
pub struct PatientService {
    client: Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenSource>,
}

impl PatientService {
    /// Create a service for the configured endpoint
    pub fn new(config: ClientConfig, tokens: impl TokenSource) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            client,
            config,
            tokens: Arc::new(tokens),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Collection URL
    fn list_url(&self) -> String {
        self.config.build_url(PATIENTS_PATH)
    }

    /// URL below a single record, with every segment percent-encoded
    fn record_url(&self, id: &str, trailing: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.list_url()).map_err(|e| Error::Config {
            message: format!("Invalid base URL: {e}"),
        })?;
        url.path_segments_mut()
            .map_err(|_| Error::Config {
                message: "Base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push(id)
            .extend(trailing);
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(AUTHORIZATION, self.tokens.bearer())
    }
}

/// Map non-2xx answers to [`Error::Status`]
fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::Status {
            status,
            url: response.url().to_string(),
        })
    }
}

impl PatientsApi for PatientService {
    async fn patients_page(&self, request: &PageRequest) -> Result<PatientsPage> {
        let params = request.query_params();
        tracing::debug!(?params, "GET {}", self.list_url());

        let response = self
            .authorized(self.client.get(self.list_url()))
            .query(&params)
            .send()
            .await?;
        let page: PatientsPage = check_status(response)?.json().await?;

        tracing::debug!(
            items = page.data.len(),
            has_next = page.next_cursor().is_some(),
            "Patients page received"
        );
        Ok(page)
    }

    async fn patient(&self, id: &str) -> Result<Patient> {
        let url = self.record_url(id, &[])?;
        tracing::debug!("GET {url}");

        let response = self.authorized(self.client.get(url)).send().await?;
        let envelope: PatientEnvelope = check_status(response)?.json().await?;
        Ok(envelope.data)
    }

    async fn patient_payments(
        &self,
        id: &str,
        page_size: NonZeroUsize,
        cursor: Option<&Cursor>,
    ) -> Result<PaymentsPage> {
        let url = self.record_url(id, &["payments"])?;
        let mut params = vec![("pageSize", page_size.to_string())];
        if let Some(cursor) = cursor {
            params.push(("lastKey", cursor.to_string()));
        }
        tracing::debug!(?params, "GET {url}");

        let response = self
            .authorized(self.client.get(url))
            .query(&params)
            .send()
            .await?;
        Ok(check_status(response)?.json().await?)
    }
}

impl std::fmt::Debug for PatientService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientService")
            .field("base_url", &self.config.base_url)
            .field("environment", &self.config.environment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::SessionToken;

    fn service(base_url: &str) -> PatientService {
        let config = ClientConfig {
            base_url: base_url.to_string(),
            request_timeout_secs: 2,
            ..Default::default()
        };
        PatientService::new(config, SessionToken::with_token("t")).expect("service")
    }

    #[test]
    fn record_urls_are_encoded() {
        let svc = service("https://api.example.com/");
        let url = svc.record_url("PATIENT#a/b c", &[]).expect("url");
        assert_eq!(url.as_str(), "https://api.example.com/patients/PATIENT%23a%2Fb%20c");

        let url = svc.record_url("p1", &["payments"]).expect("url");
        assert_eq!(url.as_str(), "https://api.example.com/patients/p1/payments");
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let config = ClientConfig {
            base_url: " ".to_string(),
            ..Default::default()
        };
        assert!(PatientService::new(config, SessionToken::new()).is_err());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        let svc = service("http://127.0.0.1:1");
        let request = PageRequest::first(NonZeroUsize::new(3).expect("non-zero"));
        let err = svc.patients_page(&request).await.expect_err("no server");
        assert!(err.is_network());
    }
}
