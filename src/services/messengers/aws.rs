//! SigV4 request signing for the AWS JSON APIs used by the SMS and email
//! messengers.

use std::time::SystemTime;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{
    SignableBody, SignableRequest, SigningParams, SigningSettings, sign,
};
use aws_sigv4::sign::v4;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder};

use super::error::MessengerError;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Signs requests for one AWS service in one region.
#[derive(Debug, Clone)]
pub struct AwsSigner {
    service: &'static str,
    region: String,
    credentials: SharedCredentialsProvider,
}

impl AwsSigner {
    pub fn new(
        service: &'static str,
        region: impl Into<String>,
        credentials: SharedCredentialsProvider,
    ) -> Self {
        Self {
            service,
            region: region.into(),
            credentials,
        }
    }

    /// Signer backed by access keys taken from configuration.
    pub fn with_static_keys(
        service: &'static str,
        region: impl Into<String>,
        access_key: &str,
        secret_key: &str,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "relay-config");
        Self::new(service, region, SharedCredentialsProvider::new(credentials))
    }

    /// Signer backed by the default AWS credential chain
    /// (environment, profile, web identity, instance metadata).
    pub async fn from_default_chain(
        service: &'static str,
        region: &str,
    ) -> Result<Self, MessengerError> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        let credentials = sdk_config.credentials_provider().ok_or_else(|| {
            MessengerError::invalid_config(
                "access_key",
                "no static keys configured and no default credential provider available",
            )
        })?;

        Ok(Self::new(service, region, credentials))
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Build a signed JSON request.
    ///
    /// Credentials are resolved on every call so rotating credentials from the
    /// default chain keep working.
    pub async fn request(
        &self,
        client: &Client,
        method: Method,
        url: &str,
        body: Vec<u8>,
    ) -> Result<RequestBuilder, MessengerError> {
        let credentials = self.credentials.provide_credentials().await?;
        let identity = credentials.into();

        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(self.service)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| MessengerError::Signing(e.into()))?
            .into();

        let headers = [(CONTENT_TYPE.as_str(), JSON_CONTENT_TYPE)];
        let signable = SignableRequest::new(
            method.as_str(),
            url,
            headers.into_iter(),
            SignableBody::Bytes(&body),
        )
        .map_err(|e| MessengerError::Signing(e.into()))?;

        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| MessengerError::Signing(e.into()))?
            .into_parts();

        let mut request = client
            .request(method, url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        for (name, value) in instructions.headers() {
            request = request.header(name, value);
        }

        Ok(request.body(body))
    }
}
