use crate::utils::error::{GatewayErrorDetail, PaymentsError, Result};
use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use url::form_urlencoded;

#[derive(Clone)]
pub struct NvpCredentials {
    pub user: String,
    pub pwd: String,
    pub signature: String,
}

impl fmt::Debug for NvpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NvpCredentials")
            .field("user", &self.user)
            .field("pwd", &"<redacted>")
            .field("signature", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    Success,
    SuccessWithWarning,
    Failure,
    FailureWithWarning,
    Other(String),
}

impl Ack {
    fn parse(value: &str) -> Self {
        match value {
            "Success" => Ack::Success,
            "SuccessWithWarning" => Ack::SuccessWithWarning,
            "Failure" => Ack::Failure,
            "FailureWithWarning" => Ack::FailureWithWarning,
            other => Ack::Other(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Ack::Success | Ack::SuccessWithWarning)
    }
}

/// Decoded `KEY=VALUE&...` body of an NVP response, in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NvpResponse {
    pairs: Vec<(String, String)>,
}

impl NvpResponse {
    /// Keys and values are percent-decoded and `+` reads as a space. A
    /// segment without `=` becomes a key with an empty value.
    pub fn parse(body: &str) -> Self {
        let pairs = form_urlencoded::parse(body.trim().as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Last value wins when a key repeats.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like `get`, but absent or empty values are a protocol error.
    pub fn require(&self, method: &str, key: &str) -> Result<&str> {
        match self.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(PaymentsError::protocol(
                method,
                format!("response has no {} field", key),
            )),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn ack(&self) -> Option<Ack> {
        self.get("ACK").map(Ack::parse)
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.get("CORRELATIONID")
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.get("TIMESTAMP")
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Collect the indexed `L_ERRORCODEn` / `L_*MESSAGEn` entries.
    pub fn errors(&self) -> Vec<GatewayErrorDetail> {
        let mut errors = Vec::new();
        for n in 0.. {
            let code = self.get(&format!("L_ERRORCODE{}", n));
            let short = self.get(&format!("L_SHORTMESSAGE{}", n));
            let long = self.get(&format!("L_LONGMESSAGE{}", n));
            if code.is_none() && short.is_none() && long.is_none() {
                break;
            }
            errors.push(GatewayErrorDetail {
                code: code.unwrap_or_default().to_string(),
                short_message: short.unwrap_or_default().to_string(),
                long_message: long.unwrap_or_default().to_string(),
                severity: self
                    .get(&format!("L_SEVERITYCODE{}", n))
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        errors
    }

    /// Turn the application-level ACK into a result.
    pub fn check_ack(&self, method: &str) -> Result<()> {
        let ack = self
            .ack()
            .ok_or_else(|| PaymentsError::protocol(method, "response has no ACK field"))?;

        match ack {
            Ack::Success => Ok(()),
            Ack::SuccessWithWarning => {
                for warning in self.errors() {
                    tracing::warn!(
                        method,
                        code = %warning.code,
                        correlation_id = self.correlation_id().unwrap_or_default(),
                        "Gateway warning: {}",
                        warning.long_message
                    );
                }
                Ok(())
            }
            Ack::Failure | Ack::FailureWithWarning => Err(PaymentsError::GatewayError {
                method: method.to_string(),
                ack: self.get("ACK").unwrap_or_default().to_string(),
                correlation_id: self.correlation_id().map(str::to_string),
                errors: self.errors(),
            }),
            Ack::Other(value) => Err(PaymentsError::protocol(
                method,
                format!("unrecognised ACK value {:?}", value),
            )),
        }
    }
}

/// Async client for the PayPal Name-Value Pair API.
pub struct NvpClient {
    client: Client,
    endpoint: String,
    version: String,
    credentials: NvpCredentials,
}

impl NvpClient {
    pub fn new(
        endpoint: impl Into<String>,
        version: impl Into<String>,
        credentials: NvpCredentials,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            version: version.into(),
            credentials,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Form-encode a call: method, version and credentials first, then `params`.
    pub fn encode_request(&self, method: &str, params: &[(&str, String)]) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer
            .append_pair("METHOD", method)
            .append_pair("VERSION", &self.version)
            .append_pair("USER", &self.credentials.user)
            .append_pair("PWD", &self.credentials.pwd)
            .append_pair("SIGNATURE", &self.credentials.signature);
        for (key, value) in params {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    pub async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<NvpResponse> {
        let body = self.encode_request(method, params);

        tracing::debug!(
            method,
            endpoint = %self.endpoint,
            fields = params.len(),
            "Sending NVP request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(method, status = %status, "NVP response received");

        if !status.is_success() {
            return Err(PaymentsError::HttpStatusError {
                method: method.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let nvp = NvpResponse::parse(&text);
        nvp.check_ack(method)?;

        tracing::debug!(
            method,
            correlation_id = nvp.correlation_id().unwrap_or_default(),
            "NVP call succeeded"
        );
        Ok(nvp)
    }
}
