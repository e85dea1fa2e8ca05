//! Access tokens for the Google Workspace APIs
//!
//! [`ServiceAccountTokens`] implements the service-account JWT bearer flow
//! with domain-wide delegation: a JWT signed with the account's RSA key,
//! naming the impersonated user in `sub`, is exchanged at the key's token
//! endpoint. Tokens are cached per subject and refreshed shortly before
//! they expire.

use super::http;
use crate::config::{SecretString, WorkspaceConfig};
use crate::domain::errors::{ApiError, ArchiveError};
use crate::domain::result::Result;
use crate::core::report::ReportKind;
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN_SECS: i64 = 60;

const SCOPE_DRIVE: &str = "https://www.googleapis.com/auth/drive";
const SCOPE_USERS: &str = "https://www.googleapis.com/auth/admin.directory.user.readonly";
const SCOPE_GROUPS: &str = "https://www.googleapis.com/auth/admin.directory.group.readonly";
const SCOPE_GROUP_SETTINGS: &str = "https://www.googleapis.com/auth/apps.groups.settings";
const SCOPE_GMAIL_SETTINGS: &str = "https://www.googleapis.com/auth/gmail.settings.basic";

/// OAuth scopes a report needs, archive upload included
pub fn scopes_for(kind: ReportKind) -> Vec<String> {
    let scopes: &[&str] = match kind {
        ReportKind::SharedDriveAcls => &[SCOPE_DRIVE],
        ReportKind::UserForwarding => &[SCOPE_USERS, SCOPE_GMAIL_SETTINGS, SCOPE_DRIVE],
        ReportKind::GroupMembers => &[SCOPE_GROUPS, SCOPE_DRIVE],
        ReportKind::GroupSettings => &[SCOPE_GROUPS, SCOPE_GROUP_SETTINGS, SCOPE_DRIVE],
    };
    scopes.iter().map(|s| s.to_string()).collect()
}

/// Source of bearer tokens for a given subject
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns a token acting as `subject`
    async fn access_token(&self, subject: &str) -> std::result::Result<String, ApiError>;
}

/// A pre-issued bearer token, used for every subject
pub struct StaticToken {
    token: SecretString,
}

impl StaticToken {
    /// Wraps a token
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self, _subject: &str) -> std::result::Result<String, ApiError> {
        Ok(self.token.expose_secret().as_str().to_string())
    }
}

/// The fields of a service account key file gwarchive uses
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account email, the JWT issuer
    pub client_email: String,

    /// PEM encoded RSA private key
    pub private_key: SecretString,

    /// Key id, sent as the JWT `kid`
    #[serde(default)]
    pub private_key_id: Option<String>,

    /// Token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    /// Parses a key from its JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ArchiveError::Configuration(format!("Invalid service account key: {e}")))
    }

    /// Reads a key file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ArchiveError::Configuration(format!(
                "Failed to read service account key {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    exp: i64,
    iat: i64,
    sub: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: i64,
}

impl CachedToken {
    fn is_fresh(&self, now: i64) -> bool {
        now < self.expires_at - EXPIRY_MARGIN_SECS
    }
}

/// Tokens by subject
///
/// The lock is only taken for lookups and inserts, never across a token
/// exchange, so exchanges for different subjects run concurrently. Two
/// concurrent misses for one subject may both exchange; the later insert
/// wins.
#[derive(Default)]
struct TokenCache {
    tokens: Mutex<HashMap<String, CachedToken>>,
}

impl TokenCache {
    fn fresh(&self, subject: &str, now: i64) -> Option<String> {
        let tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        tokens
            .get(subject)
            .filter(|t| t.is_fresh(now))
            .map(|t| t.token.clone())
    }

    fn store(&self, subject: &str, token: CachedToken) {
        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        tokens.insert(subject.to_string(), token);
    }
}

/// Delegated service-account tokens, cached per subject
pub struct ServiceAccountTokens {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scopes: Vec<String>,
    http: Client,
    cache: TokenCache,
}

impl ServiceAccountTokens {
    /// Creates a token source
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the private key is not valid RSA PEM.
    pub fn new(key: ServiceAccountKey, scopes: Vec<String>, http: Client) -> Result<Self> {
        // Keys pasted through environment variables often carry literal "\n"
        let pem = key.private_key.expose_secret().as_str().replace("\\n", "\n");
        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
            ArchiveError::Configuration(format!("Failed to load service account private key: {e}"))
        })?;

        Ok(Self {
            key,
            encoding_key,
            scopes,
            http,
            cache: TokenCache::default(),
        })
    }

    async fn exchange(&self, subject: &str, now: i64) -> std::result::Result<CachedToken, ApiError> {
        let claims = JwtClaims {
            iss: &self.key.client_email,
            scope: self.scopes.join(" "),
            aud: &self.key.token_uri,
            exp: now + TOKEN_LIFETIME_SECS,
            iat: now,
            sub: subject,
        };
        let header = Header {
            alg: Algorithm::RS256,
            kid: self.key.private_key_id.clone(),
            ..Default::default()
        };
        let assertion = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| ApiError::fatal(format!("failed to sign token request: {e}")))?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(http::transport)?;
        let response = http::check(response).await?;
        let token: TokenResponse = http::json(response).await?;

        tracing::debug!(subject, "Obtained delegated access token");

        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + token.expires_in.unwrap_or(TOKEN_LIFETIME_SECS),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokens {
    async fn access_token(&self, subject: &str) -> std::result::Result<String, ApiError> {
        let now = Utc::now().timestamp();
        if let Some(token) = self.cache.fresh(subject, now) {
            return Ok(token);
        }

        let fresh = self.exchange(subject, now).await?;
        let token = fresh.token.clone();
        self.cache.store(subject, fresh);
        Ok(token)
    }
}

/// Google API endpoints, overridable for testing
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Admin SDK Directory API
    pub directory: String,
    /// Drive API
    pub drive: String,
    /// Drive upload API
    pub upload: String,
    /// Gmail API
    pub gmail: String,
    /// Groups Settings API
    pub groups_settings: String,
}

impl Endpoints {
    /// Every endpoint under one base URL, for a mock server
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            directory: format!("{base}/admin/directory/v1"),
            drive: format!("{base}/drive/v3"),
            upload: format!("{base}/upload/drive/v3"),
            gmail: format!("{base}/gmail/v1"),
            groups_settings: format!("{base}/groups/v1"),
        }
    }

    fn from_config(config: &WorkspaceConfig) -> Self {
        Self {
            directory: config.directory_url.clone(),
            drive: config.drive_url.clone(),
            upload: config.upload_url.clone(),
            gmail: config.gmail_url.clone(),
            groups_settings: config.groups_settings_url.clone(),
        }
    }
}

/// Authenticated session shared read-only by every call of a run
#[derive(Clone)]
pub struct Session {
    /// HTTP client
    pub http: Client,
    /// Token source
    pub tokens: Arc<dyn TokenSource>,
    /// Administrator the directory calls act as
    pub admin_subject: String,
    /// API endpoints
    pub endpoints: Endpoints,
}

impl Session {
    /// Creates a session
    pub fn new(
        http: Client,
        tokens: Arc<dyn TokenSource>,
        admin_subject: impl Into<String>,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            http,
            tokens,
            admin_subject: admin_subject.into(),
            endpoints,
        }
    }

    /// Builds the session for a report from the `[workspace]` section
    pub fn from_config(config: &WorkspaceConfig, kind: ReportKind) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("gwarchive/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ArchiveError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        let tokens: Arc<dyn TokenSource> = if let Some(token) = &config.access_token {
            Arc::new(StaticToken::new(token.clone()))
        } else {
            let key = match (&config.service_account_json, &config.service_account_file) {
                (Some(json), _) => ServiceAccountKey::from_json(json.expose_secret().as_str())?,
                (None, Some(path)) => ServiceAccountKey::from_file(path)?,
                (None, None) => {
                    return Err(ArchiveError::Configuration(
                        "No workspace credentials configured".to_string(),
                    ))
                }
            };
            tracing::info!(
                service_account = %key.client_email,
                subject = %config.admin_email,
                "Using delegated service account credentials"
            );
            Arc::new(ServiceAccountTokens::new(key, scopes_for(kind), http.clone())?)
        };

        Ok(Self::new(
            http,
            tokens,
            config.admin_email.clone(),
            Endpoints::from_config(config),
        ))
    }

    /// Token acting as the administrator
    pub async fn admin_token(&self) -> std::result::Result<String, ApiError> {
        self.tokens.access_token(&self.admin_subject).await
    }
}
