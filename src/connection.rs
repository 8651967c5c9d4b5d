//! IMAP sessions, one per user identity
//!
//! [`Connector`] is the seam between the account logic and the wire:
//! it logs users in and hands out exclusive access to their session.
//! [`ImapConnector`] implements it over STARTTLS with async-imap.

use crate::capability::Capabilities;
use crate::config::ImapConfig;
use crate::error::{Error, Result};
use crate::quota::QuotaRootResponse;
use async_imap::Session;
use async_trait::async_trait;
use parking_lot::Mutex;
use rustls::pki_types::ServerName;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio_rustls::TlsConnector;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};
use tracing::{debug, info, warn};

/// A TLS-wrapped IMAP session.
pub type ImapSession = Session<Compat<tokio_rustls::client::TlsStream<TcpStream>>>;

/// Establishes sessions and grants exclusive access to them.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: ProtocolSession;

    /// Log `username` in and keep the session for later use.
    ///
    /// Returns the account's primary address.
    async fn connect(&self, username: &str, password: &str) -> Result<String>;

    /// Lock the session of `id`. The lock is released when the guard
    /// is dropped.
    async fn session(&self, id: &str) -> Result<OwnedMutexGuard<Self::Session>>;
}

/// The operations the backend issues on a live session.
#[async_trait]
pub trait ProtocolSession: Send {
    /// Capabilities announced after login.
    fn capabilities(&self) -> Capabilities;

    /// Run `GETQUOTAROOT` for `mailbox`.
    async fn get_quota_root(&mut self, mailbox: &str) -> Result<QuotaRootResponse>;
}

/// A logged-in session with the capabilities it was opened with.
pub struct ImapConnection {
    session: ImapSession,
    capabilities: Capabilities,
    /// Set while a command is on the wire. Still set afterwards means the
    /// caller gave up waiting and the answer was never read.
    interrupted: bool,
}

impl ImapConnection {
    /// Whether an earlier command was abandoned mid-flight, leaving the
    /// session out of step with the server.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        self.interrupted
    }
}

#[async_trait]
impl ProtocolSession for ImapConnection {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn get_quota_root(&mut self, mailbox: &str) -> Result<QuotaRootResponse> {
        if self.interrupted {
            warn!("Refusing GETQUOTAROOT on a session with an unread answer");
            return Err(Error::Imap(
                "Session is out of sync after an interrupted command".to_string(),
            ));
        }

        debug!("Sending GETQUOTAROOT {}", mailbox);
        self.interrupted = true;
        let response = self.session.get_quota_root(mailbox).await;
        self.interrupted = false;

        response
            .map(QuotaRootResponse::from)
            .map_err(|e| Error::Imap(format!("GETQUOTAROOT failed: {e}")))
    }
}

/// Keeps one IMAP session per user identity.
pub struct ImapConnector {
    config: ImapConfig,
    sessions: Mutex<HashMap<String, Arc<AsyncMutex<ImapConnection>>>>,
}

impl ImapConnector {
    #[must_use]
    pub fn new(config: ImapConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ImapConfig {
        &self.config
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}

#[async_trait]
impl Connector for ImapConnector {
    type Session = ImapConnection;

    async fn connect(&self, username: &str, password: &str) -> Result<String> {
        let mut session = open(&self.config, username, password).await?;

        let caps = session
            .capabilities()
            .await
            .map_err(|e| Error::Imap(format!("CAPABILITY failed: {e}")))?;
        let capabilities = Capabilities::from(&caps);
        debug!("Capabilities for {}: {:?}", username, capabilities);

        let connection = Arc::new(AsyncMutex::new(ImapConnection {
            session,
            capabilities,
            interrupted: false,
        }));
        if self
            .sessions
            .lock()
            .insert(username.to_string(), connection)
            .is_some()
        {
            debug!("Replaced existing session for {}", username);
        }

        Ok(self.config.primary_address(username))
    }

    async fn session(&self, id: &str) -> Result<OwnedMutexGuard<ImapConnection>> {
        let connection = self
            .sessions
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        Ok(connection.lock_owned().await)
    }
}

/// Build a TLS connector that accepts all certificates.
///
/// Local bridges and test servers present self-signed certificates,
/// so verification is skipped entirely.
fn tls_connector() -> TlsConnector {
    let config = rustls::ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(DangerousVerifier))
        .with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

/// Open a fresh TLS-wrapped IMAP session.
///
/// Connects to `config.host:config.port` via TCP, issues STARTTLS,
/// performs the TLS handshake, and logs in.
async fn open(config: &ImapConfig, username: &str, password: &str) -> Result<ImapSession> {
    let addr = format!("{}:{}", config.host, config.port);
    debug!("Connecting to IMAP server at {} as {}", addr, username);

    let tcp_stream = TcpStream::connect(&addr).await?;
    let mut client = async_imap::Client::new(tcp_stream.compat());

    client
        .run_command_and_check_ok("STARTTLS", None)
        .await
        .map_err(|e| Error::Tls(format!("STARTTLS failed: {e}")))?;

    let server_name = ServerName::try_from(config.host.clone())
        .map_err(|e| Error::Tls(format!("Invalid server name: {e}")))?;

    let inner = client.into_inner().into_inner();
    let tls_stream = tls_connector()
        .connect(server_name, inner)
        .await
        .map_err(|e| Error::Tls(e.to_string()))?;

    let tls_client = async_imap::Client::new(tls_stream.compat());

    let session = tls_client
        .login(username, password)
        .await
        .map_err(|(e, _)| match e {
            async_imap::error::Error::No(reason) => {
                debug!("Server rejected login for {}: {}", username, reason);
                Error::InvalidCredentials
            }
            other => Error::Imap(format!("Login failed: {other}")),
        })?;

    info!("Logged in to IMAP server as {}", username);
    Ok(session)
}

/// Certificate verifier that accepts all certificates.
#[derive(Debug)]
struct DangerousVerifier;

impl rustls::client::danger::ServerCertVerifier for DangerousVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::RSA_PKCS1_SHA384,
            rustls::SignatureScheme::RSA_PKCS1_SHA512,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::ECDSA_NISTP521_SHA512,
            rustls::SignatureScheme::RSA_PSS_SHA256,
            rustls::SignatureScheme::RSA_PSS_SHA384,
            rustls::SignatureScheme::RSA_PSS_SHA512,
            rustls::SignatureScheme::ED25519,
        ]
    }
}
