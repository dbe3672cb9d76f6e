use std::{fmt, num::NonZeroUsize, sync::Arc, time::Duration};

use cosmian_jwt_kms_interfaces::{GatewayError, GatewayResult, RemoteCryptoGateway};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::{JwtKmsError, result::JwtKmsResult};

/// Default number of public keys kept in memory.
pub const DEFAULT_PUBLIC_KEY_CACHE_CAPACITY: usize = 100;

/// Cancellation context bound to every remote call of a [`KmsConfig`].
///
/// Clones share the token given to [`OperationContext::new`]: cancelling it
/// stops the calls running under all of them.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    cancellation: CancellationToken,
    timeout: Option<Duration>,
}

impl OperationContext {
    #[must_use]
    pub fn new(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run a remote call under this context.
    ///
    /// The call is dropped as soon as the token is cancelled or the timeout
    /// elapses. Every failure is labelled with `operation`.
    pub async fn run<T, F>(&self, operation: &str, call: F) -> JwtKmsResult<T>
    where
        F: Future<Output = GatewayResult<T>>,
    {
        let bounded = async {
            match self.timeout {
                Some(timeout) => tokio::time::timeout(timeout, call)
                    .await
                    .unwrap_or(Err(GatewayError::Timeout(timeout))),
                None => call.await,
            }
        };
        let outcome = tokio::select! {
            biased;
            () = self.cancellation.cancelled() => Err(GatewayError::Cancelled),
            res = bounded => res,
        };
        outcome.map_err(|e| JwtKmsError::gateway(operation, e))
    }
}

/// Binding of a remote key to a verification strategy.
///
/// This is the value handed to the signing methods in place of a raw key.
#[derive(Clone)]
pub struct KmsConfig {
    key_id: String,
    verify_with_kms: bool,
    gateway: Arc<dyn RemoteCryptoGateway>,
    context: OperationContext,
}

impl KmsConfig {
    /// When `verify_with_kms` is false, signatures are checked in process
    /// against the public key fetched once from the gateway.
    pub fn new(
        gateway: Arc<dyn RemoteCryptoGateway>,
        key_id: impl Into<String>,
        verify_with_kms: bool,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            verify_with_kms,
            gateway,
            context: OperationContext::default(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: OperationContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    #[must_use]
    pub const fn verify_with_kms(&self) -> bool {
        self.verify_with_kms
    }

    #[must_use]
    pub fn gateway(&self) -> &dyn RemoteCryptoGateway {
        self.gateway.as_ref()
    }

    #[must_use]
    pub const fn context(&self) -> &OperationContext {
        &self.context
    }
}

impl fmt::Debug for KmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmsConfig")
            .field("key_id", &self.key_id)
            .field("verify_with_kms", &self.verify_with_kms)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Key binding as read from the host configuration file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct KmsKeyParams {
    pub key_id: String,
    #[serde(default)]
    pub verify_with_kms: bool,
    /// Deadline applied to each remote call
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl KmsKeyParams {
    pub fn into_config(self, gateway: Arc<dyn RemoteCryptoGateway>) -> KmsConfig {
        let mut context = OperationContext::default();
        if let Some(secs) = self.timeout_secs {
            context = context.with_timeout(Duration::from_secs(secs));
        }
        KmsConfig::new(gateway, self.key_id, self.verify_with_kms).with_context(context)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct PublicKeyCacheConfig {
    #[serde(default = "default_capacity")]
    pub capacity: NonZeroUsize,
}

const fn default_capacity() -> NonZeroUsize {
    match NonZeroUsize::new(DEFAULT_PUBLIC_KEY_CACHE_CAPACITY) {
        Some(capacity) => capacity,
        None => NonZeroUsize::MIN,
    }
}

impl Default for PublicKeyCacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use cosmian_jwt_kms_interfaces::GatewayError;
    use test_jwt_kms_gateway::TestGateway;
    use tokio_util::sync::CancellationToken;

    use super::{KmsKeyParams, OperationContext, PublicKeyCacheConfig};
    use crate::JwtKmsError;

    #[test]
    fn test_key_params_from_json() {
        let params: KmsKeyParams =
            serde_json::from_str(r#"{"key_id": "alias/jwt", "timeout_secs": 5}"#).unwrap();
        assert_eq!(params.key_id, "alias/jwt");
        assert!(!params.verify_with_kms);
        assert_eq!(params.timeout_secs, Some(5));

        let cache: PublicKeyCacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cache, PublicKeyCacheConfig::default());
        assert_eq!(cache.capacity.get(), 100);
    }

    #[test]
    fn test_key_params_into_config() {
        let params = KmsKeyParams {
            key_id: "alias/jwt".to_owned(),
            verify_with_kms: true,
            timeout_secs: Some(3),
        };
        let config = params.into_config(Arc::new(TestGateway::new()));
        assert_eq!(config.key_id(), "alias/jwt");
        assert!(config.verify_with_kms());
        assert_eq!(config.context().timeout(), Some(Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let context = OperationContext::default();
        let value = context.run("op", async { Ok::<_, GatewayError>(7) }).await;
        assert_eq!(value.unwrap(), 7);

        let err = context
            .run("op", async {
                Err::<u8, _>(GatewayError::NotFound("k".to_owned()))
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            JwtKmsError::Gateway {
                source: GatewayError::NotFound(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_run_cancelled() {
        let token = CancellationToken::new();
        let context = OperationContext::new(token.clone());
        token.cancel();
        let err = context
            .run("op", std::future::pending::<Result<(), GatewayError>>())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            JwtKmsError::Gateway {
                source: GatewayError::Cancelled,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_timeout() {
        let context = OperationContext::default().with_timeout(Duration::from_millis(50));
        let err = context
            .run("op", std::future::pending::<Result<(), GatewayError>>())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            JwtKmsError::Gateway {
                source: GatewayError::Timeout(_),
                ..
            }
        ));
    }
}
