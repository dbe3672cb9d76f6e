use std::{collections::HashMap, sync::Arc};

use crate::{
    cache::PublicKeyCache,
    signing_method::{
        PS256, PS384, PS512, PssSigningMethod, RS256, RS384, RS512, RsaSigningMethod,
        SigningMethod,
    },
};

/// The KMS backed signing methods, indexed by JWT `alg`.
///
/// All methods share one public key cache, owned by whoever builds the registry.
pub struct SigningMethods {
    cache: Arc<PublicKeyCache>,
    methods: HashMap<&'static str, Arc<dyn SigningMethod>>,
}

impl SigningMethods {
    #[must_use]
    pub fn new(cache: Arc<PublicKeyCache>) -> Self {
        let mut methods: HashMap<&'static str, Arc<dyn SigningMethod>> = HashMap::new();
        for descriptor in [RS256, RS384, RS512] {
            methods.insert(
                descriptor.name,
                Arc::new(RsaSigningMethod::new(descriptor, cache.clone())),
            );
        }
        for descriptor in [PS256, PS384, PS512] {
            methods.insert(
                descriptor.name,
                Arc::new(PssSigningMethod::new(descriptor, cache.clone())),
            );
        }
        Self { cache, methods }
    }

    #[must_use]
    pub fn get(&self, alg: &str) -> Option<Arc<dyn SigningMethod>> {
        self.methods.get(alg).cloned()
    }

    /// Sorted algorithm names
    #[must_use]
    pub fn algorithms(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<PublicKeyCache> {
        &self.cache
    }
}

impl Default for SigningMethods {
    fn default() -> Self {
        Self::new(Arc::new(PublicKeyCache::default()))
    }
}
