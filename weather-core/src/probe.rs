//! DNS-based network diagnostic.
//!
//! Resolving a couple of well-known hostnames tells "no connectivity at all"
//! apart from "the weather service is misbehaving".

use std::{fmt::Debug, io, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::WeatherError;

#[async_trait]
pub trait HostResolver: Send + Sync + Debug {
    /// Resolves `host`, returning the number of addresses found.
    async fn resolve(&self, host: &str) -> io::Result<usize>;
}

/// Resolver backed by the operating system via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> io::Result<usize> {
        let count = tokio::net::lookup_host((host, 443)).await?.count();
        if count == 0 {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no addresses for {host}"),
            ));
        }
        Ok(count)
    }
}

#[derive(Debug, Clone)]
pub struct NetworkProbe {
    resolver: Arc<dyn HostResolver>,
    hosts: Vec<String>,
}

impl NetworkProbe {
    pub fn new(resolver: Arc<dyn HostResolver>, hosts: Vec<String>) -> Self {
        Self { resolver, hosts }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Resolves every host in order, stopping at the first failure.
    pub async fn diagnose(&self) -> Result<(), WeatherError> {
        for host in &self.hosts {
            let addresses = self
                .resolver
                .resolve(host)
                .await
                .map_err(|source| WeatherError::Dns { host: host.clone(), source })?;
            debug!(%host, addresses, "DNS lookup succeeded");
        }
        Ok(())
    }

    /// `true` iff every host resolves. Failures are logged, never returned.
    pub async fn check(&self) -> bool {
        match self.diagnose().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "Network diagnostic failed");
                false
            }
        }
    }
}
