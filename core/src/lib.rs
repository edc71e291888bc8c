//! Core types shared by the loader, reconciler and exporters.

pub mod error;
pub mod normalize;
pub mod records;

pub use error::RecordError;
pub use records::{Cell, FingerprintRecord, MergedRecord, ProbeFields, ProbeRecord, ScanRecord, Tech};

use serde::{Deserialize, Serialize};
use std::fmt;

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Identity of one scanned network service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Endpoint { host: host.into(), port }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl From<(&str, u16)> for Endpoint {
    fn from((host, port): (&str, u16)) -> Self {
        Endpoint::new(host, port)
    }
}
