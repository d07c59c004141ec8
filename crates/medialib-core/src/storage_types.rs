use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Blob storage backend types
///
/// Defined in core because configuration selects it and storage implementations report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Local,
    S3,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "local" => Ok(StorageBackend::Local),
            "s3" => Ok(StorageBackend::S3),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::S3 => write!(f, "s3"),
        }
    }
}

/// Catalog repository backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    #[default]
    Memory,
    Postgres,
}

impl FromStr for CatalogBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(CatalogBackend::Memory),
            "postgres" | "postgresql" => Ok(CatalogBackend::Postgres),
            _ => Err(anyhow::anyhow!("Invalid catalog backend: {}", s)),
        }
    }
}

impl Display for CatalogBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CatalogBackend::Memory => write!(f, "memory"),
            CatalogBackend::Postgres => write!(f, "postgres"),
        }
    }
}
