//! Configuration module
//!
//! Library configuration is read from the environment (with `.env` support) and selects
//! the blob storage and catalog backends plus upload and view settings.

use std::env;
use std::str::FromStr;

use crate::storage_types::{CatalogBackend, StorageBackend};

// Common constants
const MAX_FILE_SIZE_MB: u64 = 100;
const CATALOG_PAGE_SIZE: usize = 24;
const THUMBNAIL_MAX_EDGE: u32 = 320;
const DB_MAX_CONNECTIONS: u32 = 5;
const DB_TIMEOUT_SECS: u64 = 30;

/// Log output format for [`crate::telemetry::init_tracing`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Media library configuration
#[derive(Clone, Debug)]
pub struct LibraryConfig {
    pub environment: String,
    pub log_format: LogFormat,
    // Blob storage configuration
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers such as MinIO
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    // Catalog configuration
    pub catalog_backend: CatalogBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Upload and view configuration
    pub max_file_size_bytes: u64,
    pub page_size: usize,
    pub thumbnail_max_edge: u32,
    pub cleanup_orphaned_blobs: bool,
    pub uploader_label: Option<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_format: LogFormat::Pretty,
            storage_backend: StorageBackend::Memory,
            local_storage_path: None,
            local_storage_base_url: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            catalog_backend: CatalogBackend::Memory,
            database_url: None,
            db_max_connections: DB_MAX_CONNECTIONS,
            db_timeout_seconds: DB_TIMEOUT_SECS,
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            page_size: CATALOG_PAGE_SIZE,
            thumbnail_max_edge: THUMBNAIL_MAX_EDGE,
            cleanup_orphaned_blobs: true,
            uploader_label: None,
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl LibraryConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| defaults.environment.clone());

        let log_format = match optional_var("LOG_FORMAT") {
            Some(v) => v.parse()?,
            None => defaults.log_format,
        };

        let storage_backend = match optional_var("STORAGE_BACKEND") {
            Some(v) => v.parse()?,
            None => defaults.storage_backend,
        };

        let catalog_backend = match optional_var("CATALOG_BACKEND") {
            Some(v) => v.parse()?,
            None => defaults.catalog_backend,
        };

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("MAX_FILE_SIZE_MB must be a valid number"))?;
        let max_file_size_bytes = megabytes_to_bytes(max_file_size_mb)?;

        let page_size = env::var("CATALOG_PAGE_SIZE")
            .unwrap_or_else(|_| CATALOG_PAGE_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("CATALOG_PAGE_SIZE must be a valid number"))?;

        let thumbnail_max_edge = env::var("THUMBNAIL_MAX_EDGE")
            .unwrap_or_else(|_| THUMBNAIL_MAX_EDGE.to_string())
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("THUMBNAIL_MAX_EDGE must be a valid number"))?;

        let cleanup_orphaned_blobs = match optional_var("CLEANUP_ORPHANED_BLOBS") {
            Some(v) => parse_bool(&v).ok_or_else(|| {
                anyhow::anyhow!("CLEANUP_ORPHANED_BLOBS must be true or false, got '{}'", v)
            })?,
            None => defaults.cleanup_orphaned_blobs,
        };

        let config = LibraryConfig {
            environment,
            log_format,
            storage_backend,
            local_storage_path: optional_var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: optional_var("LOCAL_STORAGE_BASE_URL"),
            s3_bucket: optional_var("S3_BUCKET"),
            s3_region: optional_var("S3_REGION"),
            s3_endpoint: optional_var("S3_ENDPOINT"),
            aws_region: optional_var("AWS_REGION"),
            catalog_backend,
            database_url: optional_var("DATABASE_URL"),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DB_MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(DB_MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| DB_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DB_TIMEOUT_SECS),
            max_file_size_bytes,
            page_size,
            thumbnail_max_edge,
            cleanup_orphaned_blobs,
            uploader_label: optional_var("UPLOADER_LABEL"),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field requirements of the selected backends
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.page_size == 0 {
            return Err(anyhow::anyhow!("CATALOG_PAGE_SIZE must be greater than 0"));
        }
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.thumbnail_max_edge == 0 {
            return Err(anyhow::anyhow!("THUMBNAIL_MAX_EDGE must be greater than 0"));
        }

        match self.storage_backend {
            StorageBackend::Memory => {}
            StorageBackend::Local => {
                if self.local_storage_path.is_none() || self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL are required \
                         for the local storage backend"
                    ));
                }
            }
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET is required for the s3 storage backend"
                    ));
                }
                if self.s3_region().is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION is required for the s3 storage backend"
                    ));
                }
            }
        }

        if self.catalog_backend == CatalogBackend::Postgres && self.database_url.is_none() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL is required for the postgres catalog backend"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// S3 region, falling back to `AWS_REGION`
    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }
}

/// `MAX_FILE_SIZE_MB` in bytes, refusing values that overflow `u64`
fn megabytes_to_bytes(megabytes: u64) -> Result<u64, anyhow::Error> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large: {}", megabytes))
}
