//! # Configuration Management
//!
//! Wire constants of the simple-modulus format and the runtime configuration of
//! the pipeline pump.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - TOML strings via `from_toml()`
//! - Environment variables via `from_env()`
//! - Direct instantiation with defaults
//!
//! The wire constants are fixed by the format and are never derived at runtime.

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Size of one plaintext block
pub const DECRYPTED_BLOCK_SIZE: usize = 8;

/// Size of one block on the wire (8 content bytes + 3 overhead bytes)
pub const ENCRYPTED_BLOCK_SIZE: usize = 11;

/// XOR mask applied to the block length byte
pub const BLOCK_SIZE_XOR_KEY: u8 = 0x3D;

/// XOR mask applied to the block checksum byte
pub const BLOCK_CHECKSUM_XOR_KEY: u8 = 0xF8;

/// Size of the header scratch area (largest header form)
pub const HEADER_SCRATCH_SIZE: usize = 3;

/// Number of key words in the keystream ring buffer
pub const RING_BUFFER_WORDS: usize = 4;

/// Largest packet a 3-byte header can describe
pub const MAX_PACKET_SIZE: usize = u16::MAX as usize;

/// Default amount of buffered output that triggers a flush
pub const DEFAULT_FLUSH_THRESHOLD: usize = 8 * 1024;

/// Default number of bytes requested from the source per read
pub const DEFAULT_READ_CHUNK: usize = 4 * 1024;

/// Default upper bound for a single flush
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime configuration for one connection's pipeline pump
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Buffered output (bytes) at which the pump flushes the sink
    pub flush_threshold_bytes: usize,

    /// Bytes requested from the source per read
    pub read_chunk_size: usize,

    /// Largest packet accepted from the source
    pub max_packet_size: usize,

    /// Upper bound for a single flush before `ProtocolError::Timeout`
    #[serde(with = "duration_serde")]
    pub flush_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            flush_threshold_bytes: DEFAULT_FLUSH_THRESHOLD,
            read_chunk_size: DEFAULT_READ_CHUNK,
            max_packet_size: MAX_PACKET_SIZE,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables, starting from defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(threshold) = std::env::var("SIMPLE_MODULUS_FLUSH_THRESHOLD") {
            config.flush_threshold_bytes = parse_env("SIMPLE_MODULUS_FLUSH_THRESHOLD", &threshold)?;
        }

        if let Ok(chunk) = std::env::var("SIMPLE_MODULUS_READ_CHUNK") {
            config.read_chunk_size = parse_env("SIMPLE_MODULUS_READ_CHUNK", &chunk)?;
        }

        if let Ok(max) = std::env::var("SIMPLE_MODULUS_MAX_PACKET_SIZE") {
            config.max_packet_size = parse_env("SIMPLE_MODULUS_MAX_PACKET_SIZE", &max)?;
        }

        if let Ok(timeout) = std::env::var("SIMPLE_MODULUS_FLUSH_TIMEOUT_MS") {
            let millis: u64 = parse_env("SIMPLE_MODULUS_FLUSH_TIMEOUT_MS", &timeout)?;
            config.flush_timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.flush_threshold_bytes == 0 {
            errors.push("Flush threshold must be greater than 0".to_string());
        } else if self.flush_threshold_bytes > 64 * 1024 * 1024 {
            errors.push(format!(
                "Flush threshold too large: {} bytes (maximum: 64 MB)",
                self.flush_threshold_bytes
            ));
        }

        if self.read_chunk_size < ENCRYPTED_BLOCK_SIZE {
            errors.push(format!(
                "Read chunk too small: {} bytes (minimum: {ENCRYPTED_BLOCK_SIZE})",
                self.read_chunk_size
            ));
        }

        if self.max_packet_size < HEADER_SCRATCH_SIZE + ENCRYPTED_BLOCK_SIZE {
            errors.push(format!(
                "Max packet size too small: {} bytes (minimum: {})",
                self.max_packet_size,
                HEADER_SCRATCH_SIZE + ENCRYPTED_BLOCK_SIZE
            ));
        } else if self.max_packet_size > MAX_PACKET_SIZE {
            errors.push(format!(
                "Max packet size too large: {} bytes (headers describe at most {MAX_PACKET_SIZE})",
                self.max_packet_size
            ));
        }

        if self.flush_timeout.as_millis() < 10 {
            errors.push("Flush timeout too short (minimum: 10ms)".to_string());
        } else if self.flush_timeout.as_secs() > 300 {
            errors.push("Flush timeout too long (maximum: 300s)".to_string());
        }

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse::<T>()
        .map_err(|_| ProtocolError::ConfigError(format!("Invalid value for {name}: '{value}'")))
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
