//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and addresses.
//! All problems are collected so one run reports every mistake.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is not a socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("rewrite.client_script must be an absolute path, got {0:?}")]
    ClientScriptPath(String),
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let positive = [
        ("timeouts.upstream_secs", config.timeouts.upstream_secs as usize),
        ("timeouts.connect_secs", config.timeouts.connect_secs as usize),
        ("timeouts.request_secs", config.timeouts.request_secs as usize),
        ("rewrite.stream_chunk_bytes", config.rewrite.stream_chunk_bytes),
        ("rewrite.max_buffered_body_bytes", config.rewrite.max_buffered_body_bytes),
        ("listener.max_request_body_bytes", config.listener.max_request_body_bytes),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if !config.rewrite.client_script.starts_with('/') {
        errors.push(ValidationError::ClientScriptPath(
            config.rewrite.client_script.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
