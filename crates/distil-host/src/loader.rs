//! Resource loading: image bytes and the module artifact
//!
//! One attempt, no retry, no timeout of its own; transport policy stays with
//! reqwest. A non-success HTTP status is an error rather than a byte buffer.

use std::fs;
use std::path::Path;

use crate::error::{HostError, Result};

/// Load a resource from a filesystem path or an `http(s)://` URL
pub fn load_resource(locator: &str) -> Result<Vec<u8>> {
    if locator.starts_with("http://") || locator.starts_with("https://") {
        fetch_url(locator)
    } else {
        tracing::debug!(path = locator, "loading resource from disk");
        Ok(fs::read(Path::new(locator))?)
    }
}

fn fetch_url(url: &str) -> Result<Vec<u8>> {
    tracing::debug!(url, "fetching resource");
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| HostError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;
    let bytes = response.bytes().map_err(|e| HostError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    Ok(bytes.to_vec())
}
