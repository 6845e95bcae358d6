//! Process-wide default profile.
//!
//! Configure it at startup, before traffic begins. Each call through the
//! free functions takes a snapshot of the default when it starts, so a
//! reconfiguration never affects requests already in flight.

use std::sync::{OnceLock, PoisonError, RwLock};

use reqwest::{header::HeaderMap, Method};
use serde::{de::DeserializeOwned, Serialize};

use crate::{Profile, RawResponse, Result};

fn default_slot() -> &'static RwLock<Profile> {
    static DEFAULT: OnceLock<RwLock<Profile>> = OnceLock::new();
    DEFAULT.get_or_init(|| RwLock::new(Profile::new()))
}

/// Applies `update` to the shared default profile in place.
pub fn configure_default<F>(update: F)
where
    F: FnOnce(&mut Profile),
{
    let mut profile = default_slot()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    update(&mut profile);
}

/// Snapshot of the shared default profile.
pub fn default_profile() -> Profile {
    default_slot()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// [`Profile::request_json`] on the default profile.
pub async fn request_json<T, B>(
    method: Method,
    url: &str,
    headers: HeaderMap,
    body: Option<&B>,
) -> Result<T>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    default_profile()
        .request_json(method, url, headers, body)
        .await
}

/// [`Profile::request_json_with_response`] on the default profile.
pub async fn request_json_with_response<T, B>(
    method: Method,
    url: &str,
    headers: HeaderMap,
    body: Option<&B>,
) -> Result<(RawResponse, T)>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    default_profile()
        .request_json_with_response(method, url, headers, body)
        .await
}
