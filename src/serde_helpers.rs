//! Decoding of raw response bodies.
//!
//! When the `tracing` feature is enabled, unknown fields are logged as warnings and a failing
//! decode logs the path of the offending value, which helps detect API changes.

use serde::de::DeserializeOwned;

/// Decode a JSON body, warning about fields the target type does not capture.
#[cfg(feature = "tracing")]
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> crate::Result<T> {
    use std::any::type_name;

    let type_name = type_name::<T>();
    tracing::trace!(
        type_name,
        json = %String::from_utf8_lossy(body),
        "deserializing JSON"
    );

    let mut unknown_paths: Vec<String> = Vec::new();
    let de = &mut serde_json::Deserializer::from_slice(body);

    let result: T = serde_path_to_error::deserialize(serde_ignored::Deserializer::new(
        &mut *de,
        |path| unknown_paths.push(path.to_string()),
    ))
    .inspect_err(|e| {
        tracing::error!(
            type_name,
            path = %e.path(),
            error = %e.inner(),
            "deserialization failed"
        );
    })?;
    de.end()?;

    for path in unknown_paths {
        tracing::warn!(type_name, field = %path, "unknown field in API response");
    }

    Ok(result)
}

/// Pass-through decoding when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> crate::Result<T> {
    Ok(serde_json::from_slice(body)?)
}
