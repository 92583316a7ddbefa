//! FHIR search-set bundle unwrapping.
//!
//! Search endpoints answer with a `Bundle` whose `entry[].resource` holds the matches.
//! Search bundles may also carry `OperationOutcome` entries (search mode `outcome`), so
//! entries are filtered by `resourceType` before being decoded into the caller's wire type.

use crate::{decode_wire, FhirError, FhirResult};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct BundleWire {
    #[serde(rename = "resourceType")]
    resource_type: String,

    #[serde(default)]
    entry: Vec<BundleEntryWire>,
}

#[derive(Debug, Deserialize)]
struct BundleEntryWire {
    #[serde(default)]
    resource: Option<Value>,
}

/// Extract the resources of type `resource_type` from a search response body.
///
/// An empty body (`null` or `[]`) is treated as an empty result rather than an error,
/// because some proxies collapse an empty search set that way.
///
/// # Errors
///
/// Returns [`FhirError`] if the body is not a `Bundle`, or a matching entry does not decode
/// into `T`.
pub fn search_resources<T>(body: Value, resource_type: &str) -> FhirResult<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    match &body {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) if items.is_empty() => return Ok(Vec::new()),
        _ => {}
    }

    let bundle: BundleWire = decode_wire(body, "Bundle")?;
    if bundle.resource_type != "Bundle" {
        return Err(FhirError::InvalidInput(format!(
            "Expected resourceType 'Bundle', got '{}'",
            bundle.resource_type
        )));
    }

    let mut resources = Vec::with_capacity(bundle.entry.len());
    for resource in bundle.entry.into_iter().filter_map(|e| e.resource) {
        let kind = resource
            .get("resourceType")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if kind != resource_type {
            tracing::debug!("skipping {kind} entry in {resource_type} search bundle");
            continue;
        }
        resources.push(decode_wire(resource, resource_type)?);
    }

    Ok(resources)
}
