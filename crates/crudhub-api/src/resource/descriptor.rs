//! Machine-readable endpoint listing served by the API docs endpoint.

use serde::{Deserialize, Serialize};

/// One HTTP endpoint of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// HTTP method.
    pub method: String,
    /// Route path.
    pub path: String,
    /// Short description.
    pub summary: String,
    /// Status code on success.
    pub success: u16,
    /// Status codes returned on failure.
    pub errors: Vec<u16>,
}

impl EndpointDescriptor {
    fn new(method: &str, path: String, summary: String, success: u16, errors: &[u16]) -> Self {
        Self {
            method: method.to_string(),
            path,
            summary,
            success,
            errors: errors.to_vec(),
        }
    }
}

/// A registered resource and its endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Entity name.
    pub name: String,
    /// Mount path.
    pub base_path: String,
    /// Endpoints in registration order.
    pub endpoints: Vec<EndpointDescriptor>,
}

impl ResourceDescriptor {
    /// The endpoint set every [`Resource`](super::Resource) exposes.
    pub fn standard(name: &str, base_path: &str) -> Self {
        let item = format!("{base_path}/{{id}}");
        let endpoints = vec![
            EndpointDescriptor::new(
                "POST",
                base_path.to_string(),
                format!("Create a new {name}"),
                201,
                &[400, 401, 500],
            ),
            EndpointDescriptor::new(
                "PUT",
                base_path.to_string(),
                format!("Update an existing {name}"),
                200,
                &[400, 401, 500],
            ),
            EndpointDescriptor::new(
                "GET",
                base_path.to_string(),
                format!("List, search or export {name} records"),
                200,
                &[400, 500],
            ),
            EndpointDescriptor::new(
                "GET",
                item.clone(),
                format!("Get a {name} by id"),
                200,
                &[404, 500],
            ),
            EndpointDescriptor::new(
                "DELETE",
                item,
                format!("Soft-delete a {name} by id"),
                200,
                &[401, 404, 500],
            ),
            EndpointDescriptor::new(
                "POST",
                format!("{base_path}/excel"),
                format!("Create or update {name} records from a spreadsheet"),
                200,
                &[400, 401, 500],
            ),
        ];
        Self {
            name: name.to_string(),
            base_path: base_path.to_string(),
            endpoints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_endpoints() {
        let descriptor = ResourceDescriptor::standard("Tenant", "/api/tenants");
        assert_eq!(descriptor.endpoints.len(), 6);
        assert_eq!(descriptor.endpoints[0].success, 201);
        assert!(
            descriptor
                .endpoints
                .iter()
                .any(|e| e.method == "DELETE" && e.path == "/api/tenants/{id}")
        );
        assert_eq!(descriptor.endpoints[5].path, "/api/tenants/excel");
    }
}
