//! Wire DTO and mapper for the built-in [`Tenant`] entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crudhub_core::error::AppError;
use crudhub_core::types::AuditFields;
use crudhub_entity::{SoftDelete, Tenant};

use crate::dto::ResourceDto;
use crate::mapper::DtoMapper;

/// Base path of the tenant resource.
pub const TENANTS_PATH: &str = "/api/tenants";

/// Tenant as exchanged over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TenantDto {
    /// Stored id; absent on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    #[validate(length(min = 1, max = 200, message = "name must not be blank"))]
    pub name: String,
    /// Short unique code.
    #[validate(length(min = 1, max = 50, message = "code must not be blank"))]
    pub code: String,
    /// Whether the tenant is visible to default reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Read-only audit stamps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<DateTime<Utc>>,
}

impl TenantDto {
    /// A new tenant with no id.
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            code: code.into(),
            active: None,
            created_by: None,
            created_date: None,
            last_modified_by: None,
            last_modified_date: None,
        }
    }
}

impl ResourceDto for TenantDto {
    fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    fn active(&self) -> Option<bool> {
        self.active
    }
}

/// Maps [`Tenant`] to [`TenantDto`] and back.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantMapper;

impl DtoMapper<Tenant, TenantDto> for TenantMapper {
    fn to_entity(&self, dto: TenantDto) -> Result<Tenant, AppError> {
        let id = dto.id().map(str::to_string);
        Ok(Tenant {
            base: SoftDelete {
                id,
                active: dto.active.unwrap_or(true),
            },
            // Stamps are owned by the repository; incoming values are ignored.
            audit: AuditFields::default(),
            name: dto.name.trim().to_string(),
            code: dto.code.trim().to_string(),
        })
    }

    fn to_dto(&self, entity: Tenant) -> TenantDto {
        TenantDto {
            id: entity.base.id,
            name: entity.name,
            code: entity.code,
            active: Some(entity.base.active),
            created_by: Some(entity.audit.created_by),
            created_date: Some(entity.audit.created_date),
            last_modified_by: Some(entity.audit.last_modified_by),
            last_modified_date: Some(entity.audit.last_modified_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_id_counts_as_absent() {
        let mut dto = TenantDto::new("Acme", "ACME");
        dto.id = Some(" ".into());
        assert_eq!(ResourceDto::id(&dto), None);
        let entity = TenantMapper.to_entity(dto).unwrap();
        assert!(entity.base.id.is_none());
    }

    #[test]
    fn test_round_trip_keeps_fields() {
        let mut dto = TenantDto::new(" Acme ", "ACME");
        dto.id = Some("64b000000000000000000001".into());
        dto.active = Some(false);
        let back = TenantMapper.to_dto(TenantMapper.to_entity(dto).unwrap());
        assert_eq!(back.name, "Acme");
        assert_eq!(back.id.as_deref(), Some("64b000000000000000000001"));
        assert_eq!(back.active, Some(false));
        assert_eq!(back.created_by.as_deref(), Some("unknown"));
    }

    #[test]
    fn test_validation() {
        assert!(TenantDto::new("", "X").validate().is_err());
        assert!(TenantDto::new("Acme", "ACME").validate().is_ok());
    }
}
