//! Tenant-scoped contact entity, its DTO, and mapper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crudhub_api::{DtoMapper, ResourceDto};
use crudhub_core::error::AppError;
use crudhub_core::types::{AuditFields, FieldDescriptor};
use crudhub_entity::{SoftDelete, TenantRef, impl_entity};

/// Base path of the contact resource.
pub const CONTACTS_PATH: &str = "/api/contacts";

/// A person belonging to a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(flatten)]
    pub base: SoftDelete,
    #[serde(flatten)]
    pub audit: AuditFields,
    /// Owning tenant.
    pub tenant: TenantRef,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl_entity!(Contact {
    collection: "contacts",
    name: "Contact",
    base: base,
    audit: audit,
    fields: [
        TenantRef::descriptor(),
        FieldDescriptor::text("first_name"),
        FieldDescriptor::text("last_name"),
        FieldDescriptor::text("email"),
        FieldDescriptor::text("phone").with_searchable(false),
    ],
});

/// Contact as exchanged over HTTP; the tenant is referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ContactDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[validate(length(min = 1, message = "tenant_id must not be blank"))]
    pub tenant_id: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<DateTime<Utc>>,
}

impl ResourceDto for ContactDto {
    fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    fn active(&self) -> Option<bool> {
        self.active
    }
}

/// Maps [`Contact`] to [`ContactDto`] and back.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactMapper;

impl DtoMapper<Contact, ContactDto> for ContactMapper {
    fn to_entity(&self, dto: ContactDto) -> Result<Contact, AppError> {
        let id = dto.id().map(str::to_string);
        Ok(Contact {
            base: SoftDelete {
                id,
                active: dto.active.unwrap_or(true),
            },
            audit: AuditFields::default(),
            tenant: TenantRef::new(dto.tenant_id.trim()),
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email.filter(|e| !e.is_empty()),
            phone: dto.phone.filter(|p| !p.is_empty()),
        })
    }

    fn to_dto(&self, entity: Contact) -> ContactDto {
        ContactDto {
            id: entity.base.id,
            tenant_id: entity.tenant.tenant_id().to_string(),
            first_name: entity.first_name,
            last_name: entity.last_name,
            email: entity.email,
            phone: entity.phone,
            active: Some(entity.base.active),
            created_by: Some(entity.audit.created_by),
            created_date: Some(entity.audit.created_date),
            last_modified_by: Some(entity.audit.last_modified_by),
            last_modified_date: Some(entity.audit.last_modified_date),
        }
    }
}
