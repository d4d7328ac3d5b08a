//! Conversion between entities and their DTOs.

use crudhub_core::error::AppError;
use crudhub_core::traits::Entity;

use crate::dto::ResourceDto;

/// Maps an entity type to and from its wire DTO.
pub trait DtoMapper<E: Entity, D: ResourceDto>: Send + Sync + 'static {
    /// Build an entity from an incoming DTO.
    fn to_entity(&self, dto: D) -> Result<E, AppError>;

    /// Build the outgoing DTO for a stored entity.
    fn to_dto(&self, entity: E) -> D;

    /// Map a list of entities.
    fn to_dtos(&self, entities: Vec<E>) -> Vec<D> {
        entities.into_iter().map(|e| self.to_dto(e)).collect()
    }

    /// Map a list of DTOs, failing on the first invalid one.
    fn to_entities(&self, dtos: Vec<D>) -> Result<Vec<E>, AppError> {
        dtos.into_iter().map(|d| self.to_entity(d)).collect()
    }
}
