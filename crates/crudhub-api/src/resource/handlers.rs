//! Handlers behind a [`Resource`](super::Resource) router.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE, HeaderName, LOCATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::Query;
use bytes::Bytes;
use tracing::info;
use validator::Validate;

use crudhub_core::error::AppError;
use crudhub_core::traits::Entity;
use crudhub_core::types::PageResponse;
use crudhub_excel::EXCEL_MEDIA_TYPE;

use super::{ResourceState, TOTAL_COUNT_HEADER};
use crate::dto::ResourceDto;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, ListParams};
use crate::mapper::DtoMapper;

/// Multipart part holding the uploaded workbook.
const FILE_PART: &str = "file";

/// POST {base}
pub(crate) async fn create<E, D, M>(
    State(state): State<ResourceState<E, D, M>>,
    user: CurrentUser,
    Json(dto): Json<D>,
) -> Result<Response, ApiError>
where
    E: Entity,
    D: ResourceDto,
    M: DtoMapper<E, D>,
{
    dto.validate()?;
    if dto.id().is_some() {
        return Err(AppError::conflict(format!("A new {} cannot already have an id", E::NAME)).into());
    }

    let entity = state.mapper.to_entity(dto)?;
    let saved = state.service.save(&user.context(), entity).await?;
    let dto = state.mapper.to_dto(saved);

    let location = match dto.id() {
        Some(id) => format!("{}/{}", state.base_path, id),
        None => state.base_path.to_string(),
    };
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(dto)).into_response())
}

/// PUT {base}
pub(crate) async fn update<E, D, M>(
    State(state): State<ResourceState<E, D, M>>,
    user: CurrentUser,
    Json(dto): Json<D>,
) -> Result<Json<D>, ApiError>
where
    E: Entity,
    D: ResourceDto,
    M: DtoMapper<E, D>,
{
    dto.validate()?;
    if dto.id().is_none() {
        return Err(AppError::validation(format!("Invalid id: updating a {} requires an id", E::NAME)).into());
    }

    let active = dto.active();
    let entity = retain_active(&state, active, state.mapper.to_entity(dto)?).await?;
    let saved = state.service.save(&user.context(), entity).await?;
    Ok(Json(state.mapper.to_dto(saved)))
}

/// GET {base}
pub(crate) async fn list<E, D, M>(
    State(state): State<ResourceState<E, D, M>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError>
where
    E: Entity,
    D: ResourceDto,
    M: DtoMapper<E, D>,
{
    let sort = params.sort_fields()?;

    let (result, paged) = if let Some(key) = params.search_key() {
        let page = (!params.all).then(|| params.page_request());
        let result = state.service.search(Some(key), &sort, page.as_ref()).await?;
        (result, page.is_some())
    } else if params.all {
        (PageResponse::unpaged(state.service.find_all(&sort).await?), false)
    } else {
        (state.service.find_page(&sort, &params.page_request()).await?, true)
    };

    let total = result.total_items;
    let page = result.try_map(|entity| Ok::<_, AppError>(state.mapper.to_dto(entity)))?;

    if wants_excel(&headers) {
        let bytes = state.excel.create_excel(&page.items, E::NAME)?;
        return Ok(excel_response(E::NAME, total, bytes));
    }

    let count = [(HeaderName::from_static(TOTAL_COUNT_HEADER), total.to_string())];
    if paged {
        Ok((count, Json(page)).into_response())
    } else {
        Ok((count, Json(page.items)).into_response())
    }
}

/// GET {base}/{id}
pub(crate) async fn get_one<E, D, M>(
    State(state): State<ResourceState<E, D, M>>,
    Path(id): Path<String>,
) -> Result<Json<D>, ApiError>
where
    E: Entity,
    D: ResourceDto,
    M: DtoMapper<E, D>,
{
    let entity = state
        .service
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{} {id} not found", E::NAME)))?;
    Ok(Json(state.mapper.to_dto(entity)))
}

/// DELETE {base}/{id}
pub(crate) async fn delete_one<E, D, M>(
    State(state): State<ResourceState<E, D, M>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    E: Entity,
    D: ResourceDto,
    M: DtoMapper<E, D>,
{
    state.service.delete(&user.context(), &id).await?;
    Ok(StatusCode::OK)
}

/// POST {base}/excel
///
/// Rows with an id update the stored entity; rows without one are created.
pub(crate) async fn upload_excel<E, D, M>(
    State(state): State<ResourceState<E, D, M>>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<Vec<D>>, ApiError>
where
    E: Entity,
    D: ResourceDto,
    M: DtoMapper<E, D>,
{
    let bytes = read_file_part(&mut multipart).await?;
    let dtos: Vec<D> = state.excel.read_excel(&bytes, E::NAME)?;
    for dto in &dtos {
        dto.validate()?;
    }

    let mut entities = Vec::with_capacity(dtos.len());
    for dto in dtos {
        let active = dto.active();
        entities.push(retain_active(&state, active, state.mapper.to_entity(dto)?).await?);
    }
    let saved = state.service.save_all(&user.context(), entities).await?;
    info!(entity = E::NAME, count = saved.len(), "Imported spreadsheet");
    Ok(Json(state.mapper.to_dtos(saved)))
}

/// Keep the stored soft-delete flag when the client left it out.
async fn retain_active<E, D, M>(
    state: &ResourceState<E, D, M>,
    active: Option<bool>,
    mut entity: E,
) -> Result<E, AppError>
where
    E: Entity,
    D: ResourceDto,
    M: DtoMapper<E, D>,
{
    if active.is_some() || entity.is_new() {
        return Ok(entity);
    }
    let id = entity.id().unwrap_or_default().to_string();
    if let Some(stored) = state.service.find_by_id(&id).await? {
        entity.set_active(stored.is_active());
    }
    Ok(entity)
}

async fn read_file_part(multipart: &mut Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some(FILE_PART) {
            return field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Failed to read part '{FILE_PART}': {e}")));
        }
    }
    Err(AppError::validation(format!("Missing multipart part '{FILE_PART}'")))
}

/// Whether the `Accept` header asks for a spreadsheet.
pub(crate) fn wants_excel(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|media| media.split(';').next())
        .any(|media| media.trim().eq_ignore_ascii_case(EXCEL_MEDIA_TYPE))
}

fn excel_response(entity_name: &str, total: u64, bytes: Vec<u8>) -> Response {
    let headers = [
        (CONTENT_TYPE, EXCEL_MEDIA_TYPE.to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{entity_name}.xlsx\""),
        ),
        (HeaderName::from_static(TOTAL_COUNT_HEADER), total.to_string()),
    ];
    (headers, bytes).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_wants_excel() {
        let mut headers = HeaderMap::new();
        assert!(!wants_excel(&headers));

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        assert!(!wants_excel(&headers));

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html, application/vnd.ms-excel;q=0.9"),
        );
        assert!(wants_excel(&headers));
    }
}
