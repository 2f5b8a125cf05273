use std::sync::Arc;

use actix_web::web::{Data, Json, Path};
use actix_web::{HttpResponse, Result};

use log::error;
use serde::{Deserialize, Serialize};

use super::AdminHeaders;
use crate::api::AppState;
use crate::entities::catalog::{Amenity, Location, Media, Property, Unit};
use crate::entities::cms::Section;

#[derive(Serialize, Deserialize, Clone)]
pub struct AdminResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    ids: Option<Vec<i32>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    removed: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Default for AdminResponse {
    fn default() -> Self {
        Self {
            ids: None,
            removed: None,
            error: None,
        }
    }
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(AdminResponse {
        error: Some(format!("Invalid admin key")),
        ..Default::default()
    })
}

fn not_implemented() -> HttpResponse {
    HttpResponse::InternalServerError().json(AdminResponse {
        error: Some(format!("Not implemented")),
        ..Default::default()
    })
}

pub async fn create_locations(
    appstate: Data<Arc<AppState>>,
    locations: Json<Vec<Location>>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.catalog_entity() {
        match entity.create_locations(&locations.into_inner()).await {
            Ok(ids) => Ok(HttpResponse::Ok().json(AdminResponse {
                ids: Some(ids),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::InternalServerError().json(AdminResponse {
                error: Some(format!("Failed to create locations: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}

pub async fn update_location(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    location: Json<Location>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    let (location_id,) = path.into_inner();

    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.catalog_entity() {
        match entity.update_location(location_id, &location.into_inner()).await {
            Ok(_) => Ok(HttpResponse::Ok().json(AdminResponse {
                ids: Some(vec![location_id]),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(AdminResponse {
                error: Some(format!("Failed to update location: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}

pub async fn create_properties(
    appstate: Data<Arc<AppState>>,
    properties: Json<Vec<Property>>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.catalog_entity() {
        match entity.create_properties(&properties.into_inner()).await {
            Ok(ids) => Ok(HttpResponse::Ok().json(AdminResponse {
                ids: Some(ids),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(AdminResponse {
                error: Some(format!("Failed to create properties: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}

pub async fn update_property(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    property: Json<Property>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    let (property_id,) = path.into_inner();

    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.catalog_entity() {
        match entity.update_property(property_id, &property.into_inner()).await {
            Ok(_) => Ok(HttpResponse::Ok().json(AdminResponse {
                ids: Some(vec![property_id]),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(AdminResponse {
                error: Some(format!("Failed to update property: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}

pub async fn delete_property(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    let (property_id,) = path.into_inner();

    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    let booking = match appstate.booking_entity() {
        Some(entity) => entity,
        None => return Ok(not_implemented()),
    };
    let catalog = match appstate.catalog_entity() {
        Some(entity) => entity,
        None => return Ok(not_implemented()),
    };

    if let Err(error) = booking.delete_for_property(property_id).await {
        return Ok(HttpResponse::InternalServerError().json(AdminResponse {
            error: Some(format!("Failed to delete appointments: {}", error)),
            ..Default::default()
        }));
    }

    match catalog.delete_property(property_id).await {
        Ok(object_keys) => {
            let removed = object_keys.len() as u64;

            for object_key in object_keys {
                if let Err(e) = appstate
                    .s3
                    .delete_object()
                    .bucket(appstate.bucket())
                    .key(&object_key)
                    .send()
                    .await
                {
                    error!("Failed to delete media object {}: {}", object_key, e);
                }
            }

            Ok(HttpResponse::Ok().json(AdminResponse {
                removed: Some(removed),
                ..Default::default()
            }))
        }
        Err(error) => Ok(HttpResponse::BadRequest().json(AdminResponse {
            error: Some(format!("Failed to delete property: {}", error)),
            ..Default::default()
        })),
    }
}

pub async fn create_units(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    units: Json<Vec<Unit>>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    let (property_id,) = path.into_inner();

    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.catalog_entity() {
        match entity.create_units(property_id, &units.into_inner()).await {
            Ok(ids) => Ok(HttpResponse::Ok().json(AdminResponse {
                ids: Some(ids),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(AdminResponse {
                error: Some(format!("Failed to create units: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}

pub async fn update_unit(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    unit: Json<Unit>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    let (unit_id,) = path.into_inner();

    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.catalog_entity() {
        match entity.update_unit(unit_id, &unit.into_inner()).await {
            Ok(_) => Ok(HttpResponse::Ok().json(AdminResponse {
                ids: Some(vec![unit_id]),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(AdminResponse {
                error: Some(format!("Failed to update unit: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}

pub async fn delete_unit(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    let (unit_id,) = path.into_inner();

    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.catalog_entity() {
        match entity.delete_unit(unit_id).await {
            Ok(_) => Ok(HttpResponse::Ok().json(AdminResponse {
                removed: Some(1),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(AdminResponse {
                error: Some(format!("Failed to delete unit: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}

pub async fn create_media(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    media: Json<Vec<Media>>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    let (property_id,) = path.into_inner();

    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.catalog_entity() {
        match entity.create_media(property_id, &media.into_inner()).await {
            Ok(ids) => Ok(HttpResponse::Ok().json(AdminResponse {
                ids: Some(ids),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(AdminResponse {
                error: Some(format!("Failed to create media: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}

pub async fn delete_media(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    let (media_id,) = path.into_inner();

    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.catalog_entity() {
        match entity.delete_media(media_id).await {
            Ok(object_key) => {
                if let Err(e) = appstate
                    .s3
                    .delete_object()
                    .bucket(appstate.bucket())
                    .key(&object_key)
                    .send()
                    .await
                {
                    error!("Failed to delete media object {}: {}", object_key, e);
                }

                Ok(HttpResponse::Ok().json(AdminResponse {
                    removed: Some(1),
                    ..Default::default()
                }))
            }
            Err(error) => Ok(HttpResponse::BadRequest().json(AdminResponse {
                error: Some(format!("Failed to delete media: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}

pub async fn create_amenities(
    appstate: Data<Arc<AppState>>,
    amenities: Json<Vec<Amenity>>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.catalog_entity() {
        match entity.create_amenities(&amenities.into_inner()).await {
            Ok(ids) => Ok(HttpResponse::Ok().json(AdminResponse {
                ids: Some(ids),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::InternalServerError().json(AdminResponse {
                error: Some(format!("Failed to create amenities: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}

pub async fn delete_amenity(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    let (amenity_id,) = path.into_inner();

    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.catalog_entity() {
        match entity.delete_amenity(amenity_id).await {
            Ok(_) => Ok(HttpResponse::Ok().json(AdminResponse {
                removed: Some(1),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(AdminResponse {
                error: Some(format!("Failed to delete amenity: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}

pub async fn set_property_amenities(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    amenity_ids: Json<Vec<i32>>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    let (property_id,) = path.into_inner();

    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.catalog_entity() {
        match entity
            .set_property_amenities(property_id, &amenity_ids.into_inner())
            .await
        {
            Ok(_) => Ok(HttpResponse::Ok().json(AdminResponse {
                ids: Some(vec![property_id]),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(AdminResponse {
                error: Some(format!("Failed to set amenities: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}

pub async fn upsert_cms_sections(
    appstate: Data<Arc<AppState>>,
    sections: Json<Vec<Section>>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.cms_entity() {
        match entity.upsert_sections(&sections.into_inner()).await {
            Ok(ids) => Ok(HttpResponse::Ok().json(AdminResponse {
                ids: Some(ids),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(AdminResponse {
                error: Some(format!("Failed to upsert sections: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}

pub async fn delete_cms_section(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    let (section_id,) = path.into_inner();

    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(unauthorized());
    }

    if let Some(entity) = appstate.cms_entity() {
        match entity.delete_section(section_id).await {
            Ok(_) => Ok(HttpResponse::Ok().json(AdminResponse {
                removed: Some(1),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(AdminResponse {
                error: Some(format!("Failed to delete section: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(not_implemented())
    }
}
