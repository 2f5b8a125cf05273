use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::web::{Data, Path, Query};
use actix_web::{HttpResponse, Result};

use aws_sdk_s3::primitives::ByteStream;

use serde::{Deserialize, Serialize};

use super::VisitorHeaders;
use crate::api::{next_after, AppState};
use crate::entities::catalog::{
    Amenity, ListingType, PriceRange, Property, PropertyFilter, PropertyStatus,
};
use crate::entities::cms::Section;

struct Stream(ByteStream);

impl futures::Stream for Stream {
    type Item = Result<actix_web::web::Bytes, actix_web::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match futures_util::ready!(Pin::new(&mut self.0).poll_next(cx)) {
            Some(Ok(bytes)) => Poll::Ready(Some(Ok(actix_web::web::Bytes::from(bytes)))),
            Some(Err(e)) => Poll::Ready(Some(Err(actix_web::error::ErrorInternalServerError(
                format!("ByteStream error: {}", e),
            )))),
            None => Poll::Ready(None),
        }
    }
}

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct SearchQueryInput {
    #[serde(default)]
    q: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    after: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
}

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct PriceRangeInput {
    #[serde(default)]
    listing_type: Option<String>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct ListPropertiesResponse {
    data: Vec<Property>,

    #[serde(skip_serializing_if = "Option::is_none")]
    next_after: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct CatalogResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<ListPropertiesResponse>,

    #[serde(skip_serializing_if = "Option::is_none")]
    property: Option<Property>,

    #[serde(skip_serializing_if = "Option::is_none")]
    listing_types: Option<Vec<ListingType>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    amenities: Option<Vec<Amenity>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    price_range: Option<PriceRange>,

    #[serde(skip_serializing_if = "Option::is_none")]
    sections: Option<Vec<Section>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    compare: Option<Vec<i32>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Default for CatalogResponse {
    fn default() -> Self {
        Self {
            properties: None,
            property: None,
            listing_types: None,
            amenities: None,
            price_range: None,
            sections: None,
            compare: None,
            error: None,
        }
    }
}

pub async fn list_listing_types(appstate: Data<Arc<AppState>>) -> Result<HttpResponse> {
    if let Some(entity) = appstate.catalog_entity() {
        match entity.list_listing_types().await {
            Ok(data) => Ok(HttpResponse::Ok().json(CatalogResponse {
                listing_types: Some(data),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::InternalServerError().json(CatalogResponse {
                error: Some(format!("Failed to get list of listing types: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(CatalogResponse {
            error: Some(format!("Not implemented")),
            ..Default::default()
        }))
    }
}

pub async fn list_amenities(appstate: Data<Arc<AppState>>) -> Result<HttpResponse> {
    if let Some(entity) = appstate.catalog_entity() {
        match entity.list_amenities().await {
            Ok(data) => Ok(HttpResponse::Ok().json(CatalogResponse {
                amenities: Some(data),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::InternalServerError().json(CatalogResponse {
                error: Some(format!("Failed to get list of amenities: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(CatalogResponse {
            error: Some(format!("Not implemented")),
            ..Default::default()
        }))
    }
}

pub async fn list_properties(
    appstate: Data<Arc<AppState>>,
    query: Query<PropertyFilter>,
) -> Result<HttpResponse> {
    if let Some(entity) = appstate.catalog_entity() {
        let filter = query.into_inner();
        let after = filter.after.unwrap_or(0);
        let limit = filter.limit.unwrap_or(10);

        if limit > 100 {
            Ok(HttpResponse::BadRequest().json(CatalogResponse {
                error: Some(format!(
                    "Maximum item per page does not exceed 100, currently is {}",
                    limit
                )),
                ..Default::default()
            }))
        } else {
            match entity.list_paginated_properties(&filter, after, limit).await {
                Ok(data) => {
                    let next_after = next_after(&data, limit, |it| it.id);

                    Ok(HttpResponse::Ok().json(CatalogResponse {
                        properties: Some(ListPropertiesResponse { data, next_after }),
                        ..Default::default()
                    }))
                }
                Err(error) => Ok(HttpResponse::InternalServerError().json(CatalogResponse {
                    error: Some(format!("Failed to get list of properties: {}", error)),
                    ..Default::default()
                })),
            }
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(CatalogResponse {
            error: Some(format!("Not implemented")),
            ..Default::default()
        }))
    }
}

pub async fn search_properties(
    appstate: Data<Arc<AppState>>,
    query: Query<SearchQueryInput>,
) -> Result<HttpResponse> {
    if let Some(entity) = appstate.catalog_entity() {
        let keyword = match &query.q {
            Some(keyword) if !keyword.is_empty() => keyword.clone(),
            _ => {
                return Ok(HttpResponse::BadRequest().json(CatalogResponse {
                    error: Some(format!("Missing query parameter `q`")),
                    ..Default::default()
                }))
            }
        };
        let after = query.after.unwrap_or(0);
        let limit = query.limit.unwrap_or(10);

        if limit > 100 {
            Ok(HttpResponse::BadRequest().json(CatalogResponse {
                error: Some(format!(
                    "Maximum item per page does not exceed 100, currently is {}",
                    limit
                )),
                ..Default::default()
            }))
        } else {
            match entity.search_properties(keyword.as_str(), after, limit).await {
                Ok(data) => {
                    let next_after = next_after(&data, limit, |it| it.id);

                    Ok(HttpResponse::Ok().json(CatalogResponse {
                        properties: Some(ListPropertiesResponse { data, next_after }),
                        ..Default::default()
                    }))
                }
                Err(error) => Ok(HttpResponse::InternalServerError().json(CatalogResponse {
                    error: Some(format!("Failed to search properties: {}", error)),
                    ..Default::default()
                })),
            }
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(CatalogResponse {
            error: Some(format!("Not implemented")),
            ..Default::default()
        }))
    }
}

pub async fn get_property(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
) -> Result<HttpResponse> {
    let (property_id,) = path.into_inner();

    if let Some(entity) = appstate.catalog_entity() {
        match entity.get_property(property_id).await {
            Ok(data) => Ok(HttpResponse::Ok().json(CatalogResponse {
                property: Some(data),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::InternalServerError().json(CatalogResponse {
                error: Some(format!("Failed to get property: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(CatalogResponse {
            error: Some(format!("Not implemented")),
            ..Default::default()
        }))
    }
}

pub async fn price_range(
    appstate: Data<Arc<AppState>>,
    query: Query<PriceRangeInput>,
) -> Result<HttpResponse> {
    if let Some(entity) = appstate.catalog_entity() {
        let listing_type_id = match &query.listing_type {
            Some(name) => match entity.resolve_listing_type(name.as_str()).await {
                Ok(id) => Some(id),
                Err(error) => {
                    return Ok(HttpResponse::BadRequest().json(CatalogResponse {
                        error: Some(format!("Failed to resolve listing type: {}", error)),
                        ..Default::default()
                    }))
                }
            },
            None => None,
        };

        match entity.price_range(listing_type_id).await {
            Ok(data) => Ok(HttpResponse::Ok().json(CatalogResponse {
                price_range: data,
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::InternalServerError().json(CatalogResponse {
                error: Some(format!("Failed to compute price range: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(CatalogResponse {
            error: Some(format!("Not implemented")),
            ..Default::default()
        }))
    }
}

pub async fn page_sections(
    appstate: Data<Arc<AppState>>,
    path: Path<String>,
) -> Result<HttpResponse> {
    let page = path.into_inner();

    if let Some(entity) = appstate.cms_entity() {
        match entity.page_sections(page.as_str()).await {
            Ok(data) => Ok(HttpResponse::Ok().json(CatalogResponse {
                sections: Some(data),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::InternalServerError().json(CatalogResponse {
                error: Some(format!("Failed to get sections of page {}: {}", page, error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(CatalogResponse {
            error: Some(format!("Not implemented")),
            ..Default::default()
        }))
    }
}

pub async fn media(appstate: Data<Arc<AppState>>, path: Path<String>) -> Result<HttpResponse> {
    let object_key = path.into_inner();

    let response = match appstate
        .s3
        .get_object()
        .bucket(appstate.bucket())
        .key(&object_key)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            return Ok(HttpResponse::NotFound()
                .body(format!("Failed to fetch media {}: {}", object_key, e)))
        }
    };

    Ok(HttpResponse::Ok().streaming(Stream(response.body)))
}

pub async fn get_compare(
    appstate: Data<Arc<AppState>>,
    headers: VisitorHeaders,
) -> Result<HttpResponse> {
    if let Some(entity) = appstate.compare_entity() {
        match entity.selection(headers.visitor_id.as_str()).await {
            Ok(data) => Ok(HttpResponse::Ok().json(CatalogResponse {
                compare: Some(data),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::InternalServerError().json(CatalogResponse {
                error: Some(format!("Failed to get compare list: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(CatalogResponse {
            error: Some(format!("Not implemented")),
            ..Default::default()
        }))
    }
}

pub async fn add_to_compare(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    headers: VisitorHeaders,
) -> Result<HttpResponse> {
    let (property_id,) = path.into_inner();

    let catalog = match appstate.catalog_entity() {
        Some(entity) => entity,
        None => {
            return Ok(HttpResponse::InternalServerError().json(CatalogResponse {
                error: Some(format!("Not implemented")),
                ..Default::default()
            }))
        }
    };

    let published = PropertyStatus::Published.to_string();

    match catalog.get_property(property_id).await {
        Ok(property) => {
            if property.status.as_deref() != Some(published.as_str()) {
                return Ok(HttpResponse::BadRequest().json(CatalogResponse {
                    error: Some(format!(
                        "Property {} is not open for comparison",
                        property_id
                    )),
                    ..Default::default()
                }));
            }
        }
        Err(error) => {
            return Ok(HttpResponse::BadRequest().json(CatalogResponse {
                error: Some(format!("Failed to get property: {}", error)),
                ..Default::default()
            }))
        }
    }

    if let Some(entity) = appstate.compare_entity() {
        match entity.add(headers.visitor_id.as_str(), property_id).await {
            Ok(data) => Ok(HttpResponse::Ok().json(CatalogResponse {
                compare: Some(data),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(CatalogResponse {
                error: Some(format!("Failed to add to compare list: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(CatalogResponse {
            error: Some(format!("Not implemented")),
            ..Default::default()
        }))
    }
}

pub async fn remove_from_compare(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    headers: VisitorHeaders,
) -> Result<HttpResponse> {
    let (property_id,) = path.into_inner();

    if let Some(entity) = appstate.compare_entity() {
        match entity.remove(headers.visitor_id.as_str(), property_id).await {
            Ok(data) => Ok(HttpResponse::Ok().json(CatalogResponse {
                compare: Some(data),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::InternalServerError().json(CatalogResponse {
                error: Some(format!("Failed to remove from compare list: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(CatalogResponse {
            error: Some(format!("Not implemented")),
            ..Default::default()
        }))
    }
}
