pub(crate) mod amenities;
pub(crate) mod listing_types;
pub(crate) mod locations;
pub(crate) mod media;
pub(crate) mod properties;
pub(crate) mod property_amenities;
pub(crate) mod units;

pub mod search;

use amenities::Entity as Amenities;
use listing_types::Entity as ListingTypes;
use locations::Entity as Locations;
use media::Entity as PropertyMedia;
use properties::Entity as Properties;
use property_amenities::Entity as PropertyAmenities;
use units::Entity as Units;

use std::collections::{HashMap, HashSet};
use std::convert::TryFrom;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::Expr;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RuntimeErr, Set, TransactionTrait,
};

#[repr(i32)]
pub enum PropertyStatus {
    Draft,
    Published,
    Archived,
}

impl TryFrom<i32> for PropertyStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PropertyStatus::Draft),
            1 => Ok(PropertyStatus::Published),
            2 => Ok(PropertyStatus::Archived),
            _ => Err(format!("Invalid state({}) for property", value)),
        }
    }
}

impl TryFrom<String> for PropertyStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Draft" => Ok(PropertyStatus::Draft),
            "Published" => Ok(PropertyStatus::Published),
            "Archived" => Ok(PropertyStatus::Archived),
            _ => Err(format!("Invalid state({}) for property", value)),
        }
    }
}

impl Display for PropertyStatus {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            PropertyStatus::Draft => write!(f, "Draft"),
            PropertyStatus::Published => write!(f, "Published"),
            PropertyStatus::Archived => write!(f, "Archived"),
        }
    }
}

#[repr(i32)]
pub enum UnitStatus {
    Available,
    Reserved,
    Sold,
}

impl TryFrom<i32> for UnitStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(UnitStatus::Available),
            1 => Ok(UnitStatus::Reserved),
            2 => Ok(UnitStatus::Sold),
            _ => Err(format!("Invalid state({}) for unit", value)),
        }
    }
}

impl TryFrom<String> for UnitStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Available" => Ok(UnitStatus::Available),
            "Reserved" => Ok(UnitStatus::Reserved),
            "Sold" => Ok(UnitStatus::Sold),
            _ => Err(format!("Invalid state({}) for unit", value)),
        }
    }
}

impl Display for UnitStatus {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            UnitStatus::Available => write!(f, "Available"),
            UnitStatus::Reserved => write!(f, "Reserved"),
            UnitStatus::Sold => write!(f, "Sold"),
        }
    }
}

#[repr(i32)]
pub enum MediaKind {
    Image,
    Video,
    Floorplan,
}

impl TryFrom<i32> for MediaKind {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MediaKind::Image),
            1 => Ok(MediaKind::Video),
            2 => Ok(MediaKind::Floorplan),
            _ => Err(format!("Invalid kind({}) for media", value)),
        }
    }
}

impl TryFrom<String> for MediaKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Image" => Ok(MediaKind::Image),
            "Video" => Ok(MediaKind::Video),
            "Floorplan" => Ok(MediaKind::Floorplan),
            _ => Err(format!("Invalid kind({}) for media", value)),
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            MediaKind::Image => write!(f, "Image"),
            MediaKind::Video => write!(f, "Video"),
            MediaKind::Floorplan => write!(f, "Floorplan"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct ListingType {
    pub id: i32,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    pub city: String,
    pub address: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Media {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,

    pub kind: String,
    pub object_key: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Unit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    pub name: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqm: f64,
    pub price: f64,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Amenity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    pub name: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Property {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_type_id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<Media>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<Vec<Unit>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<Amenity>>,

    pub title: String,
}

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct PropertyFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenity_id: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

pub struct Catalog {
    db: Arc<DatabaseConnection>,
}

impl Catalog {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    pub async fn resolve_listing_type(&self, name: &str) -> Result<i32, DbErr> {
        match ListingTypes::find()
            .filter(listing_types::Column::Name.eq(name))
            .select_only()
            .column(listing_types::Column::Id)
            .into_tuple::<i32>()
            .one(self.db())
            .await?
        {
            Some(id) => Ok(id),
            None => Err(DbErr::Query(RuntimeErr::Internal(format!(
                "Not found listing type {}",
                name,
            )))),
        }
    }

    pub async fn list_listing_types(&self) -> Result<Vec<ListingType>, DbErr> {
        Ok(ListingTypes::find()
            .order_by_asc(listing_types::Column::Id)
            .all(self.db())
            .await?
            .iter()
            .map(|it| ListingType {
                id: it.id,
                name: it.name.clone(),
            })
            .collect::<Vec<_>>())
    }

    pub async fn list_amenities(&self) -> Result<Vec<Amenity>, DbErr> {
        Ok(Amenities::find()
            .order_by_asc(amenities::Column::Id)
            .all(self.db())
            .await?
            .iter()
            .map(|it| Amenity {
                id: Some(it.id),
                icon: it.icon.clone(),
                name: it.name.clone(),
            })
            .collect::<Vec<_>>())
    }

    pub async fn list_paginated_properties(
        &self,
        filter: &PropertyFilter,
        after: i32,
        limit: u64,
    ) -> Result<Vec<Property>, DbErr> {
        let mut condition = Condition::all()
            .add(properties::Column::Status.eq(PropertyStatus::Published as i32))
            .add(properties::Column::Id.gt(after));

        if let Some(name) = &filter.listing_type {
            let listing_type_id = self.resolve_listing_type(name).await?;
            condition = condition.add(properties::Column::ListingTypeId.eq(listing_type_id));
        }

        if let Some(featured) = filter.featured {
            condition = condition.add(properties::Column::Featured.eq(featured as i32));
        }

        if let Some(city) = &filter.city {
            condition = condition.add(
                properties::Column::LocationId.in_subquery(
                    SeaQuery::select()
                        .column(locations::Column::Id)
                        .from(Locations)
                        .and_where(
                            Expr::col((Locations, locations::Column::City)).eq(city.clone()),
                        )
                        .to_owned(),
                ),
            );
        }

        if let Some(bedrooms) = filter.bedrooms {
            condition = condition.add(
                properties::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(units::Column::PropertyId)
                        .from(Units)
                        .and_where(Expr::col((Units, units::Column::Bedrooms)).gte(bedrooms))
                        .to_owned(),
                ),
            );
        }

        if filter.min_price.is_some() || filter.max_price.is_some() {
            let mut in_window = SeaQuery::select();

            in_window.column(units::Column::PropertyId).from(Units);

            if let Some(min_price) = filter.min_price {
                in_window.and_where(Expr::col((Units, units::Column::Price)).gte(min_price));
            }

            if let Some(max_price) = filter.max_price {
                in_window.and_where(Expr::col((Units, units::Column::Price)).lte(max_price));
            }

            condition = condition.add(properties::Column::Id.in_subquery(in_window.to_owned()));
        }

        if let Some(amenity_id) = filter.amenity_id {
            condition = condition.add(
                properties::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(property_amenities::Column::PropertyId)
                        .from(PropertyAmenities)
                        .and_where(
                            Expr::col((PropertyAmenities, property_amenities::Column::AmenityId))
                                .eq(amenity_id),
                        )
                        .to_owned(),
                ),
            );
        }

        let rows = Properties::find()
            .filter(condition)
            .order_by_asc(properties::Column::Id)
            .limit(limit)
            .all(self.db())
            .await?;

        self.hydrate_summaries(rows).await
    }

    pub async fn search_properties(
        &self,
        keyword: &str,
        after: i32,
        limit: u64,
    ) -> Result<Vec<Property>, DbErr> {
        let by_title = Properties::find()
            .filter(properties::Column::Status.eq(PropertyStatus::Published as i32))
            .filter(properties::Column::Title.contains(keyword))
            .filter(properties::Column::Id.gt(after))
            .order_by_asc(properties::Column::Id)
            .limit(limit)
            .all(self.db())
            .await?;

        let location_ids = Locations::find()
            .filter(
                Condition::any()
                    .add(locations::Column::City.contains(keyword))
                    .add(locations::Column::District.contains(keyword))
                    .add(locations::Column::Address.contains(keyword)),
            )
            .select_only()
            .column(locations::Column::Id)
            .into_tuple::<i32>()
            .all(self.db())
            .await?;

        let by_location = if location_ids.is_empty() {
            Vec::new()
        } else {
            Properties::find()
                .filter(properties::Column::Status.eq(PropertyStatus::Published as i32))
                .filter(properties::Column::LocationId.is_in(location_ids))
                .filter(properties::Column::Id.gt(after))
                .order_by_asc(properties::Column::Id)
                .limit(limit)
                .all(self.db())
                .await?
        };

        let merged = search::merge_search_hits(by_title, by_location, limit as usize, |row| row.id);

        self.hydrate_summaries(merged).await
    }

    pub async fn get_property(&self, property_id: i32) -> Result<Property, DbErr> {
        let row = Properties::find()
            .filter(properties::Column::Id.eq(property_id))
            .one(self.db())
            .await?
            .ok_or_else(|| {
                DbErr::Query(RuntimeErr::Internal(format!(
                    "Property with id {}, not exist",
                    property_id
                )))
            })?;

        let listing_type = ListingTypes::find()
            .filter(listing_types::Column::Id.eq(row.listing_type_id))
            .one(self.db())
            .await?
            .map(|it| it.name);

        let location = match row.location_id {
            Some(location_id) => Locations::find()
                .filter(locations::Column::Id.eq(location_id))
                .one(self.db())
                .await?
                .map(|it| Location {
                    id: Some(it.id),
                    district: it.district.clone(),
                    latitude: it.latitude,
                    longitude: it.longitude,
                    city: it.city.clone(),
                    address: it.address.clone(),
                }),
            None => None,
        };

        let media = PropertyMedia::find()
            .filter(media::Column::PropertyId.eq(property_id))
            .order_by_asc(media::Column::Position)
            .all(self.db())
            .await?
            .iter()
            .map(|it| {
                Ok(Media {
                    id: Some(it.id),
                    property_id: Some(it.property_id),
                    position: Some(it.position),
                    kind: MediaKind::try_from(it.kind)
                        .map_err(|error| {
                            DbErr::Query(RuntimeErr::Internal(format!(
                                "Media with id {} face issue: {}",
                                it.id, error,
                            )))
                        })?
                        .to_string(),
                    object_key: it.object_key.clone(),
                })
            })
            .collect::<Result<Vec<_>, DbErr>>()?;

        let units = Units::find()
            .filter(units::Column::PropertyId.eq(property_id))
            .order_by_asc(units::Column::Id)
            .all(self.db())
            .await?
            .iter()
            .map(|it| {
                Ok(Unit {
                    id: Some(it.id),
                    status: Some(
                        UnitStatus::try_from(it.status)
                            .map_err(|error| {
                                DbErr::Query(RuntimeErr::Internal(format!(
                                    "Unit with id {} face issue: {}",
                                    it.id, error,
                                )))
                            })?
                            .to_string(),
                    ),
                    name: it.name.clone(),
                    bedrooms: it.bedrooms,
                    bathrooms: it.bathrooms,
                    area_sqm: it.area_sqm,
                    price: it.price,
                })
            })
            .collect::<Result<Vec<_>, DbErr>>()?;

        let amenities_of_property = Amenities::find()
            .join_rev(
                JoinType::InnerJoin,
                property_amenities::Entity::belongs_to(Amenities)
                    .from(property_amenities::Column::AmenityId)
                    .to(amenities::Column::Id)
                    .into(),
            )
            .filter(property_amenities::Column::PropertyId.eq(property_id))
            .all(self.db())
            .await?
            .iter()
            .map(|it| Amenity {
                id: Some(it.id),
                icon: it.icon.clone(),
                name: it.name.clone(),
            })
            .collect::<Vec<_>>();

        let price_rows = units
            .iter()
            .map(|unit| (property_id, unit.price))
            .collect::<Vec<_>>();
        let price_range = search::fold_unit_prices(&price_rows).remove(&property_id);

        Ok(Property {
            id: Some(row.id),
            listing_type_id: Some(row.listing_type_id),
            listing_type,
            location_id: row.location_id,
            location,
            description: row.description.clone(),
            status: Some(
                PropertyStatus::try_from(row.status)
                    .map_err(|error| {
                        DbErr::Query(RuntimeErr::Internal(format!(
                            "Property with id {} face issue: {}",
                            row.id, error,
                        )))
                    })?
                    .to_string(),
            ),
            featured: Some(row.featured != 0),
            cover: media
                .iter()
                .find(|it| it.kind == MediaKind::Image.to_string())
                .map(|it| it.object_key.clone()),
            price_range,
            media: Some(media),
            units: Some(units),
            amenities: Some(amenities_of_property),
            title: row.title,
        })
    }

    pub async fn price_range(
        &self,
        listing_type_id: Option<i32>,
    ) -> Result<Option<PriceRange>, DbErr> {
        let mut query = Units::find()
            .select_only()
            .expr_as(Expr::col((Units, units::Column::Price)).min(), "min_price")
            .expr_as(Expr::col((Units, units::Column::Price)).max(), "max_price")
            .join_rev(
                JoinType::InnerJoin,
                properties::Entity::belongs_to(Units)
                    .from(properties::Column::Id)
                    .to(units::Column::PropertyId)
                    .into(),
            )
            .filter(properties::Column::Status.eq(PropertyStatus::Published as i32));

        if let Some(listing_type_id) = listing_type_id {
            query = query.filter(properties::Column::ListingTypeId.eq(listing_type_id));
        }

        let bounds = query
            .into_tuple::<(Option<f64>, Option<f64>)>()
            .one(self.db())
            .await?;

        Ok(match bounds {
            Some((Some(min), Some(max))) => Some(PriceRange { min, max }),
            _ => None,
        })
    }

    async fn hydrate_summaries(
        &self,
        rows: Vec<properties::Model>,
    ) -> Result<Vec<Property>, DbErr> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let property_ids = rows.iter().map(|row| row.id).collect::<Vec<_>>();

        let type_names = ListingTypes::find()
            .all(self.db())
            .await?
            .into_iter()
            .map(|it| (it.id, it.name))
            .collect::<HashMap<_, _>>();

        let location_ids = rows
            .iter()
            .filter_map(|row| row.location_id)
            .collect::<HashSet<_>>();
        let locations_by_id = if location_ids.is_empty() {
            HashMap::new()
        } else {
            Locations::find()
                .filter(locations::Column::Id.is_in(location_ids))
                .all(self.db())
                .await?
                .into_iter()
                .map(|it| {
                    (
                        it.id,
                        Location {
                            id: Some(it.id),
                            district: it.district.clone(),
                            latitude: it.latitude,
                            longitude: it.longitude,
                            city: it.city.clone(),
                            address: it.address.clone(),
                        },
                    )
                })
                .collect::<HashMap<_, _>>()
        };

        let price_rows = Units::find()
            .select_only()
            .column(units::Column::PropertyId)
            .column(units::Column::Price)
            .filter(units::Column::PropertyId.is_in(property_ids.clone()))
            .into_tuple::<(i32, f64)>()
            .all(self.db())
            .await?;
        let prices = search::fold_unit_prices(&price_rows);

        let mut covers = HashMap::new();
        for it in PropertyMedia::find()
            .filter(media::Column::PropertyId.is_in(property_ids))
            .filter(media::Column::Kind.eq(MediaKind::Image as i32))
            .order_by_asc(media::Column::PropertyId)
            .order_by_asc(media::Column::Position)
            .all(self.db())
            .await?
        {
            covers.entry(it.property_id).or_insert(it.object_key);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                Ok(Property {
                    id: Some(row.id),
                    listing_type: type_names.get(&row.listing_type_id).cloned(),
                    listing_type_id: Some(row.listing_type_id),
                    location: row
                        .location_id
                        .and_then(|id| locations_by_id.get(&id).cloned()),
                    location_id: row.location_id,
                    description: None,
                    status: Some(
                        PropertyStatus::try_from(row.status)
                            .map_err(|error| {
                                DbErr::Query(RuntimeErr::Internal(format!(
                                    "Property with id {} face issue: {}",
                                    row.id, error,
                                )))
                            })?
                            .to_string(),
                    ),
                    featured: Some(row.featured != 0),
                    cover: covers.get(&row.id).cloned(),
                    price_range: prices.get(&row.id).cloned(),
                    media: None,
                    units: None,
                    amenities: None,
                    title: row.title,
                })
            })
            .collect::<Result<Vec<_>, DbErr>>()?)
    }

    pub async fn create_locations(&self, locations_in: &[Location]) -> Result<Vec<i32>, DbErr> {
        if locations_in.is_empty() {
            return Ok(vec![]);
        }

        Locations::insert_many(
            locations_in
                .iter()
                .map(|it| locations::ActiveModel {
                    city: Set(it.city.clone()),
                    district: Set(it.district.clone()),
                    address: Set(it.address.clone()),
                    latitude: Set(it.latitude),
                    longitude: Set(it.longitude),
                    created_at: Set(Utc::now()),
                    updated_at: Set(Utc::now()),
                    ..Default::default()
                })
                .collect::<Vec<_>>(),
        )
        .exec(self.db())
        .await?;

        Ok(Locations::find()
            .select_only()
            .column(locations::Column::Id)
            .filter(
                locations::Column::Address.is_in(
                    locations_in
                        .iter()
                        .map(|it| it.address.clone())
                        .collect::<Vec<_>>(),
                ),
            )
            .all(self.db())
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect::<Vec<_>>())
    }

    pub async fn update_location(&self, location_id: i32, location: &Location) -> Result<(), DbErr> {
        Locations::find()
            .filter(locations::Column::Id.eq(location_id))
            .one(self.db())
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("Location with id {}, not exist", location_id))
            })?;

        let mut update_query =
            Locations::update_many().filter(locations::Column::Id.eq(location_id));

        update_query = update_query
            .col_expr(locations::Column::City, Expr::value(location.city.clone()))
            .col_expr(
                locations::Column::Address,
                Expr::value(location.address.clone()),
            );

        if let Some(district) = &location.district {
            update_query = update_query.col_expr(
                locations::Column::District,
                Expr::value(Some(district.clone())),
            );
        }

        if let Some(latitude) = location.latitude {
            update_query =
                update_query.col_expr(locations::Column::Latitude, Expr::value(Some(latitude)));
        }

        if let Some(longitude) = location.longitude {
            update_query =
                update_query.col_expr(locations::Column::Longitude, Expr::value(Some(longitude)));
        }

        update_query
            .col_expr(locations::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(self.db())
            .await?;

        Ok(())
    }

    pub async fn create_properties(&self, props: &[Property]) -> Result<Vec<i32>, DbErr> {
        if props.is_empty() {
            return Ok(vec![]);
        }

        let mut models = Vec::new();

        for p in props {
            let listing_type_id = p.listing_type_id.ok_or_else(|| {
                DbErr::Custom(format!("Property {} is missing a listing type", p.title))
            })?;

            models.push(properties::ActiveModel {
                listing_type_id: Set(listing_type_id),
                location_id: Set(p.location_id),
                title: Set(p.title.clone()),
                description: Set(p.description.clone()),
                status: Set(PropertyStatus::try_from(
                    p.status
                        .clone()
                        .unwrap_or(PropertyStatus::Draft.to_string()),
                )
                .map_err(|error| {
                    DbErr::Custom(format!(
                        "Fail with status of property {}: {}",
                        p.title.clone(),
                        error
                    ))
                })? as i32),
                featured: Set(p.featured.unwrap_or(false) as i32),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
        }

        Properties::insert_many(models).exec(self.db()).await?;

        Ok(Properties::find()
            .select_only()
            .column(properties::Column::Id)
            .filter(
                properties::Column::Title
                    .is_in(props.iter().map(|p| p.title.clone()).collect::<Vec<_>>()),
            )
            .all(self.db())
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect::<Vec<_>>())
    }

    pub async fn update_property(&self, property_id: i32, p: &Property) -> Result<(), DbErr> {
        Properties::find()
            .filter(properties::Column::Id.eq(property_id))
            .one(self.db())
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("Property with id {}, not exist", property_id))
            })?;

        let mut update_query =
            Properties::update_many().filter(properties::Column::Id.eq(property_id));

        if !p.title.is_empty() {
            update_query =
                update_query.col_expr(properties::Column::Title, Expr::value(p.title.clone()));
        }

        if let Some(description) = &p.description {
            update_query = update_query.col_expr(
                properties::Column::Description,
                Expr::value(Some(description.clone())),
            );
        }

        if let Some(status) = &p.status {
            let status = PropertyStatus::try_from(status.clone()).map_err(|error| {
                DbErr::Custom(format!(
                    "Fail with status of property {}: {}",
                    property_id, error
                ))
            })?;

            update_query =
                update_query.col_expr(properties::Column::Status, Expr::value(status as i32));
        }

        if let Some(featured) = p.featured {
            update_query =
                update_query.col_expr(properties::Column::Featured, Expr::value(featured as i32));
        }

        if let Some(location_id) = p.location_id {
            update_query = update_query.col_expr(
                properties::Column::LocationId,
                Expr::value(Some(location_id)),
            );
        }

        if let Some(listing_type_id) = p.listing_type_id {
            update_query = update_query.col_expr(
                properties::Column::ListingTypeId,
                Expr::value(listing_type_id),
            );
        }

        update_query
            .col_expr(properties::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(self.db())
            .await?;

        Ok(())
    }

    // @NOTE: bucket objects of the removed media are returned so the
    //        caller can clean the storage side
    pub async fn delete_property(&self, property_id: i32) -> Result<Vec<String>, DbErr> {
        let txn = self.db().begin().await?;

        let object_keys = PropertyMedia::find()
            .select_only()
            .column(media::Column::ObjectKey)
            .filter(media::Column::PropertyId.eq(property_id))
            .into_tuple::<String>()
            .all(&txn)
            .await?;

        PropertyMedia::delete_many()
            .filter(media::Column::PropertyId.eq(property_id))
            .exec(&txn)
            .await?;

        Units::delete_many()
            .filter(units::Column::PropertyId.eq(property_id))
            .exec(&txn)
            .await?;

        PropertyAmenities::delete_many()
            .filter(property_amenities::Column::PropertyId.eq(property_id))
            .exec(&txn)
            .await?;

        let result = Properties::delete_many()
            .filter(properties::Column::Id.eq(property_id))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(DbErr::RecordNotFound(format!(
                "Property with id {}, not exist",
                property_id
            )));
        }

        txn.commit().await?;
        Ok(object_keys)
    }

    pub async fn create_units(&self, property_id: i32, units_in: &[Unit]) -> Result<Vec<i32>, DbErr> {
        if units_in.is_empty() {
            return Ok(vec![]);
        }

        let txn = self.db().begin().await?;

        Properties::find()
            .filter(properties::Column::Id.eq(property_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("Property with id {}, not exist", property_id))
            })?;

        let mut models = Vec::new();

        for u in units_in {
            models.push(units::ActiveModel {
                property_id: Set(property_id),
                name: Set(u.name.clone()),
                bedrooms: Set(u.bedrooms),
                bathrooms: Set(u.bathrooms),
                area_sqm: Set(u.area_sqm),
                price: Set(u.price),
                status: Set(UnitStatus::try_from(
                    u.status.clone().unwrap_or(UnitStatus::Available.to_string()),
                )
                .map_err(|error| {
                    DbErr::Custom(format!("Fail with status of unit {}: {}", u.name, error))
                })? as i32),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
        }

        Units::insert_many(models).exec(&txn).await?;
        txn.commit().await?;

        Ok(Units::find()
            .select_only()
            .column(units::Column::Id)
            .filter(units::Column::PropertyId.eq(property_id))
            .filter(
                units::Column::Name
                    .is_in(units_in.iter().map(|u| u.name.clone()).collect::<Vec<_>>()),
            )
            .all(self.db())
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect::<Vec<_>>())
    }

    pub async fn update_unit(&self, unit_id: i32, unit: &Unit) -> Result<(), DbErr> {
        Units::find()
            .filter(units::Column::Id.eq(unit_id))
            .one(self.db())
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Unit with id {}, not exist", unit_id)))?;

        let mut update_query = Units::update_many().filter(units::Column::Id.eq(unit_id));

        if !unit.name.is_empty() {
            update_query = update_query.col_expr(units::Column::Name, Expr::value(unit.name.clone()));
        }

        if let Some(status) = &unit.status {
            let status = UnitStatus::try_from(status.clone()).map_err(|error| {
                DbErr::Custom(format!("Fail with status of unit {}: {}", unit_id, error))
            })?;

            update_query = update_query.col_expr(units::Column::Status, Expr::value(status as i32));
        }

        update_query
            .col_expr(units::Column::Bedrooms, Expr::value(unit.bedrooms))
            .col_expr(units::Column::Bathrooms, Expr::value(unit.bathrooms))
            .col_expr(units::Column::AreaSqm, Expr::value(unit.area_sqm))
            .col_expr(units::Column::Price, Expr::value(unit.price))
            .col_expr(units::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(self.db())
            .await?;

        Ok(())
    }

    pub async fn delete_unit(&self, unit_id: i32) -> Result<(), DbErr> {
        let result = Units::delete_many()
            .filter(units::Column::Id.eq(unit_id))
            .exec(self.db())
            .await?;

        if result.rows_affected == 0 {
            Err(DbErr::RecordNotFound(format!(
                "Unit with id {}, not exist",
                unit_id
            )))
        } else {
            Ok(())
        }
    }

    pub async fn create_media(
        &self,
        property_id: i32,
        media_in: &[Media],
    ) -> Result<Vec<i32>, DbErr> {
        if media_in.is_empty() {
            return Ok(vec![]);
        }

        let txn = self.db().begin().await?;

        Properties::find()
            .filter(properties::Column::Id.eq(property_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("Property with id {}, not exist", property_id))
            })?;

        let mut models = Vec::new();

        for m in media_in {
            models.push(media::ActiveModel {
                property_id: Set(property_id),
                kind: Set(MediaKind::try_from(m.kind.clone()).map_err(|error| {
                    DbErr::Custom(format!(
                        "Fail with kind of media {}: {}",
                        m.object_key.clone(),
                        error
                    ))
                })? as i32),
                object_key: Set(m.object_key.clone()),
                position: Set(m.position.unwrap_or(0)),
                created_at: Set(Utc::now()),
                ..Default::default()
            })
        }

        PropertyMedia::insert_many(models).exec(&txn).await?;
        txn.commit().await?;

        Ok(PropertyMedia::find()
            .select_only()
            .column(media::Column::Id)
            .filter(media::Column::PropertyId.eq(property_id))
            .filter(
                media::Column::ObjectKey.is_in(
                    media_in
                        .iter()
                        .map(|m| m.object_key.clone())
                        .collect::<Vec<_>>(),
                ),
            )
            .all(self.db())
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect::<Vec<_>>())
    }

    pub async fn delete_media(&self, media_id: i32) -> Result<String, DbErr> {
        let row = PropertyMedia::find()
            .filter(media::Column::Id.eq(media_id))
            .one(self.db())
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("Media with id {}, not exist", media_id))
            })?;

        PropertyMedia::delete_many()
            .filter(media::Column::Id.eq(media_id))
            .exec(self.db())
            .await?;

        Ok(row.object_key)
    }

    pub async fn create_amenities(&self, amenities_in: &[Amenity]) -> Result<Vec<i32>, DbErr> {
        if amenities_in.is_empty() {
            return Ok(vec![]);
        }

        Amenities::insert_many(
            amenities_in
                .iter()
                .map(|it| amenities::ActiveModel {
                    name: Set(it.name.clone()),
                    icon: Set(it.icon.clone()),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                })
                .collect::<Vec<_>>(),
        )
        .exec(self.db())
        .await?;

        Ok(Amenities::find()
            .select_only()
            .column(amenities::Column::Id)
            .filter(
                amenities::Column::Name.is_in(
                    amenities_in
                        .iter()
                        .map(|it| it.name.clone())
                        .collect::<Vec<_>>(),
                ),
            )
            .all(self.db())
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect::<Vec<_>>())
    }

    pub async fn delete_amenity(&self, amenity_id: i32) -> Result<(), DbErr> {
        let txn = self.db().begin().await?;

        PropertyAmenities::delete_many()
            .filter(property_amenities::Column::AmenityId.eq(amenity_id))
            .exec(&txn)
            .await?;

        let result = Amenities::delete_many()
            .filter(amenities::Column::Id.eq(amenity_id))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(DbErr::RecordNotFound(format!(
                "Amenity with id {}, not exist",
                amenity_id
            )));
        }

        txn.commit().await?;
        Ok(())
    }

    pub async fn set_property_amenities(
        &self,
        property_id: i32,
        amenity_ids: &[i32],
    ) -> Result<(), DbErr> {
        let txn = self.db().begin().await?;

        Properties::find()
            .filter(properties::Column::Id.eq(property_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("Property with id {}, not exist", property_id))
            })?;

        let requested = amenity_ids.iter().copied().collect::<HashSet<_>>();
        let valid = Amenities::find()
            .filter(amenities::Column::Id.is_in(requested.clone()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|it| it.id)
            .collect::<HashSet<i32>>();

        if valid.len() != requested.len() {
            let invalid = requested.difference(&valid).copied().collect::<Vec<_>>();
            return Err(DbErr::Custom(format!("Invalid amenity IDs: {:?}", invalid)));
        }

        PropertyAmenities::delete_many()
            .filter(property_amenities::Column::PropertyId.eq(property_id))
            .exec(&txn)
            .await?;

        if !amenity_ids.is_empty() {
            PropertyAmenities::insert_many(
                amenity_ids
                    .iter()
                    .map(|&amenity_id| property_amenities::ActiveModel {
                        property_id: Set(property_id),
                        amenity_id: Set(amenity_id),
                        ..Default::default()
                    })
                    .collect::<Vec<_>>(),
            )
            .exec(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(())
    }
}
