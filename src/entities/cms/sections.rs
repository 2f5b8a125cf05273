use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "cms_sections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub page: String,
    pub slot: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub object_key: Option<String>,
    pub position: i32,
    pub publish: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
