pub(crate) mod sections;

use sections::Entity as Sections;

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

#[derive(Serialize, Deserialize, Clone)]
pub struct Section {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<bool>,

    pub page: String,
    pub slot: String,
    pub position: i32,
}

pub struct Cms {
    db: Arc<DatabaseConnection>,
}

impl Cms {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    pub async fn page_sections(&self, page: &str) -> Result<Vec<Section>, DbErr> {
        Ok(Sections::find()
            .filter(sections::Column::Page.eq(page))
            .filter(sections::Column::Publish.eq(1))
            .order_by_asc(sections::Column::Position)
            .all(self.db())
            .await?
            .iter()
            .map(|it| Section {
                id: Some(it.id),
                title: it.title.clone(),
                body: it.body.clone(),
                object_key: it.object_key.clone(),
                publish: Some(it.publish != 0),
                page: it.page.clone(),
                slot: it.slot.clone(),
                position: it.position,
            })
            .collect::<Vec<_>>())
    }

    pub async fn upsert_sections(&self, sections_in: &[Section]) -> Result<Vec<i32>, DbErr> {
        let mut section_ids = Vec::new();
        let txn = self.db().begin().await?;

        for s in sections_in {
            match s.id {
                Some(section_id) => {
                    Sections::find()
                        .filter(sections::Column::Id.eq(section_id))
                        .one(&txn)
                        .await?
                        .ok_or_else(|| {
                            DbErr::RecordNotFound(format!(
                                "Section with id {}, not exist",
                                section_id
                            ))
                        })?;

                    let mut update_query =
                        Sections::update_many().filter(sections::Column::Id.eq(section_id));

                    update_query = update_query
                        .col_expr(sections::Column::Page, Expr::value(s.page.clone()))
                        .col_expr(sections::Column::Slot, Expr::value(s.slot.clone()))
                        .col_expr(sections::Column::Position, Expr::value(s.position));

                    if let Some(title) = &s.title {
                        update_query = update_query
                            .col_expr(sections::Column::Title, Expr::value(Some(title.clone())));
                    }

                    if let Some(body) = &s.body {
                        update_query = update_query
                            .col_expr(sections::Column::Body, Expr::value(Some(body.clone())));
                    }

                    if let Some(object_key) = &s.object_key {
                        update_query = update_query.col_expr(
                            sections::Column::ObjectKey,
                            Expr::value(Some(object_key.clone())),
                        );
                    }

                    if let Some(publish) = s.publish {
                        update_query = update_query
                            .col_expr(sections::Column::Publish, Expr::value(publish as i32));
                    }

                    update_query
                        .col_expr(sections::Column::UpdatedAt, Expr::value(Utc::now()))
                        .exec(&txn)
                        .await?;

                    section_ids.push(section_id);
                }
                None => {
                    let inserted = Sections::insert(sections::ActiveModel {
                        page: Set(s.page.clone()),
                        slot: Set(s.slot.clone()),
                        title: Set(s.title.clone()),
                        body: Set(s.body.clone()),
                        object_key: Set(s.object_key.clone()),
                        position: Set(s.position),
                        publish: Set(s.publish.unwrap_or(false) as i32),
                        created_at: Set(Utc::now()),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    })
                    .exec(&txn)
                    .await?;

                    section_ids.push(inserted.last_insert_id);
                }
            }
        }

        txn.commit().await?;
        Ok(section_ids)
    }

    pub async fn delete_section(&self, section_id: i32) -> Result<(), DbErr> {
        let result = Sections::delete_many()
            .filter(sections::Column::Id.eq(section_id))
            .exec(self.db())
            .await?;

        if result.rows_affected == 0 {
            Err(DbErr::RecordNotFound(format!(
                "Section with id {}, not exist",
                section_id
            )))
        } else {
            Ok(())
        }
    }
}
