pub(crate) mod appointments;

use appointments::Entity as Appointments;

use std::convert::TryFrom;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, RuntimeErr, Set, TransactionTrait,
};

use super::catalog::{properties, PropertyStatus};

#[repr(i32)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Expired,
}

impl AppointmentStatus {
    pub fn can_move_to(&self, next: &AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (AppointmentStatus::Pending, AppointmentStatus::Confirmed)
                | (AppointmentStatus::Pending, AppointmentStatus::Cancelled)
                | (AppointmentStatus::Confirmed, AppointmentStatus::Completed)
                | (AppointmentStatus::Confirmed, AppointmentStatus::Cancelled)
        )
    }
}

impl TryFrom<i32> for AppointmentStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AppointmentStatus::Pending),
            1 => Ok(AppointmentStatus::Confirmed),
            2 => Ok(AppointmentStatus::Completed),
            3 => Ok(AppointmentStatus::Cancelled),
            4 => Ok(AppointmentStatus::Expired),
            _ => Err(format!("Invalid state({}) for appointment", value)),
        }
    }
}

impl TryFrom<String> for AppointmentStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Pending" => Ok(AppointmentStatus::Pending),
            "Confirmed" => Ok(AppointmentStatus::Confirmed),
            "Completed" => Ok(AppointmentStatus::Completed),
            "Cancelled" => Ok(AppointmentStatus::Cancelled),
            "Expired" => Ok(AppointmentStatus::Expired),
            _ => Err(format!("Invalid state({}) for appointment", value)),
        }
    }
}

impl Display for AppointmentStatus {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            AppointmentStatus::Pending => write!(f, "Pending"),
            AppointmentStatus::Confirmed => write!(f, "Confirmed"),
            AppointmentStatus::Completed => write!(f, "Completed"),
            AppointmentStatus::Cancelled => write!(f, "Cancelled"),
            AppointmentStatus::Expired => write!(f, "Expired"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Appointment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    pub property_id: i32,
    pub customer_name: String,
    pub phone: String,
    pub scheduled_at: DateTime<Utc>,
}

pub struct Booking {
    db: Arc<DatabaseConnection>,
}

impl Booking {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    pub async fn create(&self, appointment: &Appointment) -> Result<i32, DbErr> {
        let txn = self.db().begin().await?;

        let open_for_viewing = properties::Entity::find()
            .filter(properties::Column::Id.eq(appointment.property_id))
            .filter(properties::Column::Status.eq(PropertyStatus::Published as i32))
            .one(&txn)
            .await?;

        if open_for_viewing.is_none() {
            return Err(DbErr::Custom(format!(
                "Property {} is not open for viewing",
                appointment.property_id
            )));
        }

        let inserted = Appointments::insert(appointments::ActiveModel {
            property_id: Set(appointment.property_id),
            customer_name: Set(appointment.customer_name.clone()),
            phone: Set(appointment.phone.clone()),
            email: Set(appointment.email.clone()),
            scheduled_at: Set(appointment.scheduled_at),
            note: Set(appointment.note.clone()),
            status: Set(AppointmentStatus::Pending as i32),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        })
        .exec(&txn)
        .await?;

        txn.commit().await?;
        Ok(inserted.last_insert_id)
    }

    pub async fn list_paginated(
        &self,
        status: Option<&String>,
        property_id: Option<i32>,
        after: i32,
        limit: u64,
    ) -> Result<Vec<Appointment>, DbErr> {
        let mut condition = Condition::all().add(appointments::Column::Id.gt(after));

        if let Some(status) = status {
            let status = AppointmentStatus::try_from(status.clone()).map_err(DbErr::Custom)?;
            condition = condition.add(appointments::Column::Status.eq(status as i32));
        }

        if let Some(property_id) = property_id {
            condition = condition.add(appointments::Column::PropertyId.eq(property_id));
        }

        Appointments::find()
            .filter(condition)
            .order_by_asc(appointments::Column::Id)
            .limit(limit)
            .all(self.db())
            .await?
            .iter()
            .map(|it| {
                Ok(Appointment {
                    id: Some(it.id),
                    email: it.email.clone(),
                    note: it.note.clone(),
                    status: Some(
                        AppointmentStatus::try_from(it.status)
                            .map_err(|error| {
                                DbErr::Query(RuntimeErr::Internal(format!(
                                    "Appointment with id {} face issue: {}",
                                    it.id, error,
                                )))
                            })?
                            .to_string(),
                    ),
                    created_at: Some(it.created_at),
                    property_id: it.property_id,
                    customer_name: it.customer_name.clone(),
                    phone: it.phone.clone(),
                    scheduled_at: it.scheduled_at,
                })
            })
            .collect::<Result<Vec<_>, DbErr>>()
    }

    pub async fn update_status(
        &self,
        appointment_id: i32,
        next: &str,
    ) -> Result<Appointment, DbErr> {
        let next = AppointmentStatus::try_from(next.to_string()).map_err(DbErr::Custom)?;
        let next_label = next.to_string();

        let txn = self.db().begin().await?;

        let row = Appointments::find()
            .filter(appointments::Column::Id.eq(appointment_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("Appointment with id {}, not exist", appointment_id))
            })?;

        let current = AppointmentStatus::try_from(row.status).map_err(|error| {
            DbErr::Query(RuntimeErr::Internal(format!(
                "Appointment with id {} face issue: {}",
                appointment_id, error,
            )))
        })?;

        if !current.can_move_to(&next) {
            return Err(DbErr::Custom(format!(
                "Cannot move appointment {} from {} to {}",
                appointment_id, current, next_label
            )));
        }

        Appointments::update_many()
            .col_expr(appointments::Column::Status, Expr::value(next as i32))
            .col_expr(appointments::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(appointments::Column::Id.eq(appointment_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(Appointment {
            id: Some(row.id),
            email: row.email.clone(),
            note: row.note.clone(),
            status: Some(next_label),
            created_at: Some(row.created_at),
            property_id: row.property_id,
            customer_name: row.customer_name.clone(),
            phone: row.phone.clone(),
            scheduled_at: row.scheduled_at,
        })
    }

    pub async fn sweep_expired(&self, grace: Duration) -> Result<u64, DbErr> {
        let cutoff = Utc::now() - grace;

        let result = Appointments::update_many()
            .col_expr(
                appointments::Column::Status,
                Expr::value(AppointmentStatus::Expired as i32),
            )
            .col_expr(appointments::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(appointments::Column::Status.eq(AppointmentStatus::Pending as i32))
            .filter(appointments::Column::ScheduledAt.lt(cutoff))
            .exec(self.db())
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn delete_for_property(&self, property_id: i32) -> Result<u64, DbErr> {
        let result = Appointments::delete_many()
            .filter(appointments::Column::PropertyId.eq(property_id))
            .exec(self.db())
            .await?;

        Ok(result.rows_affected)
    }
}
