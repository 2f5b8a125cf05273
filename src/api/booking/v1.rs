use std::sync::Arc;

use actix_web::web::{Data, Json, Path, Query};
use actix_web::{HttpResponse, Result};

use serde::{Deserialize, Serialize};

use crate::api::admin::AdminHeaders;
use crate::api::{next_after, AppState};
use crate::entities::booking::Appointment;

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct AppointmentFilterInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    property_id: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    after: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct UpdateStatusInput {
    status: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct ListAppointmentsResponse {
    data: Vec<Appointment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    next_after: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct BookingResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    appointments: Option<ListAppointmentsResponse>,

    #[serde(skip_serializing_if = "Option::is_none")]
    appointment: Option<Appointment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Default for BookingResponse {
    fn default() -> Self {
        Self {
            appointments: None,
            appointment: None,
            id: None,
            error: None,
        }
    }
}

pub async fn create_appointment(
    appstate: Data<Arc<AppState>>,
    appointment: Json<Appointment>,
) -> Result<HttpResponse> {
    if let Some(entity) = appstate.booking_entity() {
        let appointment = appointment.into_inner();

        match entity.create(&appointment).await {
            Ok(id) => Ok(HttpResponse::Ok().json(BookingResponse {
                id: Some(id),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(BookingResponse {
                error: Some(format!("Failed to create appointment: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(BookingResponse {
            error: Some(format!("Not implemented")),
            ..Default::default()
        }))
    }
}

pub async fn list_appointments(
    appstate: Data<Arc<AppState>>,
    query: Query<AppointmentFilterInput>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(HttpResponse::Unauthorized().json(BookingResponse {
            error: Some(format!("Invalid admin key")),
            ..Default::default()
        }));
    }

    if let Some(entity) = appstate.booking_entity() {
        let after = query.after.unwrap_or(0);
        let limit = query.limit.unwrap_or(10);

        if limit > 100 {
            Ok(HttpResponse::BadRequest().json(BookingResponse {
                error: Some(format!(
                    "Maximum item per page does not exceed 100, currently is {}",
                    limit
                )),
                ..Default::default()
            }))
        } else {
            match entity
                .list_paginated(query.status.as_ref(), query.property_id, after, limit)
                .await
            {
                Ok(data) => {
                    let next_after = next_after(&data, limit, |it| it.id);

                    Ok(HttpResponse::Ok().json(BookingResponse {
                        appointments: Some(ListAppointmentsResponse { data, next_after }),
                        ..Default::default()
                    }))
                }
                Err(error) => Ok(HttpResponse::InternalServerError().json(BookingResponse {
                    error: Some(format!("Failed to get list of appointments: {}", error)),
                    ..Default::default()
                })),
            }
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(BookingResponse {
            error: Some(format!("Not implemented")),
            ..Default::default()
        }))
    }
}

pub async fn update_appointment(
    appstate: Data<Arc<AppState>>,
    path: Path<(i32,)>,
    input: Json<UpdateStatusInput>,
    headers: AdminHeaders,
) -> Result<HttpResponse> {
    let (appointment_id,) = path.into_inner();

    if !appstate.is_admin(headers.admin_key.as_str()) {
        return Ok(HttpResponse::Unauthorized().json(BookingResponse {
            error: Some(format!("Invalid admin key")),
            ..Default::default()
        }));
    }

    if let Some(entity) = appstate.booking_entity() {
        match entity
            .update_status(appointment_id, input.status.as_str())
            .await
        {
            Ok(data) => Ok(HttpResponse::Ok().json(BookingResponse {
                appointment: Some(data),
                ..Default::default()
            })),
            Err(error) => Ok(HttpResponse::BadRequest().json(BookingResponse {
                error: Some(format!("Failed to update appointment: {}", error)),
                ..Default::default()
            })),
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(BookingResponse {
            error: Some(format!("Not implemented")),
            ..Default::default()
        }))
    }
}
