use std::collections::VecDeque;
use std::io::{Error, ErrorKind, Result as AppStateResult};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::web::Data;
use actix_web::{HttpResponse, Result as HttpResult};
use actix_web_prometheus::{PrometheusMetrics, PrometheusMetricsBuilder};

use aws_config::{
    meta::region::RegionProviderChain, timeout::TimeoutConfig, BehaviorVersion, Region,
};
use aws_sdk_s3::Client as S3Client;

use chrono::Utc;
use log::{debug, error};
use prometheus::IntCounter;
use redis::{AsyncCommands, Client as RedisClient};
use sea_orm::{Database, DatabaseConnection};
use serde::{Deserialize, Serialize};

use crate::entities;
use crate::entities::compare::Compare;

pub mod admin;
pub mod booking;
pub mod catalog;

#[derive(Serialize, Deserialize, Clone, Debug)]
struct Status {
    sweeptime: Vec<i64>,
    current: i64,
    swept: i64,
    status: bool,
}

pub struct AppState {
    // @NOTE: monitoring
    sweeptime: Arc<Mutex<VecDeque<i64>>>,
    swept: Arc<AtomicI64>,
    swept_counter: IntCounter,
    timeframe: usize,
    s3: S3Client,
    db: Option<Arc<DatabaseConnection>>,
    redis: Option<RedisClient>,
    prometheus: PrometheusMetrics,

    // @NOTE: state management
    locked: Arc<Mutex<bool>>,

    // @NOTE: database models
    catalog_entity: Option<entities::catalog::Catalog>,
    booking_entity: Option<entities::booking::Booking>,
    cms_entity: Option<entities::cms::Cms>,
    compare_entity: Option<Compare>,

    // @NOTE: configuration
    admin_key: String,
    bucket: String,
    grace: chrono::Duration,
}

impl AppState {
    pub async fn new() -> AppStateResult<AppState> {
        let admin_key = std::env::var("ADMIN_KEY")
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid ADMIN_KEY"))?;

        let s3_bucket = std::env::var("S3_BUCKET")
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid S3_BUCKET"))?;
        let s3_region = std::env::var("S3_REGION")
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid S3_REGION"))?;
        let s3_endpoint = std::env::var("S3_ENDPOINT")
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid S3_ENDPOINT"))?;

        let grace_minutes = std::env::var("APPOINTMENT_GRACE_MINUTES")
            .unwrap_or_else(|_| "1440".to_string())
            .parse::<i64>()
            .map_err(|_| {
                Error::new(ErrorKind::InvalidInput, "Invalid APPOINTMENT_GRACE_MINUTES")
            })?;

        let redis_host = match std::env::var("REDIS_HOST") {
            Ok(redis_host) => redis_host,
            Err(_) => "".to_string(),
        };
        let redis_port = match std::env::var("REDIS_PORT") {
            Ok(redis_port) => redis_port,
            Err(_) => "".to_string(),
        };
        let redis_password = match std::env::var("REDIS_PASSWORD") {
            Ok(redis_password) => redis_password,
            Err(_) => "".to_string(),
        };
        let redis_username = match std::env::var("REDIS_USERNAME") {
            Ok(redis_username) => redis_username,
            Err(_) => "".to_string(),
        };

        let redis = match RedisClient::open(format!(
            "redis://{}:{}@{}:{}",
            redis_username, redis_password, redis_host, redis_port
        )) {
            Ok(redis) => Some(redis),
            Err(_) => None,
        };

        let db = match std::env::var("MYSQL_DSN") {
            Ok(dsn) => Some(Arc::new(Database::connect(dsn).await.map_err(|error| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("Failed to connect database: {}", error),
                )
            })?)),
            Err(_) => None,
        };

        let s3 = S3Client::new(
            &(aws_config::defaults(BehaviorVersion::latest())
                .timeout_config(
                    TimeoutConfig::builder()
                        .operation_timeout(Duration::from_secs(30))
                        .operation_attempt_timeout(Duration::from_millis(10000))
                        .build(),
                )
                .region(
                    RegionProviderChain::first_try(Region::new(s3_region.clone()))
                        .or_default_provider(),
                )
                .endpoint_url(s3_endpoint.clone())
                .load()
                .await),
        );

        let catalog_entity = match db {
            Some(ref db) => Some(entities::catalog::Catalog::new(db.clone())),
            None => None,
        };

        let booking_entity = match db {
            Some(ref db) => Some(entities::booking::Booking::new(db.clone())),
            None => None,
        };

        let cms_entity = match db {
            Some(ref db) => Some(entities::cms::Cms::new(db.clone())),
            None => None,
        };

        let compare_entity = redis.clone().map(Compare::new);

        let prometheus = PrometheusMetricsBuilder::new("api")
            .endpoint("/metrics")
            .build()
            .map_err(|e| {
                Error::new(
                    ErrorKind::Other,
                    format!("Failed to build prometheus metrics: {:?}", e),
                )
            })?;

        let swept_counter = IntCounter::new(
            "marketplace_swept_appointments",
            "Total number of appointments expired by the sweeper",
        )
        .map_err(|e| {
            Error::new(
                ErrorKind::Other,
                format!("Failed to build sweeper counter: {:?}", e),
            )
        })?;

        prometheus
            .registry
            .register(Box::new(swept_counter.clone()))
            .map_err(|e| {
                Error::new(
                    ErrorKind::Other,
                    format!("Failed to register sweeper counter: {:?}", e),
                )
            })?;

        Ok(AppState {
            // @NOTE: shared parameters
            sweeptime: Arc::new(Mutex::new(VecDeque::new())),
            swept: Arc::new(AtomicI64::new(0)),
            swept_counter,
            timeframe: std::env::var("APPSTATE_TIMEFRAME")
                .unwrap_or_else(|_| "4".to_string())
                .parse::<usize>()
                .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid APPSTATE_TIMEFRAME"))?,

            // @NOTE: database entities
            catalog_entity,
            booking_entity,
            cms_entity,
            compare_entity,

            // @NOTE: monitors
            locked: Arc::new(Mutex::new(false)),
            s3,
            db,
            redis,
            prometheus,

            // @NOTE: configuration
            admin_key,
            bucket: s3_bucket,
            grace: chrono::Duration::minutes(grace_minutes),
        })
    }

    pub fn prometheus(&self) -> &PrometheusMetrics {
        &self.prometheus
    }

    pub fn catalog_entity(&self) -> &Option<entities::catalog::Catalog> {
        &self.catalog_entity
    }

    pub fn booking_entity(&self) -> &Option<entities::booking::Booking> {
        &self.booking_entity
    }

    pub fn cms_entity(&self) -> &Option<entities::cms::Cms> {
        &self.cms_entity
    }

    pub fn compare_entity(&self) -> &Option<Compare> {
        &self.compare_entity
    }

    pub fn is_admin(&self, key: &str) -> bool {
        !self.admin_key.is_empty() && self.admin_key == key
    }

    pub fn bucket(&self) -> &str {
        self.bucket.as_str()
    }

    pub async fn sweep_tick(&self) {
        let locked = match self.locked.lock() {
            Ok(locked) => *locked,
            Err(_) => false,
        };

        if locked {
            return;
        }

        let count = match self.booking_entity() {
            Some(entity) => match entity.sweep_expired(self.grace).await {
                Ok(count) => count,
                Err(err) => {
                    error!("Sweep failed: {:?}", err);
                    return;
                }
            },
            None => 0,
        };

        if count > 0 {
            debug!("Expired {} stale appointments", count);
        }

        self.swept.fetch_add(count as i64, Ordering::SeqCst);
        self.swept_counter.inc_by(count);

        match self.sweeptime.lock() {
            Ok(mut sweeptime) => {
                sweeptime.push_back(Utc::now().timestamp());
                if sweeptime.len() > self.timeframe {
                    sweeptime.pop_front();
                }
            }
            Err(_) => {
                error!("Failed to lock sweeptime mutex - skipping timestamp update");
            }
        }
    }

    pub async fn ping(&self) -> bool {
        let redis_ok = match &self.redis {
            Some(client) => {
                if let Ok(mut conn) = client.get_multiplexed_tokio_connection().await {
                    if let Ok(resp) = conn.ping::<String>().await {
                        resp == "PONG"
                    } else {
                        false
                    }
                } else {
                    false
                }
            }
            None => true,
        };
        let db_ok = match &self.db {
            Some(client) => client.ping().await.is_ok(),
            None => true,
        };

        redis_ok && db_ok
    }
}

pub fn next_after<T, F>(data: &[T], limit: u64, id_of: F) -> Option<i32>
where
    F: Fn(&T) -> Option<i32>,
{
    if data.len() == limit as usize {
        data.last().and_then(id_of)
    } else {
        None
    }
}

pub async fn unlock(appstate: Data<Arc<AppState>>) -> HttpResult<HttpResponse> {
    match appstate.locked.lock() {
        Ok(mut locked) => {
            *locked = false;
            Ok(HttpResponse::Ok().body("ok"))
        }
        Err(_) => Ok(HttpResponse::InternalServerError().body("Cannot unlock sweeper")),
    }
}

pub async fn lock(appstate: Data<Arc<AppState>>) -> HttpResult<HttpResponse> {
    match appstate.locked.lock() {
        Ok(mut locked) => {
            *locked = true;
            Ok(HttpResponse::Ok().body("ok"))
        }
        Err(_) => Ok(HttpResponse::InternalServerError().body("Cannot lock sweeper")),
    }
}

pub async fn health(appstate: Data<Arc<AppState>>) -> HttpResult<HttpResponse> {
    let current = Utc::now().timestamp();

    let max_stale = std::env::var("SWEEPER_STALE_SECS")
        .unwrap_or_else(|_| "180".to_string())
        .parse::<i64>()
        .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid SWEEPER_STALE_SECS"))?;

    if appstate.ping().await {
        match appstate.sweeptime.lock() {
            Ok(sweeptime) => {
                let swept = appstate.swept.load(Ordering::SeqCst);
                let last_ok = sweeptime
                    .back()
                    .map_or(true, |updated| current - updated <= max_stale);
                let builder = if last_ok {
                    HttpResponse::Ok
                } else {
                    HttpResponse::GatewayTimeout
                };

                Ok(builder().json(Status {
                    sweeptime: sweeptime.iter().cloned().collect(),
                    status: last_ok,
                    swept,
                    current,
                }))
            }
            Err(_) => Ok(HttpResponse::InternalServerError().json(Status {
                sweeptime: Vec::new(),
                status: false,
                swept: 0,
                current,
            })),
        }
    } else {
        Ok(HttpResponse::InternalServerError().json(Status {
            sweeptime: Vec::new(),
            status: false,
            swept: 0,
            current,
        }))
    }
}
