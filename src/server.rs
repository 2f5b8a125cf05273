use std::io::{Error, ErrorKind};
use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::web::{delete, get, patch, post, put, scope, Data};
use actix_web::{App, HttpServer};

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::oneshot;

use chrono::Utc;
use log::info;

use crate::api::{health, lock, unlock, AppState};

pub async fn run() -> std::io::Result<()> {
    // @NOTE: sentry configuration
    let _guard = sentry::init((
        std::env::var("SENTRY_DSN")
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid SENTRY_DSN"))?,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            traces_sample_rate: 1.0,
            send_default_pii: true,
            max_request_body_size: sentry::MaxRequestBodySize::Always,
            ..Default::default()
        },
    ));

    // @NOTE: server configuration
    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("SERVER_PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse::<u16>()
        .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid SERVER_PORT"))?;
    let concurrent = std::env::var("SERVER_CONCURRENT")
        .unwrap_or_else(|_| "1".to_string())
        .parse::<usize>()
        .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid SERVER_CONCURRENT"))?;
    let sweep_interval = std::env::var("SWEEPER_INTERVAL_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse::<u64>()
        .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid SWEEPER_INTERVAL_SECS"))?;

    // @NOTE: control sweeper
    let (txstop, mut rxstop) = oneshot::channel::<()>();
    let (txsweep, rxsweep) = oneshot::channel::<()>();

    // @NOTE: store appstate
    let appstate_for_control = Arc::new(AppState::new().await?);
    let appstate_for_sweeper = appstate_for_control.clone();

    // @NOTE: start sweeper
    actix_rt::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(sweep_interval));
        let appstate = appstate_for_sweeper.clone();

        info!(
            "Sweeper started at {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    appstate.sweep_tick().await;
                }
                _ = &mut rxstop => {
                    info!("Sweeper is down...");

                    txsweep.send(()).unwrap();
                    break;
                }
            }
        }
    });

    // @NOTE: spawn new http server
    let server = HttpServer::new(move || {
        App::new()
            // @NOTE: monitoring
            .wrap(appstate_for_control.prometheus().clone())
            .wrap(Logger::default())
            .wrap(
                sentry_actix::Sentry::builder()
                    .capture_server_errors(true)
                    .start_transaction(true)
                    .finish(),
            )
            // @NOTE: health-check
            .route("/health", get().to(health))
            // @NOTE: APIs for operation
            .service(
                scope("/api/ops")
                    .route("/v1/sweeper/lock", put().to(lock))
                    .route("/v1/sweeper/unlock", put().to(unlock)),
            )
            // @NOTE: APIs of the public catalog
            .service(
                scope("/api/catalog")
                    .route(
                        "/v1/listing-types",
                        get().to(crate::api::catalog::v1::list_listing_types),
                    )
                    .route(
                        "/v1/amenities",
                        get().to(crate::api::catalog::v1::list_amenities),
                    )
                    .route(
                        "/v1/properties",
                        get().to(crate::api::catalog::v1::list_properties),
                    )
                    .route(
                        "/v1/properties/search",
                        get().to(crate::api::catalog::v1::search_properties),
                    )
                    .route(
                        "/v1/properties/price-range",
                        get().to(crate::api::catalog::v1::price_range),
                    )
                    .route(
                        "/v1/properties/{property_id}",
                        get().to(crate::api::catalog::v1::get_property),
                    )
                    .route(
                        "/v1/media/{path:.*}",
                        get().to(crate::api::catalog::v1::media),
                    )
                    .route(
                        "/v1/compare",
                        get().to(crate::api::catalog::v1::get_compare),
                    )
                    .route(
                        "/v1/compare/{property_id}",
                        put().to(crate::api::catalog::v1::add_to_compare),
                    )
                    .route(
                        "/v1/compare/{property_id}",
                        delete().to(crate::api::catalog::v1::remove_from_compare),
                    )
                    .route(
                        "/v1/cms/{page}",
                        get().to(crate::api::catalog::v1::page_sections),
                    ),
            )
            // @NOTE: APIs of booking
            .service(
                scope("/api/booking")
                    .route(
                        "/v1/appointments",
                        post().to(crate::api::booking::v1::create_appointment),
                    )
                    .route(
                        "/v1/appointments",
                        get().to(crate::api::booking::v1::list_appointments),
                    )
                    .route(
                        "/v1/appointments/{appointment_id}",
                        patch().to(crate::api::booking::v1::update_appointment),
                    ),
            )
            // @NOTE: APIs of the back office
            .service(
                scope("/api/admin")
                    .route(
                        "/v1/locations",
                        post().to(crate::api::admin::v1::create_locations),
                    )
                    .route(
                        "/v1/locations/{location_id}",
                        patch().to(crate::api::admin::v1::update_location),
                    )
                    .route(
                        "/v1/properties",
                        post().to(crate::api::admin::v1::create_properties),
                    )
                    .route(
                        "/v1/properties/{property_id}",
                        patch().to(crate::api::admin::v1::update_property),
                    )
                    .route(
                        "/v1/properties/{property_id}",
                        delete().to(crate::api::admin::v1::delete_property),
                    )
                    .route(
                        "/v1/properties/{property_id}/units",
                        post().to(crate::api::admin::v1::create_units),
                    )
                    .route(
                        "/v1/units/{unit_id}",
                        patch().to(crate::api::admin::v1::update_unit),
                    )
                    .route(
                        "/v1/units/{unit_id}",
                        delete().to(crate::api::admin::v1::delete_unit),
                    )
                    .route(
                        "/v1/properties/{property_id}/media",
                        post().to(crate::api::admin::v1::create_media),
                    )
                    .route(
                        "/v1/media/{media_id}",
                        delete().to(crate::api::admin::v1::delete_media),
                    )
                    .route(
                        "/v1/properties/{property_id}/amenities",
                        put().to(crate::api::admin::v1::set_property_amenities),
                    )
                    .route(
                        "/v1/amenities",
                        post().to(crate::api::admin::v1::create_amenities),
                    )
                    .route(
                        "/v1/amenities/{amenity_id}",
                        delete().to(crate::api::admin::v1::delete_amenity),
                    )
                    .route(
                        "/v1/cms",
                        post().to(crate::api::admin::v1::upsert_cms_sections),
                    )
                    .route(
                        "/v1/cms/{section_id}",
                        delete().to(crate::api::admin::v1::delete_cms_section),
                    ),
            )
            // @NOTE: AppState
            .app_data(Data::new(appstate_for_control.clone()))
    })
    .workers(concurrent)
    .keep_alive(std::time::Duration::from_secs(100))
    .bind((host.as_str(), port))
    .map_err(|e| {
        Error::new(
            ErrorKind::AddrInUse,
            format!("Failed to bind to {}:{}: {}", host, port, e),
        )
    })?
    .shutdown_timeout(30)
    .run();

    let handler = server.handle();

    info!(
        "Server started at {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
    );

    // @NOTE: graceful shutdown
    actix_rt::spawn(async move {
        let mut sigint = signal(SignalKind::interrupt()).unwrap();
        let mut sigterm = signal(SignalKind::terminate()).unwrap();

        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }

        info!("Shutting down...");
        let _ = txstop.send(());

        tokio::select! {
            _ = rxsweep => {
                info!("Sweeper is downed gracefully...");

                handler.stop(true).await;
            }
        }

        info!("Server is going to shutdown...");
    });

    // @NOTE: wait for everything to finish
    tokio::select! {
        result = server => result,
    }
}

pub async fn sweep(grace_minutes: i64) -> std::io::Result<()> {
    let appstate = AppState::new().await?;

    match appstate.booking_entity() {
        Some(entity) => {
            let count = entity
                .sweep_expired(chrono::Duration::minutes(grace_minutes))
                .await
                .map_err(|error| {
                    Error::new(ErrorKind::Other, format!("Failed to sweep: {}", error))
                })?;

            info!("Expired {} stale appointments", count);
            Ok(())
        }
        None => Err(Error::new(ErrorKind::InvalidInput, "Invalid MYSQL_DSN")),
    }
}
