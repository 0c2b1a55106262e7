use crate::{
    api::{attendance, leave_request, reports, staff},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let scan_limiter = Arc::new(build_limiter(config.rate_scan_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(handlers::protected)
            .service(
                web::scope("/staff")
                    // /staff
                    .service(
                        web::resource("")
                            .route(web::post().to(staff::create_staff))
                            .route(web::get().to(staff::list_staff)),
                    )
                    // /staff/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(staff::update_staff))
                            .route(web::get().to(staff::get_staff))
                            .route(web::delete().to(staff::delete_staff)),
                    )
                    .service(
                        web::resource("/{id}/deactivate")
                            .route(web::post().to(staff::deactivate_staff)),
                    )
                    .service(
                        web::resource("/{id}/reactivate")
                            .route(web::post().to(staff::reactivate_staff)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::put().to(leave_request::update_leave))
                            .route(web::delete().to(leave_request::delete_leave)),
                    )
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/scan")
                            .wrap(scan_limiter.clone())
                            .route(web::post().to(attendance::scan)),
                    )
                    .service(
                        web::resource("/sync")
                            .wrap(scan_limiter.clone())
                            .route(web::get().to(attendance::sync)),
                    )
                    .service(
                        web::resource("/device-sync")
                            .wrap(scan_limiter)
                            .route(web::post().to(attendance::device_sync)),
                    )
                    .service(web::resource("/import").route(web::post().to(attendance::import)))
                    .service(web::resource("/me").route(web::get().to(attendance::my_attendance))),
            )
            .service(
                web::scope("/reports")
                    .service(
                        web::resource("/incidences").route(web::get().to(reports::incidences)),
                    )
                    .service(web::resource("/daily").route(web::get().to(reports::daily)))
                    .service(web::resource("/absences").route(web::get().to(reports::absences)))
                    .service(web::resource("/monthly").route(web::get().to(reports::monthly))),
            )
            .service(web::resource("/dashboard").route(web::get().to(reports::dashboard))),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// API REQUEST
//  └─ Authorization: Bearer access_token
//
// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
