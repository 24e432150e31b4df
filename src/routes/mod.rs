pub mod health;
pub mod itinerary;
pub mod payment;
pub mod views;

use actix_web::web;

/// Every route except `/health`, mounted under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/destinations/{id}")
                    .route("/itinerary", web::get().to(itinerary::get_itinerary))
                    .route("/fares", web::get().to(itinerary::get_fares)),
            )
            .service(
                web::scope("/views")
                    .route("", web::post().to(views::create))
                    .route("/{view_id}", web::get().to(views::get))
                    .route("/{view_id}", web::delete().to(views::remove))
                    .route("/{view_id}/refresh", web::post().to(views::refresh))
                    .route(
                        "/{view_id}/destination",
                        web::put().to(views::switch_destination),
                    )
                    .route(
                        "/{view_id}/selections",
                        web::post().to(views::confirm_selection),
                    )
                    .route("/{view_id}/dialog", web::post().to(views::open_dialog))
                    .route("/{view_id}/dialog", web::put().to(views::stage_option))
                    .route("/{view_id}/dialog", web::delete().to(views::cancel_dialog))
                    .route(
                        "/{view_id}/dialog/confirm",
                        web::post().to(views::confirm_dialog),
                    ),
            )
            .service(
                web::scope("/payment")
                    .route("/checkout", web::post().to(payment::checkout))
                    .route("/success", web::get().to(payment::success))
                    .route("/webhook", web::post().to(payment::webhook)),
            ),
    );
}
