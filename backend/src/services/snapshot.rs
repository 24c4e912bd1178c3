use crate::error::ServiceError;
use crate::store::Store;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Responder, Scope};

const API_PATH: &str = "/api/snapshot";

/// `GET /api/snapshot`: all five collections in one reply.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(process))
}

async fn process(store: web::Data<Store>) -> impl Responder {
    match store.snapshot() {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => ServiceError::from(e).to_response(),
    }
}
