//! PIN login for the shared terminal.
//!
//! - `POST /api/auth/login`: checks `{person_id, pin}` and opens the session.
//! - `POST /api/auth/logout`: closes it.
//! - `GET /api/auth/session`: the signed-in person, or 401.

use crate::error::ServiceError;
use crate::services::acting_person;
use crate::session::SessionStore;
use crate::store::pin::{hash_pin, needs_rehash, verify_pin};
use crate::store::{people, Store};
use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use common::model::person::Person;
use common::requests::LoginRequest;
use common::rules::validation::{validate_pin, ValidationError};
use log::{info, warn};

const API_PATH: &str = "/api/auth";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/login", post().to(login))
        .route("/logout", post().to(logout))
        .route("/session", get().to(session))
}

async fn login(
    store: web::Data<Store>,
    session: web::Data<SessionStore>,
    req: web::Json<LoginRequest>,
) -> impl Responder {
    match sign_in(&store, &session, req.into_inner()).await {
        Ok(person) => HttpResponse::Ok().json(person),
        Err(e) => e.to_response(),
    }
}

async fn sign_in(
    store: &Store,
    session: &SessionStore,
    req: LoginRequest,
) -> Result<Person, ServiceError> {
    validate_pin(&req.pin)?;
    let conn = store.connect()?;
    let person = people::get(&conn, &req.person_id)?.ok_or(ServiceError::NotFound("person"))?;
    if !verify_pin(&req.pin, &person.pin_hash) {
        warn!("Rejected PIN for person {}", person.id);
        return Err(ValidationError::PinMismatch.into());
    }
    if needs_rehash(&person.pin_hash) {
        info!("Upgrading stored PIN of person {}", person.id);
        people::set_pin(&conn, &person.id, &hash_pin(&req.pin))?;
    }
    session.sign_in(&person.id).await?;
    Ok(person)
}

async fn logout(session: web::Data<SessionStore>) -> impl Responder {
    match session.sign_out().await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => ServiceError::from(e).to_response(),
    }
}

async fn session(store: web::Data<Store>, session: web::Data<SessionStore>) -> impl Responder {
    match acting_person(&session, &store).await {
        Ok(person) => HttpResponse::Ok().json(person),
        Err(e) => e.to_response(),
    }
}
