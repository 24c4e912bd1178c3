use crate::error::ServiceError;
use crate::store::pin::hash_pin;
use crate::store::{new_id, people, Store};
use actix_web::web::{delete, get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use common::model::person::{Person, PersonForm};
use common::model::snapshot::Snapshot;
use common::rules::validation::validate_person;
use log::info;

const API_PATH: &str = "/api/people";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("/save", post().to(save))
        .route("/{id}", delete().to(remove))
}

async fn list(store: web::Data<Store>) -> impl Responder {
    let result = store.connect().and_then(|conn| people::list(&conn));
    match result {
        Ok(people) => HttpResponse::Ok().json(people),
        Err(e) => ServiceError::from(e).to_response(),
    }
}

async fn save(store: web::Data<Store>, form: web::Json<PersonForm>) -> impl Responder {
    match save_person(&store, form.into_inner()) {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => e.to_response(),
    }
}

/// Creates or updates a person. An empty PIN on update keeps the stored one.
pub(crate) fn save_person(store: &Store, form: PersonForm) -> Result<Snapshot, ServiceError> {
    let conn = store.connect()?;
    write_person(&conn, form)?;
    Ok(store.snapshot()?)
}

pub(crate) fn write_person(
    conn: &rusqlite::Connection,
    form: PersonForm,
) -> Result<Person, ServiceError> {
    validate_person(&form)?;
    let id = form
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from);
    let pin_hash = match form.pin.as_deref().filter(|p| !p.is_empty()) {
        Some(pin) => hash_pin(pin),
        None => {
            let existing = match id.as_deref() {
                Some(id) => people::get(conn, id)?,
                None => None,
            };
            existing.ok_or(ServiceError::NotFound("person"))?.pin_hash
        }
    };
    let person = Person {
        id: id.unwrap_or_else(new_id),
        name: form.name.trim().to_string(),
        department: form.department,
        role: form.role,
        hire_date: form.hire_date,
        start_time: form.start_time,
        end_time: form.end_time,
        pin_hash,
    };
    people::upsert(conn, &person)?;
    info!("Saved person {} ({})", person.id, person.name);
    Ok(person)
}

async fn remove(store: web::Data<Store>, id: web::Path<String>) -> impl Responder {
    match delete_person(&store, &id) {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => e.to_response(),
    }
}

fn delete_person(store: &Store, id: &str) -> Result<Snapshot, ServiceError> {
    let conn = store.connect()?;
    if !people::delete(&conn, id)? {
        return Err(ServiceError::NotFound("person"));
    }
    info!("Deleted person {}", id);
    Ok(store.snapshot()?)
}
