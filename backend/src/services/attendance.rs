use crate::error::ServiceError;
use crate::services::acting_person;
use crate::session::SessionStore;
use crate::store::{attendance, new_id, Store};
use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};
use common::model::attendance::Attendance;
use common::model::person::Person;
use common::model::snapshot::Snapshot;
use common::requests::DateQuery;
use log::info;

const API_PATH: &str = "/api/attendance";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("/check_in", post().to(check_in))
        .route("/check_out", post().to(check_out))
}

async fn list(store: web::Data<Store>, query: web::Query<DateQuery>) -> impl Responder {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let result = store.connect().and_then(|conn| attendance::list(&conn));
    match result {
        Ok(records) => {
            let day: Vec<Attendance> = records.into_iter().filter(|a| a.date == date).collect();
            HttpResponse::Ok().json(day)
        }
        Err(e) => ServiceError::from(e).to_response(),
    }
}

/// Clock times are kept to the minute.
fn clock(now: NaiveDateTime) -> NaiveTime {
    NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or_default()
}

async fn check_in(store: web::Data<Store>, session: web::Data<SessionStore>) -> impl Responder {
    let result = match acting_person(&session, &store).await {
        Ok(person) => record_check_in(&store, &person, Local::now().naive_local()),
        Err(e) => Err(e),
    };
    match result {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => e.to_response(),
    }
}

/// One check-in per person and day; a second one is a conflict.
fn record_check_in(
    store: &Store,
    person: &Person,
    now: NaiveDateTime,
) -> Result<Snapshot, ServiceError> {
    let conn = store.connect()?;
    let today = now.date();
    if attendance::find(&conn, &person.id, today)?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "{} already checked in on {}",
            person.name, today
        )));
    }
    let record = Attendance {
        id: new_id(),
        person_id: person.id.clone(),
        date: today,
        check_in: clock(now),
        check_out: None,
    };
    attendance::upsert(&conn, &record)?;
    info!("{} checked in at {}", person.id, record.check_in);
    Ok(store.snapshot()?)
}

async fn check_out(store: web::Data<Store>, session: web::Data<SessionStore>) -> impl Responder {
    let result = match acting_person(&session, &store).await {
        Ok(person) => record_check_out(&store, &person, Local::now().naive_local()),
        Err(e) => Err(e),
    };
    match result {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => e.to_response(),
    }
}

/// Requires today's check-in. A repeated check-out replaces the earlier one.
fn record_check_out(
    store: &Store,
    person: &Person,
    now: NaiveDateTime,
) -> Result<Snapshot, ServiceError> {
    let conn = store.connect()?;
    let mut record = attendance::find(&conn, &person.id, now.date())?
        .ok_or(ServiceError::NotFound("check-in for today"))?;
    record.check_out = Some(clock(now));
    attendance::upsert(&conn, &record)?;
    info!("{} checked out at {}", person.id, clock(now));
    Ok(store.snapshot()?)
}
