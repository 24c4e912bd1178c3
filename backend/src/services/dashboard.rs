//! Read-only figures for the management dashboard.
//!
//! Budget and productivity take the history filters, so the dashboard can be
//! narrowed to a period, a pole or a person. Presence and punctuality work on
//! attendance records.

use crate::error::ServiceError;
use crate::store::Store;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use chrono::{Local, NaiveDate};
use common::model::person::Person;
use common::model::same_id;
use common::requests::{DateQuery, PunctualityQuery};
use common::rules::aggregation::{
    budget_report, presence, productivity, FolderBudget, PersonProductivity, PresenceSummary,
};
use common::rules::filters::{filter_history, HistoryFilter};
use common::rules::punctuality::{punctuality, PunctualityReport};

const API_PATH: &str = "/api/dashboard";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/budget", get().to(budget))
        .route("/productivity", get().to(people_hours))
        .route("/presence", get().to(presence_rate))
        .route("/punctuality", get().to(on_time))
}

async fn budget(store: web::Data<Store>, filter: web::Query<HistoryFilter>) -> impl Responder {
    match budget_lines(&store, &filter) {
        Ok(lines) => HttpResponse::Ok().json(lines),
        Err(e) => e.to_response(),
    }
}

fn budget_lines(store: &Store, filter: &HistoryFilter) -> Result<Vec<FolderBudget>, ServiceError> {
    let snapshot = store.snapshot()?;
    let directory = snapshot.directory();
    let entries = filter_history(&snapshot.entries, &directory, filter);
    Ok(budget_report(&snapshot.folders, &entries))
}

async fn people_hours(
    store: web::Data<Store>,
    filter: web::Query<HistoryFilter>,
) -> impl Responder {
    match productivity_lines(&store, &filter) {
        Ok(lines) => HttpResponse::Ok().json(lines),
        Err(e) => e.to_response(),
    }
}

fn productivity_lines(
    store: &Store,
    filter: &HistoryFilter,
) -> Result<Vec<PersonProductivity>, ServiceError> {
    let snapshot = store.snapshot()?;
    let directory = snapshot.directory();
    let entries = filter_history(&snapshot.entries, &directory, filter);
    Ok(productivity(&snapshot.people, &entries))
}

async fn presence_rate(store: web::Data<Store>, query: web::Query<DateQuery>) -> impl Responder {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    match presence_summary(&store, date) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => e.to_response(),
    }
}

fn presence_summary(store: &Store, date: NaiveDate) -> Result<PresenceSummary, ServiceError> {
    let snapshot = store.snapshot()?;
    Ok(presence(&snapshot.people, &snapshot.attendance, date))
}

async fn on_time(store: web::Data<Store>, query: web::Query<PunctualityQuery>) -> impl Responder {
    match punctuality_report(&store, &query, Local::now().date_naive()) {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => e.to_response(),
    }
}

/// Whole roster, or a single person when `person_id` is given.
fn punctuality_report(
    store: &Store,
    query: &PunctualityQuery,
    today: NaiveDate,
) -> Result<PunctualityReport, ServiceError> {
    let snapshot = store.snapshot()?;
    let wanted = query.person_id.as_deref().filter(|id| !id.trim().is_empty());
    let people: Vec<&Person> = snapshot
        .people
        .iter()
        .filter(|p| wanted.is_none_or(|id| same_id(&p.id, id)))
        .collect();
    Ok(punctuality(&people, &snapshot.attendance, query.range, today))
}
