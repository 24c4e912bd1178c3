//! Time entries.
//!
//! - `GET /api/entries`: history view, filtered by `HistoryFilter` query
//!   parameters and sorted most recent first.
//! - `POST /api/entries/save`: creates or updates one entry. The person
//!   defaults to the signed-in one, the date to today, the service to the
//!   folder's and the fiscal year to the date's year.
//! - `DELETE /api/entries/{id}`.

use crate::error::ServiceError;
use crate::session::SessionStore;
use crate::store::{entries, folders, new_id, Store};
use actix_web::web::{delete, get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use chrono::{Datelike, Local, NaiveDate};
use common::model::snapshot::Snapshot;
use common::model::time_entry::{EntryForm, TimeEntry};
use common::rules::filters::{filter_history, HistoryFilter};
use common::rules::validation::validate_entry;
use log::info;
use rusqlite::Connection;

const API_PATH: &str = "/api/entries";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("/save", post().to(save))
        .route("/{id}", delete().to(remove))
}

async fn list(store: web::Data<Store>, filter: web::Query<HistoryFilter>) -> impl Responder {
    match history(&store, &filter) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => e.to_response(),
    }
}

fn history(store: &Store, filter: &HistoryFilter) -> Result<Vec<TimeEntry>, ServiceError> {
    let snapshot = store.snapshot()?;
    let directory = snapshot.directory();
    Ok(filter_history(&snapshot.entries, &directory, filter)
        .into_iter()
        .cloned()
        .collect())
}

async fn save(
    store: web::Data<Store>,
    session: web::Data<SessionStore>,
    form: web::Json<EntryForm>,
) -> impl Responder {
    let signed_in = session.person_id().await;
    match save_entry(&store, form.into_inner(), signed_in.as_deref()) {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => e.to_response(),
    }
}

fn save_entry(
    store: &Store,
    form: EntryForm,
    signed_in: Option<&str>,
) -> Result<Snapshot, ServiceError> {
    let conn = store.connect()?;
    write_entry(&conn, form, signed_in, Local::now().date_naive())?;
    Ok(store.snapshot()?)
}

/// Fills the form's defaults and writes the entry. The folder must exist.
/// An edited entry keeps its person unless the form names another one.
pub(crate) fn write_entry(
    conn: &Connection,
    form: EntryForm,
    signed_in: Option<&str>,
    today: NaiveDate,
) -> Result<TimeEntry, ServiceError> {
    validate_entry(&form)?;
    let id = form
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from);
    let existing = match id.as_deref() {
        Some(id) => entries::get(conn, id)?,
        None => None,
    };
    let person_id = form
        .person_id
        .as_deref()
        .or(existing.as_ref().map(|e| e.person_id.as_str()))
        .or(signed_in)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ServiceError::Unauthenticated)?
        .to_string();
    let folder_id = form.folder_id.as_deref().unwrap_or_default();
    let folder = folders::get(conn, folder_id)?.ok_or(ServiceError::NotFound("folder"))?;
    let date = form.date.unwrap_or(today);
    let entry = TimeEntry {
        id: id.unwrap_or_else(new_id),
        person_id,
        folder_id: Some(folder.id),
        hours: form.hours,
        date,
        description: form.description.trim().to_string(),
        service: form.service.or(folder.service),
        fiscal_year: form
            .fiscal_year
            .map(|y| y.trim().to_string())
            .filter(|y| !y.is_empty())
            .unwrap_or_else(|| date.year().to_string()),
    };
    entries::upsert(conn, &entry)?;
    info!(
        "Saved entry {}: {}h by {} on {}",
        entry.id, entry.hours, entry.person_id, entry.date
    );
    Ok(entry)
}

async fn remove(store: web::Data<Store>, id: web::Path<String>) -> impl Responder {
    match delete_entry(&store, &id) {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => e.to_response(),
    }
}

fn delete_entry(store: &Store, id: &str) -> Result<Snapshot, ServiceError> {
    let conn = store.connect()?;
    if !entries::delete(&conn, id)? {
        return Err(ServiceError::NotFound("entry"));
    }
    Ok(store.snapshot()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use common::model::person::{Department, Role};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[actix_web::test]
    async fn save_fills_defaults_from_session_and_folder() {
        let ctx = TestContext::new();
        ctx.add_person("p1", Department::Audit, Role::Collaborator);
        ctx.add_folder("f1", "F-1", 40.0);
        ctx.sign_in("p1").await;
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri("/api/entries/save")
            .set_json(json!({"folder_id": "f1", "hours": 3.5, "date": "2024-11-05", "description": " Fieldwork "}))
            .to_request();
        let snapshot: Snapshot = test::call_and_read_body_json(&app, req).await;
        let entry = &snapshot.entries[0];
        assert_eq!(entry.person_id, "p1");
        assert_eq!(entry.service, Some(Department::Audit));
        assert_eq!(entry.fiscal_year, "2024");
        assert_eq!(entry.description, "Fieldwork");
    }

    #[actix_web::test]
    async fn save_refuses_bad_hours_and_anonymous_writes() {
        let ctx = TestContext::new();
        ctx.add_folder("f1", "F-1", 40.0);
        let app = test_app!(ctx);
        let cases = [
            (json!({"folder_id": "f1", "hours": 0.0}), StatusCode::BAD_REQUEST),
            (json!({"folder_id": null, "hours": 2.0}), StatusCode::BAD_REQUEST),
            (json!({"folder_id": "f1", "hours": 2.0}), StatusCode::UNAUTHORIZED),
            (json!({"folder_id": "nope", "hours": 2.0, "person_id": "p1"}), StatusCode::NOT_FOUND),
        ];
        for (body, status) in cases {
            let req = test::TestRequest::post()
                .uri("/api/entries/save")
                .set_json(&body)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), status, "{}", body);
        }
    }

    #[actix_web::test]
    async fn history_filters_by_person_and_search() {
        let ctx = TestContext::new();
        ctx.add_person("p1", Department::Audit, Role::Collaborator);
        ctx.add_person("p2", Department::Legal, Role::Collaborator);
        ctx.add_folder("f1", "F-1", 40.0);
        let conn = ctx.temp.store.connect().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        for (person, description) in [("p1", "Inventory count"), ("p2", "Board minutes"), ("p1", "Review")] {
            let form = EntryForm {
                folder_id: Some("f1".into()),
                hours: 1.0,
                description: description.into(),
                ..Default::default()
            };
            write_entry(&conn, form, Some(person), today).unwrap();
        }
        let app = test_app!(ctx);

        let req = test::TestRequest::get()
            .uri("/api/entries?person_id=p1&search=INVENTORY")
            .to_request();
        let rows: Vec<TimeEntry> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Inventory count");

        let req = test::TestRequest::get()
            .uri("/api/entries?from=2025-03-13")
            .to_request();
        let rows: Vec<TimeEntry> = test::call_and_read_body_json(&app, req).await;
        assert!(rows.is_empty());
    }

    #[actix_web::test]
    async fn editing_keeps_the_original_person() {
        let ctx = TestContext::new();
        ctx.add_folder("f1", "F-1", 40.0);
        let conn = ctx.temp.store.connect().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let form = EntryForm {
            id: Some("e1".into()),
            folder_id: Some("f1".into()),
            hours: 1.0,
            ..Default::default()
        };
        write_entry(&conn, form.clone(), Some("p1"), today).unwrap();
        let edited = write_entry(&conn, EntryForm { hours: 2.0, ..form }, Some("boss"), today).unwrap();
        assert_eq!(edited.person_id, "p1");
        assert_eq!(entries::get(&conn, "e1").unwrap().unwrap().hours, 2.0);
    }

    #[actix_web::test]
    async fn delete_entry_then_not_found() {
        let ctx = TestContext::new();
        ctx.add_folder("f1", "F-1", 40.0);
        let conn = ctx.temp.store.connect().unwrap();
        let form = EntryForm {
            id: Some("e1".into()),
            folder_id: Some("f1".into()),
            hours: 1.0,
            ..Default::default()
        };
        write_entry(&conn, form, Some("p1"), NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()).unwrap();
        let app = test_app!(ctx);

        let req = test::TestRequest::delete().uri("/api/entries/e1").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        let req = test::TestRequest::delete().uri("/api/entries/e1").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
