use crate::error::ServiceError;
use crate::store::{folders, new_id, Store};
use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use common::model::folder::{Folder, FolderForm};
use common::model::snapshot::Snapshot;
use common::requests::FolderQuery;
use common::rules::filters::active_folders;
use common::rules::validation::validate_folder;
use log::info;
use rusqlite::Connection;

const API_PATH: &str = "/api/folders";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("/save", post().to(save))
        .route("/{id}/archive", post().to(archive))
}

async fn list(store: web::Data<Store>, query: web::Query<FolderQuery>) -> impl Responder {
    match list_folders(&store, query.include_archived) {
        Ok(folders) => HttpResponse::Ok().json(folders),
        Err(e) => e.to_response(),
    }
}

fn list_folders(store: &Store, include_archived: bool) -> Result<Vec<Folder>, ServiceError> {
    let conn = store.connect()?;
    let all = folders::list(&conn)?;
    if include_archived {
        return Ok(all);
    }
    Ok(active_folders(&all).into_iter().cloned().collect())
}

async fn save(store: web::Data<Store>, form: web::Json<FolderForm>) -> impl Responder {
    match save_folder(&store, form.into_inner()) {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => e.to_response(),
    }
}

fn save_folder(store: &Store, form: FolderForm) -> Result<Snapshot, ServiceError> {
    let conn = store.connect()?;
    write_folder(&conn, form)?;
    Ok(store.snapshot()?)
}

/// Updates keep the archive flag of the stored folder.
pub(crate) fn write_folder(conn: &Connection, form: FolderForm) -> Result<Folder, ServiceError> {
    validate_folder(&form)?;
    let id = form
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from);
    let existing = match id.as_deref() {
        Some(id) => folders::get(conn, id)?,
        None => None,
    };
    let folder = Folder {
        id: id.unwrap_or_else(new_id),
        name: form.name.trim().to_string(),
        number: form.number.trim().to_string(),
        client: form.client.trim().to_string(),
        service: form.service,
        budget_hours: form.budget_hours,
        archived: existing.is_some_and(|f| f.archived),
    };
    folders::upsert(conn, &folder)?;
    info!("Saved folder {} ({})", folder.id, folder.label());
    Ok(folder)
}

async fn archive(store: web::Data<Store>, id: web::Path<String>) -> impl Responder {
    match archive_folder(&store, &id) {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => e.to_response(),
    }
}

fn archive_folder(store: &Store, id: &str) -> Result<Snapshot, ServiceError> {
    let conn = store.connect()?;
    if !folders::archive(&conn, id)? {
        return Err(ServiceError::NotFound("folder"));
    }
    info!("Archived folder {}", id);
    Ok(store.snapshot()?)
}

#[cfg(test)]
mod tests {
    use crate::services::testing::{test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use common::model::folder::Folder;
    use common::model::snapshot::Snapshot;
    use serde_json::json;

    #[actix_web::test]
    async fn archived_folders_leave_the_default_list() {
        let ctx = TestContext::new();
        ctx.add_folder("f1", "F-2", 10.0);
        ctx.add_folder("f2", "F-1", 10.0);
        let app = test_app!(ctx);

        let req = test::TestRequest::get().uri("/api/folders").to_request();
        let listed: Vec<Folder> = test::call_and_read_body_json(&app, req).await;
        let numbers: Vec<&str> = listed.iter().map(|f| f.number.as_str()).collect();
        assert_eq!(numbers, vec!["F-1", "F-2"]);

        let req = test::TestRequest::post().uri("/api/folders/f1/archive").to_request();
        let snapshot: Snapshot = test::call_and_read_body_json(&app, req).await;
        assert!(snapshot.folders.iter().any(|f| f.id == "f1" && f.archived));

        let req = test::TestRequest::get().uri("/api/folders").to_request();
        let listed: Vec<Folder> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 1);

        let req = test::TestRequest::get()
            .uri("/api/folders?include_archived=true")
            .to_request();
        let listed: Vec<Folder> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 2);

        let req = test::TestRequest::post().uri("/api/folders/zz/archive").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn saving_keeps_archive_flag_and_rejects_negative_budget() {
        let ctx = TestContext::new();
        ctx.add_folder("f1", "F-1", 10.0);
        let app = test_app!(ctx);
        let req = test::TestRequest::post().uri("/api/folders/f1/archive").to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/folders/save")
            .set_json(json!({"id": "f1", "name": "Renamed", "service": "Audit", "budget_hours": 20.0}))
            .to_request();
        let snapshot: Snapshot = test::call_and_read_body_json(&app, req).await;
        let folder = &snapshot.folders[0];
        assert_eq!(folder.name, "Renamed");
        assert_eq!(folder.budget_hours, 20.0);
        assert!(folder.archived);

        let req = test::TestRequest::post()
            .uri("/api/folders/save")
            .set_json(json!({"id": null, "name": "New", "service": null, "budget_hours": -3.0}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
