//! Spreadsheet downloads of the history view.
//!
//! Both routes take the same query parameters as `GET /api/entries` and
//! answer with a CSV attachment.

use crate::error::ServiceError;
use crate::store::Store;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use common::rules::export::{flat_rows, group_by_folder, grouped_rows, Row};
use common::rules::filters::{filter_history, HistoryFilter};
use log::info;

const API_PATH: &str = "/api/export";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Flat,
    Grouped,
}

impl Layout {
    fn file_name(&self) -> &'static str {
        match self {
            Layout::Flat => "timesheet.csv",
            Layout::Grouped => "timesheet_by_folder.csv",
        }
    }
}

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/flat", get().to(flat))
        .route("/grouped", get().to(grouped))
}

async fn flat(store: web::Data<Store>, filter: web::Query<HistoryFilter>) -> impl Responder {
    process(&store, &filter, Layout::Flat)
}

async fn grouped(store: web::Data<Store>, filter: web::Query<HistoryFilter>) -> impl Responder {
    process(&store, &filter, Layout::Grouped)
}

fn process(store: &Store, filter: &HistoryFilter, layout: Layout) -> HttpResponse {
    match export(store, filter, layout) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(layout.file_name().to_string())],
            })
            .body(body),
        Err(e) => e.to_response(),
    }
}

fn export(store: &Store, filter: &HistoryFilter, layout: Layout) -> Result<Vec<u8>, ServiceError> {
    let snapshot = store.snapshot()?;
    let directory = snapshot.directory();
    let entries = filter_history(&snapshot.entries, &directory, filter);
    let rows = match layout {
        Layout::Flat => flat_rows(&entries, &directory),
        Layout::Grouped => grouped_rows(&group_by_folder(&entries, &directory), &directory),
    };
    info!("Exporting {} entries as {:?}", entries.len(), layout);
    write_csv(&rows)
}

/// Rows differ in length (blank separators), hence the flexible writer.
fn write_csv(rows: &[Row]) -> Result<Vec<u8>, ServiceError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| ServiceError::Export(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| ServiceError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::services::testing::{test_app, TestContext};
    use crate::store::entries;
    use actix_web::http::header::CONTENT_DISPOSITION;
    use actix_web::test;
    use chrono::NaiveDate;
    use common::model::person::{Department, Role};
    use common::model::time_entry::TimeEntry;

    fn seed(ctx: &TestContext) {
        ctx.add_person("p1", Department::Audit, Role::Collaborator);
        ctx.add_person("p2", Department::Audit, Role::Collaborator);
        ctx.add_folder("f1", "F-1", 40.0);
        let conn = ctx.temp.store.connect().unwrap();
        for (id, person, day, hours) in [("e1", "p1", 10, 6.0), ("e2", "p2", 11, 4.0)] {
            let entry = TimeEntry {
                id: id.into(),
                person_id: person.into(),
                folder_id: Some("f1".into()),
                hours,
                date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
                description: format!("work, {}", id),
                service: None,
                fiscal_year: "2025".into(),
            };
            entries::upsert(&conn, &entry).unwrap();
        }
    }

    #[actix_web::test]
    async fn flat_export_is_a_csv_attachment() {
        let ctx = TestContext::new();
        seed(&ctx);
        let app = test_app!(ctx);

        let req = test::TestRequest::get().uri("/api/export/flat").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let disposition = resp.headers().get(CONTENT_DISPOSITION).unwrap().to_str().unwrap();
        assert!(disposition.contains("timesheet.csv"));

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "2025-03-11,Person p2,F-1,Folder f1,Audit,CAC2025,\"work, e2\",4"
        );
    }

    #[actix_web::test]
    async fn grouped_export_has_person_shares() {
        let ctx = TestContext::new();
        seed(&ctx);
        let app = test_app!(ctx);

        let req = test::TestRequest::get()
            .uri("/api/export/grouped?person_id=")
            .to_request();
        let body = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();
        assert!(body.contains("AUDIT,F-1 - Folder f1,ACME,,10"));
        assert!(body.contains("Subtotal,Person p1,,60.0%,6"));
        assert!(body.contains("Subtotal,Person p2,,40.0%,4"));
    }
}
