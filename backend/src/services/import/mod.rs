//! Spreadsheet import of people, folders and time entries.
//!
//! - `POST /api/import/{kind}`: multipart upload with a `file` field holding
//!   a `.csv` file. Starts a background verification job and answers with its
//!   id.
//! - `GET /api/import/status/{job_id}`: current `JobStatus` of that job. A
//!   completed job carries the `ImportReport` (parsed records and issues).
//! - `POST /api/import/apply`: writes the reviewed records and answers with
//!   an `ApplyImportOutcome`.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod apply;
mod status;
mod upload;
mod verify;

const API_PATH: &str = "/api/import";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/status/{job_id}", get().to(status::process))
        .route("/apply", post().to(apply::process))
        .route("/{kind}", post().to(upload::process))
}
