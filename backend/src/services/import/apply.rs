use crate::error::{ServiceError, StoreError};
use crate::services::entries::write_entry;
use crate::services::folders::write_folder;
use crate::services::people::write_person;
use crate::store::Store;
use actix_web::{web, HttpResponse, Responder};
use chrono::{Local, NaiveDate};
use common::requests::{ApplyImportOutcome, ApplyImportRequest};
use common::rules::import::ImportedRecord;
use log::{info, warn};

pub(crate) async fn process(
    store: web::Data<Store>,
    req: web::Json<ApplyImportRequest>,
) -> impl Responder {
    match apply_import(&store, req.into_inner(), Local::now().date_naive()) {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.to_response(),
    }
}

/// Writes every record in one transaction. A record that fails validation
/// is reported and skipped; a datastore failure aborts the whole import.
fn apply_import(
    store: &Store,
    req: ApplyImportRequest,
    today: NaiveDate,
) -> Result<ApplyImportOutcome, ServiceError> {
    let mut conn = store.connect()?;
    let tx = conn.transaction()?;
    let mut written = 0;
    let mut rejected = Vec::new();

    for (idx, record) in req.records.into_iter().enumerate() {
        let result = match record {
            ImportedRecord::Person(form) => write_person(&tx, form).map(|_| ()),
            ImportedRecord::Folder(form) => write_folder(&tx, form).map(|_| ()),
            ImportedRecord::Entry(form) => write_entry(&tx, form, None, today).map(|_| ()),
        };
        match result {
            Ok(()) => written += 1,
            Err(ServiceError::Store(e)) => return Err(e.into()),
            Err(e) => {
                warn!("Import record {} rejected: {}", idx, e);
                rejected.push((idx, e.to_string()));
            }
        }
    }
    tx.commit().map_err(StoreError::from)?;
    info!("Import applied: {} written, {} rejected", written, rejected.len());

    Ok(ApplyImportOutcome {
        written,
        rejected,
        snapshot: store.snapshot()?,
    })
}
