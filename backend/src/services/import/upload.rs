use crate::error::ServiceError;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::services::import::verify::verify_import_blocking;
use crate::store::Store;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::rules::import::ImportKind;
use futures_util::StreamExt;
use log::{error, info};

pub(crate) async fn process(
    kind: web::Path<String>,
    payload: Multipart,
    store: web::Data<Store>,
    jobs_state: web::Data<JobsState>,
) -> impl Responder {
    match schedule_import(&kind, payload, &store, &jobs_state).await {
        Ok(job_id) => HttpResponse::Ok().body(job_id),
        Err(e) => e.to_response(),
    }
}

/// Reads the `file` field of the form. Other fields are ignored.
async fn read_csv_field(mut payload: Multipart) -> Result<Vec<u8>, ServiceError> {
    let upload_error = |e: actix_multipart::MultipartError| ServiceError::Upload(e.to_string());
    let mut bytes: Option<Vec<u8>> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(upload_error)?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if name.as_deref() != Some("file") {
            continue;
        }
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        if !filename.to_lowercase().ends_with(".csv") {
            return Err(ServiceError::Upload("the file must end with .csv".into()));
        }
        let mut buf = Vec::new();
        while let Some(chunk) = field.next().await {
            buf.extend_from_slice(&chunk.map_err(upload_error)?);
        }
        bytes = Some(buf);
    }

    bytes.ok_or_else(|| ServiceError::Upload("missing file".into()))
}

async fn schedule_import(
    kind: &str,
    payload: Multipart,
    store: &Store,
    jobs_state: &JobsState,
) -> Result<String, ServiceError> {
    let kind = kind.parse::<ImportKind>().map_err(ServiceError::Upload)?;
    let bytes = read_csv_field(payload).await?;
    let job_id = jobs_state.register().await;
    info!("Import job {} started: {:?}, {} bytes", job_id, kind, bytes.len());

    let tx = jobs_state.tx.clone();
    let store = store.clone();
    let value = job_id.clone();

    tokio::spawn(async move {
        let tx_block = tx.clone();
        let job_for_blocking = value.clone();

        let handle = tokio::task::spawn_blocking(move || {
            verify_import_blocking(tx_block, job_for_blocking, kind, bytes, store)
        });

        // The final status goes through the channel as well, so it cannot be
        // overtaken by a progress update still in flight.
        let status = match handle.await {
            Ok(Ok(report)) => {
                info!(
                    "Import job {} verified: {} records, {} issues",
                    value,
                    report.records.len(),
                    report.issues.len()
                );
                JobStatus::Completed(report)
            }
            Ok(Err(e)) => {
                error!("Import job {} failed: {}", value, e);
                JobStatus::Failed(e)
            }
            Err(join_err) => JobStatus::Failed(format!("join error: {}", join_err)),
        };
        let _ = tx.send(JobUpdate { job_id: value, status }).await;
    });

    Ok(job_id)
}
