use crate::error::{StorageError, SyncError};
use crate::models::floorplan::next_version;
use crate::models::{FormDefinition, Markup, PhotoRef, Pin};
use crate::storage::OfflineQueue;
use crate::sync::gateway::{ConnectivityProbe, Gateway};
use chrono::Utc;
use planpin_proto::{FloorPlanVersion, MarkupRow, PinRow, WriteBatch};
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

/// Storage bucket for floor-plan images.
pub const FLOORPLAN_BUCKET: &str = "floorplans";
/// Storage bucket for pin photos.
pub const PIN_PHOTO_BUCKET: &str = "pinphotos";

/// How a save request left the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveReceipt {
    /// The batch reached the backend directly.
    Synced,
    /// The batch is queued locally and will sync on the next connectivity
    /// event ("saved offline, will sync").
    SavedOffline,
}

/// Save placed pins for a floor plan.
///
/// Photos are uploaded and rows fully resolved before the batch exists; the
/// batch then goes straight to the backend when the probe reports online, or
/// into the offline queue otherwise. A direct insert that fails is queued
/// rather than lost and reported as saved-offline.
pub async fn save_pins<G: Gateway, P: ConnectivityProbe>(
    gateway: &G,
    probe: &P,
    queue: &mut OfflineQueue,
    project_id: Uuid,
    floor_plan_id: Uuid,
    pins: &[Pin],
) -> Result<SaveReceipt, SyncError> {
    if pins.is_empty() {
        return Ok(SaveReceipt::Synced);
    }

    let rows = resolve_pin_rows(gateway, floor_plan_id, pins).await?;

    if probe.is_online().await {
        match gateway.insert_pin_batch(&rows).await {
            Ok(()) => {
                info!(%floor_plan_id, rows = rows.len(), "pin batch saved");
                return Ok(SaveReceipt::Synced);
            }
            Err(err) => {
                warn!(%floor_plan_id, %err, "direct pin insert failed, falling back to the queue");
            }
        }
    }

    queue.enqueue(&WriteBatch::Pins {
        project_id,
        floor_plan_id,
        rows,
    })?;
    info!(%floor_plan_id, "pin batch queued for sync");
    Ok(SaveReceipt::SavedOffline)
}

/// Validate and save a structured form response.
///
/// Validation failures are returned to the caller for correction and never
/// queued; a valid response follows the same direct-or-queue split as pins.
pub async fn save_form_response<G: Gateway, P: ConnectivityProbe>(
    gateway: &G,
    probe: &P,
    queue: &mut OfflineQueue,
    form: &FormDefinition,
    project_id: Uuid,
    submitted_by: Uuid,
    values: Map<String, Value>,
) -> Result<SaveReceipt, SyncError> {
    let row = form.response(project_id, submitted_by, values)?;

    if probe.is_online().await {
        match gateway.insert_form_response(&row).await {
            Ok(()) => {
                info!(form_id = %row.form_id, "form response saved");
                return Ok(SaveReceipt::Synced);
            }
            Err(err) => {
                warn!(form_id = %row.form_id, %err, "direct form insert failed, falling back to the queue");
            }
        }
    }

    queue.enqueue(&WriteBatch::FormResponse { row })?;
    Ok(SaveReceipt::SavedOffline)
}

/// Save rectangle and line markups.
///
/// Markups are never queued; saving them requires connectivity.
pub async fn save_markups<G: Gateway, P: ConnectivityProbe>(
    gateway: &G,
    probe: &P,
    floor_plan_id: Uuid,
    markups: &[Markup],
) -> Result<(), SyncError> {
    if markups.is_empty() {
        return Ok(());
    }
    if !probe.is_online().await {
        return Err(SyncError::Offline);
    }
    let rows: Vec<MarkupRow> = markups.iter().map(|m| m.to_row(floor_plan_id)).collect();
    gateway.insert_markups(&rows).await?;
    info!(%floor_plan_id, rows = rows.len(), "markups saved");
    Ok(())
}

/// Upload a new floor-plan image and append it to the project's version
/// ledger.
///
/// The version number comes from a fresh listing taken immediately before
/// the insert, never from a cached copy. Two racing sessions can still pick
/// the same number; the last insert wins it.
pub async fn publish_version<G: Gateway>(
    gateway: &G,
    project_id: Uuid,
    file_name: &str,
    bytes: Vec<u8>,
    uploaded_by: Option<Uuid>,
) -> Result<FloorPlanVersion, SyncError> {
    let existing = gateway.list_floor_plan_versions(project_id).await?;
    let version_number = next_version(&existing);

    let object = format!("{project_id}/v{version_number}_{file_name}");
    let file_url = gateway.upload_file(FLOORPLAN_BUCKET, &object, bytes).await?;

    let row = FloorPlanVersion {
        id: Uuid::new_v4(),
        project_id,
        version_number,
        file_url,
        uploaded_by,
        created_at: Utc::now(),
    };
    gateway.insert_floor_plan_version(&row).await?;
    info!(%project_id, version_number, "published floor plan version");
    Ok(row)
}

/// Upload any still-local pin photos and return fully-resolved rows.
///
/// Runs strictly before batch construction: a batch never carries an
/// unresolved local photo reference, and a failed upload fails the save
/// before anything is queued.
async fn resolve_pin_rows<G: Gateway>(
    gateway: &G,
    floor_plan_id: Uuid,
    pins: &[Pin],
) -> Result<Vec<PinRow>, SyncError> {
    let mut rows = Vec::with_capacity(pins.len());
    for pin in pins {
        let photo_url = match &pin.photo {
            None => None,
            Some(PhotoRef::Uploaded(url)) => Some(url.clone()),
            Some(PhotoRef::Local(path)) => {
                let bytes = tokio::fs::read(path).await.map_err(StorageError::from)?;
                let object = format!(
                    "{}/{}_{}.jpg",
                    floor_plan_id,
                    Uuid::new_v4(),
                    object_name(&pin.label)
                );
                Some(gateway.upload_file(PIN_PHOTO_BUCKET, &object, bytes).await?)
            }
        };
        rows.push(PinRow {
            floor_plan_id,
            x_coord: pin.position.x,
            y_coord: pin.position.y,
            status: pin.status,
            label: pin.label.clone(),
            comment: pin.comment.clone(),
            photo_url,
        });
    }
    Ok(rows)
}

/// Make a label safe to embed in a storage object path.
fn object_name(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '-',
        })
        .collect()
}
