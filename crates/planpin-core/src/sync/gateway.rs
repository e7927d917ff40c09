use crate::error::GatewayError;
use async_trait::async_trait;
use planpin_proto::{FloorPlanVersion, FormResponseRow, MarkupRow, PinRow};
use uuid::Uuid;

/// The remote persistence service the engine reconciles against.
///
/// Calls fail independently, per call; nothing here is transactional across
/// calls. Inserts are not idempotent: resubmitting a batch whose success
/// acknowledgment was lost produces duplicate rows (see the engine docs).
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn insert_pin_batch(&self, rows: &[PinRow]) -> Result<(), GatewayError>;

    async fn insert_form_response(&self, row: &FormResponseRow) -> Result<(), GatewayError>;

    async fn insert_markups(&self, rows: &[MarkupRow]) -> Result<(), GatewayError>;

    /// Upload a file to a storage bucket and return its public URL.
    async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
    ) -> Result<String, GatewayError>;

    /// All versions recorded for a project, ordered by version number.
    async fn list_floor_plan_versions(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<FloorPlanVersion>, GatewayError>;

    async fn insert_floor_plan_version(&self, row: &FloorPlanVersion) -> Result<(), GatewayError>;
}

/// "Is the device online" probe, read at the start of each sync attempt.
///
/// Best-effort only: a wrong answer merely changes which error path runs,
/// since a network failure downstream is handled the same as a deliberate
/// early exit. Injected so the engine's triggering logic is testable without
/// a real network.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}
