use async_trait::async_trait;
use planpin_core::capture::CaptureSession;
use planpin_core::error::{GatewayError, SyncError, ValidationError};
use planpin_core::models::{FieldKind, FormDefinition, FormField, FormSchema, Markup, PhotoRef};
use planpin_core::storage::OfflineQueue;
use planpin_core::sync::{
    publish_version, save_form_response, save_markups, save_pins, ConnectivityProbe, Gateway,
    SaveReceipt, SyncEngine, SyncReport,
};
use planpin_proto::{
    Category, FloorPlanVersion, FormResponseRow, MarkupRow, PinRow, PinStatus, Point, WriteBatch,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Gateway double that rejects scripted insert attempts and records the rest.
#[derive(Clone, Default)]
struct ScriptedGateway {
    state: Arc<GatewayState>,
}

#[derive(Default)]
struct GatewayState {
    fail_on: Mutex<HashSet<usize>>,
    attempts: AtomicUsize,
    pin_calls: Mutex<Vec<Vec<PinRow>>>,
    form_calls: Mutex<Vec<FormResponseRow>>,
    markup_calls: Mutex<Vec<Vec<MarkupRow>>>,
    uploads: Mutex<Vec<String>>,
    versions: Mutex<Vec<FloorPlanVersion>>,
}

impl ScriptedGateway {
    fn failing_on(indices: &[usize]) -> Self {
        let gateway = Self::default();
        *gateway.state.fail_on.lock().unwrap() = indices.iter().copied().collect();
        gateway
    }

    fn check_attempt(&self) -> Result<(), GatewayError> {
        let attempt = self.state.attempts.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_on.lock().unwrap().contains(&attempt) {
            return Err(GatewayError::Api {
                status: 500,
                message: "insert failed".to_string(),
            });
        }
        Ok(())
    }

    fn attempts(&self) -> usize {
        self.state.attempts.load(Ordering::SeqCst)
    }

    fn pin_calls(&self) -> Vec<Vec<PinRow>> {
        self.state.pin_calls.lock().unwrap().clone()
    }

    fn form_calls(&self) -> Vec<FormResponseRow> {
        self.state.form_calls.lock().unwrap().clone()
    }

    fn uploads(&self) -> Vec<String> {
        self.state.uploads.lock().unwrap().clone()
    }

    fn seed_version(&self, version_number: u32) {
        let project_id = Uuid::new_v4();
        self.state.versions.lock().unwrap().push(FloorPlanVersion {
            id: Uuid::new_v4(),
            project_id,
            version_number,
            file_url: format!("https://cdn.test/floorplans/v{version_number}.png"),
            uploaded_by: None,
            created_at: chrono::Utc::now(),
        });
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn insert_pin_batch(&self, rows: &[PinRow]) -> Result<(), GatewayError> {
        self.check_attempt()?;
        self.state.pin_calls.lock().unwrap().push(rows.to_vec());
        Ok(())
    }

    async fn insert_form_response(&self, row: &FormResponseRow) -> Result<(), GatewayError> {
        self.check_attempt()?;
        self.state.form_calls.lock().unwrap().push(row.clone());
        Ok(())
    }

    async fn insert_markups(&self, rows: &[MarkupRow]) -> Result<(), GatewayError> {
        self.state.markup_calls.lock().unwrap().push(rows.to_vec());
        Ok(())
    }

    async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, GatewayError> {
        let url = format!("https://cdn.test/{bucket}/{path}");
        self.state.uploads.lock().unwrap().push(url.clone());
        Ok(url)
    }

    async fn list_floor_plan_versions(
        &self,
        _project_id: Uuid,
    ) -> Result<Vec<FloorPlanVersion>, GatewayError> {
        Ok(self.state.versions.lock().unwrap().clone())
    }

    async fn insert_floor_plan_version(&self, row: &FloorPlanVersion) -> Result<(), GatewayError> {
        self.state.versions.lock().unwrap().push(row.clone());
        Ok(())
    }
}

#[derive(Clone)]
struct StaticProbe {
    online: Arc<AtomicBool>,
}

impl StaticProbe {
    fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectivityProbe for StaticProbe {
    async fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

fn temp_queue() -> (tempfile::TempDir, OfflineQueue) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let queue = OfflineQueue::open(&dir.path().join("queue.db")).expect("open queue");
    (dir, queue)
}

fn pin_batch(label: &str) -> WriteBatch {
    let floor_plan_id = Uuid::new_v4();
    WriteBatch::Pins {
        project_id: Uuid::new_v4(),
        floor_plan_id,
        rows: vec![PinRow {
            floor_plan_id,
            x_coord: 0.4,
            y_coord: 0.6,
            status: PinStatus::Complete,
            label: label.to_string(),
            comment: String::new(),
            photo_url: None,
        }],
    }
}

fn inspection_form() -> FormDefinition {
    FormDefinition {
        id: Uuid::new_v4(),
        name: "Handover checklist".to_string(),
        project_id: None,
        schema: FormSchema {
            fields: vec![FormField {
                name: "inspector".to_string(),
                label: "Inspector".to_string(),
                kind: FieldKind::Text,
                required: true,
            }],
        },
    }
}

#[tokio::test]
async fn partial_success_retains_only_the_failed_batch_in_position() {
    let (_dir, mut queue) = temp_queue();
    let batches = [pin_batch("B-1"), pin_batch("B-2"), pin_batch("B-3")];
    for batch in &batches {
        queue.enqueue(batch).unwrap();
    }

    // Backend accepts batches 1 and 3, rejects batch 2.
    let gateway = ScriptedGateway::failing_on(&[1]);
    let engine = SyncEngine::new(gateway.clone(), StaticProbe::new(true));

    let report = engine.sync_category(&mut queue, Category::Pins).await.unwrap();
    assert_eq!(
        report,
        SyncReport {
            attempted: 3,
            succeeded: 2,
            retained: 1
        }
    );

    let remaining = queue.drain(Category::Pins).unwrap();
    assert_eq!(remaining, vec![batches[1].clone()]);

    let accepted: Vec<String> = gateway
        .pin_calls()
        .iter()
        .map(|rows| rows[0].label.clone())
        .collect();
    assert_eq!(accepted, vec!["B-1", "B-3"]);
}

#[tokio::test]
async fn full_success_removes_the_category_key() {
    let (_dir, mut queue) = temp_queue();
    queue.enqueue(&pin_batch("B-1")).unwrap();
    queue.enqueue(&pin_batch("B-2")).unwrap();

    let engine = SyncEngine::new(ScriptedGateway::default(), StaticProbe::new(true));
    let report = engine.sync_category(&mut queue, Category::Pins).await.unwrap();

    assert_eq!(report.succeeded, 2);
    assert!(!queue.has_pending(Category::Pins).unwrap());
}

#[tokio::test]
async fn total_failure_leaves_the_queue_untouched() {
    let (_dir, mut queue) = temp_queue();
    let batches = [pin_batch("B-1"), pin_batch("B-2"), pin_batch("B-3")];
    for batch in &batches {
        queue.enqueue(batch).unwrap();
    }

    let gateway = ScriptedGateway::failing_on(&[0, 1, 2]);
    let engine = SyncEngine::new(gateway, StaticProbe::new(true));
    let report = engine.sync_category(&mut queue, Category::Pins).await.unwrap();

    assert_eq!(report.succeeded, 0);
    assert_eq!(report.retained, 3);
    assert_eq!(queue.drain(Category::Pins).unwrap(), batches.to_vec());
}

#[tokio::test]
async fn offline_sync_is_a_noop() {
    let (_dir, mut queue) = temp_queue();
    queue.enqueue(&pin_batch("B-1")).unwrap();

    let gateway = ScriptedGateway::default();
    let engine = SyncEngine::new(gateway.clone(), StaticProbe::new(false));
    let report = engine.sync_all(&mut queue).await.unwrap();

    assert_eq!(report, SyncReport::default());
    assert_eq!(gateway.attempts(), 0);
    assert_eq!(queue.drain(Category::Pins).unwrap().len(), 1);
}

#[tokio::test]
async fn offline_capture_syncs_once_connectivity_returns() {
    let (_dir, mut queue) = temp_queue();
    let gateway = ScriptedGateway::default();
    let probe = StaticProbe::new(false);
    let project_id = Uuid::new_v4();
    let floor_plan_id = Uuid::new_v4();

    // Capture two pins offline: one complete without a photo, one damage
    // with an already-uploaded photo.
    let mut session = CaptureSession::new();
    session
        .add_pin(
            Point::new(0.25, 0.25),
            PinStatus::Complete,
            "DW-101".to_string(),
            String::new(),
            None,
        )
        .unwrap();
    session
        .add_pin(
            Point::new(0.75, 0.5),
            PinStatus::Damage,
            "DW-102".to_string(),
            "dented frame".to_string(),
            Some(PhotoRef::Uploaded(
                "https://cdn.test/pinphotos/existing.jpg".to_string(),
            )),
        )
        .unwrap();

    let receipt = save_pins(
        &gateway,
        &probe,
        &mut queue,
        project_id,
        floor_plan_id,
        session.pins(),
    )
    .await
    .unwrap();
    assert_eq!(receipt, SaveReceipt::SavedOffline);

    let pending = queue.drain(Category::Pins).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].row_count(), 2);

    // Connectivity returns; one sync invocation sends both rows in one call.
    probe.set_online(true);
    let engine = SyncEngine::new(gateway.clone(), probe.clone());
    engine.sync_all(&mut queue).await.unwrap();

    let calls = gateway.pin_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 2);
    assert_eq!(calls[0][0].status, PinStatus::Complete);
    assert_eq!(
        calls[0][1].photo_url.as_deref(),
        Some("https://cdn.test/pinphotos/existing.jpg")
    );
    assert!(!queue.has_pending(Category::Pins).unwrap());
}

#[tokio::test]
async fn failed_direct_insert_falls_back_to_the_queue() {
    let (_dir, mut queue) = temp_queue();
    let gateway = ScriptedGateway::failing_on(&[0]);
    let probe = StaticProbe::new(true);

    let pins = vec![planpin_core::models::Pin {
        position: Point::new(0.5, 0.5),
        status: PinStatus::Complete,
        label: "DW-103".to_string(),
        comment: String::new(),
        photo: None,
    }];
    let receipt = save_pins(
        &gateway,
        &probe,
        &mut queue,
        Uuid::new_v4(),
        Uuid::new_v4(),
        &pins,
    )
    .await
    .unwrap();

    assert_eq!(receipt, SaveReceipt::SavedOffline);
    assert_eq!(gateway.attempts(), 1);
    assert_eq!(queue.drain(Category::Pins).unwrap().len(), 1);
}

#[tokio::test]
async fn local_photos_are_uploaded_before_the_batch_is_queued() {
    let (dir, mut queue) = temp_queue();
    let gateway = ScriptedGateway::default();
    let probe = StaticProbe::new(false);

    let photo_path = dir.path().join("damage.jpg");
    std::fs::write(&photo_path, b"jpeg bytes").unwrap();

    let pins = vec![planpin_core::models::Pin {
        position: Point::new(0.1, 0.9),
        status: PinStatus::Damage,
        label: "DW-104".to_string(),
        comment: String::new(),
        photo: Some(PhotoRef::Local(photo_path)),
    }];
    save_pins(
        &gateway,
        &probe,
        &mut queue,
        Uuid::new_v4(),
        Uuid::new_v4(),
        &pins,
    )
    .await
    .unwrap();

    let uploads = gateway.uploads();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].contains("/pinphotos/"));

    // The queued row carries the resolved URL, never the local path.
    let pending = queue.drain(Category::Pins).unwrap();
    let WriteBatch::Pins { rows, .. } = &pending[0] else {
        panic!("expected a pin batch");
    };
    assert_eq!(rows[0].photo_url.as_deref(), Some(uploads[0].as_str()));
}

#[tokio::test]
async fn invalid_form_response_never_reaches_the_queue() {
    let (_dir, mut queue) = temp_queue();
    let gateway = ScriptedGateway::default();
    let probe = StaticProbe::new(true);
    let form = inspection_form();

    let err = save_form_response(
        &gateway,
        &probe,
        &mut queue,
        &form,
        Uuid::new_v4(),
        Uuid::new_v4(),
        serde_json::Map::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Validation(ValidationError::MissingField(field)) if field == "inspector"
    ));
    assert_eq!(gateway.attempts(), 0);
    assert!(!queue.has_pending(Category::FormResponses).unwrap());
}

#[tokio::test]
async fn offline_form_response_is_queued_and_synced() {
    let (_dir, mut queue) = temp_queue();
    let gateway = ScriptedGateway::default();
    let probe = StaticProbe::new(false);
    let form = inspection_form();

    let mut values = serde_json::Map::new();
    values.insert("inspector".to_string(), json!("R. Vega"));
    let receipt = save_form_response(
        &gateway,
        &probe,
        &mut queue,
        &form,
        Uuid::new_v4(),
        Uuid::new_v4(),
        values,
    )
    .await
    .unwrap();
    assert_eq!(receipt, SaveReceipt::SavedOffline);
    assert!(queue.has_pending(Category::FormResponses).unwrap());

    probe.set_online(true);
    let engine = SyncEngine::new(gateway.clone(), probe.clone());
    engine.sync_all(&mut queue).await.unwrap();

    let calls = gateway.form_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].form_id, form.id);
    assert!(!queue.has_pending(Category::FormResponses).unwrap());
}

#[tokio::test]
async fn markups_require_connectivity() {
    let gateway = ScriptedGateway::default();
    let probe = StaticProbe::new(false);
    let markups = vec![Markup::rectangle(
        Point::new(0.1, 0.1),
        Point::new(0.5, 0.5),
        "kitchen".to_string(),
        String::new(),
    )];

    let err = save_markups(&gateway, &probe, Uuid::new_v4(), &markups)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Offline));

    probe.set_online(true);
    save_markups(&gateway, &probe, Uuid::new_v4(), &markups)
        .await
        .unwrap();
    assert_eq!(gateway.state.markup_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn publishing_assigns_the_next_version_number() {
    let gateway = ScriptedGateway::default();
    gateway.seed_version(1);
    gateway.seed_version(3);

    let project_id = Uuid::new_v4();
    let published = publish_version(&gateway, project_id, "plan.png", b"png".to_vec(), None)
        .await
        .unwrap();

    assert_eq!(published.version_number, 4);
    assert!(published.file_url.contains("/v4_plan.png"));

    let versions = gateway.state.versions.lock().unwrap().clone();
    assert_eq!(versions.len(), 3);
    assert_eq!(versions.last().unwrap(), &published);
}
