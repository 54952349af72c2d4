//! One operator's capture session: resolve an asset, confirm it, enter a reading, submit.
//!
//! [`CaptureMachine`] holds the state and the transition rules and never touches the
//! network. [`CaptureController`] wires it to a [`Backend`], the resolver and the
//! latest-reading cache. Timed transitions are driven by [`CaptureController::tick`];
//! [`CaptureController::next_deadline`] says when the next one is due.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard};
use std::time::Duration;

use labtrack_api::models::*;
use time::OffsetDateTime;
use tokio::time::Instant;

use crate::backend::Backend;
use crate::cache::LatestReadingCache;
use crate::error::{ClientError, Result};
use crate::resolver::{IdentifierResolver, resolve_remote, scanned_code};

/// How long the resolved asset is shown before the form opens.
pub const CONFIRM_DELAY: Duration = Duration::from_millis(1500);

/// How long the success screen stays before the session resets.
pub const RESET_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    Idle,
    Confirming {
        entity: ResolvedEntity,
        until: Instant,
    },
    /// Equipment without a kind; the operator picks one.
    AwaitingInputType { entity: ResolvedEntity },
    DataEntry {
        entity: ResolvedEntity,
        kind: EquipmentKind,
        /// Last submitted values, kept after a failed attempt.
        draft: Option<ReadingDraft>,
    },
    Submitted {
        entity: ResolvedEntity,
        record: SubmittedRecord,
        until: Instant,
    },
}

impl CaptureState {
    pub fn entity(&self) -> Option<&ResolvedEntity> {
        match self {
            CaptureState::Idle => None,
            CaptureState::Confirming { entity, .. }
            | CaptureState::AwaitingInputType { entity }
            | CaptureState::DataEntry { entity, .. }
            | CaptureState::Submitted { entity, .. } => Some(entity),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, CaptureState::Idle)
    }
}

/// Form values as entered. Missing required values are reported on submit.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadingDraft {
    Temperature {
        temperature: Option<f64>,
        humidity: Option<f64>,
        recorded_at: Option<OffsetDateTime>,
    },
    Inspection {
        condition: Option<Condition>,
        notes: Option<String>,
        inspected_at: Option<OffsetDateTime>,
    },
}

impl ReadingDraft {
    pub fn temperature(temperature: f64) -> Self {
        ReadingDraft::Temperature {
            temperature: Some(temperature),
            humidity: None,
            recorded_at: None,
        }
    }

    pub fn inspection(condition: Condition) -> Self {
        ReadingDraft::Inspection {
            condition: Some(condition),
            notes: None,
            inspected_at: None,
        }
    }

    pub fn kind(&self) -> EquipmentKind {
        match self {
            ReadingDraft::Temperature { .. } => EquipmentKind::Temperature,
            ReadingDraft::Inspection { .. } => EquipmentKind::Inspection,
        }
    }

    fn to_submission(&self, entity: &ResolvedEntity) -> Result<Submission> {
        match (self, entity) {
            (
                ReadingDraft::Temperature {
                    temperature,
                    humidity,
                    recorded_at,
                },
                entity,
            ) => {
                let temperature = temperature
                    .ok_or_else(|| ClientError::field("temperature", "temperature is required"))?;
                let request = CreateTemperatureReadingRequest {
                    temperature,
                    humidity: *humidity,
                    recorded_at: *recorded_at,
                };
                request.validate(entity.records_humidity())?;

                Ok(match entity {
                    ResolvedEntity::Room(room) => Submission::RoomReading(room.id, request),
                    ResolvedEntity::Equipment(equipment) => {
                        Submission::EquipmentReading(equipment.id, request)
                    }
                })
            }
            (
                ReadingDraft::Inspection {
                    condition,
                    notes,
                    inspected_at,
                },
                ResolvedEntity::Equipment(equipment),
            ) => {
                let condition = condition
                    .ok_or_else(|| ClientError::field("condition", "condition is required"))?;
                let request = CreateInspectionRequest {
                    condition,
                    notes: notes
                        .as_deref()
                        .map(str::trim)
                        .filter(|notes| !notes.is_empty())
                        .map(str::to_string),
                    inspected_at: *inspected_at,
                };
                request.validate()?;

                Ok(Submission::Inspection(equipment.id, request))
            }
            (ReadingDraft::Inspection { .. }, ResolvedEntity::Room(_)) => Err(
                ClientError::InvalidState("rooms take temperature readings only"),
            ),
        }
    }
}

/// Stored record returned by the server for a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmittedRecord {
    RoomReading(TemperatureLogResponse),
    EquipmentReading(EquipmentTemperatureLogResponse),
    Inspection(InspectionResponse),
}

impl SubmittedRecord {
    pub fn id(&self) -> i32 {
        match self {
            SubmittedRecord::RoomReading(record) => record.id,
            SubmittedRecord::EquipmentReading(record) => record.id,
            SubmittedRecord::Inspection(record) => record.id,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        match self {
            SubmittedRecord::RoomReading(record) => EntityId::Room(record.room_id),
            SubmittedRecord::EquipmentReading(record) => EntityId::Equipment(record.equipment_id),
            SubmittedRecord::Inspection(record) => EntityId::Equipment(record.equipment_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The session moved to `Confirming` for this entity.
    Resolved(EntityId),
    /// A resolution was already running or an entity is already selected.
    Ignored,
    /// The session was cancelled while the lookup was in flight.
    Discarded,
}

/// Validated request ready to send.
#[derive(Debug, Clone)]
enum Submission {
    RoomReading(i32, CreateTemperatureReadingRequest),
    EquipmentReading(i32, CreateTemperatureReadingRequest),
    Inspection(i32, CreateInspectionRequest),
}

impl Submission {
    async fn send<B: Backend + ?Sized>(&self, backend: &B) -> Result<SubmittedRecord> {
        match self {
            Submission::RoomReading(room_id, request) => backend
                .submit_room_reading(*room_id, request)
                .await
                .map(SubmittedRecord::RoomReading),
            Submission::EquipmentReading(equipment_id, request) => backend
                .submit_equipment_reading(*equipment_id, request)
                .await
                .map(SubmittedRecord::EquipmentReading),
            Submission::Inspection(equipment_id, request) => backend
                .submit_inspection(*equipment_id, request)
                .await
                .map(SubmittedRecord::Inspection),
        }
    }
}

/// Proof that an async step was started in a given session generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

#[derive(Debug)]
pub struct CaptureMachine {
    state: CaptureState,
    generation: u64,
    resolving: bool,
    submitting: bool,
}

impl Default for CaptureMachine {
    fn default() -> Self {
        Self {
            state: CaptureState::Idle,
            generation: 0,
            resolving: false,
            submitting: false,
        }
    }
}

impl CaptureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn is_resolving(&self) -> bool {
        self.resolving
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.generation,
        }
    }

    /// `None` when the scan must be ignored.
    pub fn begin_resolution(&mut self) -> Option<Ticket> {
        if self.resolving || !self.state.is_idle() {
            return None;
        }

        self.resolving = true;
        Some(self.ticket())
    }

    pub fn finish_resolution(
        &mut self,
        ticket: Ticket,
        result: Result<ResolvedEntity>,
        now: Instant,
    ) -> Result<ScanOutcome> {
        if ticket != self.ticket() {
            log::debug!("dropping resolution from cancelled session");
            return Ok(ScanOutcome::Discarded);
        }

        self.resolving = false;
        let entity = result?;
        let id = entity.entity_id();
        self.confirm(entity, now);

        Ok(ScanOutcome::Resolved(id))
    }

    /// Manual pick from a list.
    pub fn select(&mut self, entity: ResolvedEntity, now: Instant) -> Result<()> {
        if self.resolving {
            return Err(ClientError::Busy);
        }
        if !self.state.is_idle() {
            return Err(ClientError::InvalidState("finish or cancel the current capture first"));
        }

        self.confirm(entity, now);
        Ok(())
    }

    fn confirm(&mut self, entity: ResolvedEntity, now: Instant) {
        log::info!("capturing {} ({})", entity.name(), entity.barcode());
        self.state = CaptureState::Confirming {
            entity,
            until: now + CONFIRM_DELAY,
        };
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.state {
            CaptureState::Confirming { until, .. } | CaptureState::Submitted { until, .. } => {
                Some(*until)
            }
            _ => None,
        }
    }

    /// Applies a due timed transition. Returns true when the state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.next_deadline() {
            Some(until) if until <= now => {}
            _ => return false,
        }

        self.state = match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Confirming { entity, .. } => match entity.inferred_kind() {
                Some(kind) => CaptureState::DataEntry {
                    entity,
                    kind,
                    draft: None,
                },
                None => CaptureState::AwaitingInputType { entity },
            },
            CaptureState::Submitted { .. } => CaptureState::Idle,
            other => other,
        };
        true
    }

    pub fn choose_kind(&mut self, kind: EquipmentKind) -> Result<()> {
        let CaptureState::AwaitingInputType { entity } = &self.state else {
            return Err(ClientError::InvalidState("no reading kind to choose"));
        };

        let supported = match entity {
            ResolvedEntity::Room(_) => vec![EquipmentKind::Temperature],
            ResolvedEntity::Equipment(equipment) => equipment.supported_kinds(),
        };
        if !supported.contains(&kind) {
            return Err(ClientError::field(
                "kind",
                format!("{kind} readings are not recorded for this asset"),
            ));
        }

        self.state = CaptureState::DataEntry {
            entity: entity.clone(),
            kind,
            draft: None,
        };
        Ok(())
    }

    /// Validates `draft` and marks a submission in flight. The draft is kept in the state
    /// whether or not it validates.
    fn begin_submission(&mut self, draft: ReadingDraft) -> Result<(Ticket, Submission)> {
        if self.submitting {
            return Err(ClientError::Busy);
        }

        let CaptureState::DataEntry {
            entity,
            kind,
            draft: stored,
        } = &mut self.state
        else {
            return Err(ClientError::InvalidState("no asset ready for a reading"));
        };

        if draft.kind() != *kind {
            return Err(ClientError::field(
                "kind",
                format!("expected a {kind} reading, got {}", draft.kind()),
            ));
        }

        let submission = draft.to_submission(entity);
        *stored = Some(draft);
        let submission = submission?;

        self.submitting = true;
        Ok((self.ticket(), submission))
    }

    fn finish_submission(
        &mut self,
        ticket: Ticket,
        result: Result<SubmittedRecord>,
        now: Instant,
    ) -> Result<SubmittedRecord> {
        self.submitting = false;

        let record = result?;
        if ticket != self.ticket() {
            return Ok(record);
        }

        if let CaptureState::DataEntry { entity, .. } = &self.state {
            self.state = CaptureState::Submitted {
                entity: entity.clone(),
                record: record.clone(),
                until: now + RESET_DELAY,
            };
        }

        Ok(record)
    }

    /// Returns to `Idle` from anywhere except mid-submission. In-flight lookups are
    /// discarded when they complete.
    pub fn cancel(&mut self) -> Result<()> {
        if self.submitting {
            return Err(ClientError::Busy);
        }

        self.state = CaptureState::Idle;
        self.resolving = false;
        self.generation = self.generation.wrapping_add(1);
        Ok(())
    }
}

/// Drives one capture session against a backend.
pub struct CaptureController<B: Backend> {
    backend: Arc<B>,
    resolver: RwLock<IdentifierResolver>,
    machine: Mutex<CaptureMachine>,
    cache: Arc<LatestReadingCache>,
}

impl<B: Backend> CaptureController<B> {
    pub fn new(backend: Arc<B>, cache: Arc<LatestReadingCache>) -> Self {
        Self {
            backend,
            resolver: RwLock::new(IdentifierResolver::default()),
            machine: Mutex::new(CaptureMachine::new()),
            cache,
        }
    }

    fn machine(&self) -> MutexGuard<'_, CaptureMachine> {
        self.machine
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn resolver(&self) -> RwLockReadGuard<'_, IdentifierResolver> {
        self.resolver
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Refreshes the room and equipment lists used for local resolution.
    pub async fn load_entities(&self) -> Result<()> {
        let resolver = IdentifierResolver::load(self.backend.as_ref()).await?;

        *self
            .resolver
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = resolver;
        Ok(())
    }

    pub fn rooms(&self) -> Vec<RoomResponse> {
        self.resolver().rooms().to_vec()
    }

    pub fn equipment(&self) -> Vec<EquipmentResponse> {
        self.resolver().equipment().to_vec()
    }

    pub fn state(&self) -> CaptureState {
        self.machine().state().clone()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.machine().next_deadline()
    }

    pub fn tick(&self) -> bool {
        self.machine().tick(Instant::now())
    }

    /// Handles a decoded scan or a typed code.
    pub async fn scan(&self, payload: &str) -> Result<ScanOutcome> {
        let Some(ticket) = self.machine().begin_resolution() else {
            log::debug!("scan ignored, session busy");
            return Ok(ScanOutcome::Ignored);
        };

        let result = self.resolve(payload).await;
        self.machine().finish_resolution(ticket, result, Instant::now())
    }

    async fn resolve(&self, payload: &str) -> Result<ResolvedEntity> {
        let code = scanned_code(payload)?;

        let local = self.resolver().resolve_local(code);
        match local {
            Some(entity) => Ok(entity),
            None => resolve_remote(self.backend.as_ref(), code).await,
        }
    }

    pub fn select(&self, id: EntityId) -> Result<()> {
        let entity = self.resolver().select(id).ok_or_else(|| {
            let payload = match id {
                EntityId::Room(id) => format!("room #{id}"),
                EntityId::Equipment(id) => format!("equipment #{id}"),
            };
            ClientError::NotFound { payload }
        })?;

        self.machine().select(entity, Instant::now())
    }

    pub fn choose_kind(&self, kind: EquipmentKind) -> Result<()> {
        self.machine().choose_kind(kind)
    }

    /// Validates and sends `draft`. Nothing is sent when validation fails.
    pub async fn submit(&self, draft: ReadingDraft) -> Result<SubmittedRecord> {
        let (ticket, submission) = self.machine().begin_submission(draft)?;

        let result = submission.send(self.backend.as_ref()).await;
        if let Err(e) = &result {
            log::warn!("submission failed: {e}");
        }

        let record = self
            .machine()
            .finish_submission(ticket, result, Instant::now())?;
        log::info!("stored record {} for {:?}", record.id(), record.entity_id());

        self.cache.invalidate(record.entity_id());
        if let Err(e) = self.cache.refresh(self.backend.as_ref()).await {
            log::warn!("latest readings not refreshed: {e}");
        }

        Ok(record)
    }

    pub fn cancel(&self) -> Result<()> {
        self.machine().cancel()
    }
}
