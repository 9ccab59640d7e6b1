use glam::Vec3;
use vigil_collision::{CollisionError, CollisionIndex};
use vigil_common::Record;
use vigil_input::{Action, InputState};
use vigil_kernel::{Field, FieldEvent, GridLayout, IngestError, LayoutError};
use vigil_lod::{FrameTimer, LabelTransition, LodEngine, LodFrame, TimingSummary};
use vigil_motion::{MotionPhase, MovementResolver, ObserverState, StepOutcome};

use crate::config::{ConfigError, FieldConfig};
use crate::source::{RecordSource, SourceError};

/// Errors that end or refuse a session operation.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("could not establish record count: {0}")]
    Count(#[source] SourceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Collision(#[from] CollisionError),
}

/// Whether the observer has been released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Hovering at the start height; motion is frozen.
    AwaitingBegin,
    /// Falling or walking.
    Running,
}

/// What one [`FieldSession::tick`] did.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub frame: u64,
    pub phase: SessionPhase,
    /// `None` while awaiting begin.
    pub step: Option<StepOutcome>,
    pub observer: ObserverState,
    pub lod: LodFrame,
}

/// Owns the field, its colliders, the label engine and the observer.
#[derive(Debug)]
pub struct FieldSession {
    config: FieldConfig,
    field: Field,
    colliders: CollisionIndex,
    lod: LodEngine,
    resolver: MovementResolver,
    observer: ObserverState,
    input: InputState,
    phase: SessionPhase,
    frame: u64,
    timer: FrameTimer,
}

impl FieldSession {
    /// Build an empty session sized for `total_count` records.
    pub fn new(config: FieldConfig, total_count: usize) -> Result<Self, SessionError> {
        config.validate()?;
        let spacing = config.spacing();
        let layout = GridLayout::new(total_count, spacing)?;
        let resolver = MovementResolver::new(config.motion);
        let observer = resolver.spawn(config.spawn.x, config.spawn.z);

        tracing::info!(
            total_count,
            spacing,
            grid_side = layout.grid_side(),
            policy = ?config.label_policy,
            "field session created"
        );

        Ok(Self {
            field: Field::new(layout, config.anchor),
            colliders: CollisionIndex::new(spacing),
            lod: LodEngine::new(config.lod_rules(), config.lod_scan),
            resolver,
            observer,
            input: InputState::new(),
            phase: SessionPhase::AwaitingBegin,
            frame: 0,
            timer: FrameTimer::default(),
            config,
        })
    }

    /// Ask `source` for its record count and build a session for it.
    /// Without a count no layout exists, so failure here is fatal.
    pub fn establish(
        config: FieldConfig,
        source: &mut impl RecordSource,
    ) -> Result<Self, SessionError> {
        let total = source.total_count().map_err(|e| {
            tracing::error!(error = %e, "record count unavailable");
            SessionError::Count(e)
        })?;
        Self::new(config, total)
    }

    /// Place a batch and register its colliders. Returns how many landed.
    pub fn ingest_batch(&mut self, batch: Vec<Record>) -> Result<usize, SessionError> {
        let placed = self.field.ingest_batch(batch)?;
        for p in placed {
            self.colliders.add_bound(p)?;
        }
        let count = placed.len();

        for event in self.field.drain_events() {
            match event {
                FieldEvent::BatchIngested { first_index, count } => {
                    tracing::debug!(first_index, count, colliders = self.colliders.len(), "batch placed");
                }
            }
        }
        Ok(count)
    }

    /// Queue an input action for the next tick.
    pub fn handle(&mut self, action: Action) {
        self.input.apply(action);
    }

    /// Release the observer. Same as handling [`Action::Begin`].
    pub fn begin(&mut self) {
        self.input.apply(Action::Begin);
    }

    /// Run one frame: consume input, move the observer, update labels.
    pub fn tick(&mut self, dt: f32, view_forward: Vec3) -> FrameReport {
        let _span = tracing::info_span!("session_tick", frame = self.frame).entered();

        if self.input.take_begin() && self.phase == SessionPhase::AwaitingBegin {
            self.phase = SessionPhase::Running;
            tracing::info!(placed = self.field.len(), "drop started");
        }

        let step = match self.phase {
            SessionPhase::AwaitingBegin => None,
            SessionPhase::Running => Some(self.resolver.step(
                &mut self.observer,
                self.input.intent(),
                view_forward,
                dt,
                &self.colliders,
            )),
        };

        let lod = self.lod.evaluate(self.observer.position, self.field.records());
        self.timer.record(lod.stats.elapsed);

        let report = FrameReport {
            frame: self.frame,
            phase: self.phase,
            step,
            observer: self.observer,
            lod,
        };
        self.frame += 1;
        report
    }

    /// Destroy every live label, e.g. on teardown.
    pub fn clear_labels(&mut self) -> Vec<LabelTransition> {
        self.lod.clear()
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn colliders(&self) -> &CollisionIndex {
        &self.colliders
    }

    pub fn lod(&self) -> &LodEngine {
        &self.lod
    }

    pub fn observer(&self) -> &ObserverState {
        &self.observer
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn motion_phase(&self) -> MotionPhase {
        self.resolver.phase()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Label pass timings over the recent window.
    pub fn lod_timing(&self) -> TimingSummary {
        self.timer.summary()
    }
}
