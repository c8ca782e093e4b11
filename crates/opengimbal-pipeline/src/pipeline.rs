//! Ordered, bypassable, memoizing stage chain.

use opengimbal_stages::{Stage, StageKind};
use tracing::debug;

/// Maximum number of stages a pipeline can hold.
pub const PIPELINE_CAPACITY: usize = 5;

/// Fixed-capacity ordered chain of transform stages.
///
/// Stages evaluate in insertion order and are never reordered. The pipeline
/// memoizes the value entering each stage plus the final output; see
/// [`evaluate`](TransformPipeline::evaluate) for the short-circuit rules.
///
/// The pipeline owns its stages. Parameter mutation goes through
/// [`stage_mut`](TransformPipeline::stage_mut) or
/// [`stage_of_kind_mut`](TransformPipeline::stage_of_kind_mut); the stages
/// report such changes through their changed flags, which the next
/// evaluation observes and acknowledges.
#[derive(Debug, Default)]
pub struct TransformPipeline {
    stages: [Option<Stage>; PIPELINE_CAPACITY],
    // memo[i] = value that entered stage i on the previous evaluation;
    // memo[len] = previous final output.
    memo: [i16; PIPELINE_CAPACITY + 1],
    len: usize,
    force_recompute: bool,
}

impl TransformPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self {
            stages: Default::default(),
            memo: [0; PIPELINE_CAPACITY + 1],
            len: 0,
            force_recompute: true,
        }
    }

    /// Appends a stage at the tail.
    ///
    /// Discards the stage silently when the pipeline is already holding
    /// [`PIPELINE_CAPACITY`] stages. Any accepted append invalidates the
    /// memoized output.
    pub fn add_stage(&mut self, stage: Stage) {
        if self.len == PIPELINE_CAPACITY {
            debug!(kind = ?stage.kind(), "pipeline full, stage discarded");
            return;
        }
        self.stages[self.len] = Some(stage);
        self.len += 1;
        self.force_recompute = true;
    }

    /// Removes the stage at `index`, left-compacting the remainder.
    ///
    /// Relative order of the surviving stages is preserved. Returns `None`
    /// without touching anything when `index` is out of range.
    pub fn remove_stage(&mut self, index: usize) -> Option<Stage> {
        if index >= self.len {
            return None;
        }
        let removed = self.stages[index].take();
        for i in index..self.len - 1 {
            self.stages[i] = self.stages[i + 1].take();
        }
        self.len -= 1;
        self.force_recompute = true;
        removed
    }

    /// Evaluates the chain on one raw sample.
    ///
    /// Walking the stages in order, if the value entering stage `i` equals
    /// what entered it on the previous evaluation, no stage has reported a
    /// configuration change, and stage `i` is not inherently stateful, the
    /// whole evaluation short-circuits and the previous final output is
    /// returned. A stateful stage (the moving-average filter) defeats the
    /// comparison at its own position because its output evolves regardless
    /// of input equality.
    ///
    /// Bypassed stages pass their input through unchanged. An empty pipeline
    /// is the identity.
    pub fn evaluate(&mut self, raw: i16) -> i16 {
        if self.take_stage_changes() {
            self.force_recompute = true;
        }

        let mut value = raw;
        for i in 0..self.len {
            let Some(stage) = self.stages[i].as_mut() else {
                continue;
            };
            if self.memo[i] == value && !self.force_recompute && !stage.is_stateful() {
                return self.memo[self.len];
            }
            self.memo[i] = value;
            if !stage.is_bypassed() {
                value = stage.compute(value);
            }
        }
        self.memo[self.len] = value;
        self.force_recompute = false;
        value
    }

    /// Pre-loads every memo slot with `level`.
    ///
    /// Useful at startup so the first steady-state evaluation of a sensor
    /// resting at `level` can already short-circuit.
    pub fn reset_memo(&mut self, level: i16) {
        self.memo = [level; PIPELINE_CAPACITY + 1];
    }

    /// Number of stages currently in the chain.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the chain holds no stages.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The stage at `index`, in insertion order.
    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index).and_then(|slot| slot.as_ref())
    }

    /// Mutable access to the stage at `index`.
    pub fn stage_mut(&mut self, index: usize) -> Option<&mut Stage> {
        self.stages.get_mut(index).and_then(|slot| slot.as_mut())
    }

    /// Mutable access to the first stage of the given kind.
    pub fn stage_of_kind_mut(&mut self, kind: StageKind) -> Option<&mut Stage> {
        self.stages
            .iter_mut()
            .take(self.len)
            .filter_map(|slot| slot.as_mut())
            .find(|stage| stage.kind() == kind)
    }

    /// Sets the bypass flag on the first stage of the given kind.
    ///
    /// Returns `false` when no such stage is present.
    pub fn set_bypass(&mut self, kind: StageKind, bypassed: bool) -> bool {
        match self.stage_of_kind_mut(kind) {
            Some(stage) => {
                stage.set_bypassed(bypassed);
                true
            }
            None => false,
        }
    }

    /// Bypass flag of the first stage of the given kind, if present.
    pub fn is_bypassed(&self, kind: StageKind) -> Option<bool> {
        self.stages
            .iter()
            .take(self.len)
            .filter_map(|slot| slot.as_ref())
            .find(|stage| stage.kind() == kind)
            .map(Stage::is_bypassed)
    }

    /// Sweeps the changed flags of all stages, acknowledging each one.
    ///
    /// Returns true when any stage had reported a change.
    fn take_stage_changes(&mut self) -> bool {
        let mut changed = false;
        for slot in self.stages.iter_mut().take(self.len) {
            if let Some(stage) = slot.as_mut() {
                if stage.has_changed() {
                    changed = true;
                    stage.acknowledge_change();
                }
            }
        }
        changed
    }
}
