//! Engine: data ownership, validated construction and the per-tick pipeline.
//!
//! Each [`Engine::update`] runs the phases strictly in order:
//! 1. commands → clocks → root timers (activation edges, range behaviors)
//! 2. composite propagation, one independent tree per root
//! 3. clip local time, extrapolation and activation
//! 4. blend accumulate (gather shards, merge unweighted then weighted)
//! 5. blend resolve into [`Outputs::changes`]
//!
//! Phases 1–4 fan out over rayon: root trees, clips and gather shards are
//! disjoint, and each worker returns its results in a buffer that is drained
//! in index order, so outputs do not depend on scheduling. The timer table is
//! only mutated in phases 1–2; later phases read it.

use hashbrown::HashSet;
use log::{debug, trace, warn};
use rayon::prelude::*;

use crate::accumulate::{gather_shard, BlendMap, Contribution};
use crate::binding::{TargetRow, TargetTable};
use crate::clip::{ClipRecord, ClipState, CurveSampler, NoCurves};
use crate::clock::ClockInput;
use crate::composite::{CompositeLink, TimerLink, TimerNode, TimerTable, TimerTree};
use crate::config::Config;
use crate::desc::{TimelineDesc, TimerDesc};
use crate::error::{Result, TimelineError};
use crate::ids::{ClipId, TargetId, TimerId};
use crate::inputs::{Inputs, TimelineCommand};
use crate::mix::MixData;
use crate::outputs::{Change, Outputs, TimelineEvent};
use crate::range::{in_range_incl_loops, ActiveRange};
use crate::time::DiscreteTime;
use crate::timer::{Activation, RangeOutcome, RootTimer, Timer, TimerData};
use crate::value::Value;

/// Handles created by [`Engine::add_timeline`], index-aligned with the
/// description's `timers`, `clips` and `targets`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimelineHandles {
    pub timers: Vec<TimerId>,
    pub clips: Vec<ClipId>,
    pub targets: Vec<TargetId>,
}

impl TimelineHandles {
    /// First timer of the description, the instance's root when the
    /// description is well-formed.
    pub fn root(&self) -> Option<TimerId> {
        self.timers.first().copied()
    }
}

pub struct Engine {
    pub(crate) cfg: Config,
    pub(crate) timers: TimerTable,
    pub(crate) clips: Vec<ClipRecord>,
    pub(crate) targets: TargetTable,
    blend: BlendMap,
    shards: Vec<Vec<Contribution>>,
    sampler: Box<dyn CurveSampler + Send + Sync>,
    outputs: Outputs,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("cfg", &self.cfg)
            .field("roots", &self.timers.trees().len())
            .field("timers", &self.timers.len())
            .field("clips", &self.clips.len())
            .field("targets", &self.targets.len())
            .finish()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    /// Create a new engine with the given config.
    pub fn new(cfg: Config) -> Self {
        Self {
            outputs: Outputs::with_event_cap(cfg.max_events_per_tick),
            blend: BlendMap::new(),
            shards: Vec::new(),
            sampler: Box::new(NoCurves),
            timers: TimerTable::new(),
            clips: Vec::new(),
            targets: TargetTable::new(),
            cfg,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Installs the sampler used for curve-driven clip values and weights.
    pub fn set_curve_sampler(&mut self, sampler: Box<dyn CurveSampler + Send + Sync>) {
        self.sampler = sampler;
    }

    /// Validates `desc` and adds its timers, targets and clips.
    ///
    /// Nothing is inserted when validation fails.
    pub fn add_timeline(&mut self, desc: &TimelineDesc) -> Result<TimelineHandles> {
        self.validate(desc)?;

        let mut handles = TimelineHandles::default();
        for t in &desc.timers {
            let id = match t {
                TimerDesc::Root {
                    name,
                    clock,
                    range,
                    auto_start,
                } => {
                    let root = RootTimer::new(clock.clone(), range.clone(), *auto_start);
                    self.timers.push_root(name.clone(), root)
                }
                TimerDesc::Composite {
                    name,
                    parent,
                    offset,
                    scale,
                    active_range,
                } => {
                    let link = CompositeLink {
                        parent: handles.timers[*parent],
                        offset: *offset,
                        scale: *scale,
                        active_range: *active_range,
                    };
                    self.timers
                        .push_composite(name.clone(), link)
                        .ok_or_else(|| TimelineError::MissingParentTimer {
                            timer: name.clone(),
                            parent: *parent,
                        })?
                }
            };
            handles.timers.push(id);
        }

        for t in &desc.targets {
            handles.targets.push(self.targets.upsert(TargetRow {
                name: t.name.clone(),
                default: t.default,
                additive: t.additive,
            }));
        }

        for c in &desc.clips {
            let id = ClipId(self.clips.len() as u32);
            let timer = handles.timers[c.timer];
            self.clips.push(ClipRecord {
                name: c.name.clone(),
                timer,
                transform: c.transform,
                extrapolation: c.extrapolation,
                weight: c.weight,
                target: handles.targets[c.target],
                value: c.value.clone(),
                visibility_range: c.visibility_range.unwrap_or_else(|| c.transform.range()),
                timer_data: TimerData::default(),
                driver_enabled: false,
                local_time: c.transform.to_local_time_unbound(Timer::default().time),
                extrapolated: None,
                active: false,
                active_previous: false,
            });
            handles.clips.push(id);
        }

        debug!(
            "timeline '{}' loaded: {} timers, {} clips, {} targets",
            desc.name,
            handles.timers.len(),
            handles.clips.len(),
            handles.targets.len()
        );
        Ok(handles)
    }

    /// Parses and adds a baked timeline from JSON.
    pub fn load_timeline_json(&mut self, json: &str) -> Result<TimelineHandles> {
        let desc = crate::desc::parse_timeline_json(json)?;
        self.add_timeline(&desc)
    }

    fn validate(&self, desc: &TimelineDesc) -> Result<()> {
        for (i, t) in desc.timers.iter().enumerate() {
            if let TimerDesc::Composite {
                name, parent, scale, ..
            } = t
            {
                if *parent >= desc.timers.len() {
                    return Err(TimelineError::MissingParentTimer {
                        timer: name.clone(),
                        parent: *parent,
                    });
                }
                if *parent >= i {
                    return Err(TimelineError::ParentNotEarlier {
                        timer: name.clone(),
                        parent: *parent,
                    });
                }
                if !scale.is_finite() {
                    return Err(TimelineError::InvalidCompositeScale {
                        timer: name.clone(),
                        scale: *scale,
                    });
                }
            }
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(desc.targets.len());
        for t in &desc.targets {
            if !seen.insert(t.name.as_str()) {
                return Err(TimelineError::DuplicateTarget {
                    name: t.name.clone(),
                });
            }
            // Targets are shared by name across timelines; the row is fixed
            // by whichever timeline bound it first.
            let existing = self.targets.lookup(&t.name).and_then(|id| self.targets.get(id));
            if let Some(existing) = existing {
                existing.check_redeclared(&t.default, t.additive)?;
            }
        }

        for c in &desc.clips {
            if c.timer >= desc.timers.len() {
                return Err(TimelineError::MissingTimer {
                    clip: c.name.clone(),
                    timer: c.timer,
                });
            }
            let tr = &c.transform;
            if tr.end < tr.start {
                return Err(TimelineError::InvalidClipRange {
                    clip: c.name.clone(),
                    start: tr.start.ticks(),
                    end: tr.end.ticks(),
                });
            }
            if !tr.scale.is_finite() || tr.scale <= 0.0 {
                return Err(TimelineError::InvalidClipScale {
                    clip: c.name.clone(),
                    scale: tr.scale,
                });
            }
            if let crate::clip::ClipValue::Curves { kind, curves } = &c.value {
                if curves.len() != kind.arity() {
                    return Err(TimelineError::CurveArityMismatch {
                        clip: c.name.clone(),
                        kind: *kind,
                        expected: kind.arity(),
                        actual: curves.len(),
                    });
                }
            }
            let Some(target) = desc.targets.get(c.target) else {
                return Err(TimelineError::MissingTarget {
                    clip: c.name.clone(),
                    target: c.target,
                });
            };
            if target.default.kind() != c.value.kind() {
                return Err(TimelineError::TargetKindMismatch {
                    clip: c.name.clone(),
                    target: target.name.clone(),
                    expected: target.default.kind(),
                    actual: c.value.kind(),
                });
            }
        }
        Ok(())
    }

    /// Step the timelines by one tick of host time with the given inputs.
    pub fn update(&mut self, clock: ClockInput, inputs: Inputs) -> &Outputs {
        self.outputs.clear();
        self.apply_inputs(inputs);
        self.advance_roots(&clock);
        self.update_clips();
        self.accumulate();
        self.resolve();
        &self.outputs
    }

    fn apply_inputs(&mut self, inputs: Inputs) {
        for cmd in inputs.commands {
            let (timer, wants) = match cmd {
                TimelineCommand::Play { timer } => (timer, true),
                TimelineCommand::Stop { timer } => (timer, false),
            };
            match self.timers.get_mut(timer).and_then(TimerNode::as_root_mut) {
                Some(root) => root.requested = wants,
                None => warn!("ignoring {}: {:?} is not a root timer", cmd_name(wants), timer),
            }
        }
    }

    /// Phases 1–2: clocks, root timers and composite propagation, one
    /// worker per root tree.
    fn advance_roots(&mut self, clock: &ClockInput) {
        let per_tree: Vec<Vec<TimelineEvent>> = self
            .timers
            .trees_mut()
            .par_iter_mut()
            .map(|tree| step_tree(tree, clock))
            .collect();
        for event in per_tree.into_iter().flatten() {
            self.outputs.push_event(event);
        }
    }

    /// Phase 3: local time and activation of every clip, read from the
    /// driving timer.
    fn update_clips(&mut self) {
        let timers = &self.timers;
        let edges: Vec<Activation> = self
            .clips
            .par_iter_mut()
            .map(|clip| match timers.get(clip.timer) {
                Some(driver) => clip.drive(driver.timer.data(), driver.enabled),
                None => clip.drive(clip.timer_data, false),
            })
            .collect();

        for (i, edge) in edges.into_iter().enumerate() {
            if !edge.is_edge() {
                continue;
            }
            let clip = ClipId(i as u32);
            self.outputs.push_event(if edge.is_active() {
                TimelineEvent::ClipActivated { clip }
            } else {
                TimelineEvent::ClipDeactivated { clip }
            });
        }
        trace!(
            "{} of {} clips active",
            self.clips.iter().filter(|c| c.active).count(),
            self.clips.len()
        );
    }

    /// Phase 4: gather contributions per shard in parallel, then merge
    /// sequentially in shard order.
    fn accumulate(&mut self) {
        let chunk = self.cfg.blend_chunk_size.max(1);
        let shard_count = self.clips.len().div_ceil(chunk);
        if self.shards.len() < shard_count {
            self.shards.resize_with(shard_count, Vec::new);
        }
        self.shards.truncate(shard_count);

        let sampler: &(dyn CurveSampler + Send + Sync) = self.sampler.as_ref();
        self.clips
            .par_chunks(chunk)
            .zip(self.shards.par_iter_mut())
            .for_each(|(clips, out)| gather_shard(clips, sampler, out));

        let contributing: usize = self.shards.iter().map(Vec::len).sum();
        self.blend.begin_tick(self.cfg.target_capacity.min(contributing));
        self.blend.merge_shards(&self.shards, &self.targets);
        trace!("{} contributions into {} targets", contributing, self.blend.len());
    }

    /// Phase 5: resolve every touched target.
    fn resolve(&mut self) {
        for (target, value) in self.blend.resolve(&self.targets, self.cfg.blend_epsilon) {
            let key = self
                .targets
                .get(target)
                .map(|r| r.name.clone())
                .unwrap_or_default();
            self.outputs.push_change(Change { target, key, value });
        }
    }
}

/// Steps one instance: activation edge, clock, range behavior, then the
/// composite cascade. Returns the tree's events in emission order.
fn step_tree(tree: &mut TimerTree, clock: &ClockInput) -> Vec<TimelineEvent> {
    let mut events = Vec::new();
    let Some(node) = tree.root_mut() else {
        return events;
    };
    let id = node.id;
    let timer = &mut node.timer;
    let TimerLink::Root(root) = &mut node.link else {
        return events;
    };

    let data = root.clock.clock_data(clock);
    root.activation = root.activation.step(root.requested);
    match root.activation {
        Activation::ActivatingThisTick => {
            root.reset(timer, &data);
            debug!("instance {:?} started at {:?}", id, timer.time);
            events.push(TimelineEvent::InstanceStarted { timer: id });
        }
        Activation::Active => match root.advance(timer, &data) {
            RangeOutcome::Continue => {}
            RangeOutcome::Stopped => {
                root.requested = false;
                root.activation = Activation::DeactivatingThisTick;
                root.paused = false;
                debug!("instance {:?} auto-stopped", id);
                events.push(TimelineEvent::InstanceStopped { timer: id });
            }
            RangeOutcome::Paused => {
                debug!("instance {:?} auto-paused at {:?}", id, timer.time);
                events.push(TimelineEvent::TimerPaused { timer: id });
            }
            RangeOutcome::Looped { .. } => {
                let loop_count = root.loop_count();
                events.push(TimelineEvent::TimerLooped {
                    timer: id,
                    loop_count,
                });
            }
        },
        Activation::DeactivatingThisTick => {
            root.paused = false;
            timer.delta_time = DiscreteTime::ZERO;
            debug!("instance {:?} stopped", id);
            events.push(TimelineEvent::InstanceStopped { timer: id });
        }
        Activation::Inactive => {}
    }

    let activation = root.activation;
    node.active = activation.is_active();
    node.enabled = node.active;

    let mut flips = Vec::new();
    match activation {
        Activation::ActivatingThisTick | Activation::Active => tree.propagate(&mut flips),
        Activation::DeactivatingThisTick => tree.disable(&mut flips),
        Activation::Inactive => return events,
    }
    events.extend(flips.into_iter().map(|(timer, active)| {
        debug!("composite {:?} active={}", timer, active);
        if active {
            TimelineEvent::CompositeActivated { timer }
        } else {
            TimelineEvent::CompositeDeactivated { timer }
        }
    }));
    events
}

fn cmd_name(wants: bool) -> &'static str {
    if wants {
        "play"
    } else {
        "stop"
    }
}

/// Read-only accessors.
impl Engine {
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Current timer state (root or composite).
    pub fn timer(&self, id: TimerId) -> Option<TimerData> {
        self.timers.get(id).map(|n| n.timer.data())
    }

    pub fn timer_name(&self, id: TimerId) -> Option<&str> {
        self.timers.get(id).map(|n| n.name.as_str())
    }

    /// Active flag of a composite timer; `None` for roots and unknown ids.
    pub fn composite_active(&self, id: TimerId) -> Option<bool> {
        let node = self.timers.get(id)?;
        node.as_composite().map(|_| node.active)
    }

    /// Loop count of the range behavior governing `id` (a composite reports
    /// its root's count).
    pub fn loop_count(&self, id: TimerId) -> Option<u32> {
        let node = self.timers.get(id)?;
        let root = self.timers.get(node.root)?.as_root()?;
        Some(root.loop_count())
    }

    pub fn is_paused(&self, id: TimerId) -> Option<bool> {
        self.timers.get(id)?.as_root().map(|r| r.paused)
    }

    pub fn instance_activation(&self, id: TimerId) -> Option<Activation> {
        self.timers.get(id)?.as_root().map(|r| r.activation)
    }

    pub fn clip_state(&self, id: ClipId) -> Option<ClipState> {
        self.clips.get(id.index()).map(ClipRecord::state)
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn target_id(&self, name: &str) -> Option<TargetId> {
        self.targets.lookup(name)
    }

    /// Accumulated mix of a target from the last tick.
    pub fn mix_of(&self, target: TargetId) -> Option<&MixData<Value>> {
        self.blend.get(target)
    }

    /// Replaces a target's default value; the kind must match.
    pub fn set_target_default(&mut self, target: TargetId, default: Value) -> bool {
        self.targets.set_default(target, default)
    }

    /// Clips under `root` whose visibility range is touched by `query` on a
    /// timeline looping over `timeline_range`.
    pub fn visible_clips(
        &self,
        root: TimerId,
        query: ActiveRange,
        timeline_range: ActiveRange,
    ) -> Result<Vec<ClipId>> {
        match self.timers.get(root) {
            Some(node) if node.is_root() => {}
            _ => return Err(TimelineError::UnknownTimer(root)),
        }
        Ok(self
            .clips
            .iter()
            .enumerate()
            .filter(|(_, c)| self.timers.get(c.timer).map(|n| n.root) == Some(root))
            .filter(|(_, c)| in_range_incl_loops(&c.visibility_range, &query, &timeline_range))
            .map(|(i, _)| ClipId(i as u32))
            .collect())
    }
}
