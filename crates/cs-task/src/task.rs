//! The task tree: named nodes with owned children, per-node configuration,
//! acceptance counters and a histogram-group registry, driven through a fixed
//! set of lifecycle phases.
//!
//! # Lifecycle
//!
//! `configure` → `initialize` → `execute`* → `partial`* → `finalize`, with
//! `reset` returning a node toward its configured state and `clear` releasing
//! aggregate storage while keeping the node re-initializable.
//!
//! Every lifecycle call fans out to children depth-first in insertion order —
//! except `execute`, which never recurses on its own. Analyzers call
//! [`Task::execute_sub_tasks`] explicitly when they want fan-out, because they
//! control per-event-stream execution timing. This asymmetry is deliberate
//! and part of the contract.
//!
//! # Ownership
//!
//! Children are owned by value and moved into their parent, so a subtask can
//! never be attached twice, attached to itself, or reached from two parents;
//! [`Task::add_sub_task`] still rejects a child that was already attached
//! elsewhere (a detached subtree keeps its `attached` marker) with
//! [`Error::FatalTaskLogic`]. A task's path is fixed at attach time and never
//! changes afterwards.

use std::sync::Arc;

use cs_core::index::{pair_index, single_index};
use cs_core::{keys, path, resolve, AggregateGroup, ConfigStore, Error, FilterSet, GroupSet, Result};
use cs_store::{store_target, OpenMode, Store};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::acceptance::AcceptanceCounters;
use crate::group::BinnedGroup;
use crate::registry::HistogramGroupRegistry;

/// Factory for fresh aggregate groups, injected at initialize time.
///
/// Arguments: the destination set and the group name derived from the task
/// and filter names. Injection replaces the reference design's process-wide
/// factory singletons.
pub trait GroupFactory<G> {
    /// Build one group for `set` under `name`.
    fn make(&self, set: GroupSet, name: &str) -> G;
}

impl<G, F: Fn(GroupSet, &str) -> G> GroupFactory<G> for F {
    fn make(&self, set: GroupSet, name: &str) -> G {
        self(set, name)
    }
}

/// Histogram-related settings of one task, resolved fresh from the config
/// store each time a lifecycle phase needs them.
#[derive(Debug, Clone)]
struct HistogramSettings {
    create: bool,
    import: bool,
    export: bool,
    scale: bool,
    reset_after_partial: bool,
    clear_after_finalize: bool,
    force_rewrite: bool,
    import_path: String,
    import_file: String,
    export_path: String,
    export_file: String,
}

impl HistogramSettings {
    fn resolve(config: &ConfigStore, task_path: &str) -> Result<Self> {
        let b = |key, default| resolve::resolve_bool_or(config, task_path, key, default);
        let s = |key| resolve::resolve_str_or(config, task_path, key, "none");
        Ok(Self {
            create: b(keys::HISTOGRAMS_CREATE, true)?,
            import: b(keys::HISTOGRAMS_IMPORT, false)?,
            export: b(keys::HISTOGRAMS_EXPORT, false)?,
            scale: b(keys::HISTOGRAMS_SCALE, false)?,
            reset_after_partial: b(keys::HISTOGRAMS_RESET, false)?,
            clear_after_finalize: b(keys::HISTOGRAMS_CLEAR, false)?,
            force_rewrite: b(keys::HISTOGRAMS_FORCE_REWRITE, true)?,
            import_path: s(keys::HISTOGRAMS_IMPORT_PATH)?,
            import_file: s(keys::HISTOGRAMS_IMPORT_FILE)?,
            export_path: s(keys::HISTOGRAMS_EXPORT_PATH)?,
            export_file: s(keys::HISTOGRAMS_EXPORT_FILE)?,
        })
    }
}

/// A node of the processing tree.
#[derive(Debug)]
pub struct Task<G: AggregateGroup = BinnedGroup> {
    name: String,
    path: String,
    attached: bool,
    children: Vec<Task<G>>,
    config: ConfigStore,
    requested: ConfigStore,
    configured: bool,
    executed_count: u64,
    executed_total: u64,
    filters: Arc<FilterSet>,
    acceptance: AcceptanceCounters,
    registry: HistogramGroupRegistry<G>,
    ok: bool,
}

impl<G: AggregateGroup> Task<G> {
    /// Create a detached task.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            attached: false,
            children: Vec::new(),
            config: ConfigStore::new(),
            requested: ConfigStore::new(),
            configured: false,
            executed_count: 0,
            executed_total: 0,
            filters: FilterSet::empty(),
            acceptance: AcceptanceCounters::unallocated(),
            registry: HistogramGroupRegistry::new(0, 0),
            ok: true,
        }
    }

    /// Attach caller-supplied configuration, consumed at configure time.
    pub fn with_configuration(mut self, requested: ConfigStore) -> Self {
        self.requested = requested;
        self
    }

    /// Attach the shared filter set this task aggregates against.
    pub fn with_filters(mut self, filters: Arc<FilterSet>) -> Self {
        self.filters = filters;
        self
    }

    /// Replace the caller-supplied configuration of an unconfigured task.
    pub fn set_configuration(&mut self, requested: ConfigStore) {
        self.requested = requested;
    }

    /// Task name (last path segment).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full colon-joined path from the tree root; fixed once attached.
    pub fn task_path(&self) -> &str {
        &self.path
    }

    /// Whether `configure` has run.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// False once a persistence failure (or comparable fault) was recorded;
    /// later lifecycle phases short-circuit on it instead of erroring out of
    /// deep recursion.
    pub fn is_task_ok(&self) -> bool {
        self.ok
    }

    /// Executions since the last `reset`.
    pub fn executed_count(&self) -> u64 {
        self.executed_count
    }

    /// Executions over the task's whole lifetime.
    pub fn executed_total(&self) -> u64 {
        self.executed_total
    }

    /// Attached children, in insertion order.
    pub fn children(&self) -> &[Task<G>] {
        &self.children
    }

    /// Mutable access to attached children.
    pub fn children_mut(&mut self) -> &mut [Task<G>] {
        &mut self.children
    }

    /// Child with the given name, if any.
    pub fn child(&self, name: &str) -> Option<&Task<G>> {
        self.children.iter().find(|c| c.name == name)
    }

    /// The shared filter set.
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// The merged configuration store.
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// This task's acceptance counters.
    pub fn acceptance(&self) -> &AcceptanceCounters {
        &self.acceptance
    }

    /// Mutable acceptance counters (filled during `execute`).
    pub fn acceptance_mut(&mut self) -> &mut AcceptanceCounters {
        &mut self.acceptance
    }

    /// This task's histogram-group registry.
    pub fn registry(&self) -> &HistogramGroupRegistry<G> {
        &self.registry
    }

    /// Mutable registry (filled during `execute`, extended with derived
    /// groups at finalize time).
    pub fn registry_mut(&mut self) -> &mut HistogramGroupRegistry<G> {
        &mut self.registry
    }

    /// Attach `child` as the last subtask.
    ///
    /// Fails with [`Error::FatalTaskLogic`] when the child carries no name or
    /// was already attached to a parent; the tree is left unmodified in both
    /// cases. On success the child's subtree paths are re-rooted under this
    /// task's path, once and permanently.
    pub fn add_sub_task(&mut self, mut child: Task<G>) -> Result<()> {
        if child.name.is_empty() {
            return Err(Error::FatalTaskLogic {
                path: self.path.clone(),
                reason: "cannot attach a nameless subtask".into(),
            });
        }
        if child.attached {
            return Err(Error::FatalTaskLogic {
                path: self.path.clone(),
                reason: format!(
                    "subtask '{}' is already attached to a parent; re-parenting is not supported",
                    child.path
                ),
            });
        }
        child.reroot(&self.path);
        self.children.push(child);
        Ok(())
    }

    fn reroot(&mut self, parent_path: &str) {
        self.path = path::join(parent_path, &self.name);
        self.attached = true;
        let own = self.path.clone();
        for child in &mut self.children {
            child.reroot(&own);
        }
    }

    /// Resolve a boolean key against this task's path, most specific first.
    pub fn resolve_bool(&self, key: &str) -> Result<bool> {
        resolve::resolve_bool(&self.config, &self.path, key)
    }

    /// Resolve a boolean key with a fallback for a missing key.
    pub fn resolve_bool_or(&self, key: &str, default: bool) -> Result<bool> {
        resolve::resolve_bool_or(&self.config, &self.path, key, default)
    }

    /// Resolve a string key against this task's path.
    pub fn resolve_str(&self, key: &str) -> Result<String> {
        resolve::resolve_str(&self.config, &self.path, key)
    }

    /// Resolve a string key with a fallback for a missing key.
    pub fn resolve_str_or(&self, key: &str, default: &str) -> Result<String> {
        resolve::resolve_str_or(&self.config, &self.path, key, default)
    }

    /// Resolve a long key against this task's path.
    pub fn resolve_long(&self, key: &str) -> Result<i64> {
        resolve::resolve_long(&self.config, &self.path, key)
    }

    /// Resolve a double key against this task's path.
    pub fn resolve_double(&self, key: &str) -> Result<f64> {
        resolve::resolve_double(&self.config, &self.path, key)
    }

    /// Whether this task reads event stream `n` (stream 0 defaults on, the
    /// rest default off).
    pub fn uses_stream(&self, n: usize) -> Result<bool> {
        self.resolve_bool_or(&keys::events_use_stream(n), n == 0)
    }

    /// Merge built-in defaults and the caller-supplied overrides into the
    /// local store, then configure children depth-first in insertion order.
    ///
    /// Calling `configure` a second time is a logged no-op. A parent's merged
    /// store is pushed down into each child before the child configures, so
    /// children resolve ancestor defaults through the path-prefix search and
    /// shadow them with entries on their own path.
    pub fn configure(&mut self) -> Result<()> {
        if self.configured {
            tracing::warn!(task = %self.path, "already configured; ignoring repeat call");
            return Ok(());
        }

        // Built-in defaults live on the root path only. Materializing them on
        // every node would let a child's own-path default shadow an ancestor
        // override under most-specific-path-wins resolution; children reach
        // the root defaults through the store pushed down below, and the
        // `*_or` fallbacks in settings resolution cover detached use.
        if !self.attached {
            self.install_defaults();
        }
        let requested = std::mem::take(&mut self.requested);
        self.config.merge(&requested);
        self.configured = true;
        tracing::debug!(task = %self.path, entries = self.config.len(), "configured");

        let parent_store = self.config.clone();
        for child in &mut self.children {
            child.config.merge(&parent_store);
            child.configure()?;
        }
        Ok(())
    }

    fn install_defaults(&mut self) {
        let p = self.path.clone();
        let c = &mut self.config;
        c.set_default(&p, keys::EVENTS_USED, true);
        c.set_default(&p, keys::USE_PARTICLES, false);
        for n in 0..4 {
            c.set_default(&p, &keys::events_use_stream(n), n == 0);
        }
        c.set_default(&p, keys::HISTOGRAMS_CREATE, true);
        c.set_default(&p, keys::HISTOGRAMS_IMPORT, false);
        c.set_default(&p, keys::HISTOGRAMS_EXPORT, false);
        c.set_default(&p, keys::HISTOGRAMS_SCALE, false);
        c.set_default(&p, keys::HISTOGRAMS_RESET, false);
        c.set_default(&p, keys::HISTOGRAMS_CLEAR, false);
        c.set_default(&p, keys::HISTOGRAMS_FORCE_REWRITE, true);
        c.set_default(&p, keys::HISTOGRAMS_IMPORT_PATH, "none");
        c.set_default(&p, keys::HISTOGRAMS_IMPORT_FILE, "none");
        c.set_default(&p, keys::HISTOGRAMS_EXPORT_PATH, "none");
        c.set_default(&p, keys::HISTOGRAMS_EXPORT_FILE, "none");
        c.set_default(&p, keys::SEVERITY, "Info");
    }

    /// Bump the execution counters.
    ///
    /// Never fans out: subclass-style drivers call
    /// [`Task::execute_sub_tasks`] themselves when (and only when) they want
    /// children to run for the current unit of work.
    pub fn execute(&mut self) {
        self.executed_total += 1;
        self.executed_count += 1;
    }

    /// Run `execute` on every child, in insertion order.
    pub fn execute_sub_tasks(&mut self) {
        for child in &mut self.children {
            child.execute();
        }
    }

    /// Zero counters and group contents, recurse. Allocation survives;
    /// `executed_total` keeps counting across resets.
    pub fn reset(&mut self) {
        self.executed_count = 0;
        self.acceptance.reset();
        self.registry.reset_all();
        for child in &mut self.children {
            child.reset();
        }
    }

    /// Release counters and group storage, recurse. The node stays
    /// configured and can be initialized again.
    pub fn clear(&mut self) {
        self.acceptance.clear();
        self.registry.clear();
        for child in &mut self.children {
            child.clear();
        }
    }

    /// Divide each event filter's group blocks by its accepted-event count.
    ///
    /// Filters with fewer than two accepted events are skipped with a
    /// warning; their contents stay bit-for-bit unchanged. Downstream
    /// consumers must tolerate unscaled output for low-statistics filters.
    fn scale_groups(&mut self) {
        for ef in 0..self.acceptance.n_event_filters() {
            let n_events = self.acceptance.accepted_events(ef);
            if n_events <= 1 {
                tracing::warn!(
                    task = %self.path,
                    event_filter = ef,
                    accepted = n_events,
                    "too few accepted events; leaving groups unscaled"
                );
                continue;
            }
            self.registry.scale_event_filter(ef, 1.0 / n_events as f64);
        }
    }
}

impl<G: AggregateGroup + Serialize + DeserializeOwned> Task<G> {
    /// Allocate (or import) counters and histogram groups, then initialize
    /// children — but only while no error has been recorded on this node.
    ///
    /// When the task consumes events and the event-filter list is empty (or
    /// particles are requested with an empty particle-filter list),
    /// allocation is skipped with a warning instead of failing: the task
    /// still participates in the lifecycle, it just aggregates nothing.
    pub fn initialize(&mut self, factory: &impl GroupFactory<G>) -> Result<()> {
        if !self.ok {
            tracing::debug!(task = %self.path, "error flagged; skipping initialize");
            return Ok(());
        }

        let settings = HistogramSettings::resolve(&self.config, &self.path)?;
        let events_used = self.resolve_bool_or(keys::EVENTS_USED, true)?;
        let use_particles = self.resolve_bool_or(keys::USE_PARTICLES, false)?;

        if events_used {
            let n_ef = self.filters.n_event_filters();
            let n_pf = self.filters.n_particle_filters();

            if n_ef == 0 || (use_particles && n_pf == 0) {
                tracing::warn!(
                    task = %self.path,
                    n_event_filters = n_ef,
                    n_particle_filters = n_pf,
                    "filter lists incomplete; acceptance counting disabled"
                );
            } else {
                self.acceptance =
                    AcceptanceCounters::new(n_ef, if use_particles { n_pf } else { 0 });
                self.registry = HistogramGroupRegistry::new(n_ef, n_pf);

                if settings.import {
                    if let Err(e) = self.import_state(&settings, use_particles) {
                        tracing::warn!(
                            task = %self.path,
                            error = %e,
                            "import failed; disabling this task's histogram I/O"
                        );
                        self.ok = false;
                    }
                } else if settings.create && use_particles {
                    self.create_groups(factory);
                }
            }
        }

        if self.is_task_ok() {
            for child in &mut self.children {
                child.initialize(factory)?;
            }
        }
        Ok(())
    }

    fn create_groups(&mut self, factory: &impl GroupFactory<G>) {
        let n_ef = self.registry.n_event_filters();
        let n_pf = self.registry.n_particle_filters();
        for ef in 0..n_ef {
            let ef_name = self.filters.event_filter_name(ef).unwrap_or_default();
            for pf in 0..n_pf {
                let pf_name = self.filters.particle_filter_name(pf).unwrap_or_default();
                let name = format!("{}_{}_{}", self.name, ef_name, pf_name);
                debug_assert_eq!(
                    self.registry.len(GroupSet::BaseSingle),
                    single_index(ef, pf, n_pf)
                );
                self.registry
                    .add_group(GroupSet::BaseSingle, factory.make(GroupSet::BaseSingle, &name));
            }
        }
        for ef in 0..n_ef {
            let ef_name = self.filters.event_filter_name(ef).unwrap_or_default();
            for pf1 in 0..n_pf {
                let pf1_name = self.filters.particle_filter_name(pf1).unwrap_or_default();
                for pf2 in 0..n_pf {
                    let pf2_name = self.filters.particle_filter_name(pf2).unwrap_or_default();
                    let name = format!("{}_{}_{}_{}", self.name, ef_name, pf1_name, pf2_name);
                    debug_assert_eq!(
                        self.registry.len(GroupSet::BasePair),
                        pair_index(ef, pf1, pf2, n_pf)
                    );
                    self.registry
                        .add_group(GroupSet::BasePair, factory.make(GroupSet::BasePair, &name));
                }
            }
        }
        tracing::debug!(
            task = %self.path,
            singles = self.registry.len(GroupSet::BaseSingle),
            pairs = self.registry.len(GroupSet::BasePair),
            "created histogram groups"
        );
    }

    fn import_state(&mut self, settings: &HistogramSettings, use_particles: bool) -> Result<()> {
        let target = store_target(&settings.import_path, &settings.import_file, &self.name);
        let store = Store::open(&target, OpenMode::Read)?;

        let n_ef = self.registry.n_event_filters();
        let n_pf = self.registry.n_particle_filters();
        self.acceptance =
            AcceptanceCounters::load(&store, n_ef, if use_particles { n_pf } else { 0 })?;

        if use_particles {
            let singles = store.get_groups(GroupSet::BaseSingle, n_ef * n_pf)?;
            self.registry.replace_set(GroupSet::BaseSingle, singles);
            let pairs = store.get_groups(GroupSet::BasePair, n_ef * n_pf * n_pf)?;
            self.registry.replace_set(GroupSet::BasePair, pairs);
            // Derived sets carry whatever the exporting pass produced.
            for set in [GroupSet::DerivedSingle, GroupSet::DerivedPair] {
                let n = store.group_count(set);
                self.registry.replace_set(set, store.get_groups(set, n)?);
            }
        }
        tracing::info!(task = %self.path, path = %target.display(), "imported prior state");
        Ok(())
    }

    /// Scale (when enabled) and export the current aggregates, then recurse.
    ///
    /// With `HistogramsReset` set, counters and group contents are zeroed
    /// after a successful export — the per-stream save-then-reset workflow.
    pub fn partial(&mut self) -> Result<()> {
        if !self.ok {
            tracing::debug!(task = %self.path, "error flagged; skipping partial");
            return Ok(());
        }

        let settings = HistogramSettings::resolve(&self.config, &self.path)?;
        self.save_pass(&settings);
        if self.ok && settings.reset_after_partial {
            self.executed_count = 0;
            self.acceptance.reset();
            self.registry.reset_all();
        }
        for child in &mut self.children {
            child.partial()?;
        }
        Ok(())
    }

    /// Final scale-and-export pass, then recurse.
    ///
    /// A task that never executed finalizes successfully but produces no
    /// output: scaling and export are skipped entirely. With
    /// `HistogramsClear` set, aggregate storage is released after a
    /// successful export.
    pub fn finalize(&mut self) -> Result<()> {
        if !self.ok {
            tracing::debug!(task = %self.path, "error flagged; skipping finalize");
            return Ok(());
        }

        let settings = HistogramSettings::resolve(&self.config, &self.path)?;
        if self.executed_count == 0 {
            tracing::debug!(task = %self.path, "never executed; nothing to scale or export");
        } else {
            self.save_pass(&settings);
            if self.ok && settings.clear_after_finalize {
                self.acceptance.clear();
                self.registry.clear();
            }
        }
        for child in &mut self.children {
            child.finalize()?;
        }
        Ok(())
    }

    /// Scale + export according to `settings`. Persistence failures flip the
    /// sticky error flag instead of unwinding out of the recursion.
    fn save_pass(&mut self, settings: &HistogramSettings) {
        if settings.scale {
            self.scale_groups();
        }
        if settings.export {
            if let Err(e) = self.export_state(settings) {
                tracing::warn!(
                    task = %self.path,
                    error = %e,
                    "export failed; disabling this task's histogram I/O"
                );
                self.ok = false;
            }
        }
    }

    fn export_state(&self, settings: &HistogramSettings) -> Result<()> {
        let target = store_target(&settings.export_path, &settings.export_file, &self.name);
        let mode = if settings.force_rewrite {
            OpenMode::CreateOrReplace
        } else {
            OpenMode::CreateIfAbsent
        };
        let mut store = Store::open(&target, mode)?;
        self.acceptance.save(&mut store)?;
        for set in GroupSet::ALL {
            store.put_groups(set, self.registry.set_slice(set))?;
        }
        store.flush()?;
        tracing::info!(task = %self.path, path = %target.display(), "exported aggregates");
        Ok(())
    }
}
