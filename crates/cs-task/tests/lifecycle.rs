//! Integration tests: full configure → initialize → execute → finalize
//! passes over a small task tree, including export/import round trips.

use cs_core::index::single_index;
use cs_core::{ConfigStore, FilterSet, GroupSet};
use cs_store::{OpenMode, Store};
use cs_task::{BinnedGroup, Task};

fn factory(_set: GroupSet, name: &str) -> BinnedGroup {
    BinnedGroup::new(name, 10, 0.0, 1.0)
}

fn analysis_task(name: &str, overrides: ConfigStore) -> Task {
    Task::new(name)
        .with_configuration(overrides)
        .with_filters(FilterSet::new(["MB", "central"], ["piPlus", "piMinus", "kaon"]))
}

#[test]
fn two_by_three_allocates_six_singles_eighteen_pairs() {
    let mut cfg = ConfigStore::new();
    cfg.set("pairs", "UseParticles", true);
    let mut t = analysis_task("pairs", cfg);

    t.configure().unwrap();
    t.initialize(&factory).unwrap();

    assert_eq!(t.registry().len(GroupSet::BaseSingle), 6);
    assert_eq!(t.registry().len(GroupSet::BasePair), 18);
    assert_eq!(t.registry().len(GroupSet::DerivedSingle), 0);
    assert_eq!(t.registry().len(GroupSet::DerivedPair), 0);

    // Group names carry task and filter names.
    let g = t
        .registry()
        .group(GroupSet::BaseSingle, single_index(1, 2, 3))
        .unwrap();
    assert_eq!(g.name, "pairs_central_kaon");
}

#[test]
fn empty_filter_lists_disable_aggregation_without_failing() {
    let mut cfg = ConfigStore::new();
    cfg.set("lonely", "UseParticles", true);
    let mut t = Task::new("lonely").with_configuration(cfg);

    t.configure().unwrap();
    t.initialize(&factory).unwrap();

    assert!(t.is_task_ok());
    assert!(!t.acceptance().is_allocated());
    assert_eq!(t.registry().len(GroupSet::BaseSingle), 0);
}

#[test]
fn scaling_divides_by_accepted_events_and_skips_sparse_filters() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = ConfigStore::new();
    cfg.set("pairs", "UseParticles", true);
    cfg.set("pairs", "HistogramsScale", true);
    cfg.set("pairs", "HistogramsExport", true);
    cfg.set("pairs", "HistogramsExportPath", dir.path().to_str().unwrap());
    let mut t = analysis_task("pairs", cfg);

    t.configure().unwrap();
    t.initialize(&factory).unwrap();

    // Event filter 0 accepts 4 events; filter 1 accepts only 1 (sparse).
    for _ in 0..4 {
        t.execute();
        t.acceptance_mut().increment_event(0);
    }
    t.acceptance_mut().increment_event(1);

    for ef in 0..2 {
        for pf in 0..3 {
            t.registry_mut()
                .group_mut(GroupSet::BaseSingle, single_index(ef, pf, 3))
                .unwrap()
                .fill(0.5, 8.0);
        }
    }

    t.finalize().unwrap();
    assert!(t.is_task_ok());

    // ef 0 scaled by 1/4; ef 1 left bit-for-bit unchanged.
    for pf in 0..3 {
        let scaled = t
            .registry()
            .group(GroupSet::BaseSingle, single_index(0, pf, 3))
            .unwrap();
        assert_eq!(scaled.integral(), 2.0);
        let sparse = t
            .registry()
            .group(GroupSet::BaseSingle, single_index(1, pf, 3))
            .unwrap();
        assert_eq!(sparse.integral(), 8.0);
        assert_eq!(sparse.bin_content[5], 8.0);
    }
}

#[test]
fn finalize_without_executions_exports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = ConfigStore::new();
    cfg.set("idle", "UseParticles", true);
    cfg.set("idle", "HistogramsExport", true);
    cfg.set("idle", "HistogramsExportPath", dir.path().to_str().unwrap());
    let mut t = analysis_task("idle", cfg);

    t.configure().unwrap();
    t.initialize(&factory).unwrap();
    t.finalize().unwrap();

    assert!(t.is_task_ok());
    assert!(!dir.path().join("idle.json").exists());
}

#[test]
fn export_then_import_restores_counters_and_groups() {
    let dir = tempfile::tempdir().unwrap();
    let dir_str = dir.path().to_str().unwrap();

    let mut cfg = ConfigStore::new();
    cfg.set("pairs", "UseParticles", true);
    cfg.set("pairs", "HistogramsExport", true);
    cfg.set("pairs", "HistogramsExportPath", dir_str);
    let mut writer = analysis_task("pairs", cfg);

    writer.configure().unwrap();
    writer.initialize(&factory).unwrap();
    writer.execute();
    writer.acceptance_mut().increment_event(0);
    writer.acceptance_mut().increment_particle(0, 1);
    writer
        .registry_mut()
        .group_mut(GroupSet::BaseSingle, single_index(0, 1, 3))
        .unwrap()
        .fill(0.25, 3.0);
    writer.finalize().unwrap();
    assert!(writer.is_task_ok());
    assert!(dir.path().join("pairs.json").exists());

    let mut cfg = ConfigStore::new();
    cfg.set("pairs", "UseParticles", true);
    cfg.set("pairs", "HistogramsImport", true);
    cfg.set("pairs", "HistogramsImportPath", dir_str);
    let mut reader = analysis_task("pairs", cfg);

    reader.configure().unwrap();
    reader.initialize(&factory).unwrap();
    assert!(reader.is_task_ok());

    assert_eq!(reader.acceptance().accepted_events(0), 1);
    assert_eq!(reader.acceptance().accepted_particles(0, 1), 1);
    let g = reader
        .registry()
        .group(GroupSet::BaseSingle, single_index(0, 1, 3))
        .unwrap();
    assert_eq!(g.integral(), 3.0);
    assert_eq!(reader.registry().len(GroupSet::BasePair), 18);
}

#[test]
fn import_failure_flags_task_and_skips_children() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = ConfigStore::new();
    cfg.set("parent", "UseParticles", true);
    cfg.set("parent", "HistogramsImport", true);
    cfg.set("parent", "HistogramsImportPath", dir.path().to_str().unwrap());
    cfg.set("parent", "HistogramsImportFile", "missing");

    let mut parent = analysis_task("parent", cfg);
    parent.add_sub_task(Task::new("child")).unwrap();

    parent.configure().unwrap();
    parent.initialize(&factory).unwrap();

    assert!(!parent.is_task_ok());
    // Children were not initialized: finalize on the flagged parent is a
    // logged no-op, not an error.
    parent.finalize().unwrap();
}

#[test]
fn force_rewrite_off_flags_export_onto_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let dir_str = dir.path().to_str().unwrap();

    // Pre-existing artifact under the task's export name.
    Store::open(dir.path().join("pairs.json"), OpenMode::CreateOrReplace)
        .unwrap()
        .flush()
        .unwrap();

    let mut cfg = ConfigStore::new();
    cfg.set("pairs", "UseParticles", true);
    cfg.set("pairs", "HistogramsExport", true);
    cfg.set("pairs", "HistogramsExportPath", dir_str);
    cfg.set("pairs", "HistogramsForceRewrite", false);
    let mut t = analysis_task("pairs", cfg);

    t.configure().unwrap();
    t.initialize(&factory).unwrap();
    t.execute();
    t.finalize().unwrap();

    // The failure is sticky but non-fatal.
    assert!(!t.is_task_ok());
}

#[test]
fn partial_with_reset_saves_then_zeroes() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = ConfigStore::new();
    cfg.set("stream", "UseParticles", true);
    cfg.set("stream", "HistogramsExport", true);
    cfg.set("stream", "HistogramsExportPath", dir.path().to_str().unwrap());
    cfg.set("stream", "HistogramsReset", true);
    let mut t = analysis_task("stream", cfg);

    t.configure().unwrap();
    t.initialize(&factory).unwrap();
    t.execute();
    t.execute();
    t.acceptance_mut().increment_event(0);

    t.partial().unwrap();

    assert!(dir.path().join("stream.json").exists());
    assert_eq!(t.executed_count(), 0);
    assert_eq!(t.executed_total(), 2);
    assert_eq!(t.acceptance().accepted_events(0), 0);
    assert!(t.acceptance().is_allocated());
}

#[test]
fn clear_releases_storage_but_allows_reinitialize() {
    let mut cfg = ConfigStore::new();
    cfg.set("pairs", "UseParticles", true);
    let mut t = analysis_task("pairs", cfg);

    t.configure().unwrap();
    t.initialize(&factory).unwrap();
    assert_eq!(t.registry().len(GroupSet::BaseSingle), 6);

    t.clear();
    assert!(t.registry().is_empty());
    assert!(!t.acceptance().is_allocated());

    t.initialize(&factory).unwrap();
    assert_eq!(t.registry().len(GroupSet::BaseSingle), 6);
    assert_eq!(t.registry().len(GroupSet::BasePair), 18);
}

#[test]
fn lifecycle_fans_out_depth_first_in_insertion_order() {
    let mut root = Task::new("run");
    let mut mid = Task::new("first");
    mid.add_sub_task(Task::new("leaf")).unwrap();
    root.add_sub_task(mid).unwrap();
    root.add_sub_task(Task::new("second")).unwrap();

    root.configure().unwrap();
    root.initialize(&factory).unwrap();

    for t in [
        &root,
        root.child("first").unwrap(),
        root.child("first").unwrap().child("leaf").unwrap(),
        root.child("second").unwrap(),
    ] {
        assert!(t.is_configured());
        assert!(t.is_task_ok());
    }
}
