mod common;

use common::*;
use pipeforge_registry::{
    DependencyResolver, RegistrationTask, RegistryError, RegistryResult, TaskQueue,
    ValidityReport,
};
use pipeforge_types::Dependency;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn setup() -> (TaskQueue<Ctx>, Ctx) {
    let queue = TaskQueue::new();
    let ctx = Ctx::wired(&queue);
    (queue, ctx)
}

// ============================================================
// Basic scheduling
// ============================================================

#[test]
fn run_on_empty_queue_is_noop() {
    let (mut queue, mut ctx) = setup();
    assert_eq!(queue.run(&mut ctx).unwrap(), 0);
    assert!(queue.is_empty());
}

#[test]
fn task_without_dependencies_fires_on_schedule() {
    let (mut queue, mut ctx) = setup();
    queue
        .schedule(node_task(NodeDef::new::<Threshold>("ns:threshold"), vec![]), &mut ctx)
        .unwrap();

    assert!(queue.is_empty());
    assert_eq!(ctx.node_ids(), vec!["ns:threshold"]);
}

#[test]
fn task_waits_for_dependency() {
    let (mut queue, mut ctx) = setup();
    queue
        .schedule(
            node_task(NodeDef::new::<Threshold>("ns:threshold"), vec![data_dep("ns:image")]),
            &mut ctx,
        )
        .unwrap();
    assert_eq!(queue.len(), 1);
    assert!(ctx.nodes.is_empty());

    ctx.data
        .register(DataDef::new::<Image>("ns:image"), &source("ext.data"))
        .unwrap();
    assert_eq!(queue.run(&mut ctx).unwrap(), 1);

    assert!(queue.is_empty());
    assert_eq!(ctx.node_ids(), vec!["ns:threshold"]);
    assert_eq!(queue.fired_total(), 1);
}

#[test]
fn chained_tasks_resolve_in_one_run() {
    let (mut queue, mut ctx) = setup();
    // Submitted in reverse dependency order: c needs b needs a needs image.
    queue.enqueue(node_task(NodeDef::new::<Image>("ns:c"), vec![node_dep("ns:b")]));
    queue.enqueue(node_task(NodeDef::new::<Blur>("ns:b"), vec![node_dep("ns:a")]));
    queue.enqueue(node_task(NodeDef::new::<Threshold>("ns:a"), vec![data_dep("ns:image")]));
    queue.enqueue(data_task(DataDef::new::<Image>("ns:image"), vec![]));

    assert_eq!(queue.run(&mut ctx).unwrap(), 4);
    assert_eq!(ctx.node_ids(), vec!["ns:a", "ns:b", "ns:c"]);
    assert_eq!(ctx.data_ids(), vec!["ns:image"]);
}

#[test]
fn registration_inside_task_unblocks_earlier_task() {
    let (mut queue, mut ctx) = setup();
    queue.enqueue(node_task(NodeDef::new::<Threshold>("ns:waiting"), vec![data_dep("ns:table")]));
    queue.enqueue(data_task(DataDef::new::<Table>("ns:table"), vec![]));

    assert_eq!(queue.run(&mut ctx).unwrap(), 2);
    assert!(queue.is_empty());
}

#[test]
fn signal_is_clear_after_run() {
    let (mut queue, mut ctx) = setup();
    queue
        .schedule(data_task(DataDef::new::<Table>("ns:table"), vec![]), &mut ctx)
        .unwrap();
    assert!(!queue.signal().is_raised());
}

// ============================================================
// Deadlock visibility
// ============================================================

#[test]
fn unsatisfiable_task_stays_scheduled() {
    let (mut queue, mut ctx) = setup();
    let id = queue
        .schedule(
            node_task(NodeDef::new::<Threshold>("ns:orphan"), vec![data_dep("ns:does-not-exist")]),
            &mut ctx,
        )
        .unwrap();

    for _ in 0..3 {
        assert_eq!(queue.run(&mut ctx).unwrap(), 0);
    }

    let scheduled = queue.scheduled_tasks();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].id, id);
    assert_eq!(scheduled[0].description, "node ns:orphan");
    assert_eq!(scheduled[0].dependencies, vec![data_dep("ns:does-not-exist")]);
}

#[test]
fn cyclic_tasks_stay_pending_with_missing_dependencies() {
    let (mut queue, mut ctx) = setup();
    queue.enqueue(node_task(NodeDef::new::<Threshold>("ns:a"), vec![node_dep("ns:b")]));
    queue.enqueue(node_task(NodeDef::new::<Blur>("ns:b"), vec![node_dep("ns:a")]));

    assert_eq!(queue.run(&mut ctx).unwrap(), 0);

    let pending = queue.pending(&ctx);
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].missing, vec![node_dep("ns:b")]);
    assert_eq!(
        pending[1].missing_description(),
        "missing dependency: node type 'ns:a'"
    );
}

#[test]
fn pending_tasks_are_reported_as_warnings() {
    let (mut queue, mut ctx) = setup();
    queue
        .schedule(
            node_task(
                NodeDef::new::<Threshold>("ns:orphan"),
                vec![data_dep("ns:image"), data_dep("ns:mask")],
            ),
            &mut ctx,
        )
        .unwrap();
    ctx.data
        .register(DataDef::new::<Image>("ns:image"), &source("ext"))
        .unwrap();
    // Not run again on purpose: the report looks at current state.

    let mut report = ValidityReport::new();
    queue.report_validity(&ctx, &mut report);

    assert!(report.is_valid());
    let warnings: Vec<_> = report.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].context, vec!["Registration tasks", "node ns:orphan"]);
    assert_eq!(warnings[0].message, "missing dependency: data type 'ns:mask'");
}

// ============================================================
// Failure semantics
// ============================================================

#[test]
fn conflicting_task_aborts_run_with_error() {
    let (mut queue, mut ctx) = setup();
    ctx.nodes
        .register(NodeDef::new::<Threshold>("ns:a"), &source("ext"))
        .unwrap();

    let err = queue
        .schedule(node_task(NodeDef::new::<Blur>("ns:a"), vec![]), &mut ctx)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Conflict { .. }));

    // The failed task is gone; the queue keeps working.
    assert!(queue.is_empty());
    assert_eq!(queue.failed_tasks().len(), 1);
    assert_eq!(queue.failed_tasks()[0].description, "node ns:a");
    assert_eq!(queue.failed_tasks()[0].message, err.to_string());

    let mut report = ValidityReport::new();
    queue.report_validity(&ctx, &mut report);
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].context, vec!["Registration tasks", "node ns:a"]);
    assert_eq!(errors[0].details, vec![err.to_string()]);

    queue
        .schedule(node_task(NodeDef::new::<Blur>("ns:b"), vec![]), &mut ctx)
        .unwrap();
    assert_eq!(ctx.node_ids(), vec!["ns:a", "ns:b"]);
}

#[test]
fn identical_task_registration_is_not_an_error() {
    let (mut queue, mut ctx) = setup();
    ctx.nodes
        .register(NodeDef::new::<Threshold>("ns:a"), &source("ext"))
        .unwrap();
    queue
        .schedule(node_task(NodeDef::new::<Threshold>("ns:a"), vec![]), &mut ctx)
        .unwrap();
    assert_eq!(ctx.nodes.len(), 1);
}

// ============================================================
// Monotonicity guard
// ============================================================

/// A task whose predicate answers from a script, to simulate a buggy
/// non-monotonic implementation.
struct ScriptedTask {
    answers: Mutex<VecDeque<bool>>,
    checks: Arc<AtomicUsize>,
    fired: Arc<AtomicUsize>,
}

impl RegistrationTask<Ctx> for ScriptedTask {
    fn describe(&self) -> String {
        "scripted".to_string()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }

    fn can_register(&self, _ctx: &Ctx) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.answers.lock().unwrap().pop_front().unwrap_or(true)
    }

    fn register(&mut self, _ctx: &mut Ctx) -> RegistryResult<()> {
        self.fired.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn flipping_predicate_fires_exactly_once() {
    let (mut queue, mut ctx) = setup();
    let checks = Arc::new(AtomicUsize::new(0));
    let fired = Arc::new(AtomicUsize::new(0));
    queue.enqueue(ScriptedTask {
        answers: Mutex::new(VecDeque::from([false, true, false, true])),
        checks: Arc::clone(&checks),
        fired: Arc::clone(&fired),
    });

    assert_eq!(queue.run(&mut ctx).unwrap(), 0);
    assert_eq!(checks.load(Ordering::SeqCst), 1);

    // Second run observes `true` and fires; later answers are never asked.
    assert_eq!(queue.run(&mut ctx).unwrap(), 1);
    for _ in 0..3 {
        queue.run(&mut ctx).unwrap();
    }

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(checks.load(Ordering::SeqCst), 2);
    assert!(queue.is_empty());
}

#[test]
fn deferred_registration_action_runs_once() {
    let count = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&count);
    let mut task = pipeforge_registry::DeferredRegistration::<Ctx>::new("once", vec![], move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    let mut ctx = Ctx::default();

    assert!(!task.has_fired());
    task.register(&mut ctx).unwrap();
    task.register(&mut ctx).unwrap();

    assert!(task.has_fired());
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn default_predicate_uses_resolver() {
    let mut ctx = Ctx::default();
    let task = node_task(NodeDef::new::<Threshold>("ns:a"), vec![data_dep("ns:image")]);
    assert!(!task.can_register(&ctx));
    assert_eq!(task.missing_dependencies(&ctx), vec![data_dep("ns:image")]);

    ctx.data
        .register(DataDef::new::<Image>("ns:image"), &source("ext"))
        .unwrap();
    assert!(ctx.is_satisfied(&data_dep("ns:image")));
    assert!(task.can_register(&ctx));
    assert!(task.missing_dependencies(&ctx).is_empty());
}

// ============================================================
// Order independence
// ============================================================

#[derive(Debug, Clone, Copy)]
enum Op {
    TaskA,
    TaskB,
    TaskTable,
    DirectImage,
    DirectMask,
}

fn apply(op: Op, queue: &mut TaskQueue<Ctx>, ctx: &mut Ctx) {
    match op {
        Op::TaskA => {
            queue
                .schedule(
                    node_task(NodeDef::new::<Threshold>("ns:a"), vec![data_dep("ns:image")]),
                    ctx,
                )
                .unwrap();
        }
        Op::TaskB => {
            queue
                .schedule(
                    node_task(
                        NodeDef::new::<Blur>("ns:b"),
                        vec![node_dep("ns:a"), data_dep("ns:mask")],
                    ),
                    ctx,
                )
                .unwrap();
        }
        Op::TaskTable => {
            queue
                .schedule(data_task(DataDef::new::<Table>("ns:table"), vec![data_dep("ns:mask")]), ctx)
                .unwrap();
        }
        Op::DirectImage => {
            ctx.data
                .register(DataDef::new::<Image>("ns:image"), &source("ext"))
                .unwrap();
            queue.run(ctx).unwrap();
        }
        Op::DirectMask => {
            ctx.data
                .register(DataDef::new::<Threshold>("ns:mask"), &source("ext"))
                .unwrap();
            queue.run(ctx).unwrap();
        }
    }
}

proptest! {
    #[test]
    fn final_registry_is_order_independent(
        ops in Just(vec![Op::TaskA, Op::TaskB, Op::TaskTable, Op::DirectImage, Op::DirectMask])
            .prop_shuffle()
    ) {
        let (mut queue, mut ctx) = setup();
        for op in ops {
            apply(op, &mut queue, &mut ctx);
        }

        prop_assert!(queue.is_empty());
        prop_assert_eq!(ctx.node_ids(), vec!["ns:a", "ns:b"]);
        prop_assert_eq!(ctx.data_ids(), vec!["ns:image", "ns:mask", "ns:table"]);
    }

    #[test]
    fn unsatisfiable_tasks_survive_any_order(
        ops in Just(vec![Op::TaskA, Op::TaskB, Op::TaskTable, Op::DirectImage]).prop_shuffle()
    ) {
        // Without the mask, only `ns:a` can ever register.
        let (mut queue, mut ctx) = setup();
        for op in ops {
            apply(op, &mut queue, &mut ctx);
        }

        prop_assert_eq!(ctx.node_ids(), vec!["ns:a"]);
        let pending: Vec<String> = queue
            .scheduled_tasks()
            .into_iter()
            .map(|t| t.description)
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        prop_assert_eq!(pending, vec!["data ns:table", "node ns:b"]);
    }
}
