// tests/property_scheduler.rs

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;

use dagrun::dag::TaskSpec;
use dagrun::engine::Engine;
use dagrun_test_utils::recording_handler::{HandlerEvent, RecordingHandler};

#[derive(Debug, Clone)]
struct Case {
    specs: Vec<TaskSpec>,
    failing: HashSet<String>,
}

fn name(i: usize) -> String {
    format!("task_{i}")
}

// Acyclic by construction: task N may only wait for tasks 0..N-1.
// task_0 never waits, so there is always a root.
fn case_strategy(max_tasks: usize) -> impl Strategy<Value = Case> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        (
            proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..3), num_tasks),
            proptest::collection::vec(any::<bool>(), num_tasks),
            proptest::collection::vec(any::<bool>(), num_tasks),
        )
            .prop_map(move |(raw_deps, skips, fails)| {
                let specs = raw_deps
                    .into_iter()
                    .enumerate()
                    .map(|(i, potential)| {
                        let deps: BTreeSet<usize> = if i == 0 {
                            BTreeSet::new()
                        } else {
                            potential.into_iter().map(|d| d % i).collect()
                        };
                        // Only odd-indexed tasks may be skipped.
                        let skip = skips[i] && i % 2 == 1;
                        TaskSpec::new(name(i))
                            .wait_for_all(deps.into_iter().map(name))
                            .skip(skip)
                    })
                    .collect();

                let failing = fails
                    .into_iter()
                    .enumerate()
                    .filter(|(i, f)| *f && i % 3 == 0)
                    .map(|(i, _)| name(i))
                    .collect();

                Case { specs, failing }
            })
    })
}

/// Tasks whose handler should have run: not skipped, and every dependency
/// either skipped or ran without failing.
fn expected_invoked(case: &Case) -> HashSet<String> {
    let mut succeeded: HashSet<String> = HashSet::new();
    let mut invoked = HashSet::new();

    for spec in &case.specs {
        let ready = spec.wait_for.iter().all(|d| succeeded.contains(d));
        if spec.skip {
            succeeded.insert(spec.id.clone());
        } else if ready {
            invoked.insert(spec.id.clone());
            if !case.failing.contains(&spec.id) {
                succeeded.insert(spec.id.clone());
            }
        }
    }

    invoked
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn engine_respects_dependencies(case in case_strategy(12)) {
        let mut handler = RecordingHandler::new();
        for id in &case.failing {
            handler = handler.failing_on(id);
        }

        let engine = Engine::new(handler.clone(), case.specs.clone()).unwrap();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let report = rt.block_on(engine.run_with_report());

        let expected = expected_invoked(&case);
        let actual: HashSet<String> = handler.started().into_iter().collect();
        prop_assert_eq!(&actual, &expected);

        for spec in &case.specs {
            let calls = handler.invocations(&spec.id);
            prop_assert!(calls <= 1, "{} invoked {} times", spec.id, calls);

            if calls == 0 {
                continue;
            }

            let start = handler
                .position(&HandlerEvent::Started(spec.id.clone()))
                .unwrap();
            for dep in &spec.wait_for {
                if handler.invocations(dep) == 0 {
                    continue; // skipped dependency
                }
                let dep_end = handler.position(&HandlerEvent::Finished(dep.clone()));
                prop_assert!(
                    matches!(dep_end, Some(p) if p < start),
                    "{} started before dependency {} finished",
                    spec.id,
                    dep
                );
            }
        }

        let failed_and_run = expected.intersection(&case.failing).count();
        prop_assert_eq!(report.errors.len(), failed_and_run);
        prop_assert_eq!(report.failed.len(), failed_and_run);

        let never_ran = case
            .specs
            .iter()
            .filter(|s| !s.skip && !expected.contains(&s.id))
            .count();
        prop_assert_eq!(report.blocked.len(), never_ran);
        prop_assert_eq!(report.is_success(), failed_and_run == 0);
    }
}
