//! Orchestration sequencing tests: dependency ordering, failure isolation,
//! running-set semantics, and cancellation.

use crate::fixtures::{registry_ab, FakeRuntime, RuntimeCall, ScriptedProbe, Stack};

use stackctl::{Error, ServiceDescriptor, ServiceRegistry};

#[test]
fn test_start_reports_health_and_populates_running_set() {
    // A (no deps) healthy, B (depends on A) unhealthy.
    let probe = ScriptedProbe::new()
        .with_healthy("a", true)
        .with_healthy("b", false);
    let mut stack = Stack::new(registry_ab(), FakeRuntime::new(), probe);

    let report = stack.orchestrator.start(&[]).unwrap();

    assert_eq!(
        report,
        vec![("a".to_string(), true), ("b".to_string(), false)]
    );
    assert!(stack.orchestrator.is_running("a"));
    assert!(!stack.orchestrator.is_running("b"));
    assert_eq!(stack.orchestrator.running().len(), 1);

    // One `up` per existing compose file.
    assert_eq!(
        stack.runtime.calls(),
        vec![RuntimeCall::Up(stack.compose_file())]
    );
}

#[test]
fn test_dependent_never_probed_when_dependency_unhealthy() {
    // d never becomes healthy; c depends on it; e is independent.
    let registry = ServiceRegistry::new(vec![
        ServiceDescriptor::new("d", 5432, ""),
        ServiceDescriptor::new("c", 8080, "/health").with_dependencies(&["d"]),
        ServiceDescriptor::new("e", 9090, "/health"),
    ]);
    let probe = ScriptedProbe::new()
        .with_healthy("c", true)
        .with_healthy("e", true);
    let mut stack = Stack::new(registry, FakeRuntime::new(), probe);

    let report = stack.orchestrator.start(&[]).unwrap();

    assert_eq!(
        report,
        vec![
            ("d".to_string(), false),
            ("c".to_string(), false),
            ("e".to_string(), true),
        ]
    );
    // The dependent itself was never probed.
    assert_eq!(stack.probe.probes_of("c"), 0);
    // The independent service was unaffected.
    assert!(stack.orchestrator.is_running("e"));
    assert!(!stack.orchestrator.is_running("c"));
}

#[test]
fn test_stop_clears_running_set_even_when_teardown_fails() {
    let probe = ScriptedProbe::new().with_healthy("a", true);
    let mut stack = Stack::new(registry_ab(), FakeRuntime::new().failing_down(), probe);

    stack.orchestrator.start(&["a".to_string()]).unwrap();
    assert!(stack.orchestrator.is_running("a"));

    stack.orchestrator.stop(&[]).unwrap();

    assert!(stack.orchestrator.running().is_empty());
    // The failing teardown was still attempted.
    assert!(stack
        .runtime
        .calls()
        .contains(&RuntimeCall::Down(stack.compose_file())));
}

#[test]
fn test_restart_on_empty_running_set_equals_stop_then_start() {
    let probe = ScriptedProbe::new()
        .with_healthy("a", true)
        .with_healthy("b", true);
    let mut stack = Stack::new(registry_ab(), FakeRuntime::new(), probe);

    let report = stack.orchestrator.restart(&[]).unwrap();

    assert_eq!(
        report,
        vec![("a".to_string(), true), ("b".to_string(), true)]
    );
    // Teardown ran first, then bring-up.
    assert_eq!(
        stack.runtime.calls(),
        vec![
            RuntimeCall::Down(stack.compose_file()),
            RuntimeCall::Up(stack.compose_file()),
        ]
    );
    assert_eq!(stack.orchestrator.running().len(), 2);
}

#[test]
fn test_status_all_unreachable_maps_every_service_false() {
    // Nothing is scripted healthy; every probe fails.
    let stack = Stack::new(
        ServiceRegistry::builtin(),
        FakeRuntime::new(),
        ScriptedProbe::new(),
    );

    let report = stack.orchestrator.status();

    assert_eq!(report.len(), stack.orchestrator.registry().len());
    assert!(report.iter().all(|(_, healthy)| !healthy));
    // Read-only: no running-set mutation, no compose calls.
    assert!(stack.orchestrator.running().is_empty());
    assert!(stack.runtime.calls().is_empty());
}

#[test]
fn test_start_fails_fast_when_runtime_unavailable() {
    let mut stack = Stack::new(
        registry_ab(),
        FakeRuntime::new().unavailable(),
        ScriptedProbe::new().with_healthy("a", true),
    );

    match stack.orchestrator.start(&[]) {
        Err(Error::RuntimeUnavailable(_)) => {}
        other => panic!("Expected RuntimeUnavailable, got {other:?}"),
    }
    // Nothing was brought up and nothing was probed.
    assert!(stack.runtime.calls().is_empty());
    assert_eq!(stack.probe.probes_of("a"), 0);
}

#[test]
fn test_compose_up_failure_does_not_abort_probing() {
    let probe = ScriptedProbe::new().with_healthy("a", true);
    let mut stack = Stack::new(registry_ab(), FakeRuntime::new().failing_up(), probe);

    let report = stack.orchestrator.start(&["a".to_string()]).unwrap();

    assert_eq!(report, vec![("a".to_string(), true)]);
    assert!(stack.orchestrator.is_running("a"));
}

#[test]
fn test_unknown_service_names_are_skipped() {
    let mut stack = Stack::new(registry_ab(), FakeRuntime::new(), ScriptedProbe::new());

    let report = stack.orchestrator.start(&["ghost".to_string()]).unwrap();

    assert!(report.is_empty());
    assert!(stack.orchestrator.running().is_empty());
}

#[test]
fn test_dangling_dependency_is_skipped_not_fatal() {
    let registry = ServiceRegistry::new(vec![ServiceDescriptor::new("web", 8080, "/health")
        .with_dependencies(&["ghost"])]);
    let probe = ScriptedProbe::new().with_healthy("web", true);
    let mut stack = Stack::new(registry, FakeRuntime::new(), probe);

    let report = stack.orchestrator.start(&[]).unwrap();

    assert_eq!(report, vec![("web".to_string(), true)]);
    assert!(stack.orchestrator.is_running("web"));
}

#[test]
fn test_cancelled_start_stops_best_effort() {
    let probe = ScriptedProbe::new().with_healthy("a", true);
    let mut stack = Stack::new(registry_ab(), FakeRuntime::new(), probe);

    stack.cancel.cancel();

    match stack.orchestrator.start(&[]) {
        Err(Error::Interrupted) => {}
        other => panic!("Expected Interrupted, got {other:?}"),
    }
    // The normal stop path ran and the running set is clear.
    assert!(stack
        .runtime
        .calls()
        .contains(&RuntimeCall::Down(stack.compose_file())));
    assert!(stack.orchestrator.running().is_empty());
}

#[test]
fn test_logs_resolves_container_name() {
    let stack = Stack::new(registry_ab(), FakeRuntime::new(), ScriptedProbe::new());

    stack.orchestrator.logs(Some("a"), true).unwrap();

    assert_eq!(
        stack.runtime.calls(),
        vec![RuntimeCall::Logs {
            container: Some("stack-a".to_string()),
            follow: true,
        }]
    );
}
