use crucible::{check, Error, FindingKind, Model, Report, RunConfig, Runner};

fn divides_evenly() {
    let a = crucible::uint8("a");
    let b = crucible::uint8("b");
    if b != 0 {
        check!(a % b < b);
        check!(a / b <= a);
        check!(b > 16 || a / b != 3);
    }
}

fn runner() -> Runner {
    Runner::new(RunConfig {
        iterations: 20_000,
        seed: Some(77),
        ..RunConfig::default()
    })
}

#[test]
fn finding_model_reproduces_the_failure() {
    let report = runner().run("divides", divides_evenly);
    let [finding] = report.findings() else {
        panic!("expected a counterexample: {report}");
    };
    assert_eq!(finding.kind, FindingKind::AssertionFailed);
    let a = finding.model.get("a").unwrap().bits;
    let b = finding.model.get("b").unwrap().bits;
    assert_eq!(a / b, 3);

    let replayed = runner().replay("divides", &finding.model, divides_evenly).unwrap();
    assert_eq!(replayed.paths, 1);
    assert_eq!(replayed.findings()[0].location, finding.location);
    assert_eq!(replayed.findings()[0].model, finding.model);
}

#[test]
fn models_survive_json() {
    let report = runner().run("divides", divides_evenly);
    let json = report.to_json().unwrap();
    let restored = Report::from_json(&json).unwrap();
    assert_eq!(restored, report);

    let model_json = restored.findings()[0].model.to_json().unwrap();
    let model = Model::from_json(&model_json).unwrap();
    let replayed = runner().replay("divides", &model, divides_evenly).unwrap();
    assert!(!replayed.is_success());
}

#[test]
fn same_seed_same_report() {
    let first = runner().run("divides", divides_evenly);
    let second = runner().run("divides", divides_evenly);
    assert_eq!(first, second);
}

#[test]
fn replay_rejects_a_different_harness() {
    let report = runner().run("divides", divides_evenly);
    let model = &report.findings()[0].model;

    let err = runner()
        .replay("other", model, || {
            let _ = crucible::uint32("a");
        })
        .unwrap_err();
    assert!(matches!(err, Error::ReplayDivergence { index: 0, .. }), "{err}");

    let err = runner()
        .replay("longer", model, || {
            let _ = crucible::uint8("a");
            let _ = crucible::uint8("b");
            let _ = crucible::uint8("c");
        })
        .unwrap_err();
    assert!(matches!(err, Error::ReplayExhausted { index: 2, .. }), "{err}");

    let err = runner()
        .replay("shorter", model, || {
            let _ = crucible::uint8("a");
        })
        .unwrap_err();
    assert!(
        matches!(err, Error::ReplayUnconsumed { index: 1, ref name } if name == "b"),
        "{err}"
    );
}

#[test]
fn malformed_model_json() {
    assert!(matches!(Model::from_json("{\"not\": \"a model\"}"), Err(Error::Json(_))));
}
