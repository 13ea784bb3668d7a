use posixbind_core::{IdentityRef, LimitValue};
use posixbind_harness::probe::{Operation, run};
use posixbind_harness::structured_log::Outcome;

#[test]
fn ids_report_all_fields() {
    let report = run(&Operation::Ids);
    assert!(report.ok, "{report:?}");
    let value = report.value.unwrap();
    for key in ["pid", "ppid", "pgrp", "uid", "euid", "gid", "egid"] {
        assert!(value[key].is_number(), "missing {key}");
    }
    assert!(value["ppid"].as_i64().unwrap() > 0);
}

#[test]
fn getrlimit_all_lists_every_resource() {
    let report = run(&Operation::GetRlimit { resource: None });
    let value = report.value.expect("limits should be readable");
    let obj = value.as_object().unwrap();
    assert_eq!(obj.len(), posixbind_core::ResourceKind::all().len());
    assert!(obj.contains_key("nofile"));
    assert!(obj["nofile"].get("soft").is_some());
}

#[test]
fn setrlimit_soft_only_reports_installed_pair() {
    let before = run(&Operation::GetRlimit {
        resource: Some("nofile".into()),
    })
    .value
    .unwrap();
    let soft = before["soft"].as_u64().map_or(LimitValue::Unbounded, LimitValue::Finite);

    let report = run(&Operation::SetRlimit {
        resource: "nofile".into(),
        soft: Some(soft),
        hard: None,
    });
    assert!(report.ok, "{report:?}");
    assert_eq!(report.value.unwrap(), before);
}

#[test]
fn unknown_resource_is_rejected_without_errno() {
    let report = run(&Operation::SetRlimit {
        resource: "bogus".into(),
        soft: Some(LimitValue::Finite(1)),
        hard: None,
    });
    assert!(!report.ok);
    assert_eq!(report.errno, None);
    assert_eq!(report.outcome(), Outcome::Rejected);
    assert_eq!(report.error.as_deref(), Some("setrlimit: unknown resource name: bogus"));
}

#[test]
fn getpwnam_root_by_either_reference() {
    for ident in [IdentityRef::name("root"), IdentityRef::Id(0)] {
        let report = run(&Operation::GetPwnam(ident));
        let value = report.value.expect("root should resolve");
        assert_eq!(value["name"], "root");
        assert_eq!(value["uid"], 0);
    }
}

#[test]
fn missing_group_reports_not_found() {
    let report = run(&Operation::GetGrnam(IdentityRef::name("dummyzzz1234")));
    assert!(!report.ok);
    assert_eq!(report.error.as_deref(), Some("group id does not exist: dummyzzz1234"));
}

#[test]
fn setlogmask_without_priorities_queries() {
    let first = run(&Operation::SetLogMask(Vec::new())).value.unwrap();
    let second = run(&Operation::SetLogMask(Vec::new())).value.unwrap();
    assert_eq!(first["previous"], second["previous"]);
    assert_eq!(first["previous"].as_object().unwrap().len(), 8);
}

#[test]
fn syslog_rejects_unknown_facility() {
    let report = run(&Operation::Syslog {
        ident: Some("probe".into()),
        facility: "local9".into(),
        options: Vec::new(),
        priority: "info".into(),
        message: "hello".into(),
    });
    assert_eq!(report.error.as_deref(), Some("invalid syslog constant value: local9"));
}

#[test]
fn syslog_reports_truncated_ident() {
    let report = run(&Operation::Syslog {
        ident: Some("probe-ident".into()),
        facility: "user".into(),
        options: vec!["pid".into()],
        priority: "debug".into(),
        message: "posixbind probe test".into(),
    });
    let value = report.value.expect("syslog should succeed");
    assert_eq!(value["ident"], "probe-ident");
    assert_eq!(value["priority"], "debug");
}
