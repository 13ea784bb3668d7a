use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use posixbind_abi::directory::{FilesDirectory, getgrnam_with, getpwnam_with};
use posixbind_abi::privilege::setegid_with;
use posixbind_abi::{Error, getgrnam, getpwnam};
use posixbind_core::IdentityRef;

static TEST_SEQ: AtomicU64 = AtomicU64::new(0);

fn temp_path(prefix: &str) -> PathBuf {
    let seq = TEST_SEQ.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("posixbind-{prefix}-{}-{seq}.txt", std::process::id()))
}

fn write_file(path: &Path, content: &[u8]) {
    fs::write(path, content).expect("temporary directory file should be writable");
}

#[test]
fn getpwnam_root_by_name_and_uid() {
    let by_name = getpwnam(&"root".parse().expect("infallible")).expect("root should exist");
    assert_eq!(by_name.uid, 0);
    assert_eq!(by_name.gid, 0);
    let by_uid = getpwnam(&IdentityRef::Id(0)).expect("uid 0 should exist");
    assert_eq!(by_uid.name, "root");
}

#[test]
fn getgrnam_missing_group_is_not_found() {
    let err = getgrnam(&IdentityRef::name("dummyzzz1234")).expect_err("group should not exist");
    assert!(matches!(&err, Error::Identity(e) if e.is_not_found()));
    assert_eq!(err.to_string(), "group id does not exist: dummyzzz1234");
}

#[test]
fn files_directory_answers_forwarding_calls() {
    let passwd = temp_path("passwd");
    let group = temp_path("group");
    write_file(&passwd, b"# local\nsvc:x:4242:4343:Service:/srv:/sbin/nologin\n");
    write_file(&group, b"svc:x:4343:svc,backup\n");
    let dir = FilesDirectory::new(&passwd, &group);

    let user = getpwnam_with(&IdentityRef::name("svc"), &dir).expect("svc should resolve");
    assert_eq!((user.uid, user.gid), (4242, 4343));
    assert_eq!(user.gecos.as_deref(), Some("Service"));

    let grp = getgrnam_with(&IdentityRef::Id(4343), &dir).expect("gid 4343 should resolve");
    assert_eq!(grp.members, vec!["svc", "backup"]);

    let err = getpwnam_with(&IdentityRef::Id(1), &dir).expect_err("uid 1 is not listed");
    assert_eq!(err.to_string(), "user id does not exist: 1");

    let _ = fs::remove_file(passwd);
    let _ = fs::remove_file(group);
}

#[test]
fn unreadable_directory_keeps_errno() {
    let dir = FilesDirectory::new(temp_path("missing-passwd"), temp_path("missing-group"));
    let err = setegid_with(&IdentityRef::name("wheel"), &dir).expect_err("group file is missing");
    assert_eq!(err.errno(), Some(libc::ENOENT));
}
