//! Shared fixtures for the posixbind benchmarks.

use std::fmt::Write;

/// A passwd file with `n` service accounts followed by `target`.
#[must_use]
pub fn passwd_fixture(n: usize, target: &str) -> Vec<u8> {
    let mut out = String::from("root:x:0:0:root:/root:/bin/sh\n");
    for i in 0..n {
        let uid = 1000 + i;
        let _ = writeln!(out, "svc{i}:x:{uid}:{uid}:Service {i}:/srv/svc{i}:/usr/sbin/nologin");
    }
    let _ = writeln!(out, "{target}:x:60000:60000::/home/{target}:/bin/sh");
    out.into_bytes()
}

/// A group file with `n` groups of three members each.
#[must_use]
pub fn group_fixture(n: usize) -> Vec<u8> {
    let mut out = String::from("root:x:0:\n");
    for i in 0..n {
        let _ = writeln!(out, "grp{i}:x:{}:a{i},b{i},c{i}", 2000 + i);
    }
    out.into_bytes()
}
