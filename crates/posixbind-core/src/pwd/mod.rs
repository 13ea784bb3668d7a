//! Password database parsing.
//!
//! Files backend for user lookups: parses `/etc/passwd` content in the
//! standard colon-delimited format into [`UserEntry`] values.

use crate::identity::UserEntry;

/// Line accounting from a full parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub entries: usize,
    /// Non-blank, non-comment lines that failed to parse.
    pub malformed: usize,
}

fn text(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

/// Parse a single line from `/etc/passwd`.
///
/// Format: `name:passwd:uid:gid:gecos:dir:shell`
/// Returns `None` for comments, blank lines, or malformed entries.
pub fn parse_passwd_line(line: &[u8]) -> Option<UserEntry> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.is_empty() || line.starts_with(b"#") {
        return None;
    }

    let fields: Vec<&[u8]> = line.split(|&b| b == b':').collect();
    if fields.len() != 7 || fields[0].is_empty() {
        return None;
    }

    let uid = core::str::from_utf8(fields[2]).ok()?.parse::<u32>().ok()?;
    let gid = core::str::from_utf8(fields[3]).ok()?.parse::<u32>().ok()?;

    Some(UserEntry {
        name: text(fields[0]),
        passwd: text(fields[1]),
        uid,
        gid,
        gecos: Some(text(fields[4])),
        dir: text(fields[5]),
        shell: text(fields[6]),
    })
}

fn entries(content: &[u8]) -> impl Iterator<Item = UserEntry> + '_ {
    content.split(|&b| b == b'\n').filter_map(parse_passwd_line)
}

/// First entry whose name matches exactly (case-sensitive).
pub fn lookup_by_name(content: &[u8], name: &str) -> Option<UserEntry> {
    entries(content).find(|entry| entry.name == name)
}

/// First entry with the given uid.
pub fn lookup_by_uid(content: &[u8], uid: u32) -> Option<UserEntry> {
    entries(content).find(|entry| entry.uid == uid)
}

pub fn parse_all(content: &[u8]) -> Vec<UserEntry> {
    entries(content).collect()
}

/// Parse every entry and count the lines that were skipped as malformed.
pub fn parse_all_with_stats(content: &[u8]) -> (Vec<UserEntry>, ParseStats) {
    let mut stats = ParseStats::default();
    let mut out = Vec::new();
    for line in content.split(|&b| b == b'\n') {
        let trimmed = line.strip_suffix(b"\r").unwrap_or(line);
        if trimmed.is_empty() || trimmed.starts_with(b"#") {
            continue;
        }
        match parse_passwd_line(trimmed) {
            Some(entry) => out.push(entry),
            None => stats.malformed += 1,
        }
    }
    stats.entries = out.len();
    (out, stats)
}
