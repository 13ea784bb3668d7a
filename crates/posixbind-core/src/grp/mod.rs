//! Group database parsing.
//!
//! Files backend for group lookups: parses `/etc/group` content
//! (`name:passwd:gid:member,member`) into [`GroupEntry`] values.

use crate::identity::GroupEntry;
pub use crate::pwd::ParseStats;

fn text(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

/// Parse a single line from `/etc/group`.
///
/// Returns `None` for comments, blank lines, or malformed entries.
pub fn parse_group_line(line: &[u8]) -> Option<GroupEntry> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.is_empty() || line.starts_with(b"#") {
        return None;
    }

    let fields: Vec<&[u8]> = line.split(|&b| b == b':').collect();
    if fields.len() != 4 || fields[0].is_empty() {
        return None;
    }

    let gid = core::str::from_utf8(fields[2]).ok()?.parse::<u32>().ok()?;

    let members = if fields[3].is_empty() {
        Vec::new()
    } else {
        fields[3].split(|&b| b == b',').map(text).collect()
    };

    Some(GroupEntry {
        name: text(fields[0]),
        passwd: text(fields[1]),
        gid,
        members,
    })
}

fn entries(content: &[u8]) -> impl Iterator<Item = GroupEntry> + '_ {
    content.split(|&b| b == b'\n').filter_map(parse_group_line)
}

pub fn lookup_by_name(content: &[u8], name: &str) -> Option<GroupEntry> {
    entries(content).find(|entry| entry.name == name)
}

pub fn lookup_by_gid(content: &[u8], gid: u32) -> Option<GroupEntry> {
    entries(content).find(|entry| entry.gid == gid)
}

pub fn parse_all(content: &[u8]) -> Vec<GroupEntry> {
    entries(content).collect()
}

pub fn parse_all_with_stats(content: &[u8]) -> (Vec<GroupEntry>, ParseStats) {
    let mut stats = ParseStats::default();
    let mut out = Vec::new();
    for line in content.split(|&b| b == b'\n') {
        let trimmed = line.strip_suffix(b"\r").unwrap_or(line);
        if trimmed.is_empty() || trimmed.starts_with(b"#") {
            continue;
        }
        match parse_group_line(trimmed) {
            Some(entry) => out.push(entry),
            None => stats.malformed += 1,
        }
    }
    stats.entries = out.len();
    (out, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_GROUP: &[u8] = b"\
root:x:0:
adm:x:4:syslog,ubuntu
sudo:x:27:ubuntu
users:x:100:alice,bob,charlie
";

    #[test]
    fn parse_line_without_members() {
        let entry = parse_group_line(b"root:x:0:").unwrap();
        assert_eq!(entry.name, "root");
        assert_eq!(entry.passwd, "x");
        assert_eq!(entry.gid, 0);
        assert!(entry.members.is_empty());
    }

    #[test]
    fn parse_line_with_members() {
        let entry = parse_group_line(b"adm:x:4:syslog,ubuntu").unwrap();
        assert_eq!(entry.members, vec!["syslog", "ubuntu"]);
    }

    #[test]
    fn empty_password_field() {
        let entry = parse_group_line(b"nopass::99:").unwrap();
        assert_eq!(entry.passwd, "");
        assert_eq!(entry.gid, 99);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_group_line(b"root:x:0").is_none());
        assert!(parse_group_line(b"root:x:zero:").is_none());
        assert!(parse_group_line(b":x:0:").is_none());
        assert!(parse_group_line(b"# comment").is_none());
    }

    #[test]
    fn lookups() {
        assert_eq!(lookup_by_name(SAMPLE_GROUP, "users").unwrap().members.len(), 3);
        assert_eq!(lookup_by_gid(SAMPLE_GROUP, 27).unwrap().name, "sudo");
        assert!(lookup_by_name(SAMPLE_GROUP, "dummyzzz1234").is_none());
        assert!(lookup_by_gid(SAMPLE_GROUP, 31337).is_none());
    }

    #[test]
    fn stats_count_malformed_lines() {
        let (entries, stats) = parse_all_with_stats(b"root:x:0:\nbroken\n#c\nstaff:x:50:\n");
        assert_eq!(entries.len(), 2);
        assert_eq!(stats.malformed, 1);
        assert_eq!(parse_all(SAMPLE_GROUP).len(), 4);
    }
}
