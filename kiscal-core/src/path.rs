//! Mapping request paths to calendar locations.
//!
//! A request path such as `/alice/work.ics` names the calendar `work.ics`
//! owned by `alice`. Paths are cleaned lexically before anything else looks
//! at them, so `.` and `..` segments can never climb out of the storage root:
//! `/../../etc/passwd.ics` becomes `/etc/passwd.ics`, owned by `etc`.
//! Containment on disk (including symlinks) is enforced by the storage root
//! when the cleaned path is joined onto it.

use std::path::PathBuf;

use crate::error::{KiscalError, KiscalResult};

/// Suffix every calendar path must carry.
pub const CALENDAR_SUFFIX: &str = ".ics";

/// A cleaned calendar location: an owner plus one or more name segments.
///
/// The only way to build one is [`CalendarPath::resolve`], so every value
/// has already been normalized and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarPath {
    owner: String,
    name: Vec<String>,
}

impl CalendarPath {
    pub fn resolve(url_path: &str) -> KiscalResult<Self> {
        if !url_path.ends_with(CALENDAR_SUFFIX) {
            return Err(KiscalError::InvalidPath(format!(
                "'{url_path}' must end with {CALENDAR_SUFFIX}"
            )));
        }

        let mut segments: Vec<&str> = Vec::new();
        for segment in url_path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s if s.contains(['\0', '\\']) => {
                    return Err(KiscalError::InvalidPath(format!(
                        "'{url_path}' contains a forbidden character"
                    )));
                }
                s => segments.push(s),
            }
        }

        let Some((owner, name)) = segments.split_first() else {
            return Err(expected_format(url_path));
        };
        if name.is_empty() {
            return Err(expected_format(url_path));
        }

        Ok(CalendarPath {
            owner: owner.to_string(),
            name: name.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Calendar name relative to the owner, e.g. `work.ics` or `team/work.ics`.
    pub fn name(&self) -> String {
        self.name.join("/")
    }

    /// Location relative to the storage root: `{owner}/{name}`.
    pub fn relative(&self) -> PathBuf {
        std::iter::once(&self.owner).chain(&self.name).collect()
    }
}

impl std::fmt::Display for CalendarPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/{}", self.owner, self.name())
    }
}

fn expected_format(url_path: &str) -> KiscalError {
    KiscalError::InvalidPath(format!(
        "'{url_path}' does not match /{{username}}/{{calendar}}{CALENDAR_SUFFIX}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Component;

    #[test]
    fn test_resolve_simple_path() {
        let path = CalendarPath::resolve("/alice/work.ics").unwrap();
        assert_eq!(path.owner(), "alice");
        assert_eq!(path.name(), "work.ics");
        assert_eq!(path.relative(), PathBuf::from("alice/work.ics"));
        assert_eq!(path.to_string(), "/alice/work.ics");
    }

    #[test]
    fn test_resolve_without_leading_slash() {
        let path = CalendarPath::resolve("alice/work.ics").unwrap();
        assert_eq!(path, CalendarPath::resolve("/alice/work.ics").unwrap());
    }

    #[test]
    fn test_resolve_collapses_redundant_segments() {
        let path = CalendarPath::resolve("//alice/./drafts/../work.ics").unwrap();
        assert_eq!(path.owner(), "alice");
        assert_eq!(path.name(), "work.ics");
    }

    #[test]
    fn test_resolve_nested_name() {
        let path = CalendarPath::resolve("/alice/team/work.ics").unwrap();
        assert_eq!(path.owner(), "alice");
        assert_eq!(path.name(), "team/work.ics");
        assert_eq!(path.relative(), PathBuf::from("alice/team/work.ics"));
    }

    #[test]
    fn test_resolve_requires_suffix() {
        for input in ["/alice/work", "/alice/work.ics/", "/alice/work.ICS", "/", ""] {
            assert!(
                matches!(CalendarPath::resolve(input), Err(KiscalError::InvalidPath(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn test_resolve_requires_owner_and_name() {
        for input in ["/work.ics", "work.ics", "/alice/../work.ics", "/../work.ics"] {
            assert!(
                matches!(CalendarPath::resolve(input), Err(KiscalError::InvalidPath(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn test_resolve_rejects_forbidden_characters() {
        assert!(CalendarPath::resolve("/alice/..\\..\\evil.ics").is_err());
        assert!(CalendarPath::resolve("/alice/nul\0.ics").is_err());
    }

    #[test]
    fn test_traversal_changes_owner_but_stays_rooted() {
        let path = CalendarPath::resolve("/../../etc/passwd.ics").unwrap();
        assert_eq!(path.owner(), "etc");
        assert_eq!(path.name(), "passwd.ics");

        let path = CalendarPath::resolve("/alice/../bob/work.ics").unwrap();
        assert_eq!(path.owner(), "bob");
    }

    #[test]
    fn test_traversal_leaves_only_plain_segments() {
        let attacks = [
            "/../../etc/passwd.ics",
            "/alice/../../../../etc/shadow.ics",
            "../alice/x.ics",
            "/alice/./../../bob/x.ics",
            "/alice/team/../../../..//x/y.ics",
            "/./././a/b.ics",
            "/a/b/c/../../../../../../d/e.ics",
        ];

        for attack in attacks {
            let path = CalendarPath::resolve(attack).unwrap();
            let relative = path.relative();
            assert!(
                relative
                    .components()
                    .all(|c| matches!(c, Component::Normal(_))),
                "{attack} -> {}",
                relative.display()
            );
        }
    }
}
