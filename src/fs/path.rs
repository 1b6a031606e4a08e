//! Path resolution.
//!
//! Paths are resolved to absolute component lists before any disk lookup.
//! There are no symlinks and no drive letters; `/` is the one root, and
//! both `/` and `\` separate components.

/// Characters a file or directory name may not contain, on top of ASCII
/// control characters.
const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Whether `part` is a legal file or directory name.
pub(super) fn valid_name(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c as u32 >= 0x20 && !FORBIDDEN.contains(&c))
}

/// Resolves `path` against `cwd` into absolute components.
///
/// A leading `/` makes the path absolute; otherwise resolution starts at
/// `cwd`. Empty components and `.` are skipped, `..` pops (staying put at
/// the root), and any component with forbidden characters poisons the
/// whole path.
pub(super) fn resolve(cwd: &[String], path: &str) -> Option<Vec<String>> {
    let (mut parts, rest) = match path.strip_prefix('/') {
        Some(rest) => (Vec::new(), rest),
        None => (cwd.to_vec(), path),
    };
    for part in rest.split(['/', '\\']) {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            parts.pop();
            continue;
        }
        if !valid_name(part) {
            return None;
        }
        parts.push(part.to_string());
    }
    Some(parts)
}

/// Joins absolute components back into a `/`-rooted key.
pub(super) fn join(parts: &[String]) -> String {
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cwd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    fn resolved(at: &[&str], path: &str) -> Option<String> {
        resolve(&cwd(at), path).as_deref().map(join)
    }

    #[test]
    fn absolute_paths_ignore_the_cwd() {
        assert_eq!(resolved(&["deep"], "/a/b"), Some("/a/b".to_string()));
        assert_eq!(resolved(&[], "/"), Some("/".to_string()));
    }

    #[test]
    fn relative_paths_start_at_the_cwd() {
        assert_eq!(resolved(&["home"], "docs"), Some("/home/docs".to_string()));
        assert_eq!(resolved(&[], "docs"), Some("/docs".to_string()));
    }

    #[test]
    fn dot_and_empty_components_are_skipped() {
        assert_eq!(resolved(&[], "/a//.//b"), Some("/a/b".to_string()));
        assert_eq!(resolved(&["home"], ""), Some("/home".to_string()));
    }

    #[test]
    fn dotdot_pops_and_saturates_at_the_root() {
        assert_eq!(resolved(&["a", "b"], ".."), Some("/a".to_string()));
        assert_eq!(resolved(&["a"], "../../.."), Some("/".to_string()));
        assert_eq!(resolved(&[], "/a/../b"), Some("/b".to_string()));
    }

    #[test]
    fn backslashes_separate_components_too() {
        assert_eq!(resolved(&[], "/a\\b/c"), Some("/a/b/c".to_string()));
    }

    #[test]
    fn forbidden_characters_poison_the_path() {
        assert_eq!(resolved(&[], "/a<b"), None);
        assert_eq!(resolved(&[], "/a|b"), None);
        assert_eq!(resolved(&[], "/has\u{7}bell"), None);
        assert_eq!(resolved(&[], "/ok/then?bad"), None);
    }

    #[test]
    fn names_may_contain_spaces_and_dots() {
        assert_eq!(
            resolved(&[], "/my docs/notes.txt"),
            Some("/my docs/notes.txt".to_string())
        );
    }

    #[test]
    fn valid_name_rejects_empties_and_controls() {
        assert!(valid_name("file.txt"));
        assert!(valid_name("with space"));
        assert!(!valid_name(""));
        assert!(!valid_name("a:b"));
        assert!(!valid_name("a\nb"));
    }
}
