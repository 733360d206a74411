//! Lexical path arithmetic for descriptor references.
//!
//! Descriptors carry Windows-style paths no matter which host runs the tool,
//! so paths here are handled as strings: both `\` and `/` are accepted as
//! separators, drive letters and UNC shares are recognised, and `.`/`..`
//! segments are folded without touching the file system.

use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// The anchor of an absolute path.
#[derive(Debug, Clone)]
enum Root {
  /// Relative path, no root.
  None,
  /// `C:` style drive prefix.
  Drive(char),
  /// `\\server\share` prefix.
  Unc { server: String, share: String },
  /// Leading separator with no drive (`/usr/...` or `\foo`).
  Separator,
}

impl Root {
  fn same_as(&self, other: &Root) -> bool {
    match (self, other) {
      (Root::None, Root::None) | (Root::Separator, Root::Separator) => true,
      (Root::Drive(a), Root::Drive(b)) => a.eq_ignore_ascii_case(b),
      (
        Root::Unc { server: a, share: b },
        Root::Unc {
          server: c,
          share: d,
        },
      ) => a.eq_ignore_ascii_case(c) && b.eq_ignore_ascii_case(d),
      _ => false,
    }
  }

  /// Windows roots compare segments case-insensitively.
  fn case_insensitive(&self) -> bool {
    matches!(self, Root::Drive(_) | Root::Unc { .. })
  }
}

/// A path split into its root and normalized segments.
#[derive(Debug, Clone)]
pub struct LexicalPath {
  root: Root,
  segments: Vec<String>,
}

fn is_separator(c: char) -> bool {
  c == '\\' || c == '/'
}

impl LexicalPath {
  /// Parse a path string, accepting either separator style.
  pub fn parse(raw: &str) -> Self {
    let chars: Vec<char> = raw.chars().collect();

    let (root, rest) = if chars.len() >= 2 && is_separator(chars[0]) && is_separator(chars[1]) {
      let mut parts = raw[2..].split(is_separator).filter(|s| !s.is_empty());
      let server = parts.next().unwrap_or_default().to_string();
      let share = parts.next().unwrap_or_default().to_string();
      let rest: Vec<&str> = parts.collect();
      return Self::from_parts(Root::Unc { server, share }, rest);
    } else if chars.len() >= 2 && chars[0].is_ascii_alphabetic() && chars[1] == ':' {
      (Root::Drive(chars[0]), &raw[2..])
    } else if chars.first().is_some_and(|c| is_separator(*c)) {
      (Root::Separator, raw)
    } else {
      (Root::None, raw)
    };

    Self::from_parts(root, rest.split(is_separator).filter(|s| !s.is_empty()).collect())
  }

  fn from_parts(root: Root, parts: Vec<&str>) -> Self {
    let mut path = Self {
      root,
      segments: Vec::with_capacity(parts.len()),
    };
    for part in parts {
      path.push(part);
    }
    path
  }

  /// Build from a native path, e.g. one produced by directory traversal.
  pub fn from_path(path: &Path) -> Self {
    Self::parse(&path.to_string_lossy())
  }

  pub fn is_absolute(&self) -> bool {
    !matches!(self.root, Root::None)
  }

  /// Append one segment, folding `.` and `..`.
  pub fn push(&mut self, segment: &str) {
    match segment {
      "" | "." => {}
      ".." => match self.segments.last() {
        Some(last) if last != ".." => {
          self.segments.pop();
        }
        // `..` above an absolute root stays at the root
        _ if self.is_absolute() => {}
        _ => self.segments.push("..".to_string()),
      },
      other => self.segments.push(other.to_string()),
    }
  }

  /// Resolve `other` against this path. Absolute inputs replace it outright.
  pub fn join(&self, other: &str) -> Self {
    let other = Self::parse(other);
    if other.is_absolute() {
      return other;
    }
    let mut joined = self.clone();
    for segment in &other.segments {
      joined.push(segment);
    }
    joined
  }

  /// The containing directory, or `None` at the root.
  pub fn parent(&self) -> Option<Self> {
    if self.segments.is_empty() {
      return None;
    }
    let mut parent = self.clone();
    parent.segments.pop();
    Some(parent)
  }

  pub fn file_name(&self) -> Option<&str> {
    self.segments.last().map(String::as_str)
  }

  /// File name without its final extension.
  pub fn file_stem(&self) -> Option<&str> {
    let name = self.file_name()?;
    match name.rfind('.') {
      Some(0) | None => Some(name),
      Some(idx) => Some(&name[..idx]),
    }
  }

  /// Render with the given separator.
  pub fn render(&self, separator: char) -> String {
    let sep = separator.to_string();
    let body = self.segments.join(&sep);
    match &self.root {
      Root::None => body,
      Root::Drive(letter) => format!("{letter}:{sep}{body}"),
      Root::Unc { server, share } if body.is_empty() => format!("{sep}{sep}{server}{sep}{share}"),
      Root::Unc { server, share } => format!("{sep}{sep}{server}{sep}{share}{sep}{body}"),
      Root::Separator => format!("{sep}{body}"),
    }
  }

  /// Render with the host separator so the path can be opened.
  pub fn to_path_buf(&self) -> PathBuf {
    PathBuf::from(self.render(MAIN_SEPARATOR))
  }

  fn segment_eq(&self, a: &str, b: &str) -> bool {
    if self.root.case_insensitive() {
      a.eq_ignore_ascii_case(b)
    } else {
      a == b
    }
  }
}

/// Compute the path of `target` relative to the directory `anchor_dir`.
///
/// Both inputs must be absolute and share a root; otherwise there is no
/// relative form and `None` is returned. The result uses `separator` between
/// segments and is `.` when the two paths are the same.
pub fn relative_path(anchor_dir: &LexicalPath, target: &LexicalPath, separator: char) -> Option<String> {
  if !anchor_dir.is_absolute() || !target.is_absolute() || !anchor_dir.root.same_as(&target.root) {
    return None;
  }

  let common = anchor_dir
    .segments
    .iter()
    .zip(&target.segments)
    .take_while(|(a, b)| anchor_dir.segment_eq(a, b))
    .count();

  let mut parts: Vec<&str> = Vec::new();
  parts.extend(std::iter::repeat_n("..", anchor_dir.segments.len() - common));
  parts.extend(target.segments[common..].iter().map(String::as_str));

  if parts.is_empty() {
    return Some(".".to_string());
  }
  Some(parts.join(&separator.to_string()))
}

/// Relative path from the directory holding `descriptor` to `target`.
pub fn relative_to_descriptor(descriptor: &Path, target: &str, separator: char) -> Option<String> {
  let anchor = LexicalPath::from_path(descriptor).parent()?;
  relative_path(&anchor, &LexicalPath::parse(target), separator)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rel(anchor: &str, target: &str) -> Option<String> {
    relative_path(&LexicalPath::parse(anchor), &LexicalPath::parse(target), '\\')
  }

  #[test]
  fn test_target_inside_anchor() {
    assert_eq!(rel(r"C:\proj", r"C:\proj\libs\Foo.dll").as_deref(), Some(r"libs\Foo.dll"));
  }

  #[test]
  fn test_target_in_sibling_tree() {
    assert_eq!(
      rel(r"C:\proj\sub", r"C:\proj\other\bin\Other.dll").as_deref(),
      Some(r"..\other\bin\Other.dll")
    );
  }

  #[test]
  fn test_target_in_parent_tree() {
    assert_eq!(
      rel(r"C:\proj\sub", r"C:\ndensan\framework\libs\Foo.dll").as_deref(),
      Some(r"..\..\ndensan\framework\libs\Foo.dll")
    );
  }

  #[test]
  fn test_drive_and_segments_compare_case_insensitively() {
    assert_eq!(rel(r"c:\Proj\Sub", r"C:\proj\sub\a.dll").as_deref(), Some("a.dll"));
  }

  #[test]
  fn test_posix_paths_are_case_sensitive() {
    assert_eq!(
      relative_path(&LexicalPath::parse("/work/Proj"), &LexicalPath::parse("/work/proj/a.dll"), '/').as_deref(),
      Some("../proj/a.dll")
    );
  }

  #[test]
  fn test_different_drives_have_no_relative_form() {
    assert_eq!(rel(r"D:\proj", r"C:\ndensan\framework\Foo.dll"), None);
  }

  #[test]
  fn test_relative_inputs_have_no_relative_form() {
    assert_eq!(rel(r"proj\sub", r"C:\a.dll"), None);
  }

  #[test]
  fn test_unc_share() {
    assert_eq!(
      rel(r"\\build\src\proj", r"\\build\src\libs\Foo.dll").as_deref(),
      Some(r"..\libs\Foo.dll")
    );
    assert_eq!(rel(r"\\build\src\proj", r"\\other\src\libs\Foo.dll"), None);
  }

  #[test]
  fn test_separator_is_normalized() {
    assert_eq!(rel("C:/proj/sub", r"C:\proj/libs\Foo.dll").as_deref(), Some(r"..\libs\Foo.dll"));
  }

  #[test]
  fn test_percent_sequences_survive() {
    assert_eq!(rel(r"C:\proj", r"C:\proj\my%20libs\Foo.dll").as_deref(), Some(r"my%20libs\Foo.dll"));
  }

  #[test]
  fn test_join_folds_parent_segments() {
    let base = LexicalPath::parse(r"C:\proj");
    assert_eq!(base.join(r"..\Other\Other.csproj").render('\\'), r"C:\Other\Other.csproj");
    assert_eq!(base.join(r"D:\abs\X.csproj").render('\\'), r"D:\abs\X.csproj");
    assert_eq!(base.join(r"..\..\..\X.csproj").render('\\'), r"C:\X.csproj");
  }

  #[test]
  fn test_relative_path_keeps_leading_parents() {
    let path = LexicalPath::parse(r"..\..\a\.\b");
    assert_eq!(path.render('/'), "../../a/b");
  }

  #[test]
  fn test_file_stem() {
    assert_eq!(LexicalPath::parse(r"C:\a\Other.Lib.csproj").file_stem(), Some("Other.Lib"));
    assert_eq!(LexicalPath::parse("/a/.hidden").file_stem(), Some(".hidden"));
  }

  #[test]
  fn test_relative_to_descriptor_uses_containing_directory() {
    assert_eq!(
      relative_to_descriptor(Path::new("/repo/app/App.csproj"), "/repo/lib/bin/Lib.dll", '/').as_deref(),
      Some("../lib/bin/Lib.dll")
    );
  }
}
