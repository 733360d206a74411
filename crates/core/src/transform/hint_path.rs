use std::path::Path;
use tracing::{info, warn};

use super::RewriteOptions;
use crate::document::Document;
use crate::paths::relative_to_descriptor;

pub const HINT_PATH: &str = "HintPath";

/// Relativize every `HintPath` whose value contains the absolute prefix.
///
/// The new value is relative to the directory holding `descriptor`. Returns
/// `true` if at least one element was rewritten. Values without the prefix,
/// and values that have no relative form (another drive), are left alone.
pub fn rewrite_hint_paths(document: &mut Document, descriptor: &Path, options: &RewriteOptions) -> bool {
  let mut updated = false;

  document.root.visit_mut(&mut |element| {
    if !element.is(HINT_PATH) {
      return;
    }

    let original = element.text();
    let Some(start) = find_prefix(&original, &options.absolute_prefix) else {
      return;
    };

    match relative_to_descriptor(descriptor, original[start..].trim_end(), options.separator) {
      Some(relative) if relative != original => {
        info!("Replaced HintPath: {} => {}", original, relative);
        element.set_text(relative);
        updated = true;
      }
      Some(_) => {}
      None => warn!("HintPath {} in {:?} has no relative form, left unchanged", original, descriptor),
    }
  });

  updated
}

/// Byte offset of `prefix` in `haystack`, ignoring ASCII case.
fn find_prefix(haystack: &str, prefix: &str) -> Option<usize> {
  if prefix.is_empty() || prefix.len() > haystack.len() {
    return None;
  }
  haystack
    .as_bytes()
    .windows(prefix.len())
    .position(|w| w.eq_ignore_ascii_case(prefix.as_bytes()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ABSOLUTE_PREFIX;
  use pretty_assertions::assert_eq;

  fn windows() -> RewriteOptions {
    RewriteOptions::default().separator('\\')
  }

  fn hint_values(doc: &Document) -> Vec<String> {
    let mut values = Vec::new();
    let mut root = doc.root.clone();
    root.visit_mut(&mut |e| {
      if e.is(HINT_PATH) {
        values.push(e.text());
      }
    });
    values
  }

  const APP: &str = r#"<Project xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <ItemGroup>
    <Reference Include="Foo">
      <HintPath>C:\ndensan\framework\libs\Foo.dll</HintPath>
    </Reference>
    <Reference Include="Bar">
      <HintPath>..\packages\Bar.dll</HintPath>
    </Reference>
  </ItemGroup>
</Project>"#;

  #[test]
  fn test_prefixed_hint_path_is_relativized() {
    let mut doc = Document::parse(APP.as_bytes()).unwrap();
    let changed = rewrite_hint_paths(&mut doc, Path::new(r"C:\proj\sub\App.csproj"), &windows());

    assert!(changed);
    assert_eq!(
      hint_values(&doc),
      vec![r"..\..\ndensan\framework\libs\Foo.dll".to_string(), r"..\packages\Bar.dll".to_string()]
    );
  }

  #[test]
  fn test_rewrite_is_idempotent() {
    let descriptor = Path::new(r"C:\proj\sub\App.csproj");
    let mut doc = Document::parse(APP.as_bytes()).unwrap();
    assert!(rewrite_hint_paths(&mut doc, descriptor, &windows()));
    let once = doc.to_bytes().unwrap();

    assert!(!rewrite_hint_paths(&mut doc, descriptor, &windows()));
    assert_eq!(doc.to_bytes().unwrap(), once);
    assert!(hint_values(&doc).iter().all(|v| !v.contains(ABSOLUTE_PREFIX)));
  }

  #[test]
  fn test_document_without_hint_paths_is_unchanged() {
    let src = "<Project><PropertyGroup><OutputType>Exe</OutputType></PropertyGroup></Project>";
    let mut doc = Document::parse(src.as_bytes()).unwrap();
    assert!(!rewrite_hint_paths(&mut doc, Path::new(r"C:\proj\App.csproj"), &windows()));
    assert_eq!(doc.to_bytes().unwrap(), src.as_bytes());
  }

  #[test]
  fn test_prefix_match_ignores_ascii_case() {
    let src = r"<Project><HintPath>c:\NDENSAN\Framework\Foo.dll</HintPath></Project>";
    let mut doc = Document::parse(src.as_bytes()).unwrap();
    assert!(rewrite_hint_paths(&mut doc, Path::new(r"C:\ndensan\app\App.csproj"), &windows()));
    assert_eq!(hint_values(&doc), vec![r"..\Framework\Foo.dll".to_string()]);
  }

  #[test]
  fn test_other_drive_is_left_alone() {
    let src = r"<Project><HintPath>C:\ndensan\framework\Foo.dll</HintPath></Project>";
    let mut doc = Document::parse(src.as_bytes()).unwrap();
    assert!(!rewrite_hint_paths(&mut doc, Path::new(r"D:\work\App.csproj"), &windows()));
    assert_eq!(hint_values(&doc), vec![r"C:\ndensan\framework\Foo.dll".to_string()]);
  }

  #[test]
  fn test_custom_prefix_and_separator() {
    let src = "<Project><HintPath>/opt/shared/lib/Foo.dll</HintPath></Project>";
    let mut doc = Document::parse(src.as_bytes()).unwrap();
    let options = RewriteOptions::with_prefix("/opt/shared/").separator('/');
    assert!(rewrite_hint_paths(&mut doc, Path::new("/opt/apps/app/App.csproj"), &options));
    assert_eq!(hint_values(&doc), vec!["../../shared/lib/Foo.dll".to_string()]);
  }

  #[test]
  fn test_find_prefix() {
    assert_eq!(find_prefix(r"  C:\X\a", r"c:\x\"), Some(2));
    assert_eq!(find_prefix("abc", ""), None);
    assert_eq!(find_prefix("ab", "abc"), None);
  }
}
