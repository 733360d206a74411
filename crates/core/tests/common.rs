//! Fixture trees for run-level tests.
//!
//! The tree mimics a small solution with a shared framework directory:
//!
//! ```text
//! <root>/framework/libs/Foo.dll        (only referenced, never created)
//! <root>/src/App/App.csproj            HintPath into framework + ProjectReference to Lib
//! <root>/src/Lib/Lib.csproj            AssemblyName Company.Lib, nothing to rewrite
//! <root>/src/Tool/Tool.vbproj          OutputType Exe, nothing to rewrite
//! ```

use relink_core::{RewriteOptions, RunOptions};
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use tempfile::TempDir;

/// Replace `/` with the host separator.
#[allow(dead_code)]
pub fn native(path: &str) -> String {
  path.replace('/', &MAIN_SEPARATOR.to_string())
}

/// Prefix that plays the role of the hard-coded framework directory.
pub fn framework_prefix(root: &Path) -> String {
  format!("{}{}", root.join("framework").display(), MAIN_SEPARATOR)
}

pub fn app_csproj(root: &Path) -> String {
  format!(
    r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="15.0">
  <PropertyGroup>
    <OutputType>Exe</OutputType>
    <AssemblyName>App</AssemblyName>
  </PropertyGroup>
  <ItemGroup>
    <Reference Include="Foo">
      <HintPath>{prefix}{libs}</HintPath>
    </Reference>
  </ItemGroup>
  <ItemGroup>
    <ProjectReference Include="..\Lib\Lib.csproj" />
  </ItemGroup>
</Project>
"#,
    prefix = framework_prefix(root),
    libs = native("libs/Foo.dll"),
  )
}

pub const LIB_CSPROJ: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="15.0">
  <PropertyGroup>
    <OutputType>Library</OutputType>
    <AssemblyName>Company.Lib</AssemblyName>
  </PropertyGroup>
</Project>
"#;

pub const TOOL_VBPROJ: &str = r#"<Project>
  <PropertyGroup>
    <OutputType>Exe</OutputType>
  </PropertyGroup>
</Project>
"#;

pub struct Fixture {
  pub dir: TempDir,
  pub report: TempDir,
}

#[allow(dead_code)]
impl Fixture {
  pub fn new() -> Self {
    let dir = TempDir::new().expect("Failed to create fixture dir");
    let report = TempDir::new().expect("Failed to create report dir");
    let root = dir.path();

    write(&root.join("src/App/App.csproj"), &app_csproj(root));
    write(&root.join("src/Lib/Lib.csproj"), LIB_CSPROJ);
    write(&root.join("src/Tool/Tool.vbproj"), TOOL_VBPROJ);

    Self { dir, report }
  }

  pub fn root(&self) -> &Path {
    self.dir.path()
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.dir.path().join(relative)
  }

  pub fn read(&self, relative: &str) -> String {
    std::fs::read_to_string(self.path(relative)).expect("Failed to read fixture file")
  }

  pub fn report_path(&self) -> PathBuf {
    self.report.path().join("change_history.txt")
  }

  pub fn options(&self) -> RunOptions {
    RunOptions {
      rewrite: RewriteOptions::with_prefix(framework_prefix(self.root())),
      ..RunOptions::new(self.report_path())
    }
  }
}

pub fn write(path: &Path, contents: &str) {
  std::fs::create_dir_all(path.parent().expect("fixture path has a parent")).expect("Failed to create fixture dirs");
  std::fs::write(path, contents).expect("Failed to write fixture file");
}
