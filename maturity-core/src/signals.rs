//! Repository signals consumed by the scoring engine.
//!
//! A [`SignalContext`] is an immutable snapshot of everything the criteria are
//! allowed to look at. The engine never touches the filesystem; every lookup
//! here is a pure query over already-collected data, and a missing signal is
//! reported as absence rather than as an error.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A mapping of language names to their percentage of total lines.
pub type LanguageDistribution = BTreeMap<String, f64>;

/// Classification of a discovered subproject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubprojectType {
    /// Browser-facing front end.
    Web,
    /// Long-running network service.
    Service,
    /// Mobile application.
    Mobile,
    /// Reusable package with no runtime surface of its own.
    Library,
    /// Manifest present but not understood.
    Unknown,
}

impl SubprojectType {
    /// Stable lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Service => "service",
            Self::Mobile => "mobile",
            Self::Library => "library",
            Self::Unknown => "unknown",
        }
    }

    /// Classify a subproject from its manifest kind, declared dependencies,
    /// and files (paths relative to the subproject).
    ///
    /// Precedence is mobile, web, service, library. `None` for the ecosystem
    /// means the manifest could not be read and yields [`SubprojectType::Unknown`].
    pub fn classify<'a>(
        ecosystem: Option<Ecosystem>,
        dependencies: &BTreeSet<String>,
        files: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let Some(ecosystem) = ecosystem else {
            return Self::Unknown;
        };
        let files: Vec<&str> = files.into_iter().collect();
        let depends_on = |names: &[&str]| names.iter().any(|name| dependencies.contains(*name));
        let has_file = |suffix: &str| {
            files
                .iter()
                .any(|file| *file == suffix || file.ends_with(&format!("/{suffix}")))
        };

        if depends_on(MOBILE_DEPENDENCIES)
            || (ecosystem == Ecosystem::Dart && dependencies.contains("flutter"))
            || has_file("AndroidManifest.xml")
            || has_file("Podfile")
        {
            return Self::Mobile;
        }
        if depends_on(WEB_DEPENDENCIES)
            || files
                .iter()
                .any(|file| *file == "index.html" || *file == "public/index.html")
        {
            return Self::Web;
        }
        if depends_on(SERVICE_DEPENDENCIES) {
            return Self::Service;
        }
        Self::Library
    }
}

impl fmt::Display for SubprojectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const MOBILE_DEPENDENCIES: &[&str] = &[
    "react-native",
    "expo",
    "@capacitor/core",
    "@ionic/core",
    "nativescript",
    "com.android.application",
];

const WEB_DEPENDENCIES: &[&str] = &[
    "react",
    "react-dom",
    "vue",
    "next",
    "nuxt",
    "@angular/core",
    "svelte",
    "@sveltejs/kit",
    "solid-js",
    "preact",
    "gatsby",
    "astro",
    "@remix-run/react",
    "yew",
    "leptos",
];

const SERVICE_DEPENDENCIES: &[&str] = &[
    "express",
    "fastify",
    "koa",
    "@nestjs/core",
    "@hapi/hapi",
    "django",
    "flask",
    "fastapi",
    "starlette",
    "tornado",
    "aiohttp",
    "actix-web",
    "axum",
    "rocket",
    "warp",
    "tonic",
    "poem",
    "github.com/gin-gonic/gin",
    "github.com/labstack/echo/v4",
    "github.com/gofiber/fiber/v2",
    "github.com/go-chi/chi/v5",
    "spring-boot-starter-web",
    "spring-boot-starter-webflux",
    "quarkus-rest",
    "micronaut-http-server-netty",
    "ktor-server-core",
    "vapor",
    "hummingbird",
];

/// Package ecosystem identified by the manifest that anchors a subproject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// Rust crates (`Cargo.toml`).
    Cargo,
    /// JavaScript/TypeScript packages (`package.json`).
    Npm,
    /// Python projects.
    Python,
    /// Go modules.
    Go,
    /// Maven builds.
    Maven,
    /// Gradle builds.
    Gradle,
    /// Dart and Flutter packages.
    Dart,
    /// Swift packages.
    Swift,
}

/// Manifest file names in the order they anchor a subproject.
pub const MANIFESTS: &[(&str, Ecosystem)] = &[
    ("Cargo.toml", Ecosystem::Cargo),
    ("package.json", Ecosystem::Npm),
    ("pyproject.toml", Ecosystem::Python),
    ("setup.py", Ecosystem::Python),
    ("requirements.txt", Ecosystem::Python),
    ("go.mod", Ecosystem::Go),
    ("pom.xml", Ecosystem::Maven),
    ("build.gradle", Ecosystem::Gradle),
    ("build.gradle.kts", Ecosystem::Gradle),
    ("pubspec.yaml", Ecosystem::Dart),
    ("Package.swift", Ecosystem::Swift),
];

impl Ecosystem {
    /// Ecosystem for a manifest file name, if recognized.
    pub fn from_manifest(file_name: &str) -> Option<Self> {
        MANIFESTS
            .iter()
            .find(|(name, _)| *name == file_name)
            .map(|(_, ecosystem)| *ecosystem)
    }

    /// Lockfile names that pin this ecosystem's dependency graph.
    pub fn lockfiles(self) -> &'static [&'static str] {
        match self {
            Self::Cargo => &["Cargo.lock"],
            Self::Npm => &[
                "package-lock.json",
                "npm-shrinkwrap.json",
                "yarn.lock",
                "pnpm-lock.yaml",
                "bun.lockb",
            ],
            Self::Python => &["poetry.lock", "uv.lock", "Pipfile.lock", "pdm.lock"],
            Self::Go => &["go.sum"],
            Self::Maven => &[],
            Self::Gradle => &["gradle.lockfile"],
            Self::Dart => &["pubspec.lock"],
            Self::Swift => &["Package.resolved"],
        }
    }

    /// Whether the compiler already enforces static types.
    pub fn is_statically_typed(self) -> bool {
        !matches!(self, Self::Npm | Self::Python)
    }
}

/// A discovered unit of code within the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subproject {
    /// Package or directory name.
    pub name: String,
    /// Absolute path on disk.
    #[schema(value_type = String)]
    pub path: PathBuf,
    /// Path relative to the repository root, `.` for the root itself.
    pub relative_path: String,
    /// Classified subproject type.
    #[serde(rename = "type")]
    pub kind: SubprojectType,
    /// Ecosystem of the anchoring manifest.
    pub ecosystem: Ecosystem,
    /// Declared dependency names.
    #[schema(value_type = Vec<String>)]
    pub dependencies: BTreeSet<String>,
}

impl Subproject {
    /// Path of a repository-relative file as seen from this subproject.
    pub fn relative_of<'a>(&self, path: &'a str) -> &'a str {
        strip_dir(&self.relative_path, path)
    }

    /// Repository-relative path of a file inside this subproject.
    pub fn file_path(&self, name: &str) -> String {
        join_relative(&self.relative_path, name)
    }

    /// Whether any of the given dependency names is declared.
    pub fn depends_on(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.dependencies.contains(*name))
    }

    /// Whether any declared dependency starts with one of the prefixes.
    pub fn depends_on_prefix(&self, prefixes: &[&str]) -> bool {
        self.dependencies
            .iter()
            .any(|dep| prefixes.iter().any(|prefix| dep.starts_with(prefix)))
    }
}

/// A CI workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    /// Repository-relative path.
    pub path: String,
    /// Raw file contents.
    pub contents: String,
}

/// Immutable snapshot of repository signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalContext {
    /// Repository root on disk.
    pub root: PathBuf,
    /// Repository display name.
    pub name: String,
    /// Detected languages by share of lines.
    pub languages: LanguageDistribution,
    /// Discovered subprojects.
    pub subprojects: Vec<Subproject>,
    /// Every collected file, relative to the root with `/` separators.
    pub files: BTreeSet<String>,
    /// Source files that carry inline test modules (for example `#[cfg(test)]`).
    pub test_sources: BTreeSet<String>,
    /// Contents of selected small files (manifests, config), keyed by relative path.
    pub contents: BTreeMap<String, String>,
    /// CI workflow files.
    pub workflows: Vec<Workflow>,
    /// Root README text.
    pub readme: Option<String>,
}

impl SignalContext {
    /// Whether the exact relative path was collected.
    pub fn has_file(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    /// Whether any of the exact relative paths was collected.
    pub fn has_any_file(&self, paths: &[&str]) -> bool {
        paths.iter().any(|path| self.has_file(path))
    }

    /// First file directly inside `dir` whose lowercase stem is one of `stems`.
    ///
    /// The stem is the file name up to its first dot, so `LICENSE-MIT` does not
    /// match `license` while `License.md` does.
    pub fn find_named(&self, dir: &str, stems: &[&str]) -> Option<&str> {
        self.files_under(dir)
            .filter(|path| {
                let rest = strip_dir(dir, path);
                !rest.contains('/')
            })
            .find(|path| {
                let name = file_name(path).to_lowercase();
                let stem = name.split('.').next().unwrap_or_default();
                stems.contains(&stem)
            })
    }

    /// Files at or below `dir`; `.` or an empty string means the whole repository.
    pub fn files_under<'a>(&'a self, dir: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        let prefix = if dir.is_empty() || dir == "." {
            String::new()
        } else {
            format!("{}/", dir.trim_end_matches('/'))
        };
        self.files
            .iter()
            .filter(move |path| path.starts_with(&prefix))
            .map(String::as_str)
    }

    /// Repository-relative paths of the files a subproject owns: everything
    /// under its directory except files inside nested subprojects.
    pub fn subproject_paths<'a>(
        &'a self,
        subproject: &Subproject,
    ) -> impl Iterator<Item = &'a str> + use<'a> {
        let nested = nested_dirs(
            &subproject.relative_path,
            self.subprojects.iter().map(|other| other.relative_path.as_str()),
        );
        self.owned_paths(&subproject.relative_path, nested)
    }

    /// Files a subproject owns, relative to the subproject directory.
    pub fn subproject_files<'a>(
        &'a self,
        subproject: &Subproject,
    ) -> impl Iterator<Item = &'a str> + use<'a> {
        let dir = subproject.relative_path.clone();
        self.subproject_paths(subproject)
            .map(move |path| strip_dir(&dir, path))
    }

    pub(crate) fn owned_paths<'a>(
        &'a self,
        dir: &str,
        nested: Vec<String>,
    ) -> impl Iterator<Item = &'a str> + use<'a> {
        self.files_under(dir)
            .filter(move |path| !nested.iter().any(|child| is_within(child, path)))
    }

    /// Whether a subproject directly contains any of the named files.
    pub fn subproject_has_any(&self, subproject: &Subproject, names: &[&str]) -> bool {
        names
            .iter()
            .any(|name| self.has_file(&subproject.file_path(name)))
    }

    /// Collected contents of a relative path, if it was captured.
    pub fn content(&self, path: &str) -> Option<&str> {
        self.contents.get(path).map(String::as_str)
    }

    /// Whether any workflow mentions one of the needles (case-insensitive).
    pub fn workflow_mentions(&self, needles: &[&str]) -> bool {
        self.workflows.iter().any(|workflow| {
            let haystack = workflow.contents.to_lowercase();
            needles
                .iter()
                .any(|needle| haystack.contains(&needle.to_lowercase()))
        })
    }
}

/// The entity a predicate is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target<'a> {
    /// The repository as a whole.
    Repository,
    /// A single discovered subproject.
    Subproject(&'a Subproject),
}

/// Target identifier used for the repository itself.
pub const REPOSITORY_TARGET: &str = ".";

impl Target<'_> {
    /// Display identifier: `.` for the repository, the relative path otherwise.
    pub fn id(&self) -> String {
        match self {
            Self::Repository => REPOSITORY_TARGET.to_string(),
            Self::Subproject(subproject) => subproject.relative_path.clone(),
        }
    }
}

fn join_relative(dir: &str, name: &str) -> String {
    if dir.is_empty() || dir == "." {
        name.to_string()
    } else {
        format!("{}/{name}", dir.trim_end_matches('/'))
    }
}

/// Directories among `dirs` that sit strictly inside `dir`.
pub fn nested_dirs<'a>(dir: &str, dirs: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    dirs.into_iter()
        .filter(|other| *other != dir && *other != "." && is_within(dir, other))
        .map(str::to_string)
        .collect()
}

fn is_within(dir: &str, path: &str) -> bool {
    if dir.is_empty() || dir == "." {
        return true;
    }
    path.strip_prefix(dir.trim_end_matches('/'))
        .is_some_and(|rest| rest.starts_with('/'))
}

fn strip_dir<'a>(dir: &str, path: &'a str) -> &'a str {
    if dir.is_empty() || dir == "." {
        return path;
    }
    path.strip_prefix(dir.trim_end_matches('/'))
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path)
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(files: &[&str]) -> SignalContext {
        SignalContext {
            name: "demo".to_string(),
            files: files.iter().map(|file| file.to_string()).collect(),
            ..SignalContext::default()
        }
    }

    fn deps(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn subproject(relative_path: &str) -> Subproject {
        Subproject {
            name: relative_path.to_string(),
            path: PathBuf::from("/repo").join(relative_path),
            relative_path: relative_path.to_string(),
            kind: SubprojectType::Library,
            ecosystem: Ecosystem::Cargo,
            dependencies: BTreeSet::new(),
        }
    }

    #[test]
    fn find_named_matches_stem_case_insensitively() {
        let ctx = context(&["License.md", "docs/README.md", "LICENSE-MIT"]);
        assert_eq!(ctx.find_named(".", &["license"]), Some("License.md"));
        assert_eq!(ctx.find_named(".", &["readme"]), None);
        assert_eq!(ctx.find_named("docs", &["readme"]), Some("docs/README.md"));
    }

    #[test]
    fn files_under_respects_directory_boundaries() {
        let ctx = context(&["api/src/main.rs", "api-client/src/lib.rs", "README.md"]);
        let api: Vec<&str> = ctx.files_under("api").collect();
        assert_eq!(api, vec!["api/src/main.rs"]);
        assert_eq!(ctx.files_under(".").count(), 3);
    }

    #[test]
    fn subproject_files_are_relative() {
        let ctx = context(&["api/src/main.rs", "api/Cargo.toml", "README.md"]);
        let files: Vec<&str> = ctx.subproject_files(&subproject("api")).collect();
        assert_eq!(files, vec!["Cargo.toml", "src/main.rs"]);
        assert!(ctx.subproject_has_any(&subproject("api"), &["Cargo.toml"]));
        assert!(!ctx.subproject_has_any(&subproject("api"), &["Cargo.lock"]));
    }

    #[test]
    fn nested_subproject_files_belong_to_the_child() {
        let mut ctx = context(&[
            "Cargo.toml",
            "src/main.rs",
            "mobile/package.json",
            "mobile/ios/Podfile",
            "mobile-docs/guide.md",
        ]);
        ctx.subprojects = vec![subproject("."), subproject("mobile")];

        let root: Vec<&str> = ctx.subproject_files(&ctx.subprojects[0]).collect();
        assert_eq!(root, vec!["Cargo.toml", "mobile-docs/guide.md", "src/main.rs"]);
        let mobile: Vec<&str> = ctx.subproject_paths(&ctx.subprojects[1]).collect();
        assert_eq!(mobile, vec!["mobile/ios/Podfile", "mobile/package.json"]);
        assert_eq!(ctx.subprojects[1].relative_of("mobile/ios/Podfile"), "ios/Podfile");
    }

    #[test]
    fn nested_dirs_only_lists_strict_descendants() {
        let dirs = [".", "apps", "apps/web", "apps-legacy", "libs/core"];
        assert_eq!(nested_dirs("apps", dirs), vec!["apps/web".to_string()]);
        assert_eq!(nested_dirs(".", dirs).len(), 4);
        assert!(nested_dirs("libs/core", dirs).is_empty());
    }

    #[test]
    fn root_subproject_paths_are_unprefixed() {
        let root = subproject(".");
        assert_eq!(root.file_path("Cargo.lock"), "Cargo.lock");
        assert_eq!(Target::Subproject(&root).id(), ".");
        assert_eq!(Target::Repository.id(), REPOSITORY_TARGET);
    }

    #[test]
    fn workflow_mentions_is_case_insensitive() {
        let ctx = SignalContext {
            workflows: vec![Workflow {
                path: ".github/workflows/ci.yml".to_string(),
                contents: "run: Cargo Test --all".to_string(),
            }],
            ..SignalContext::default()
        };
        assert!(ctx.workflow_mentions(&["cargo test"]));
        assert!(!ctx.workflow_mentions(&["pytest"]));
    }

    #[test]
    fn classify_prefers_mobile_then_web_then_service() {
        let files: [&str; 0] = [];
        assert_eq!(
            SubprojectType::classify(
                Some(Ecosystem::Npm),
                &deps(&["react-native", "react"]),
                files
            ),
            SubprojectType::Mobile
        );
        assert_eq!(
            SubprojectType::classify(Some(Ecosystem::Npm), &deps(&["next", "express"]), files),
            SubprojectType::Web
        );
        assert_eq!(
            SubprojectType::classify(Some(Ecosystem::Cargo), &deps(&["axum", "tokio"]), files),
            SubprojectType::Service
        );
        assert_eq!(
            SubprojectType::classify(Some(Ecosystem::Cargo), &deps(&["serde"]), files),
            SubprojectType::Library
        );
        assert_eq!(
            SubprojectType::classify(None, &deps(&["axum"]), files),
            SubprojectType::Unknown
        );
    }

    #[test]
    fn classify_uses_config_presence() {
        let empty = BTreeSet::new();
        assert_eq!(
            SubprojectType::classify(Some(Ecosystem::Npm), &empty, ["public/index.html"]),
            SubprojectType::Web
        );
        assert_eq!(
            SubprojectType::classify(
                Some(Ecosystem::Gradle),
                &empty,
                ["app/src/main/AndroidManifest.xml"]
            ),
            SubprojectType::Mobile
        );
        assert_eq!(
            SubprojectType::classify(Some(Ecosystem::Dart), &deps(&["flutter"]), []),
            SubprojectType::Mobile
        );
    }

    #[test]
    fn ecosystem_lookup_by_manifest() {
        assert_eq!(Ecosystem::from_manifest("go.mod"), Some(Ecosystem::Go));
        assert_eq!(Ecosystem::from_manifest("Makefile"), None);
        assert!(Ecosystem::Go.is_statically_typed());
        assert!(!Ecosystem::Python.is_statically_typed());
    }
}
