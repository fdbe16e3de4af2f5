//! Gathers a [`SignalContext`] from a repository on disk.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path};

use crate::error::Result;
use crate::fs::FileSystem;
use crate::inspector::LanguageInspector;
use crate::manifest::{Manifest, parse_manifest};
use crate::signals::{
    Ecosystem, MANIFESTS, SignalContext, Subproject, SubprojectType, Workflow, nested_dirs,
};

/// Files whose text is kept in [`SignalContext::contents`] besides manifests.
const CAPTURED_FILES: &[&str] = &["setup.cfg", "Dockerfile", "Containerfile"];

const ROOT_WORKFLOWS: &[&str] = &[
    ".gitlab-ci.yml",
    ".circleci/config.yml",
    "azure-pipelines.yml",
    "bitbucket-pipelines.yml",
    "Jenkinsfile",
];

/// Walk `root` and build the signal snapshot the criteria evaluate.
///
/// Only listing the root can fail. Files that cannot be read are logged and
/// treated as absent, and manifests that cannot be parsed yield subprojects
/// of unknown type.
pub fn collect_signals<F: FileSystem>(fs: &F, root: &Path) -> Result<SignalContext> {
    let paths = fs.list_files(root)?;
    let files: BTreeSet<String> = paths
        .iter()
        .filter_map(|path| relative_path(root, path))
        .collect();

    let sources = LanguageInspector::new(fs).inspect(&paths);
    let test_sources = sources
        .test_sources
        .iter()
        .filter_map(|path| relative_path(root, path))
        .collect();

    let readme = files
        .iter()
        .find(|path| !path.contains('/') && stem(path) == "readme")
        .and_then(|path| read_file(fs, root, path));

    let workflows = files
        .iter()
        .filter(|path| is_workflow(path))
        .filter_map(|path| {
            read_file(fs, root, path).map(|contents| Workflow {
                path: path.clone(),
                contents,
            })
        })
        .collect();

    let contents = files
        .iter()
        .filter(|path| is_captured(file_name(path)))
        .filter_map(|path| read_file(fs, root, path).map(|text| (path.clone(), text)))
        .collect();

    let mut ctx = SignalContext {
        root: root.to_path_buf(),
        name: repository_name(root),
        languages: sources.languages,
        subprojects: Vec::new(),
        files,
        test_sources,
        contents,
        workflows,
        readme,
    };
    ctx.subprojects = discover_subprojects(&ctx);

    log::debug!(
        "collected {} files, {} workflows, {} subprojects from {}",
        ctx.files.len(),
        ctx.workflows.len(),
        ctx.subprojects.len(),
        root.display()
    );
    Ok(ctx)
}

/// One subproject per directory holding a manifest that declares a package.
///
/// Within a directory manifests are tried in [`MANIFESTS`] order; the first
/// one that declares a package anchors the subproject, and the other
/// manifests of the same ecosystem add their dependencies. Files inside a
/// nested subproject count towards the child only.
pub fn discover_subprojects(ctx: &SignalContext) -> Vec<Subproject> {
    let mut by_dir: BTreeMap<&str, Vec<(&str, Ecosystem)>> = BTreeMap::new();
    for (manifest, ecosystem) in MANIFESTS {
        for path in ctx.files.iter().filter(|path| file_name(path) == *manifest) {
            by_dir
                .entry(parent_dir(path))
                .or_default()
                .push((path.as_str(), *ecosystem));
        }
    }

    let anchored: Vec<(Subproject, bool)> = by_dir
        .into_iter()
        .filter_map(|(dir, manifests)| anchor_subproject(ctx, dir, &manifests))
        .collect();
    let dirs: Vec<String> = anchored
        .iter()
        .map(|(subproject, _)| subproject.relative_path.clone())
        .collect();

    anchored
        .into_iter()
        .map(|(mut subproject, understood)| {
            let nested = nested_dirs(&subproject.relative_path, dirs.iter().map(String::as_str));
            let owned: Vec<&str> = ctx
                .owned_paths(&subproject.relative_path, nested)
                .map(|path| subproject.relative_of(path))
                .collect();
            subproject.kind = SubprojectType::classify(
                understood.then_some(subproject.ecosystem),
                &subproject.dependencies,
                owned,
            );
            log::debug!(
                "subproject {} at {} classified as {}",
                subproject.name,
                subproject.relative_path,
                subproject.kind
            );
            subproject
        })
        .collect()
}

fn anchor_subproject(
    ctx: &SignalContext,
    dir: &str,
    manifests: &[(&str, Ecosystem)],
) -> Option<(Subproject, bool)> {
    let mut anchor = None;
    for (index, (path, ecosystem)) in manifests.iter().enumerate() {
        match read_manifest(ctx, path) {
            Some(manifest) if !manifest.declares_package => {
                log::debug!("{path} declares no package");
            }
            parsed => {
                anchor = Some((index, *ecosystem, parsed));
                break;
            }
        }
    }
    let (index, ecosystem, parsed) = anchor?;

    let understood = parsed.is_some();
    let mut manifest = parsed.unwrap_or_default();
    for (path, other) in &manifests[index + 1..] {
        if *other != ecosystem {
            continue;
        }
        if let Some(extra) = read_manifest(ctx, path) {
            manifest.dependencies.extend(extra.dependencies);
        }
    }

    let name = manifest
        .name
        .take()
        .unwrap_or_else(|| directory_name(dir, &ctx.name));
    let path = if dir == "." {
        ctx.root.clone()
    } else {
        ctx.root.join(dir)
    };
    let subproject = Subproject {
        name,
        path,
        relative_path: dir.to_string(),
        kind: SubprojectType::Unknown,
        ecosystem,
        dependencies: manifest.dependencies,
    };
    Some((subproject, understood))
}

/// `None` when the manifest could not be read or parsed.
fn read_manifest(ctx: &SignalContext, path: &str) -> Option<Manifest> {
    let Some(contents) = ctx.content(path) else {
        log::warn!("manifest {path} was not readable");
        return None;
    };
    match parse_manifest(file_name(path), Path::new(path), contents) {
        Ok(manifest) => Some(manifest),
        Err(err) => {
            log::warn!("{err}");
            None
        }
    }
}

fn read_file<F: FileSystem>(fs: &F, root: &Path, relative: &str) -> Option<String> {
    let path = root.join(relative);
    match fs.read_to_string(&path) {
        Ok(contents) => Some(contents),
        Err(err) => {
            log::warn!("skipping {}: {err}", path.display());
            None
        }
    }
}

/// Root-relative path with `/` separators; `None` for paths outside `root`.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    if relative.is_absolute() {
        return None;
    }
    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    (!segments.is_empty()).then(|| segments.join("/"))
}

fn is_workflow(path: &str) -> bool {
    if let Some(name) = path.strip_prefix(".github/workflows/") {
        return !name.contains('/') && (name.ends_with(".yml") || name.ends_with(".yaml"));
    }
    ROOT_WORKFLOWS.contains(&path)
}

fn is_captured(name: &str) -> bool {
    CAPTURED_FILES.contains(&name) || Ecosystem::from_manifest(name).is_some()
}

fn repository_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

fn directory_name(dir: &str, repository: &str) -> String {
    if dir == "." {
        repository.to_string()
    } else {
        file_name(dir).to_string()
    }
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or(".")
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn stem(path: &str) -> String {
    file_name(path)
        .split('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}
