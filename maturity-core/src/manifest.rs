//! Package manifest parsing.
//!
//! Only what classification and the catalogue need is extracted: the package
//! name, declared dependency names, and whether the manifest declares a
//! package at all.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::{MaturityError, Result};

/// Parsed facts about one manifest file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Declared package name.
    pub name: Option<String>,
    /// Declared dependency names, normalized per ecosystem.
    pub dependencies: BTreeSet<String>,
    /// `false` for workspace roots and config-only files.
    pub declares_package: bool,
}

/// Parse a manifest by file name. `path` is only used in error messages.
pub fn parse_manifest(file_name: &str, path: &Path, contents: &str) -> Result<Manifest> {
    match file_name {
        "Cargo.toml" => parse_cargo(path, contents),
        "package.json" => parse_package_json(path, contents),
        "pyproject.toml" => parse_pyproject(path, contents),
        "setup.py" => Ok(parse_setup_py(contents)),
        "requirements.txt" => Ok(parse_requirements(contents)),
        "go.mod" => Ok(parse_go_mod(contents)),
        "pom.xml" => Ok(parse_pom(contents)),
        "build.gradle" | "build.gradle.kts" => Ok(parse_gradle(contents)),
        "pubspec.yaml" => Ok(parse_pubspec(contents)),
        "Package.swift" => Ok(parse_swift_package(contents)),
        other => Err(MaturityError::Manifest {
            path: path.to_path_buf(),
            message: format!("unsupported manifest {other}"),
        }),
    }
}

type TomlTable = BTreeMap<String, toml::Value>;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CargoToml {
    package: Option<CargoPackage>,
    workspace: Option<toml::Value>,
    dependencies: TomlTable,
    #[serde(rename = "dev-dependencies")]
    dev_dependencies: TomlTable,
    #[serde(rename = "build-dependencies")]
    build_dependencies: TomlTable,
    target: BTreeMap<String, CargoTarget>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CargoPackage {
    name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CargoTarget {
    dependencies: TomlTable,
    #[serde(rename = "dev-dependencies")]
    dev_dependencies: TomlTable,
}

fn parse_cargo(path: &Path, contents: &str) -> Result<Manifest> {
    let cargo: CargoToml = toml::from_str(contents).map_err(|err| manifest_error(path, err))?;
    let mut dependencies: BTreeSet<String> = cargo
        .dependencies
        .keys()
        .chain(cargo.dev_dependencies.keys())
        .chain(cargo.build_dependencies.keys())
        .cloned()
        .collect();
    for target in cargo.target.values() {
        dependencies.extend(target.dependencies.keys().cloned());
        dependencies.extend(target.dev_dependencies.keys().cloned());
    }
    let declares_package = cargo.package.is_some() || cargo.workspace.is_none();
    Ok(Manifest {
        name: cargo.package.and_then(|package| package.name),
        dependencies,
        declares_package,
    })
}

type JsonMap = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct PackageJson {
    name: Option<String>,
    private: Option<serde_json::Value>,
    workspaces: Option<serde_json::Value>,
    dependencies: JsonMap,
    dev_dependencies: JsonMap,
    peer_dependencies: JsonMap,
    optional_dependencies: JsonMap,
}

fn parse_package_json(path: &Path, contents: &str) -> Result<Manifest> {
    let package: PackageJson =
        serde_json::from_str(contents).map_err(|err| manifest_error(path, err))?;
    let private = matches!(package.private, Some(serde_json::Value::Bool(true)));
    let dependencies = package
        .dependencies
        .keys()
        .chain(package.dev_dependencies.keys())
        .chain(package.peer_dependencies.keys())
        .chain(package.optional_dependencies.keys())
        .cloned()
        .collect();
    Ok(Manifest {
        name: package.name,
        dependencies,
        declares_package: !(private && package.workspaces.is_some()),
    })
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PyProject {
    project: Option<PyProjectProject>,
    tool: Option<PyProjectTool>,
    #[serde(rename = "build-system")]
    build_system: Option<toml::Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PyProjectProject {
    name: Option<String>,
    dependencies: Vec<String>,
    #[serde(rename = "optional-dependencies")]
    optional_dependencies: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PyProjectTool {
    poetry: Option<PoetrySection>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PoetrySection {
    name: Option<String>,
    dependencies: TomlTable,
    #[serde(rename = "dev-dependencies")]
    dev_dependencies: TomlTable,
    group: BTreeMap<String, PoetryGroup>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PoetryGroup {
    dependencies: TomlTable,
}

fn parse_pyproject(path: &Path, contents: &str) -> Result<Manifest> {
    let pyproject: PyProject =
        toml::from_str(contents).map_err(|err| manifest_error(path, err))?;
    let poetry = pyproject.tool.and_then(|tool| tool.poetry);
    let declares_package =
        pyproject.project.is_some() || poetry.is_some() || pyproject.build_system.is_some();

    let mut manifest = Manifest {
        declares_package,
        ..Manifest::default()
    };
    if let Some(project) = pyproject.project {
        manifest.name = project.name;
        let specs = project
            .dependencies
            .iter()
            .chain(project.optional_dependencies.values().flatten());
        manifest
            .dependencies
            .extend(specs.filter_map(|spec| requirement_name(spec)));
    }
    if let Some(poetry) = poetry {
        if manifest.name.is_none() {
            manifest.name = poetry.name;
        }
        let names = poetry
            .dependencies
            .keys()
            .chain(poetry.dev_dependencies.keys())
            .chain(poetry.group.values().flat_map(|group| group.dependencies.keys()))
            .filter(|name| name.as_str() != "python");
        manifest
            .dependencies
            .extend(names.filter_map(|name| requirement_name(name)));
    }
    Ok(manifest)
}

fn parse_requirements(contents: &str) -> Manifest {
    let dependencies = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
        .filter_map(requirement_name)
        .collect();
    Manifest {
        name: None,
        dependencies,
        declares_package: true,
    }
}

fn parse_setup_py(contents: &str) -> Manifest {
    let mut manifest = Manifest {
        declares_package: true,
        ..Manifest::default()
    };
    if let Some(start) = contents.find("install_requires") {
        let rest = &contents[start..];
        let list = rest
            .find('[')
            .zip(rest.find(']'))
            .filter(|(open, close)| open < close)
            .map(|(open, close)| &rest[open + 1..close])
            .unwrap_or_default();
        manifest
            .dependencies
            .extend(quoted_strings(list).filter_map(requirement_name));
    }
    manifest.name = contents
        .find("name=")
        .and_then(|start| quoted_strings(&contents[start..]).next())
        .map(str::to_string);
    manifest
}

fn parse_go_mod(contents: &str) -> Manifest {
    let mut manifest = Manifest {
        declares_package: true,
        ..Manifest::default()
    };
    let mut in_block = false;
    for line in contents.lines().map(str::trim) {
        if let Some(module) = line.strip_prefix("module ") {
            manifest.name = Some(module.trim().to_string());
        } else if line.starts_with("require (") {
            in_block = true;
        } else if in_block && line.starts_with(')') {
            in_block = false;
        } else if let Some(single) = line.strip_prefix("require ") {
            push_first_word(&mut manifest.dependencies, single);
        } else if in_block && !line.starts_with("//") {
            push_first_word(&mut manifest.dependencies, line);
        }
    }
    manifest
}

fn parse_pom(contents: &str) -> Manifest {
    let dependencies = contents
        .split("<dependency>")
        .skip(1)
        .filter_map(|chunk| xml_value(chunk, "artifactId"))
        .collect();
    let head = contents
        .split("<dependencies>")
        .next()
        .unwrap_or(contents);
    let without_parent = match (head.find("<parent>"), head.find("</parent>")) {
        (Some(open), Some(close)) if open < close => {
            format!("{}{}", &head[..open], &head[close..])
        }
        _ => head.to_string(),
    };
    let packaging = xml_value(&without_parent, "packaging");
    Manifest {
        name: xml_value(&without_parent, "artifactId"),
        dependencies,
        declares_package: packaging.as_deref() != Some("pom"),
    }
}

const GRADLE_CONFIGURATIONS: &[&str] = &[
    "implementation",
    "api",
    "compileOnly",
    "runtimeOnly",
    "testImplementation",
    "androidTestImplementation",
    "kapt",
    "ksp",
];

fn parse_gradle(contents: &str) -> Manifest {
    let mut dependencies = BTreeSet::new();
    for line in contents.lines().map(str::trim) {
        let declares = GRADLE_CONFIGURATIONS
            .iter()
            .any(|configuration| line.starts_with(configuration));
        if !declares {
            continue;
        }
        for coordinate in quoted_strings(line) {
            let mut parts = coordinate.split(':');
            if let (Some(_group), Some(artifact)) = (parts.next(), parts.next()) {
                dependencies.insert(artifact.to_string());
            }
        }
    }
    if contents.contains("com.android.application") || contents.contains("com.android.library") {
        dependencies.insert("com.android.application".to_string());
    }
    Manifest {
        name: None,
        dependencies,
        declares_package: true,
    }
}

fn parse_pubspec(contents: &str) -> Manifest {
    let mut manifest = Manifest {
        declares_package: true,
        ..Manifest::default()
    };
    let mut in_dependencies = false;
    for line in contents.lines() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        if !line.starts_with(' ') {
            let key = line.split(':').next().unwrap_or_default().trim();
            in_dependencies = matches!(key, "dependencies" | "dev_dependencies");
            if key == "name" {
                manifest.name = line
                    .split_once(':')
                    .map(|(_, value)| value.trim().trim_matches(['"', '\'']).to_string());
            }
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        if in_dependencies && indent == 2 {
            if let Some((key, _)) = line.trim().split_once(':') {
                manifest.dependencies.insert(key.trim().to_string());
            }
        }
    }
    manifest
}

fn parse_swift_package(contents: &str) -> Manifest {
    let mut manifest = Manifest {
        declares_package: true,
        ..Manifest::default()
    };
    manifest.name = contents
        .find("name:")
        .and_then(|start| quoted_strings(&contents[start..]).next())
        .map(str::to_string);
    for chunk in contents.split(".package(").skip(1) {
        let Some(url) = quoted_strings(chunk).next() else {
            continue;
        };
        let repository = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(url)
            .trim_end_matches(".git")
            .to_lowercase();
        if !repository.is_empty() {
            manifest.dependencies.insert(repository);
        }
    }
    manifest
}

/// Normalized distribution name of a PEP 508 requirement.
pub fn requirement_name(spec: &str) -> Option<String> {
    let name = spec
        .trim()
        .split(['=', '<', '>', '!', '~', '[', ';', '@', '(', ' '])
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
        .replace('_', "-");
    (!name.is_empty()).then_some(name)
}

fn push_first_word(dependencies: &mut BTreeSet<String>, line: &str) {
    if let Some(word) = line.split_whitespace().next() {
        dependencies.insert(word.to_string());
    }
}

fn quoted_strings(text: &str) -> impl Iterator<Item = &str> {
    text.split(['"', '\''])
        .skip(1)
        .step_by(2)
        .filter(|value| !value.trim().is_empty())
}

fn xml_value(text: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = text.find(&open)? + open.len();
    let end = text[start..].find(&close)? + start;
    Some(text[start..end].trim().to_string())
}

fn manifest_error(path: &Path, err: impl std::fmt::Display) -> MaturityError {
    MaturityError::Manifest {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
