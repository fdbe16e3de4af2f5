//! Built-in criterion catalogue.
//!
//! Each entry is a plain [`Criterion`] record. Predicates only query the
//! [`SignalContext`]; anything they cannot find is a `fail` (practice missing)
//! or `not-applicable` (practice irrelevant for the target), never a panic.

use crate::criterion::{CheckResult, Criterion, Scope, Tier};
use crate::signals::{SignalContext, Subproject, SubprojectType, Target};

const DOCUMENTATION: &str = "Documentation";
const TESTING: &str = "Testing";
const CI_CD: &str = "CI/CD";
const CODE_QUALITY: &str = "Code Quality";
const SECURITY: &str = "Security";
const OBSERVABILITY: &str = "Observability";
const DEPLOYMENT: &str = "Deployment";
const DATA: &str = "Data";

/// README shorter than this is treated as a placeholder.
const MIN_README_CHARS: usize = 150;

const TEST_COMMANDS: &[&str] = &[
    "cargo test",
    "cargo nextest",
    "npm test",
    "npm run test",
    "yarn test",
    "pnpm test",
    "bun test",
    "pytest",
    "tox",
    "nox",
    "go test",
    "mvn test",
    "mvn verify",
    "gradle test",
    "gradlew test",
    "gradlew check",
    "flutter test",
    "swift test",
    "jest",
    "vitest",
    "make test",
    "dotnet test",
];

const LINT_COMMANDS: &[&str] = &[
    "clippy",
    "cargo fmt",
    "eslint",
    "npm run lint",
    "yarn lint",
    "pnpm lint",
    "biome",
    "ruff",
    "flake8",
    "pylint",
    "black --check",
    "golangci-lint",
    "go vet",
    "prettier --check",
    "ktlint",
    "detekt",
    "swiftlint",
    "rubocop",
    "pre-commit run",
];

const RELEASE_TOOLS: &[&str] = &[
    "release-please",
    "semantic-release",
    "goreleaser",
    "changesets",
    "release-plz",
    "cargo-release",
    "cargo release",
    "cargo publish",
    "npm publish",
    "twine upload",
    "action-gh-release",
    "gh release create",
];

const RELEASE_CONFIGS: &[&str] = &[
    ".releaserc",
    ".releaserc.json",
    ".goreleaser.yml",
    ".goreleaser.yaml",
    "release-please-config.json",
    "release-plz.toml",
    ".changeset/config.json",
];

const FORMATTER_CONFIGS: &[&str] = &[
    ".editorconfig",
    "rustfmt.toml",
    ".rustfmt.toml",
    ".prettierrc",
    ".prettierrc.json",
    ".prettierrc.yaml",
    ".prettierrc.yml",
    ".prettierrc.js",
    "prettier.config.js",
    "biome.json",
    ".clang-format",
    ".pre-commit-config.yaml",
    ".golangci.yml",
    ".golangci.yaml",
];

const DEPENDENCY_BOTS: &[&str] = &[
    ".github/dependabot.yml",
    ".github/dependabot.yaml",
    "renovate.json",
    "renovate.json5",
    ".renovaterc",
    ".renovaterc.json",
    ".github/renovate.json",
    ".github/renovate.json5",
];

const CODEOWNERS: &[&str] = &["CODEOWNERS", ".github/CODEOWNERS", "docs/CODEOWNERS"];

const SECURITY_SCANNERS: &[&str] = &[
    "codeql",
    "trivy",
    "gitleaks",
    "trufflehog",
    "snyk",
    "semgrep",
    "cargo audit",
    "cargo-audit",
    "cargo deny",
    "cargo-deny",
    "npm audit",
    "pip-audit",
    "bandit",
    "gosec",
    "govulncheck",
    "osv-scanner",
    "dependency-review-action",
];

const COVERAGE_CONFIGS: &[&str] = &[
    "codecov.yml",
    ".codecov.yml",
    ".coveragerc",
    ".nycrc",
    ".nycrc.json",
    "tarpaulin.toml",
];

const COVERAGE_DEPENDENCIES: &[&str] = &[
    "nyc",
    "c8",
    "@vitest/coverage-v8",
    "@vitest/coverage-istanbul",
    "@jest/coverage",
    "pytest-cov",
    "coverage",
];

const COVERAGE_COMMANDS: &[&str] = &[
    "codecov",
    "coveralls",
    "tarpaulin",
    "llvm-cov",
    "grcov",
    "--coverage",
    "coverprofile",
    "--cov",
    "jacoco",
];

const LOGGING_DEPENDENCIES: &[&str] = &[
    "tracing",
    "log",
    "slog",
    "env_logger",
    "winston",
    "pino",
    "bunyan",
    "log4js",
    "structlog",
    "loguru",
    "python-json-logger",
    "go.uber.org/zap",
    "github.com/sirupsen/logrus",
    "github.com/rs/zerolog",
    "logback-classic",
    "log4j-core",
    "slf4j-api",
    "loglevel",
    "consola",
];

const TELEMETRY_PREFIXES: &[&str] = &[
    "sentry",
    "@sentry/",
    "opentelemetry",
    "@opentelemetry/",
    "prometheus",
    "prom-client",
    "dd-trace",
    "datadog",
    "@datadog/",
    "newrelic",
    "go.opentelemetry.io/otel",
    "github.com/prometheus/",
    "github.com/getsentry/",
    "micrometer",
];

const DATABASE_PREFIXES: &[&str] = &[
    "diesel",
    "sqlx",
    "sea-orm",
    "rusqlite",
    "tokio-postgres",
    "prisma",
    "@prisma/client",
    "typeorm",
    "sequelize",
    "knex",
    "mongoose",
    "drizzle-orm",
    "pg",
    "mysql2",
    "sqlalchemy",
    "psycopg",
    "django",
    "peewee",
    "gorm.io/",
    "github.com/jackc/pgx",
    "github.com/lib/pq",
    "spring-boot-starter-data",
    "hibernate-core",
];

const MIGRATION_DIRS: &[&str] = &["migrations", "migration", "migrate", "alembic"];

const ENV_EXAMPLES: &[&str] = &[".env.example", ".env.sample", ".env.template", "example.env"];

const E2E_DEPENDENCIES: &[&str] = &[
    "@playwright/test",
    "playwright",
    "cypress",
    "puppeteer",
    "webdriverio",
    "@wdio/cli",
    "nightwatch",
    "testcafe",
];

const A11Y_DEPENDENCIES: &[&str] = &[
    "eslint-plugin-jsx-a11y",
    "eslint-plugin-vuejs-accessibility",
    "axe-core",
    "@axe-core/react",
    "@axe-core/playwright",
    "jest-axe",
    "vue-axe",
    "pa11y",
    "@lhci/cli",
];

/// The built-in criteria in display order.
pub fn builtin_criteria() -> Vec<Criterion> {
    vec![
        Criterion {
            id: "readme",
            category: DOCUMENTATION,
            tier: Tier::Basic,
            title: "README",
            description: "The repository root has a README with real content.",
            recommendation: "Add a README.md describing what the project does and how to build, run, and test it.",
            scope: Scope::Repository,
            predicate: readme,
        },
        Criterion {
            id: "license",
            category: DOCUMENTATION,
            tier: Tier::Basic,
            title: "License",
            description: "The repository declares a license at its root.",
            recommendation: "Add a LICENSE file so consumers know the terms of use.",
            scope: Scope::Repository,
            predicate: license,
        },
        Criterion {
            id: "contributing-guide",
            category: DOCUMENTATION,
            tier: Tier::Intermediate,
            title: "Contributing guide",
            description: "Contributors can find how to propose changes.",
            recommendation: "Add CONTRIBUTING.md covering setup, coding conventions, and the review process.",
            scope: Scope::Repository,
            predicate: contributing_guide,
        },
        Criterion {
            id: "changelog",
            category: DOCUMENTATION,
            tier: Tier::Intermediate,
            title: "Changelog",
            description: "User-visible changes are recorded per release.",
            recommendation: "Keep a CHANGELOG.md, or generate one from release tooling.",
            scope: Scope::Repository,
            predicate: changelog,
        },
        Criterion {
            id: "pr-template",
            category: DOCUMENTATION,
            tier: Tier::Intermediate,
            title: "Pull request template",
            description: "Pull requests start from a shared checklist.",
            recommendation: "Add .github/pull_request_template.md with the checks reviewers expect.",
            scope: Scope::Repository,
            predicate: pr_template,
        },
        Criterion {
            id: "issue-templates",
            category: DOCUMENTATION,
            tier: Tier::Advanced,
            title: "Issue templates",
            description: "Bug reports and feature requests follow templates.",
            recommendation: "Add templates under .github/ISSUE_TEMPLATE/ for bugs and feature requests.",
            scope: Scope::Repository,
            predicate: issue_templates,
        },
        Criterion {
            id: "tests-present",
            category: TESTING,
            tier: Tier::Basic,
            title: "Automated tests",
            description: "Each subproject contains automated tests.",
            recommendation: "Add a test suite next to the code, even a smoke test to start.",
            scope: Scope::Subproject,
            predicate: tests_present,
        },
        Criterion {
            id: "coverage-tooling",
            category: TESTING,
            tier: Tier::Advanced,
            title: "Coverage measurement",
            description: "Test coverage is measured and reported.",
            recommendation: "Collect coverage in CI (llvm-cov, pytest-cov, c8, jacoco) and publish it.",
            scope: Scope::Subproject,
            predicate: coverage_tooling,
        },
        Criterion {
            id: "e2e-tests",
            category: TESTING,
            tier: Tier::Advanced,
            title: "End-to-end tests",
            description: "Web front ends are exercised through a real browser.",
            recommendation: "Add Playwright or Cypress tests for the critical user journeys.",
            scope: Scope::Subproject,
            predicate: e2e_tests,
        },
        Criterion {
            id: "ci-workflow",
            category: CI_CD,
            tier: Tier::Basic,
            title: "Continuous integration",
            description: "A CI pipeline is defined in the repository.",
            recommendation: "Add a CI workflow (for example .github/workflows/ci.yml) that runs on every push.",
            scope: Scope::Repository,
            predicate: ci_workflow,
        },
        Criterion {
            id: "ci-runs-tests",
            category: CI_CD,
            tier: Tier::Intermediate,
            title: "CI runs tests",
            description: "The CI pipeline executes the test suite.",
            recommendation: "Run the project's test command in CI so regressions block merges.",
            scope: Scope::Repository,
            predicate: ci_runs_tests,
        },
        Criterion {
            id: "release-automation",
            category: CI_CD,
            tier: Tier::Advanced,
            title: "Release automation",
            description: "Releases are cut and published by tooling.",
            recommendation: "Automate releases with release-please, semantic-release, goreleaser, or an equivalent workflow.",
            scope: Scope::Repository,
            predicate: release_automation,
        },
        Criterion {
            id: "gitignore",
            category: CODE_QUALITY,
            tier: Tier::Basic,
            title: "Ignore rules",
            description: "Build output and local files are kept out of version control.",
            recommendation: "Add a .gitignore covering build artifacts, dependencies, and editor files.",
            scope: Scope::Repository,
            predicate: gitignore,
        },
        Criterion {
            id: "formatter-config",
            category: CODE_QUALITY,
            tier: Tier::Intermediate,
            title: "Formatting configuration",
            description: "Formatting rules are checked into the repository.",
            recommendation: "Commit formatter settings (.editorconfig, rustfmt.toml, .prettierrc, ruff/black config).",
            scope: Scope::Repository,
            predicate: formatter_config,
        },
        Criterion {
            id: "ci-lint",
            category: CODE_QUALITY,
            tier: Tier::Intermediate,
            title: "CI lints",
            description: "Linters or format checks run in CI.",
            recommendation: "Run the linter (clippy, eslint, ruff, golangci-lint) in CI.",
            scope: Scope::Repository,
            predicate: ci_lint,
        },
        Criterion {
            id: "type-checking",
            category: CODE_QUALITY,
            tier: Tier::Intermediate,
            title: "Static type checking",
            description: "Dynamically typed subprojects opt into a type checker.",
            recommendation: "Adopt TypeScript or configure mypy/pyright for the subproject.",
            scope: Scope::Subproject,
            predicate: type_checking,
        },
        Criterion {
            id: "accessibility-lint",
            category: CODE_QUALITY,
            tier: Tier::Advanced,
            title: "Accessibility checks",
            description: "Web front ends are checked for accessibility issues.",
            recommendation: "Add eslint-plugin-jsx-a11y or axe-based tests to the web build.",
            scope: Scope::Subproject,
            predicate: accessibility_lint,
        },
        Criterion {
            id: "lockfile",
            category: SECURITY,
            tier: Tier::Basic,
            title: "Dependency lockfile",
            description: "Applications pin their resolved dependency graph.",
            recommendation: "Commit the lockfile produced by the package manager.",
            scope: Scope::Subproject,
            predicate: lockfile,
        },
        Criterion {
            id: "security-policy",
            category: SECURITY,
            tier: Tier::Intermediate,
            title: "Security policy",
            description: "There is a documented way to report vulnerabilities.",
            recommendation: "Add SECURITY.md explaining supported versions and how to report issues privately.",
            scope: Scope::Repository,
            predicate: security_policy,
        },
        Criterion {
            id: "dependency-updates",
            category: SECURITY,
            tier: Tier::Intermediate,
            title: "Automated dependency updates",
            description: "A bot proposes dependency upgrades.",
            recommendation: "Enable Dependabot or Renovate for every package ecosystem in the repository.",
            scope: Scope::Repository,
            predicate: dependency_updates,
        },
        Criterion {
            id: "codeowners",
            category: SECURITY,
            tier: Tier::Advanced,
            title: "Code owners",
            description: "Ownership of paths is declared for review routing.",
            recommendation: "Add a CODEOWNERS file mapping directories to responsible teams.",
            scope: Scope::Repository,
            predicate: codeowners,
        },
        Criterion {
            id: "security-scanning",
            category: SECURITY,
            tier: Tier::Advanced,
            title: "Security scanning",
            description: "CI scans code or dependencies for known vulnerabilities.",
            recommendation: "Run CodeQL, cargo-audit, npm audit, pip-audit, or a similar scanner in CI.",
            scope: Scope::Repository,
            predicate: security_scanning,
        },
        Criterion {
            id: "structured-logging",
            category: OBSERVABILITY,
            tier: Tier::Intermediate,
            title: "Logging library",
            description: "Services and web apps log through a logging library rather than ad-hoc prints.",
            recommendation: "Adopt a logging library (tracing, pino, structlog, zap) with leveled output.",
            scope: Scope::Subproject,
            predicate: structured_logging,
        },
        Criterion {
            id: "health-check",
            category: OBSERVABILITY,
            tier: Tier::Advanced,
            title: "Health check",
            description: "Services expose a health endpoint or container health check.",
            recommendation: "Add a /health endpoint and a HEALTHCHECK to the container image.",
            scope: Scope::Subproject,
            predicate: health_check,
        },
        Criterion {
            id: "telemetry",
            category: OBSERVABILITY,
            tier: Tier::Advanced,
            title: "Error tracking and metrics",
            description: "Runtime errors and metrics are shipped to a backend.",
            recommendation: "Instrument with OpenTelemetry, Sentry, or Prometheus metrics.",
            scope: Scope::Subproject,
            predicate: telemetry,
        },
        Criterion {
            id: "container-build",
            category: DEPLOYMENT,
            tier: Tier::Intermediate,
            title: "Container build",
            description: "Services can be built into a container image.",
            recommendation: "Add a Dockerfile that builds and runs the service.",
            scope: Scope::Subproject,
            predicate: container_build,
        },
        Criterion {
            id: "env-example",
            category: DEPLOYMENT,
            tier: Tier::Intermediate,
            title: "Environment template",
            description: "Required runtime configuration is documented by example.",
            recommendation: "Commit a .env.example listing every variable the app reads.",
            scope: Scope::Subproject,
            predicate: env_example,
        },
        Criterion {
            id: "database-migrations",
            category: DATA,
            tier: Tier::Intermediate,
            title: "Schema migrations",
            description: "Services that use a database version their schema.",
            recommendation: "Manage schema changes with migrations (sqlx, diesel, prisma, alembic, flyway).",
            scope: Scope::Subproject,
            predicate: database_migrations,
        },
    ]
}

fn readme(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    match ctx.readme.as_deref().map(str::trim) {
        None => CheckResult::fail("no README at the repository root"),
        Some(text) if text.chars().count() < MIN_README_CHARS => CheckResult::fail(format!(
            "README has only {} characters",
            text.chars().count()
        )),
        Some(text) => CheckResult::pass(format!("README has {} characters", text.chars().count())),
    }
}

fn license(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    found_or(
        ctx.find_named(".", &["license", "licence", "copying", "unlicense"]),
        "no LICENSE file",
    )
}

fn contributing_guide(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    found_or(
        find_in_dirs(ctx, &[".", ".github", "docs"], &["contributing"]),
        "no CONTRIBUTING guide",
    )
}

fn changelog(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    found_or(
        find_in_dirs(ctx, &[".", "docs"], &["changelog", "changes", "history", "news"]),
        "no changelog",
    )
}

fn pr_template(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    let found = find_in_dirs(ctx, &[".", ".github", "docs"], &["pull_request_template"])
        .or_else(|| {
            ctx.files
                .iter()
                .map(String::as_str)
                .find(|path| starts_with_ci(path, ".github/pull_request_template/"))
        });
    found_or(found, "no pull request template")
}

fn issue_templates(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    let count = ctx
        .files
        .iter()
        .filter(|path| starts_with_ci(path, ".github/issue_template/"))
        .count();
    if count > 0 {
        CheckResult::pass(format!("{count} issue templates"))
    } else {
        found_or(
            ctx.find_named(".github", &["issue_template"]),
            "no issue templates",
        )
    }
}

fn ci_workflow(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    match ctx.workflows.len() {
        0 => CheckResult::fail("no CI workflow files"),
        1 => CheckResult::pass(format!("found {}", ctx.workflows[0].path)),
        count => CheckResult::pass(format!("{count} CI workflow files")),
    }
}

fn ci_runs_tests(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    workflow_check(ctx, TEST_COMMANDS, "tests run in CI", "no CI step runs tests")
}

fn ci_lint(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    workflow_check(ctx, LINT_COMMANDS, "linters run in CI", "no CI step runs a linter")
}

fn release_automation(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    if let Some(config) = RELEASE_CONFIGS.iter().find(|path| ctx.has_file(path)) {
        return CheckResult::pass(format!("found {config}"));
    }
    CheckResult::from_bool(
        ctx.workflow_mentions(RELEASE_TOOLS),
        "a workflow publishes releases",
        "releases are not automated",
    )
}

fn gitignore(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    CheckResult::from_bool(ctx.has_file(".gitignore"), "found .gitignore", "no .gitignore")
}

fn formatter_config(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    if let Some(config) = FORMATTER_CONFIGS.iter().find(|path| ctx.has_file(path)) {
        return CheckResult::pass(format!("found {config}"));
    }
    let pyproject = ctx.content("pyproject.toml").unwrap_or_default();
    CheckResult::from_bool(
        pyproject.contains("[tool.black]") || pyproject.contains("[tool.ruff"),
        "formatter configured in pyproject.toml",
        "no formatter configuration",
    )
}

fn type_checking(target: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    per_subproject(target, |subproject| {
        if subproject.ecosystem.is_statically_typed() {
            return CheckResult::not_applicable(format!(
                "{:?} is statically typed",
                subproject.ecosystem
            ));
        }
        if ctx.subproject_has_any(subproject, &["tsconfig.json"])
            || subproject.depends_on(&["typescript"])
        {
            return CheckResult::pass("TypeScript configured");
        }
        if ctx.subproject_has_any(subproject, &["mypy.ini", ".mypy.ini", "pyrightconfig.json"])
            || subproject.depends_on(&["mypy", "pyright"])
        {
            return CheckResult::pass("Python type checker configured");
        }
        let pyproject = ctx
            .content(&subproject.file_path("pyproject.toml"))
            .unwrap_or_default();
        let setup_cfg = ctx
            .content(&subproject.file_path("setup.cfg"))
            .unwrap_or_default();
        CheckResult::from_bool(
            pyproject.contains("[tool.mypy]")
                || pyproject.contains("[tool.pyright]")
                || setup_cfg.contains("[mypy"),
            "Python type checker configured",
            "no type checker configured",
        )
    })
}

fn accessibility_lint(target: &Target<'_>, _: &SignalContext) -> CheckResult {
    per_subproject(target, |subproject| {
        if let Some(skip) = unless_kind(subproject, &[SubprojectType::Web]) {
            return skip;
        }
        CheckResult::from_bool(
            subproject.depends_on(A11Y_DEPENDENCIES),
            "accessibility tooling declared",
            "no accessibility tooling",
        )
    })
}

fn tests_present(target: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    per_subproject(target, |subproject| {
        let count = ctx
            .subproject_paths(subproject)
            .filter(|path| {
                ctx.test_sources.contains(*path) || is_test_path(subproject.relative_of(path))
            })
            .count();
        if count > 0 {
            CheckResult::pass(format!("{count} test files"))
        } else {
            CheckResult::fail("no test files")
        }
    })
}

fn coverage_tooling(target: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    per_subproject(target, |subproject| {
        let config = COVERAGE_CONFIGS
            .iter()
            .find(|name| ctx.has_file(&subproject.file_path(name)) || ctx.has_file(name));
        if let Some(config) = config {
            return CheckResult::pass(format!("found {config}"));
        }
        if subproject.depends_on(COVERAGE_DEPENDENCIES) {
            return CheckResult::pass("coverage dependency declared");
        }
        CheckResult::from_bool(
            ctx.workflow_mentions(COVERAGE_COMMANDS),
            "coverage collected in CI",
            "coverage is not measured",
        )
    })
}

fn e2e_tests(target: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    per_subproject(target, |subproject| {
        if let Some(skip) = unless_kind(subproject, &[SubprojectType::Web]) {
            return skip;
        }
        if subproject.depends_on(E2E_DEPENDENCIES) {
            return CheckResult::pass("browser test runner declared");
        }
        let configured = ctx.subproject_files(subproject).any(|path| {
            !path.contains('/')
                && (path.starts_with("playwright.config")
                    || path.starts_with("cypress.config")
                    || path == "cypress.json")
        });
        CheckResult::from_bool(
            configured,
            "browser test runner configured",
            "no end-to-end tests",
        )
    })
}

fn lockfile(target: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    per_subproject(target, |subproject| {
        if subproject.kind == SubprojectType::Library {
            return CheckResult::not_applicable("libraries leave resolution to their consumers");
        }
        let candidates = subproject.ecosystem.lockfiles();
        if candidates.is_empty() {
            return CheckResult::not_applicable(format!(
                "{:?} has no lockfile convention",
                subproject.ecosystem
            ));
        }
        let found = candidates.iter().find(|name| {
            ctx.has_file(&subproject.file_path(name)) || ctx.has_file(name)
        });
        match found {
            Some(name) => CheckResult::pass(format!("found {name}")),
            None => CheckResult::fail(format!("none of {} committed", candidates.join(", "))),
        }
    })
}

fn security_policy(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    found_or(
        find_in_dirs(ctx, &[".", ".github", "docs"], &["security"]),
        "no SECURITY policy",
    )
}

fn dependency_updates(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    found_or(
        DEPENDENCY_BOTS.iter().copied().find(|path| ctx.has_file(path)),
        "no Dependabot or Renovate configuration",
    )
}

fn codeowners(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    found_or(
        CODEOWNERS.iter().copied().find(|path| ctx.has_file(path)),
        "no CODEOWNERS file",
    )
}

fn security_scanning(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    workflow_check(
        ctx,
        SECURITY_SCANNERS,
        "a security scanner runs in CI",
        "no security scanner in CI",
    )
}

fn structured_logging(target: &Target<'_>, _: &SignalContext) -> CheckResult {
    per_subproject(target, |subproject| {
        if let Some(skip) =
            unless_kind(subproject, &[SubprojectType::Service, SubprojectType::Web])
        {
            return skip;
        }
        match LOGGING_DEPENDENCIES
            .iter()
            .find(|name| subproject.dependencies.contains(**name))
        {
            Some(name) => CheckResult::pass(format!("uses {name}")),
            None => CheckResult::fail("no logging library declared"),
        }
    })
}

fn health_check(target: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    per_subproject(target, |subproject| {
        if let Some(skip) = unless_kind(subproject, &[SubprojectType::Service]) {
            return skip;
        }
        let health_file = ctx.subproject_files(subproject).find(|path| {
            let name = path.rsplit('/').next().unwrap_or(path).to_lowercase();
            name.starts_with("health")
        });
        if let Some(path) = health_file {
            return CheckResult::pass(format!("found {path}"));
        }
        let dockerfile = ctx
            .content(&subproject.file_path("Dockerfile"))
            .or_else(|| ctx.content("Dockerfile"))
            .unwrap_or_default();
        CheckResult::from_bool(
            dockerfile.contains("HEALTHCHECK"),
            "container declares HEALTHCHECK",
            "no health check found",
        )
    })
}

fn telemetry(target: &Target<'_>, _: &SignalContext) -> CheckResult {
    per_subproject(target, |subproject| {
        if let Some(skip) =
            unless_kind(subproject, &[SubprojectType::Service, SubprojectType::Web])
        {
            return skip;
        }
        CheckResult::from_bool(
            subproject.depends_on_prefix(TELEMETRY_PREFIXES),
            "telemetry dependency declared",
            "no error tracking or metrics dependency",
        )
    })
}

fn container_build(target: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    per_subproject(target, |subproject| {
        if let Some(skip) = unless_kind(subproject, &[SubprojectType::Service]) {
            return skip;
        }
        let names = ["Dockerfile", "Containerfile"];
        if ctx.subproject_has_any(subproject, &names) {
            return CheckResult::pass("container definition in subproject");
        }
        CheckResult::from_bool(
            ctx.has_any_file(&names),
            "container definition at repository root",
            "no Dockerfile",
        )
    })
}

fn env_example(target: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    per_subproject(target, |subproject| {
        if let Some(skip) =
            unless_kind(subproject, &[SubprojectType::Service, SubprojectType::Web])
        {
            return skip;
        }
        let found = ENV_EXAMPLES
            .iter()
            .find(|name| ctx.has_file(&subproject.file_path(name)) || ctx.has_file(name));
        match found {
            Some(name) => CheckResult::pass(format!("found {name}")),
            None => CheckResult::fail("no .env.example"),
        }
    })
}

fn database_migrations(target: &Target<'_>, ctx: &SignalContext) -> CheckResult {
    per_subproject(target, |subproject| {
        if let Some(skip) = unless_kind(subproject, &[SubprojectType::Service]) {
            return skip;
        }
        if !subproject.depends_on_prefix(DATABASE_PREFIXES) {
            return CheckResult::not_applicable("no database dependency");
        }
        let migrations = ctx.subproject_files(subproject).any(|path| {
            let mut segments: Vec<&str> = path.split('/').collect();
            let file = segments.pop().unwrap_or_default();
            file == "alembic.ini"
                || file == "schema.prisma"
                || segments.iter().any(|segment| MIGRATION_DIRS.contains(segment))
        });
        CheckResult::from_bool(
            migrations,
            "schema migrations found",
            "database used without migrations",
        )
    })
}

fn per_subproject(
    target: &Target<'_>,
    check: impl FnOnce(&Subproject) -> CheckResult,
) -> CheckResult {
    match target {
        Target::Subproject(subproject) => check(subproject),
        Target::Repository => CheckResult::not_applicable("evaluated per subproject"),
    }
}

fn unless_kind(subproject: &Subproject, kinds: &[SubprojectType]) -> Option<CheckResult> {
    if kinds.contains(&subproject.kind) {
        None
    } else {
        Some(CheckResult::not_applicable(format!(
            "not applicable to {} subprojects",
            subproject.kind
        )))
    }
}

fn workflow_check(
    ctx: &SignalContext,
    needles: &[&str],
    passed: &str,
    failed: &str,
) -> CheckResult {
    if ctx.workflows.is_empty() {
        return CheckResult::fail("no CI workflow files");
    }
    CheckResult::from_bool(ctx.workflow_mentions(needles), passed, failed)
}

fn found_or(path: Option<&str>, missing: &str) -> CheckResult {
    match path {
        Some(path) => CheckResult::pass(format!("found {path}")),
        None => CheckResult::fail(missing),
    }
}

fn find_in_dirs<'a>(ctx: &'a SignalContext, dirs: &[&str], stems: &[&str]) -> Option<&'a str> {
    dirs.iter().find_map(|dir| ctx.find_named(dir, stems))
}

fn starts_with_ci(path: &str, prefix: &str) -> bool {
    path.len() >= prefix.len()
        && path.is_char_boundary(prefix.len())
        && path[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Whether a path looks like a test file by name or location.
///
/// Pass paths relative to the owning subproject so that the subproject's own
/// location never counts as a test directory.
pub fn is_test_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    let mut segments: Vec<&str> = lower.split('/').collect();
    let file_name = segments.pop().unwrap_or_default();
    if segments
        .iter()
        .any(|segment| matches!(*segment, "test" | "tests" | "spec" | "specs" | "__tests__"))
    {
        return true;
    }
    if file_name.contains(".test.") || file_name.contains(".spec.") {
        return true;
    }
    let stem = file_name.split('.').next().unwrap_or_default();
    stem.starts_with("test_")
        || stem.ends_with("_test")
        || stem.starts_with("spec_")
        || stem.ends_with("_spec")
        || file_name.ends_with("test.java")
        || file_name.ends_with("tests.swift")
}
