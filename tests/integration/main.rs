//! Integration tests for compkit

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Isolated registry, config and project directories
    struct Env {
        registry: TempDir,
        home: TempDir,
        project: TempDir,
    }

    impl Env {
        fn new() -> Self {
            let registry = TempDir::new().unwrap();
            write_json(
                &registry.path().join("index.json"),
                json!([
                    {"name": "button", "version": "1.0.0", "description": "Clickable button", "category": "form"},
                    {"name": "dialog", "version": "1.2.0", "description": "Modal dialog", "category": "overlay", "dependencies": ["button"]},
                    {"name": "ghost", "version": "0.1.0", "dependencies": ["missing"]},
                ]),
            );
            for name in ["button", "dialog"] {
                write_json(
                    &registry.path().join("components").join(format!("{}.json", name)),
                    json!({"files": [{"path": format!("{}.tsx", name), "content": format!("export const {} = 1;\n", name)}]}),
                );
            }

            let home = TempDir::new().unwrap();
            let cache_dir = home.path().join("cache");
            fs::write(
                home.path().join("config.toml"),
                format!(
                    "[cache]\ndir = {:?}\n\n[registry]\nretries = 1\n",
                    cache_dir.display().to_string()
                ),
            )
            .unwrap();

            let project = TempDir::new().unwrap();
            fs::write(project.path().join("package.json"), r#"{"name": "app"}"#).unwrap();

            Self {
                registry,
                home,
                project,
            }
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("compkit");
            cmd.env("COMPKIT_REGISTRY", self.registry.path())
                .env("COMPKIT_CONFIG", self.home.path().join("config.toml"))
                .env_remove("COMPKIT_LOG")
                .arg("--no-local")
                .arg("--cwd")
                .arg(self.project.path());
            cmd
        }

        fn installed(&self, file: &str) -> std::path::PathBuf {
            self.project.path().join("components/ui").join(file)
        }
    }

    fn write_json(path: &Path, value: Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("compkit")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("install UI components"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("compkit")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("compkit"));
    }

    #[test]
    fn config_path() {
        let env = Env::new();
        env.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let env = Env::new();
        env.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[install]"))
            .stdout(predicate::str::contains("retries = 1"));
    }

    #[test]
    fn config_set_local_writes_project_file() {
        let env = Env::new();
        env.cmd()
            .args(["config", "set", "install.concurrency", "2", "--local"])
            .assert()
            .success();

        let written = fs::read_to_string(env.project.path().join("compkit.toml")).unwrap();
        assert!(written.contains("concurrency = 2"));
    }

    #[test]
    fn completions_generate() {
        cargo_bin_cmd!("compkit")
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("compkit"));
    }

    #[test]
    fn workspace_detects_single_package() {
        let env = Env::new();
        let output = env
            .cmd()
            .args(["workspace", "--format", "json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let report: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(report["type"], "single");
        assert!(report["target_dir"]
            .as_str()
            .unwrap()
            .ends_with("components/ui"));
    }

    #[test]
    fn workspace_detects_pnpm_monorepo() {
        let env = Env::new();
        let root = env.project.path();
        fs::write(root.join("pnpm-workspace.yaml"), "packages:\n  - 'packages/*'\n").unwrap();
        fs::create_dir_all(root.join("packages/ui")).unwrap();
        fs::write(root.join("packages/ui/package.json"), r#"{"name": "@acme/ui"}"#).unwrap();

        env.cmd()
            .args(["workspace", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"pnpm\""))
            .stdout(predicate::str::contains("@acme/ui"));
    }

    #[test]
    fn relative_cwd_finds_monorepo_root() {
        let env = Env::new();
        let root = env.project.path();
        fs::write(root.join("pnpm-workspace.yaml"), "packages:\n  - 'apps/*'\n").unwrap();
        fs::create_dir_all(root.join("apps/web")).unwrap();
        fs::write(root.join("apps/web/package.json"), r#"{"name": "web"}"#).unwrap();
        fs::write(root.join("compkit.toml"), "[install]\ncomponents_dir = \"widgets\"\n").unwrap();

        let output = cargo_bin_cmd!("compkit")
            .current_dir(root.join("apps/web"))
            .env("COMPKIT_REGISTRY", env.registry.path())
            .env("COMPKIT_CONFIG", env.home.path().join("config.toml"))
            .args(["--cwd", ".", "workspace", "--format", "json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let report: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(report["type"], "pnpm");
        assert_eq!(report["current_package"]["name"], "web");
        assert!(report["target_dir"].as_str().unwrap().ends_with("apps/web/widgets"));
    }

    #[test]
    fn search_json_filters_by_query() {
        let env = Env::new();
        let output = env
            .cmd()
            .args(["search", "dialog", "--format", "json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let results: Value = serde_json::from_slice(&output).unwrap();
        let names: Vec<_> = results
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["dialog"]);
    }

    #[test]
    fn search_plain_lists_all() {
        let env = Env::new();
        env.cmd()
            .args(["search", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("button"))
            .stdout(predicate::str::contains("ghost"));
    }

    #[test]
    fn add_installs_dependencies() {
        let env = Env::new();
        env.cmd().args(["add", "dialog"]).assert().success();

        assert!(env.installed("dialog.tsx").is_file());
        assert_eq!(
            fs::read_to_string(env.installed("button.tsx")).unwrap(),
            "export const button = 1;\n"
        );
    }

    #[test]
    fn add_dry_run_writes_nothing() {
        let env = Env::new();
        env.cmd()
            .args(["add", "dialog", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("button.tsx"));

        assert!(!env.installed("dialog.tsx").exists());
        assert!(!env.installed("button.tsx").exists());
    }

    #[test]
    fn add_existing_file_fails_without_overwrite() {
        let env = Env::new();
        fs::create_dir_all(env.installed("")).unwrap();
        fs::write(env.installed("button.tsx"), "local edits").unwrap();

        env.cmd()
            .args(["add", "button"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("did not install"));
        assert_eq!(
            fs::read_to_string(env.installed("button.tsx")).unwrap(),
            "local edits"
        );

        env.cmd()
            .args(["add", "button", "--overwrite"])
            .assert()
            .success();
        assert_eq!(
            fs::read_to_string(env.installed("button.tsx")).unwrap(),
            "export const button = 1;\n"
        );
    }

    #[test]
    fn add_missing_dependency_fails_before_writing() {
        let env = Env::new();
        env.cmd()
            .args(["add", "button", "ghost"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("missing"));

        assert!(!env.installed("button.tsx").exists());
    }

    #[test]
    fn add_unknown_component_fails() {
        let env = Env::new();
        env.cmd()
            .args(["add", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Component not found: nope"));
    }

    #[test]
    fn add_explicit_path() {
        let env = Env::new();
        env.cmd()
            .args(["add", "button", "--path", "src/widgets"])
            .assert()
            .success();

        assert!(env
            .project
            .path()
            .join("src/widgets/button.tsx")
            .is_file());
    }

    #[test]
    fn cache_stats_after_search() {
        let env = Env::new();
        env.cmd().args(["search"]).assert().success();

        let output = env
            .cmd()
            .args(["cache", "stats", "--format", "json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let stats: Value = serde_json::from_slice(&output).unwrap();
        assert!(stats["entries"].as_u64().unwrap() >= 1);
        assert!(stats["writes"].as_u64().unwrap() >= 1);
    }

    #[test]
    fn cache_clear_with_yes() {
        let env = Env::new();
        env.cmd().args(["search"]).assert().success();
        env.cmd().args(["cache", "clear", "--yes"]).assert().success();

        env.cmd()
            .args(["cache", "stats", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("0"));
    }
}
