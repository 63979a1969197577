use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;

use monako_rs::common::{Error, Result};
use monako_rs::hugo::Hugo;
use monako_rs::origin::{Checkout, Fetcher, GitFetcher, Origin};
use monako_rs::service::Monako;
use monako_rs::Config;

/// Serves origins from local fixture directories, keyed by origin URL.
struct DirectoryFetcher;

impl Fetcher for DirectoryFetcher {
    fn fetch(&self, origin: &Origin, dest: &Path) -> Result<()> {
        let source = PathBuf::from(&origin.url);
        for entry in walkdir::WalkDir::new(&source) {
            let entry = entry.unwrap();
            let target = dest.join(entry.path().strip_prefix(&source).unwrap());
            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target).unwrap();
            } else {
                std::fs::copy(entry.path(), &target).unwrap();
            }
        }
        Ok(())
    }
}

fn write(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn fixture_repo(root: &Path) {
    write(root, "README.md", b"# Monako Test\n\n![Profile](profile.png)\n");
    write(root, "profile.png", &[0x89, b'P', b'N', b'G', 0, 1, 2, 3]);
    write(root, "subfolder/subfolderprofile.png", &[0x89, b'P', b'N', b'G', 4, 5]);
    write(
        root,
        "subfolder/include_me.adoc",
        b"= Included\n\nimage::subfolderprofile.png[]\n",
    );
    write(root, "main.go", b"package main\n");
    write(root, ".git/config", b"[core]\n");
}

fn files_below(root: &Path) -> BTreeSet<String> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

fn load_config(dir: &Path, origins_yaml: &str) -> Config {
    let path = dir.join("config.monako.yaml");
    std::fs::write(
        &path,
        format!("baseURL: https://docs.example.com/\ntitle: Test\norigins:\n{origins_yaml}"),
    )
    .unwrap();
    let mut config = Config::load(&path).unwrap();
    config.set_target_dir(dir.join("site"));
    config
}

fn monako(config: Config, hugo: Hugo) -> Monako {
    Monako::new(config, PathBuf::from("absent.menu.md"), Box::new(DirectoryFetcher), hugo)
}

#[test]
fn composes_whitelisted_files_into_target_dir() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    fixture_repo(&repo);

    let config = load_config(
        dir.path(),
        &format!(
            "  - src: {}\n    targetdir: docs/X\n    whitelist: [\".md\", \".png\"]\n",
            repo.display()
        ),
    );
    let content_dir = config.content_dir();

    let count = monako(config, Hugo::new("hugo")).compose().unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        files_below(&content_dir),
        BTreeSet::from([
            "docs/X/README.md".to_string(),
            "docs/X/profile.png".to_string(),
            "docs/X/subfolder/subfolderprofile.png".to_string(),
        ])
    );
}

#[test]
fn markup_is_rewritten_and_binaries_are_copied() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    fixture_repo(&repo);

    let config = load_config(
        dir.path(),
        &format!("  - src: {}\n    targetdir: docs/monako-test\n", repo.display()),
    );
    let target = config.content_dir().join("docs/monako-test");

    monako(config, Hugo::new("hugo")).compose().unwrap();

    assert_eq!(
        std::fs::read_to_string(target.join("README.md")).unwrap(),
        "# Monako Test\n\n![Profile](../profile.png)\n"
    );
    assert_eq!(
        std::fs::read_to_string(target.join("subfolder/include_me.adoc")).unwrap(),
        "= Included\n\nimage::../subfolderprofile.png[]\n"
    );
    assert_eq!(
        std::fs::read(target.join("profile.png")).unwrap(),
        std::fs::read(repo.join("profile.png")).unwrap()
    );
    assert!(!target.join("main.go").exists());
    assert!(!target.join(".git").exists());
}

#[test]
fn source_dir_is_stripped_from_local_paths() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    fixture_repo(&repo);

    let config = load_config(
        dir.path(),
        &format!(
            "  - src: {}\n    docdir: subfolder/\n    targetdir: pictures\n",
            repo.display()
        ),
    );
    let content_dir = config.content_dir();

    monako(config, Hugo::new("hugo")).compose().unwrap();

    assert_eq!(
        files_below(&content_dir),
        BTreeSet::from([
            "pictures/include_me.adoc".to_string(),
            "pictures/subfolderprofile.png".to_string(),
        ])
    );
}

#[test]
fn origins_are_composed_in_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    write(&first, "a.md", b"# A\n");
    write(&second, "docs/b.md", b"# B\n");

    let config = load_config(
        dir.path(),
        &format!(
            "  - src: {}\n    targetdir: one\n  - src: {}\n    docdir: docs\n    targetdir: two\n",
            first.display(),
            second.display()
        ),
    );
    let content_dir = config.content_dir();
    let scratch_dir = config.scratch_dir();

    let count = monako(config, Hugo::new("hugo")).compose().unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        files_below(&content_dir),
        BTreeSet::from(["one/a.md".to_string(), "two/b.md".to_string()])
    );
    assert_eq!(files_below(&scratch_dir), BTreeSet::new());
}

#[test]
fn missing_source_dir_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    fixture_repo(&repo);

    let config = load_config(
        dir.path(),
        &format!("  - src: {}\n    docdir: nope\n", repo.display()),
    );

    let err = monako(config, Hugo::new("hugo")).compose().unwrap_err();
    assert!(matches!(err, Error::IoError { .. }));
}

#[test]
fn whitelist_listing_is_sorted_and_excludes_git_dir() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    fixture_repo(&repo);
    write(&repo, ".git/HEAD.md", b"ref: refs/heads/master\n");

    let origin = Origin::new(repo.to_string_lossy(), "master", ".", "docs")
        .with_whitelist(vec![".md".into(), ".PNG".into()]);
    let checkout = Checkout::create(&DirectoryFetcher, &origin, &dir.path().join("scratch")).unwrap();
    let checkout_root = checkout.root().to_path_buf();

    let files = checkout.whitelisted_files(Path::new("/compose")).unwrap();
    let remote: Vec<_> = files.iter().map(|f| f.remote_path.clone()).collect();
    let local: Vec<_> = files.iter().map(|f| f.local_path.clone()).collect();

    assert_eq!(
        remote,
        vec![
            PathBuf::from("README.md"),
            PathBuf::from("profile.png"),
            PathBuf::from("subfolder/subfolderprofile.png"),
        ]
    );
    assert_eq!(
        local,
        vec![
            PathBuf::from("/compose/docs/README.md"),
            PathBuf::from("/compose/docs/profile.png"),
            PathBuf::from("/compose/docs/subfolder/subfolderprofile.png"),
        ]
    );
    assert_eq!(files[0].origin().url, origin.url);

    drop(files);
    drop(checkout);
    assert!(!checkout_root.exists());
}

#[test]
fn source_dir_outside_checkout_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    fixture_repo(&repo);
    write(dir.path(), "secret.md", b"# not documentation\n");

    let origin = Origin::new(repo.to_string_lossy(), "main", "..", ".")
        .with_whitelist(vec![".md".to_string()]);
    let checkout = Checkout::create(&DirectoryFetcher, &origin, &dir.path().join("scratch")).unwrap();

    let result = checkout.whitelisted_files(Path::new("/compose"));
    assert!(matches!(result, Err(Error::ConfigError { .. })));
}

#[cfg(unix)]
#[test]
fn run_scaffolds_composes_and_builds() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    fixture_repo(&repo);
    let menu = dir.path().join("config.menu.md");
    std::fs::write(&menu, "- [Docs](/docs/)\n").unwrap();

    let mut config = load_config(
        dir.path(),
        &format!("  - src: {}\n    targetdir: docs/X\n", repo.display()),
    );
    config.theme = Some("monako-book".into());
    let compose_dir = config.compose_dir();

    // A stale file from a previous run must disappear.
    write(&compose_dir, "content/stale.md", b"old");

    let monako = Monako::new(
        config,
        menu,
        Box::new(DirectoryFetcher),
        Hugo::new("true").fail_on_error(true),
    );
    monako.run().unwrap();

    let site: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(compose_dir.join("config.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(site["baseURL"], "https://docs.example.com/");
    assert_eq!(site["theme"], "monako-book");
    assert!(compose_dir.join("content/menu/index.md").is_file());
    assert!(compose_dir.join("content/docs/X/README.md").is_file());
    assert!(!compose_dir.join("content/stale.md").exists());
}

#[cfg(unix)]
#[test]
fn hugo_runs_in_target_dir_with_relative_site() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    fixture_repo(&repo);
    let log = dir.path().join("hugo.log");
    let script = dir.path().join("fake-hugo");
    std::fs::write(
        &script,
        format!("#!/bin/sh\necho \"$(pwd -P) $*\" >> {}\n", log.display()),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o700)).unwrap();

    // The target dir does not exist before the run.
    let config = load_config(dir.path(), &format!("  - src: {}\n", repo.display()));
    let site = config.target_dir().to_path_buf();
    assert!(!site.exists());

    let hugo = Hugo::new(script.to_string_lossy()).fail_on_error(true);
    monako(config, hugo).run().unwrap();

    let site = site.canonicalize().unwrap();
    let calls: Vec<String> = std::fs::read_to_string(log)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(
        calls,
        vec![
            format!("{} --quiet new site compose", site.display()),
            format!("{} --source compose", site.display()),
        ]
    );
}

#[cfg(unix)]
#[test]
fn hugo_failure_only_aborts_with_fail_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    fixture_repo(&repo);
    let origins = format!("  - src: {}\n", repo.display());

    let tolerant = monako(load_config(dir.path(), &origins), Hugo::new("false"));
    tolerant.run().unwrap();
    assert!(tolerant.config().content_dir().join("README.md").is_file());

    let strict = monako(
        load_config(dir.path(), &origins),
        Hugo::new("false").fail_on_error(true),
    );
    assert!(matches!(strict.run(), Err(Error::HugoError { .. })));
}

fn git(dir: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .args(["-c", "user.name=Monako", "-c", "user.email=monako@example.com"])
        .args(["-c", "commit.gpgsign=false", "-c", "init.defaultBranch=main"])
        .args(args)
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[test]
fn git_fetcher_clones_branch() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    fixture_repo(&repo);
    std::fs::remove_dir_all(repo.join(".git")).unwrap();

    if !git(&repo, &["init", "--quiet"]) {
        eprintln!("git is not available, skipping");
        return;
    }
    assert!(git(&repo, &["checkout", "--quiet", "-b", "docs"]));
    assert!(git(&repo, &["add", "."]));
    assert!(git(&repo, &["commit", "--quiet", "-m", "docs"]));

    let url = format!("file://{}", repo.display());
    let origin = Origin::new(url.as_str(), "docs", ".", "docs/X")
        .with_whitelist(vec![".md".into(), ".png".into()]);
    let checkout =
        Checkout::create(&GitFetcher::default(), &origin, &dir.path().join("scratch")).unwrap();

    let compose_dir = dir.path().join("compose");
    assert_eq!(checkout.compose(&compose_dir).unwrap(), 3);
    assert_eq!(
        files_below(&compose_dir),
        BTreeSet::from([
            "docs/X/README.md".to_string(),
            "docs/X/profile.png".to_string(),
            "docs/X/subfolder/subfolderprofile.png".to_string(),
        ])
    );

    let missing = Origin::new(url.as_str(), "no-such-branch", ".", ".");
    let err =
        Checkout::create(&GitFetcher::default(), &missing, &dir.path().join("scratch")).unwrap_err();
    assert!(matches!(err, Error::CloneError { .. }));
}
