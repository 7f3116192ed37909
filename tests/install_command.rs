#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
//! Integration tests for the `install` command: the task list, how it reacts
//! to hosts without a supported package manager, `--skip`, and fail-fast
//! behavior.

mod common;

use std::collections::HashSet;

use common::IntegrationTestContext;
use dotfiles_setup::cli::Cli;
use dotfiles_setup::commands::install::provision;
use dotfiles_setup::config::ProvisionMode;
use dotfiles_setup::error::ProvisionError;
use dotfiles_setup::logging::TaskStatus;
use dotfiles_setup::platform::OsFamily;
use dotfiles_setup::tasks;

/// Snapshot of all install task names in their declared order.
#[test]
fn install_task_names() {
    let all_tasks = tasks::all_install_tasks();
    let task_names: Vec<&str> = all_tasks.iter().map(|t| t.name()).collect();
    insta::assert_snapshot!("install_task_names", task_names.join("\n"));
}

#[test]
fn install_task_names_are_unique() {
    let tasks = tasks::all_install_tasks();
    let mut seen: HashSet<&str> = HashSet::new();
    for task in &tasks {
        assert!(
            seen.insert(task.name()),
            "duplicate install task name: '{}'",
            task.name()
        );
    }
}

#[test]
fn help_exits_cleanly_without_touching_home() {
    use clap::Parser as _;

    let t = IntegrationTestContext::new();
    let err = Cli::try_parse_from(["dotfiles-setup", "--help"]).unwrap_err();
    assert_eq!(err.exit_code(), 0);
    assert_eq!(std::fs::read_dir(&t.home).unwrap().count(), 0);
}

#[cfg(unix)]
#[test]
fn unknown_os_skips_packages_but_still_provisions() {
    let t = IntegrationTestContext::new();
    let (ctx, log) = t.context(t.config(ProvisionMode::Link), OsFamily::Unknown, "20240101_000000");

    provision(&ctx, &log).unwrap();

    let entries = log.task_entries();
    assert_eq!(entries[0].name, "Install packages");
    assert_eq!(entries[0].status, TaskStatus::Skipped);
    assert_eq!(
        entries[0].message.as_deref(),
        Some("no package manager for unknown")
    );
    assert_eq!(entries[1].name, "Provision files");
    assert_eq!(entries[1].status, TaskStatus::Ok);
    assert!(t.home.join(".tmux.conf").symlink_metadata().is_ok());
}

#[cfg(unix)]
#[test]
fn generic_linux_is_treated_like_unknown() {
    let t = IntegrationTestContext::new();
    let (ctx, log) = t.context(t.config(ProvisionMode::Link), OsFamily::Linux, "20240101_000000");

    provision(&ctx, &log).unwrap();
    assert_eq!(log.task_entries()[0].status, TaskStatus::Skipped);
    assert_eq!(log.task_entries()[1].status, TaskStatus::Ok);
}

#[test]
fn installed_packages_are_left_alone() {
    let t = IntegrationTestContext::new();
    let mut config = t.config(ProvisionMode::Link);
    config.skip = vec!["files".to_string()];
    let (ctx, log) = t.context(config, OsFamily::Debian, "20240101_000000");

    provision(&ctx, &log).unwrap();

    let entries = log.task_entries();
    assert_eq!(entries[0].status, TaskStatus::Ok);
    assert_eq!(entries[1].status, TaskStatus::Skipped);
    assert_eq!(entries[1].message.as_deref(), Some("skipped by --skip"));
    assert_eq!(std::fs::read_dir(&t.home).unwrap().count(), 0);
}

#[test]
fn missing_source_fails_the_run() {
    let t = IntegrationTestContext::new()
        .with_provision_toml("[[links]]\nsource = \"zsh/zshrc\"\ntarget = \".zshrc\"\n");
    let (ctx, log) = t.context(t.config(ProvisionMode::Link), OsFamily::Unknown, "20240101_000000");

    let err = provision(&ctx, &log).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ProvisionError>(),
        Some(ProvisionError::MissingSource { .. })
    ));
    assert!(log.has_failures());
    assert_eq!(log.task_entries()[1].status, TaskStatus::Failed);
    assert!(t.home.join(".zshrc").symlink_metadata().is_err());
}

#[test]
fn unknown_key_in_provision_toml_is_rejected() {
    let t = IntegrationTestContext::new().with_provision_toml("pakages = [\"git\"]\n");
    let err = dotfiles_setup::config::Config::load(
        &t.root,
        &t.home,
        ProvisionMode::Link,
        false,
        Vec::new(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("provision.toml"));
}
