#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
//! Integration tests for placing the tmux and Neovim configuration into a
//! home directory, including backups of whatever was there before.
#![cfg(unix)]

mod common;

use common::{IntegrationTestContext, TMUX_CONF};
use dotfiles_setup::commands::install::provision;
use dotfiles_setup::config::ProvisionMode;
use dotfiles_setup::logging::TaskStatus;
use dotfiles_setup::platform::OsFamily;

/// Run the install tasks once with a backup directory stamped `stamp`.
fn run(t: &IntegrationTestContext, mode: ProvisionMode, stamp: &str) {
    let (ctx, log) = t.context(t.config(mode), OsFamily::Unknown, stamp);
    provision(&ctx, &log).expect("provision");
}

#[test]
fn fresh_host_gets_links_and_no_backup() {
    let t = IntegrationTestContext::new();
    run(&t, ProvisionMode::Link, "20240101_000000");

    assert_eq!(
        std::fs::read_link(t.home.join(".tmux.conf")).unwrap(),
        t.root.join("tmux/tmux.conf")
    );
    assert_eq!(
        std::fs::read_link(t.home.join(".config/nvim")).unwrap(),
        t.root.join("nvim")
    );
    assert!(!t.home.join(".dotfiles_backup").exists());
}

#[test]
fn link_mode_is_idempotent() {
    let t = IntegrationTestContext::new().with_home_file(".tmux.conf", "set -g prefix C-a\n");

    run(&t, ProvisionMode::Link, "20240101_000000");
    run(&t, ProvisionMode::Link, "20240101_000100");

    let dirs = t.backup_dirs();
    assert_eq!(dirs.len(), 1, "second run must not back anything up");
    assert!(dirs[0].ends_with("20240101_000000"));
}

#[test]
fn existing_file_is_preserved_in_backup() {
    let t = IntegrationTestContext::new().with_home_file(".tmux.conf", "set -g prefix C-a\n");

    run(&t, ProvisionMode::Link, "20240101_000000");

    let dirs = t.backup_dirs();
    assert_eq!(
        std::fs::read_to_string(dirs[0].join(".tmux.conf")).unwrap(),
        "set -g prefix C-a\n"
    );
    assert_eq!(
        std::fs::read_to_string(t.home.join(".tmux.conf")).unwrap(),
        TMUX_CONF
    );
}

#[test]
fn existing_nvim_directory_keeps_its_layout_in_backup() {
    let t = IntegrationTestContext::new().with_home_file(".config/nvim/init.vim", "set number\n");

    run(&t, ProvisionMode::Link, "20240101_000000");

    let dirs = t.backup_dirs();
    assert_eq!(
        std::fs::read_to_string(dirs[0].join(".config/nvim/init.vim")).unwrap(),
        "set number\n"
    );
    assert!(
        t.home
            .join(".config/nvim")
            .symlink_metadata()
            .unwrap()
            .is_symlink()
    );
}

#[test]
fn copy_mode_backs_up_on_every_rerun() {
    let t = IntegrationTestContext::new();

    run(&t, ProvisionMode::Copy, "20240101_000000");
    assert!(t.backup_dirs().is_empty());
    let tmux = t.home.join(".tmux.conf");
    assert!(!tmux.symlink_metadata().unwrap().is_symlink());
    assert_eq!(std::fs::read_to_string(&tmux).unwrap(), TMUX_CONF);
    assert_eq!(
        std::fs::read_to_string(t.home.join(".config/nvim/lua/options.lua")).unwrap(),
        "vim.o.number = true\n"
    );

    run(&t, ProvisionMode::Copy, "20240101_000100");
    assert_eq!(t.backup_dirs().len(), 1);

    run(&t, ProvisionMode::Copy, "20240101_000200");
    assert_eq!(t.backup_dirs().len(), 2);
}

#[test]
fn same_second_reruns_get_distinct_backup_dirs() {
    let t = IntegrationTestContext::new();

    run(&t, ProvisionMode::Copy, "20240101_000000");
    run(&t, ProvisionMode::Copy, "20240101_000000");
    run(&t, ProvisionMode::Copy, "20240101_000000");

    let dirs = t.backup_dirs();
    assert_eq!(dirs.len(), 2);
    assert!(dirs[0].ends_with("20240101_000000"));
    assert!(dirs[1].ends_with("20240101_000000_1"));
}

#[test]
fn dry_run_changes_nothing() {
    let t = IntegrationTestContext::new().with_home_file(".tmux.conf", "old\n");
    let mut config = t.config(ProvisionMode::Link);
    config.dry_run = true;
    let (ctx, log) = t.context(config, OsFamily::Unknown, "20240101_000000");

    provision(&ctx, &log).unwrap();

    assert_eq!(
        std::fs::read_to_string(t.home.join(".tmux.conf")).unwrap(),
        "old\n"
    );
    assert!(!t.home.join(".config").exists());
    assert!(t.backup_dirs().is_empty());
    assert_eq!(log.task_entries()[1].status, TaskStatus::DryRun);
}

#[test]
fn provision_toml_replaces_default_links() {
    let t = IntegrationTestContext::new().with_provision_toml(
        "[[links]]\nsource = \"tmux/tmux.conf\"\ntarget = \".config/tmux/tmux.conf\"\n",
    );

    run(&t, ProvisionMode::Link, "20240101_000000");

    assert!(t.home.join(".config/tmux/tmux.conf").symlink_metadata().is_ok());
    assert!(t.home.join(".tmux.conf").symlink_metadata().is_err());
    assert!(t.home.join(".config/nvim").symlink_metadata().is_err());
}
