mod common;

use clap::Parser;
use partials_cli::Commands;
use partials_cli::PartialsCli;
use partials_core::AnyEmptyResult;
use partials_core::PartialsConfig;
use predicates::prelude::PredicateBooleanExt;

use crate::common::partials_cmd;
use crate::common::write_file;
use crate::common::write_site;

fn build(root: &std::path::Path) {
	partials_cmd()
		.arg("build")
		.arg("--path")
		.arg(root)
		.assert()
		.success();
}

#[test]
fn check_passes_when_up_to_date() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_site(tmp.path())?;
	build(tmp.path());

	partials_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Check passed: all 2 destination(s) are up to date.",
		));

	Ok(())
}

#[test]
fn check_fails_when_destinations_are_missing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_site(tmp.path())?;

	partials_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("Check failed."))
		.stderr(predicates::str::contains(
			"dist/index.html from src/index.html [missing]",
		))
		.stderr(predicates::str::contains("2 of 2 destination(s) are out of date"));

	assert!(!tmp.path().join("dist").exists());

	Ok(())
}

#[test]
fn check_fails_when_partial_changes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_site(tmp.path())?;
	build(tmp.path());
	write_file(tmp.path(), "partials/_header.html", "<header>New</header>")?;

	partials_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains(
			"dist/about.html from src/about.html [stale]",
		))
		.stderr(predicates::str::contains("-<header>Site</header>").not());

	Ok(())
}

#[test]
fn check_diff_shows_changes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_site(tmp.path())?;
	build(tmp.path());
	write_file(tmp.path(), "partials/_header.html", "<header>New</header>")?;

	partials_cmd()
		.arg("check")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("-<header>Site</header>"))
		.stderr(predicates::str::contains("+<header>New</header>"));

	let index = std::fs::read_to_string(tmp.path().join("dist/index.html"))?;
	assert!(index.contains("<header>Site</header>"));

	Ok(())
}

#[test]
fn check_reports_engine_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_site(tmp.path())?;
	write_file(
		tmp.path(),
		"src/index.html",
		"<!-- build:partial a -->\n<!-- build:partial b -->\n<!-- /build -->\n",
	)?;

	partials_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("block `b` opened on line 2"));

	Ok(())
}

#[test]
fn check_command_parses_diff_flag() {
	let cli = PartialsCli::parse_from(["partials", "check", "--diff"]);
	assert!(matches!(cli.command, Some(Commands::Check { diff: true })));

	let cli = PartialsCli::parse_from(["partials", "check"]);
	assert!(matches!(cli.command, Some(Commands::Check { diff: false })));
}

#[test]
fn global_flags_override_config() {
	let cli = PartialsCli::parse_from([
		"partials",
		"check",
		"--parse-tag",
		"include",
		"--replace",
		"--strict",
		"--log-optionals",
	]);
	let mut config = PartialsConfig::default();
	cli.apply_overrides(&mut config);

	assert_eq!(config.parse_tag, "include");
	assert!(config.replace);
	assert!(config.strict);
	assert!(config.log_optionals);
}

#[test]
fn absent_flags_keep_config_values() {
	let cli = PartialsCli::parse_from(["partials"]);
	let mut config = PartialsConfig {
		parse_tag: "include".to_string(),
		replace: true,
		..PartialsConfig::default()
	};
	cli.apply_overrides(&mut config);

	assert!(cli.command.is_none());
	assert_eq!(config.parse_tag, "include");
	assert!(config.replace);
	assert!(!config.strict);
}
