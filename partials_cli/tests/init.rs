mod common;

use partials_core::AnyEmptyResult;
use partials_core::PartialsConfig;

use crate::common::partials_cmd;
use crate::common::write_file;

#[test]
fn can_init() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	partials_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Created partials.toml"))
		.stdout(predicates::str::contains("Created partial file"));

	let config = PartialsConfig::load(tmp.path())?.ok_or("config should be created")?;
	assert_eq!(config.parse_tag, "build");
	assert_eq!(config.partial_path, Some(std::path::PathBuf::from("partials")));
	assert_eq!(config.files.len(), 1);

	let partial = std::fs::read_to_string(tmp.path().join("partials/_header.html"))?;
	assert!(partial.contains("<header>"));

	Ok(())
}

#[test]
fn init_then_build() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	partials_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();
	write_file(
		tmp.path(),
		"src/index.html",
		"<!-- build:partial header -->\n<!-- /build -->\n<main></main>\n",
	)?;

	partials_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let output = std::fs::read_to_string(tmp.path().join("dist/index.html"))?;
	assert_eq!(output, "<header>Hello from partials!</header>\n\n<main></main>\n");

	Ok(())
}

#[test]
fn init_does_not_overwrite() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), ".partials.toml", "existing config")?;
	write_file(tmp.path(), "partials/_header.html", "existing partial")?;

	partials_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Config file already exists"))
		.stdout(predicates::str::contains("Partial file already exists"));

	assert!(!tmp.path().join("partials.toml").exists());
	assert_eq!(
		std::fs::read_to_string(tmp.path().join(".partials.toml"))?,
		"existing config"
	);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("partials/_header.html"))?,
		"existing partial"
	);

	Ok(())
}
