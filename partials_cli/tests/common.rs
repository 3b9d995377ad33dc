#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn partials_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("partials"));
	cmd.env("NO_COLOR", "1").env_remove("PARTIALS_LOG");
	cmd
}

/// Write `content` to `root/path`, creating parent directories.
pub fn write_file(root: &Path, path: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(path);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}

pub const SITE_CONFIG: &str = r#"partial_path = "partials"

[[files]]
src = "src/*.html"
dest = "dist"
"#;

/// A project with a header partial and two documents using it.
pub fn write_site(root: &Path) -> std::io::Result<()> {
	write_file(root, "partials.toml", SITE_CONFIG)?;
	write_file(root, "partials/_header.html", "<header>Site</header>")?;
	write_file(
		root,
		"src/index.html",
		"<html>\n<!-- build:partial header -->\n<!-- /build -->\n<p>Index</p>\n</html>\n",
	)?;
	write_file(
		root,
		"src/about.html",
		"<html>\n<!-- build:partial header -->\nold\n<!-- /build -->\n<!-- build:partial \
		 optional banner -->\n<!-- /build -->\n<p>About</p>\n</html>\n",
	)
}
