mod common;

use amalgam_core::AmalgamConfig;
use amalgam_core::AnyEmptyResult;

#[test]
fn can_init() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::amalgam_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Created"))
		.stdout(predicates::str::contains("amalgam build"));

	let config_path = tmp.path().join("amalgam.toml");
	let content = std::fs::read_to_string(&config_path)?;
	let config = AmalgamConfig::parse(&content)?;

	assert_eq!(config.input, Some("src/main.h".into()));
	assert_eq!(config.output, Some("include/main.h".into()));
	assert!(config.metadata.is_none());

	Ok(())
}

#[test]
fn init_does_not_overwrite() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join(".config"))?;
	let config_path = tmp.path().join(".config/amalgam.toml");
	std::fs::write(&config_path, "existing config")?;

	common::amalgam_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already exists"));

	assert_eq!(std::fs::read_to_string(&config_path)?, "existing config");
	assert!(!tmp.path().join("amalgam.toml").exists());

	Ok(())
}
