use crate::error::{RankError, Result};
use crate::types::config::RankConfig;
use std::path::Path;
use toml::map::Map;
use toml::Value;

pub const DEFAULT_CONFIG_FILE: &str = "modelrank.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".modelrank/local.toml";

pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<RankConfig> {
    let mut merged = Value::Table(Map::new());
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(RankError::ConfigNotFound(path.display().to_string()));
            }
            merge_file_if_exists(&mut merged, path)?;
        }
        None => merge_file_if_exists(&mut merged, &root.join(DEFAULT_CONFIG_FILE))?,
    }
    merge_file_if_exists(&mut merged, &root.join(DEFAULT_LOCAL_FILE))?;

    let cfg: RankConfig = merged.try_into()?;
    cfg.validate()?;
    Ok(cfg)
}

fn merge_file_if_exists(merged: &mut Value, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let value = read_toml_value(path)?;
    merge_toml(merged, value);
    Ok(())
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| RankError::ConfigParse(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::Strategy;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_config_defaults_when_no_file_exists() {
        let dir = TempDir::new().expect("temp dir should be created");
        let cfg = load_config(dir.path(), None).expect("load should not fail");
        assert_eq!(cfg.optimizer_settings().n_calls, 100);
        assert_eq!(cfg.optimizer_settings().strategy, Strategy::Bayesian);
    }

    #[test]
    fn load_config_rejects_missing_explicit_file() {
        let dir = TempDir::new().expect("temp dir should be created");
        let missing = dir.path().join("nope.toml");
        let err = load_config(dir.path(), Some(&missing)).expect_err("load should fail");
        assert!(matches!(err, RankError::ConfigNotFound(_)));
    }

    #[test]
    fn load_config_merges_repo_and_local_in_order() {
        let root = TempDir::new().expect("root temp dir should be created");
        fs::write(
            root.path().join(DEFAULT_CONFIG_FILE),
            r#"
[optimizer]
strategy = "random"
n_calls = 50
seed = 1

[metrics]
t_ref = 6.0
"#,
        )
        .expect("repo config should write");

        fs::create_dir_all(root.path().join(".modelrank")).expect("local dir should create");
        fs::write(
            root.path().join(DEFAULT_LOCAL_FILE),
            r#"
[optimizer]
seed = 99
"#,
        )
        .expect("local override should write");

        let cfg = load_config(root.path(), None).expect("load should succeed");
        let optimizer = cfg.optimizer_settings();
        assert_eq!(optimizer.strategy, Strategy::Random);
        assert_eq!(optimizer.n_calls, 50);
        assert_eq!(optimizer.seed, Some(99));
        assert_eq!(cfg.metric_settings().t_ref, 6.0);
    }

    #[test]
    fn load_config_reports_path_on_parse_error() {
        let root = TempDir::new().expect("root temp dir should be created");
        fs::write(root.path().join(DEFAULT_CONFIG_FILE), "[optimizer\n").expect("write");
        let err = load_config(root.path(), None).expect_err("load should fail");
        assert!(err.to_string().contains(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn load_config_validates_merged_values() {
        let root = TempDir::new().expect("root temp dir should be created");
        fs::write(
            root.path().join(DEFAULT_CONFIG_FILE),
            "[optimizer]\nn_calls = 0\n",
        )
        .expect("write");
        assert!(load_config(root.path(), None).is_err());
    }

    #[test]
    fn load_config_rejects_unknown_sections() {
        let root = TempDir::new().expect("root temp dir should be created");
        fs::write(root.path().join(DEFAULT_CONFIG_FILE), "[plugins]\nname = \"x\"\n")
            .expect("write");
        let err = load_config(root.path(), None).expect_err("load should fail");
        assert!(matches!(err, RankError::Toml(_)));
    }
}
