use std::fs;
use std::path::PathBuf;

use scriptshim::tooling::cli::{CliContext, Commands, ConfigCommands, StoreCommands};
use scriptshim::EnvironmentKind;
use tempfile::TempDir;

use crate::support::{with_env, with_xdg_env};

fn write_config(temp_dir: &TempDir) -> (PathBuf, PathBuf) {
    let store_dir = temp_dir.path().join("Store");
    let config_path = temp_dir.path().join("scriptshim.toml");
    fs::write(
        &config_path,
        format!(
            "timeout_ms = 1200\n\n[store]\ndir = \"{}\"\n",
            store_dir.display()
        ),
    )
    .unwrap();
    (config_path, store_dir)
}

#[test]
fn store_put_then_get() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let (config_path, store_dir) = write_config(&temp_dir);
        let cli = CliContext::new(Some(config_path)).unwrap();

        let output = cli
            .execute(&Commands::Store {
                command: StoreCommands::Put {
                    key: "token".to_string(),
                    value: "abc".to_string(),
                },
            })
            .unwrap();
        assert!(output.contains("token"));
        assert_eq!(fs::read_to_string(store_dir.join("token")).unwrap(), "abc");

        let value = cli
            .execute(&Commands::Store {
                command: StoreCommands::Get {
                    key: "token".to_string(),
                },
            })
            .unwrap();
        assert_eq!(value, "abc");

        assert!(cli
            .execute(&Commands::Store {
                command: StoreCommands::Get {
                    key: "missing".to_string(),
                },
            })
            .is_err());
    });
}

#[test]
fn config_show_prints_effective_toml() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let (config_path, _) = write_config(&temp_dir);
        let cli = CliContext::new(Some(config_path)).unwrap();

        let output = cli
            .execute(&Commands::Config {
                command: ConfigCommands::Show,
            })
            .unwrap();
        assert!(output.contains("timeout_ms = 1200"));
    });
}

#[test]
fn global_config_is_layered_under_explicit_file() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let global_dir = temp_dir.path().join("config").join("scriptshim");
        fs::create_dir_all(&global_dir).unwrap();
        fs::write(
            global_dir.join("config.toml"),
            "timeout_ms = 9000\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let (config_path, _) = write_config(&temp_dir);
        let cli = CliContext::new(Some(config_path)).unwrap();

        assert_eq!(cli.config().timeout_ms, 1200);
        assert_eq!(cli.config().logging.level, "debug");
    });
}

#[test]
fn environment_overrides_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let env_store = temp_dir.path().join("EnvStore");
    let env_store_str = env_store.to_string_lossy().into_owned();
    with_env(
        &temp_dir,
        &[
            ("SCRIPTSHIM_TIMEOUT_MS", "8000"),
            ("SCRIPTSHIM_STORE__DIR", env_store_str.as_str()),
        ],
        || {
            let (config_path, _) = write_config(&temp_dir);
            let cli = CliContext::new(Some(config_path)).unwrap();

            assert_eq!(cli.config().timeout_ms, 8000);
            assert_eq!(cli.config().store.dir.as_deref(), Some(env_store.as_path()));
        },
    );
}

#[test]
fn default_store_lives_under_xdg_data_home() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let cli = CliContext::new(None).unwrap();
        cli.execute(&Commands::Store {
            command: StoreCommands::Put {
                key: "k".to_string(),
                value: "v".to_string(),
            },
        })
        .unwrap();

        let expected = temp_dir
            .path()
            .join("data")
            .join("scriptshim")
            .join("Store")
            .join("k");
        assert_eq!(fs::read_to_string(expected).unwrap(), "v");
    });
}

#[test]
fn surface_lists_adapter_and_modules() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let (config_path, _) = write_config(&temp_dir);
        let cli = CliContext::new(Some(config_path)).unwrap();

        let output = cli
            .execute(&Commands::Surface {
                env: EnvironmentKind::QuantumultX,
                require: vec!["qs".to_string()],
            })
            .unwrap();
        assert!(output.contains("Environment: quanx"));
        assert!(output.contains("$task"));
        assert!(output.contains("qs"));
        assert!(!output.contains("$httpClient"));

        assert!(cli
            .execute(&Commands::Surface {
                env: EnvironmentKind::Surge,
                require: vec!["fs".to_string()],
            })
            .is_err());
    });
}
