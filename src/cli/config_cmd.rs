//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::capture::Duration;
use crate::domain::config::{AppConfig, CameraConfig};
use crate::domain::error::ConfigError;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    ensure_valid_key(key)?;
    let value = validate_config_value(key, value)?;

    let mut config = store.load().await?;
    set_value(&mut config, key, value.clone());

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    ensure_valid_key(key)?;

    let config = store.load().await?;
    presenter.output(get_value(&config, key).unwrap_or(NOT_SET));

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, get_value(&config, key).unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn ensure_valid_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

fn get_value<'a>(config: &'a AppConfig, key: &str) -> Option<&'a str> {
    let camera = config.camera.as_ref();
    match key {
        "api_url" => config.api_url.as_deref(),
        "camera.rear_device" => camera.and_then(|c| c.rear_device.as_deref()),
        "camera.front_device" => camera.and_then(|c| c.front_device.as_deref()),
        "camera.ready_timeout" => camera.and_then(|c| c.ready_timeout.as_deref()),
        _ => None,
    }
}

fn set_value(config: &mut AppConfig, key: &str, value: String) {
    if key == "api_url" {
        config.api_url = Some(value);
        return;
    }

    let camera = config.camera.get_or_insert_with(CameraConfig::default);
    match key {
        "camera.rear_device" => camera.rear_device = Some(value),
        "camera.front_device" => camera.front_device = Some(value),
        "camera.ready_timeout" => camera.ready_timeout = Some(value),
        _ => {}
    }
}

/// Validate a config value based on key type, returning it normalized
fn validate_config_value(key: &str, value: &str) -> Result<String, ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "api_url" => {
            let url = reqwest::Url::parse(value).map_err(|e| invalid(e.to_string()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(invalid(format!(
                    "Unsupported scheme '{}'. Use http or https",
                    url.scheme()
                )));
            }
            Ok(value.trim_end_matches('/').to_string())
        }
        "camera.rear_device" | "camera.front_device" => {
            let value = value.trim();
            if value.is_empty() {
                return Err(invalid("Device must not be empty".to_string()));
            }
            Ok(value.to_string())
        }
        "camera.ready_timeout" => {
            let duration = value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
            Ok(duration.to_string())
        }
        _ => Ok(value.to_string()),
    }
}
