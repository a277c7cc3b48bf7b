use std::{
    fs::File,
    io::{
        BufWriter,
        Write,
    },
    path::Path,
};

use color_eyre::eyre::Error;
use serde::{
    Deserialize,
    Serialize,
};

/// Environment variable that takes precedence over [`RconConfig::password`].
pub const PASSWORD_VAR: &str = "TPSIGN_RCON_PASSWORD";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rcon: RconConfig,

    #[serde(default)]
    pub raycast: RaycastConfig,

    #[serde(default)]
    pub sign: SignConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let mut config = if !path.as_ref().exists() {
            let config = Self::default();
            config.save(&path)?;
            config
        }
        else {
            tracing::debug!(path = %path.as_ref().display(), "reading config file");

            let toml = std::fs::read(path)?;
            toml::from_slice::<Self>(&toml)?
        };

        if let Ok(password) = std::env::var(PASSWORD_VAR) {
            tracing::debug!("using RCON password from {PASSWORD_VAR}");
            config.rcon.password = password;
        }

        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        tracing::debug!(path = %path.as_ref().display(), "writing config file");

        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_all(
            "# tpsign configuration. The RCON password can also be set with TPSIGN_RCON_PASSWORD.\n\n"
                .as_bytes(),
        )?;

        writer.write_all(toml::to_string_pretty(&self)?.as_bytes())?;

        Ok(())
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RconConfig {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default)]
    pub password: String,
}

impl Default for RconConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            password: String::new(),
        }
    }
}

// keep the password out of logs
impl std::fmt::Debug for RconConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RconConfig")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RaycastConfig {
    /// Number of blocks sampled along the view ray.
    #[serde(default = "default_max_distance")]
    pub max_distance: u32,

    /// Height of the eyes above the player's feet.
    #[serde(default = "default_eye_height")]
    pub eye_height: f64,
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self {
            max_distance: default_max_distance(),
            eye_height: default_eye_height(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignConfig {
    #[serde(default = "default_label")]
    pub label: String,

    #[serde(default = "default_not_found_message")]
    pub not_found_message: String,

    /// Block entity id shared by all sign variants.
    #[serde(default = "default_block_entity_id")]
    pub block_entity_id: String,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            not_found_message: default_not_found_message(),
            block_entity_id: default_block_entity_id(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Chat prefix that starts an invocation.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_address() -> String {
    "localhost:25575".to_owned()
}

fn default_max_distance() -> u32 {
    5
}

fn default_eye_height() -> f64 {
    1.62
}

fn default_label() -> String {
    "[Click to teleport]".to_owned()
}

fn default_not_found_message() -> String {
    "Aim at a sign and try again".to_owned()
}

fn default_block_entity_id() -> String {
    "minecraft:sign".to_owned()
}

fn default_prefix() -> String {
    "!!tp_sign".to_owned()
}

#[cfg(test)]
mod tests {
    use crate::config::Config;

    #[test]
    fn missing_fields_use_defaults() {
        let config: Config = toml::from_str(
            r#"
            [rcon]
            password = "secret"

            [raycast]
            max_distance = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.rcon.address, "localhost:25575");
        assert_eq!(config.rcon.password, "secret");
        assert_eq!(config.raycast.max_distance, 8);
        assert_eq!(config.raycast.eye_height, 1.62);
        assert_eq!(config.sign.block_entity_id, "minecraft:sign");
        assert_eq!(config.watch.prefix, "!!tp_sign");
    }

    #[test]
    fn debug_output_hides_password() {
        let config: Config = toml::from_str("[rcon]\npassword = \"secret\"").unwrap();
        assert!(!format!("{config:?}").contains("secret"));
    }
}
