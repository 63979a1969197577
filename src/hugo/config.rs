fn default_binary() -> String {
    "hugo".to_string()
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default = "default_binary")]
    pub binary: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            binary: default_binary(),
        }
    }
}
