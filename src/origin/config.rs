fn default_branch() -> String {
    "master".to_string()
}

fn default_dir() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(alias = "url")]
    pub src: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_dir", alias = "source_dir")]
    pub docdir: String,

    #[serde(default = "default_dir", alias = "target_dir")]
    pub targetdir: String,

    pub whitelist: Option<Vec<String>>,

    pub username: Option<String>,

    /// Prefix with '@' to read the password from a file.
    pub password: Option<String>,
}
