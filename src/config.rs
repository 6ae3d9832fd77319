use serde::Deserialize;

/// Configuration for the message layer: where sessions live and how the
/// request environment is interpreted.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Name of the cookie that carries the session id.
    pub session_cookie: String,

    /// Directory used by the file-backed session store.
    pub session_dir: String,

    /// Header a trusted proxy sets to report the original scheme.
    pub forwarded_proto_header: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            session_cookie: "gatehouse.session".to_string(),
            session_dir: "./sessions".to_string(),
            forwarded_proto_header: "X-Forwarded-Proto".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn from_file(path: &str) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("Fail to read {}: {err}", path);
                log::warn!("Fall back to default config");
                return HttpConfig::default();
            }
        };

        match toml::from_str::<HttpConfig>(content.as_str()) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Fail to deserialize config file {}: {err}", path);
                log::warn!("Fall back to default config");
                HttpConfig::default()
            }
        }
    }
}
