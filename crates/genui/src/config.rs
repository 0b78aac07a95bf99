//! 配置
//!
//! 分层加载：内置默认值 → YAML 文件 → 环境变量。
//! 文件路径取显式参数，否则取 `GENUI_CONFIG`；都没有时只用默认值。

use anyhow::{bail, Context, Result};
use genui_a2ui::catalog::PromptOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::streaming::ParserOptions;

/// 配置文件路径
pub const CONFIG_ENV: &str = "GENUI_CONFIG";
/// 日志过滤器
pub const LOG_ENV: &str = "GENUI_LOG";
pub const MAX_BUFFER_BYTES_ENV: &str = "GENUI_MAX_BUFFER_BYTES";
pub const INCLUDE_SCHEMAS_ENV: &str = "GENUI_INCLUDE_SCHEMAS";
pub const DATA_DIR_ENV: &str = "GENUI_DATA_DIR";

/// 默认快照目录
pub const DEFAULT_DATA_DIR: &str = ".genui/sessions";

/// 完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GenuiConfig {
    pub parser: ParserConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
    pub store: StoreConfig,
}

/// 流式解析器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// 识别为 A2UI/JSON 的围栏语言标记
    pub json_tags: Vec<String>,
    /// 识别为 JSX 的围栏语言标记
    pub jsx_tags: Vec<String>,
    pub max_buffer_bytes: usize,
    /// 流结束时把未闭合的围栏当作已闭合解析
    pub close_unterminated_on_finish: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let options = ParserOptions::default();
        Self {
            json_tags: options.json_tags,
            jsx_tags: options.jsx_tags,
            max_buffer_bytes: options.max_buffer_bytes,
            close_unterminated_on_finish: options.close_unterminated_on_finish,
        }
    }
}

impl From<&ParserConfig> for ParserOptions {
    fn from(config: &ParserConfig) -> Self {
        ParserOptions {
            json_tags: config.json_tags.clone(),
            jsx_tags: config.jsx_tags.clone(),
            max_buffer_bytes: config.max_buffer_bytes,
            close_unterminated_on_finish: config.close_unterminated_on_finish,
        }
    }
}

/// 组件目录提示词配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// 在提示词中附带每个组件的 JSON Schema
    pub include_schemas: bool,
}

impl From<&CatalogConfig> for PromptOptions {
    fn from(config: &CatalogConfig) -> Self {
        PromptOptions {
            include_schemas: config.include_schemas,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` 语法，例如 `info,genui=debug`
    pub filter: String,
    /// 输出 JSON 行
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// 快照存储配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: Option<PathBuf>,
}

impl StoreConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}

impl GenuiConfig {
    /// 按 默认值 → 文件 → 环境变量 的顺序加载
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// 解析 YAML；空文档得到默认配置
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("failed to parse YAML config")
    }

    /// 用环境变量覆盖
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(filter) = std::env::var(LOG_ENV) {
            self.logging.filter = filter;
        }
        if let Ok(val) = std::env::var(MAX_BUFFER_BYTES_ENV) {
            self.parser.max_buffer_bytes = val
                .trim()
                .parse()
                .with_context(|| format!("{} must be a byte count, got {:?}", MAX_BUFFER_BYTES_ENV, val))?;
        }
        if let Ok(val) = std::env::var(INCLUDE_SCHEMAS_ENV) {
            self.catalog.include_schemas = match parse_bool(&val) {
                Some(flag) => flag,
                None => bail!("{} must be a boolean, got {:?}", INCLUDE_SCHEMAS_ENV, val),
            };
        }
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            self.store.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.parser.max_buffer_bytes == 0 {
            bail!("parser.max_buffer_bytes must be greater than zero");
        }
        if self.parser.json_tags.is_empty() && self.parser.jsx_tags.is_empty() {
            bail!("at least one fence tag must be configured");
        }
        let mut all_tags = self.parser.json_tags.iter().chain(&self.parser.jsx_tags);
        if let Some(tag) = all_tags.find(|tag| tag.trim().is_empty() || tag.contains(char::is_whitespace)) {
            bail!("invalid fence tag {:?}", tag);
        }
        let json: Vec<_> = self.parser.json_tags.iter().map(|t| t.to_lowercase()).collect();
        if let Some(tag) = self
            .parser
            .jsx_tags
            .iter()
            .find(|tag| json.contains(&tag.to_lowercase()))
        {
            bail!("fence tag {:?} is configured as both json and jsx", tag);
        }
        Ok(())
    }

    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions::from(&self.parser)
    }

    pub fn prompt_options(&self) -> PromptOptions {
        PromptOptions::from(&self.catalog)
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ALL_ENV: [&str; 5] = [
        CONFIG_ENV,
        LOG_ENV,
        MAX_BUFFER_BYTES_ENV,
        INCLUDE_SCHEMAS_ENV,
        DATA_DIR_ENV,
    ];

    fn without_env<R>(f: impl FnOnce() -> R) -> R {
        let unset: Vec<(&str, Option<&str>)> = ALL_ENV.iter().map(|key| (*key, None)).collect();
        temp_env::with_vars(unset, f)
    }

    #[test]
    fn test_defaults_match_parser_options() {
        let config = without_env(|| GenuiConfig::load(None)).unwrap();
        assert_eq!(config, GenuiConfig::default());
        assert_eq!(config.parser_options().json_tags, vec!["json".to_string()]);
        assert_eq!(config.store.data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
        assert!(!config.prompt_options().include_schemas);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = GenuiConfig::from_yaml_str(
            "parser:\n  jsx_tags: [jsx, tsx]\nlogging:\n  json: true\n",
        )
        .unwrap();

        assert_eq!(config.parser.jsx_tags, vec!["jsx", "tsx"]);
        assert_eq!(config.parser.json_tags, vec!["json"]);
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(GenuiConfig::from_yaml_str("  \n").unwrap(), GenuiConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "logging:\n  filter: warn\ncatalog:\n  include_schemas: false").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = temp_env::with_vars(
            [
                (CONFIG_ENV, Some(path.as_str())),
                (LOG_ENV, Some("genui=trace")),
                (MAX_BUFFER_BYTES_ENV, Some("1024")),
                (INCLUDE_SCHEMAS_ENV, Some("yes")),
                (DATA_DIR_ENV, Some("/tmp/genui-data")),
            ],
            || GenuiConfig::load(None),
        )
        .unwrap();

        assert_eq!(config.logging.filter, "genui=trace");
        assert_eq!(config.parser.max_buffer_bytes, 1024);
        assert!(config.catalog.include_schemas);
        assert_eq!(config.store.data_dir(), PathBuf::from("/tmp/genui-data"));
    }

    #[test]
    fn test_bad_env_values_are_errors() {
        let err = temp_env::with_vars(
            [
                (CONFIG_ENV, None),
                (MAX_BUFFER_BYTES_ENV, Some("lots")),
            ],
            || GenuiConfig::load(None),
        )
        .unwrap_err();
        assert!(err.to_string().contains(MAX_BUFFER_BYTES_ENV));

        let err = temp_env::with_vars(
            [(CONFIG_ENV, None), (INCLUDE_SCHEMAS_ENV, Some("maybe"))],
            || GenuiConfig::load(None),
        )
        .unwrap_err();
        assert!(err.to_string().contains(INCLUDE_SCHEMAS_ENV));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let config = GenuiConfig::from_yaml_str("parser:\n  max_buffer_bytes: 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = GenuiConfig::from_yaml_str("parser:\n  json_tags: [json]\n  jsx_tags: [JSON]\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = without_env(|| GenuiConfig::load(Some(Path::new("/nonexistent/genui.yaml"))))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/genui.yaml"));
    }
}
