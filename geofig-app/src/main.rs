use std::path::{Path, PathBuf};

use geofig_config::{AppConfig, ConfigError, OutputFormat};
use geofig_io::{FigureLoader, FigureParser, JsonFacade, UnparseOptions};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

mod output;

const USAGE: &str =
    "用法: geofig [--config <路径>] [--format unparse|json|summary] [--no-strip-comments] <figure.json>...";

#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
    format: Option<OutputFormat>,
    keep_comments: bool,
    files: Vec<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(path) = args.next() else {
                    return Err("`--config` 需要提供配置文件路径".to_string());
                };
                parsed.config = Some(PathBuf::from(path));
            }
            "--format" => {
                let Some(name) = args.next() else {
                    return Err("`--format` 需要提供输出格式".to_string());
                };
                let format = OutputFormat::from_name(&name)
                    .ok_or_else(|| format!("未知输出格式：{name}"))?;
                parsed.format = Some(format);
            }
            "--no-strip-comments" => parsed.keep_comments = true,
            other if other.starts_with("--") => return Err(format!("未知参数：{other}")),
            file => parsed.files.push(PathBuf::from(file)),
        }
    }
    if parsed.files.is_empty() {
        return Err("至少需要一个图形文件".to_string());
    }
    Ok(parsed)
}

fn main() {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    // 先安装日志，再报告配置回退，否则警告无处输出
    let (config, config_error) = match load_configuration(args.config.as_deref()) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    init_logging(&config);
    if let Some(err) = config_error {
        warn!(error = %err, "加载配置失败，使用内建默认值");
    }
    info!(files = args.files.len(), "启动 geofig");

    let format = args.format.unwrap_or(config.output.format);
    let strip_comments = config.input.strip_comments && !args.keep_comments;
    let facade =
        JsonFacade::with_parser(FigureParser::new().with_comment_stripping(strip_comments));
    let options = UnparseOptions {
        indent: config.output.indent,
    };

    let mut failures = 0usize;
    for path in &args.files {
        let figure = match facade.load(path) {
            Ok(figure) => figure,
            Err(err) => {
                error!(path = %path.display(), error = %err, "加载图形失败");
                failures += 1;
                continue;
            }
        };
        match output::render(&figure, path, format, &options) {
            Ok(text) => print!("{text}"),
            Err(err) => {
                error!(path = %path.display(), error = %err, "渲染图形失败");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        warn!(failures, "部分图形未能处理");
        std::process::exit(1);
    }
}

/// 显式路径优先，否则自动发现。失败时由调用方在日志就绪后回退到默认配置。
fn load_configuration(override_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match override_path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::discover(),
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_flags_and_files() {
        let parsed = parse_args(args(&[
            "--format",
            "json",
            "--config",
            "geofig.toml",
            "--no-strip-comments",
            "a.json",
            "b.json",
        ]))
        .unwrap();
        assert_eq!(parsed.format, Some(OutputFormat::Json));
        assert_eq!(parsed.config, Some(PathBuf::from("geofig.toml")));
        assert!(parsed.keep_comments);
        assert_eq!(parsed.files.len(), 2);
    }

    #[test]
    fn rejects_bad_usage() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["--format"])).is_err());
        assert!(parse_args(args(&["--format", "xml", "a.json"])).is_err());
        assert!(parse_args(args(&["--verbose", "a.json"])).is_err());
    }
}
