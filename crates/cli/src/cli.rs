use crate::tracing::{LogLevel, TracingFormat};
use clap::{Parser, Subcommand, ValueEnum};
use gqlwatch_core::Settings;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gqlwatch")]
#[command(about = "Run GraphQL code generation for the document you just saved")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    #[arg(long, global = true, help = "Output logs in JSON format")]
    pub json: bool,

    #[arg(
        short = 'C',
        long,
        global = true,
        env = "GQLWATCH_ROOT",
        help = "Project root",
        default_value = "."
    )]
    pub root: PathBuf,

    #[arg(
        short = 'c',
        long,
        global = true,
        env = "GQLWATCH_CONFIG",
        help = "Codegen config file, overriding discovery"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        global = true,
        value_delimiter = ',',
        help = "File suffixes that declare GraphQL documents (comma separated)"
    )]
    pub extensions: Option<Vec<String>>,

    #[arg(
        long,
        global = true,
        help = "Only saves matching this glob trigger generation"
    )]
    pub watch_glob: Option<String>,

    #[arg(
        long,
        global = true,
        env = "GQLWATCH_NODE",
        help = "Node executable used to evaluate script configs",
        default_value = "node"
    )]
    pub node: String,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Watch the project and generate for every saved document")]
    Watch {
        #[arg(
            long,
            help = "Milliseconds to wait for more changes before handling a burst",
            default_value_t = 100
        )]
        debounce_ms: u64,
    },
    #[command(about = "Generate for the full document set")]
    Generate,
    #[command(about = "Show which artifacts a save of FILE would regenerate")]
    Plan {
        #[arg(help = "Document file")]
        file: PathBuf,
        #[arg(long, help = "Output format", default_value = "text", value_enum)]
        output: OutputFormat,
    },
    #[command(about = "Print the codegen config file that would be used")]
    Locate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Log format after applying `--json`
    pub const fn tracing_format(&self) -> TracingFormat {
        if self.json {
            TracingFormat::Json
        } else {
            self.log_format
        }
    }

    /// Layer command line flags over `settings`
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(extensions) = &self.extensions {
            settings.file_extensions.clone_from(extensions);
        }
        if let Some(glob) = &self.watch_glob {
            settings.file_path_to_watch = Some(glob.clone());
        }
        if let Some(config) = &self.config {
            settings.config_file_path = Some(config.clone());
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["gqlwatch", "generate"]).unwrap();

        assert!(matches!(cli.level, LogLevel::Warn));
        assert_eq!(cli.tracing_format(), TracingFormat::Compact);
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.config.is_none());
        assert_eq!(cli.command, Commands::Generate);
    }

    #[test]
    fn test_node_binary_flag() {
        let cli = Cli::try_parse_from(["gqlwatch", "--node", "/opt/node/bin/node", "generate"]).unwrap();
        assert_eq!(cli.node, "/opt/node/bin/node");
    }

    #[test]
    fn test_cli_log_level_parsing() {
        let cli = Cli::try_parse_from(["gqlwatch", "--level", "debug", "locate"]).unwrap();
        assert!(matches!(cli.level, LogLevel::Debug));

        let cli = Cli::try_parse_from(["gqlwatch", "-l", "error", "locate"]).unwrap();
        assert!(matches!(cli.level, LogLevel::Error));
    }

    #[test]
    fn test_json_flag_wins_over_log_format() {
        let cli =
            Cli::try_parse_from(["gqlwatch", "--log-format", "pretty", "--json", "locate"]).unwrap();
        assert_eq!(cli.tracing_format(), TracingFormat::Json);
    }

    #[test]
    fn test_watch_defaults() {
        let cli = Cli::try_parse_from(["gqlwatch", "watch"]).unwrap();
        assert_eq!(cli.command, Commands::Watch { debounce_ms: 100 });
    }

    #[test]
    fn test_plan_arguments() {
        let cli = Cli::try_parse_from([
            "gqlwatch",
            "plan",
            "src/users.graphql",
            "--output",
            "json",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Commands::Plan {
                file: PathBuf::from("src/users.graphql"),
                output: OutputFormat::Json,
            }
        );
    }

    #[test]
    fn test_plan_requires_file() {
        assert!(Cli::try_parse_from(["gqlwatch", "plan"]).is_err());
    }

    #[test]
    fn test_overrides_replace_settings() {
        let cli = Cli::try_parse_from([
            "gqlwatch",
            "--extensions",
            "graphql,ts",
            "--watch-glob",
            "src/**",
            "--config",
            "codegen.ts",
            "generate",
        ])
        .unwrap();

        let mut settings = Settings::default();
        cli.apply_overrides(&mut settings);

        assert_eq!(settings.file_extensions, vec!["graphql", "ts"]);
        assert_eq!(settings.file_path_to_watch.as_deref(), Some("src/**"));
        assert_eq!(settings.config_file_path.as_deref(), Some("codegen.ts"));
    }

    #[test]
    fn test_no_overrides_keep_settings() {
        let cli = Cli::try_parse_from(["gqlwatch", "generate"]).unwrap();
        let mut settings = Settings {
            file_path_to_watch: Some("lib/**".to_string()),
            ..Settings::default()
        };
        cli.apply_overrides(&mut settings);
        assert_eq!(settings.file_path_to_watch.as_deref(), Some("lib/**"));
        assert_eq!(settings.file_extensions, vec!["graphql", "gql"]);
    }
}
