//! `adie-stx` - check `.stx` grammars and highlight files from the command line.

mod render;

use adie_core::StyledBuffer;
use adie_core_syntax::{
    HighlightConfig, Restyler, StyleTable, Syntax, SyntaxError, SyntaxSet, parse_grammar,
};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Grammar shipped with the binary, used when none is found on the search path.
const BUNDLED_SYNTAX: &str = include_str!("../syntax/Adie.stx");

/// Environment variable holding the log filter.
const LOG_ENV: &str = "ADIE_LOG";

#[derive(Parser, Debug)]
#[command(name = "adie-stx", version, about = "Rule-tree syntax highlighting tools")]
struct Cli {
    /// Configuration file (JSON).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Grammar file to use instead of the configured one.
    #[arg(short, long, global = true)]
    syntax: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse grammar files and report what they define.
    Check {
        /// Grammar files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the loaded languages.
    Languages {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print the rule tree of a language.
    Rules {
        /// Language name.
        language: String,
    },
    /// Print the default style table as JSON.
    Theme,
    /// Print a file with ANSI colors.
    Highlight {
        /// File to highlight.
        file: PathBuf,
        /// Language name (guessed from the file otherwise).
        #[arg(short, long)]
        language: Option<String>,
        /// Style table (JSON).
        #[arg(short, long)]
        theme: Option<PathBuf>,
        /// Print the text without escape sequences.
        #[arg(long)]
        plain: bool,
    },
    /// Apply one edit to a file and show what the incremental restyle touched.
    ///
    /// Fails when colorizing is turned off in the configuration.
    Replay {
        /// File to edit.
        file: PathBuf,
        /// Byte offset of the edit.
        #[arg(long)]
        at: usize,
        /// Bytes to delete at the offset.
        #[arg(long, default_value_t = 0)]
        delete: usize,
        /// Text to insert at the offset.
        #[arg(long, default_value = "")]
        insert: String,
        /// Language name (guessed from the file otherwise).
        #[arg(short, long)]
        language: Option<String>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Check { files } => Ok(check(&files)),
        Command::Languages { json } => {
            let set = load_syntaxes(&config, cli.syntax.as_deref())?;
            languages(&set, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Rules { language } => {
            let set = load_syntaxes(&config, cli.syntax.as_deref())?;
            let syntax = set
                .get(&language)
                .with_context(|| format!("unknown language '{language}'"))?;
            print!("{}", rule_tree(&syntax));
            Ok(ExitCode::SUCCESS)
        }
        Command::Theme => {
            println!("{}", serde_json::to_string_pretty(&render::default_theme())?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Highlight {
            file,
            language,
            theme,
            plain,
        } => {
            let set = load_syntaxes(&config, cli.syntax.as_deref())?;
            let text = read_text(&file)?;
            let syntax = pick_language(&set, language.as_deref(), &file, &text)?;
            let mut buffer = StyledBuffer::new(text);
            if config.colorize {
                Restyler::with_options(&syntax, config.restyle_options())
                    .restyle_all(&mut buffer)?;
            }

            let palette = if plain {
                Vec::new()
            } else {
                let table = match theme.or(config.theme.clone()) {
                    Some(path) => StyleTable::load_from_path(&path)
                        .with_context(|| format!("reading theme {}", path.display()))?,
                    None => render::default_theme(),
                };
                render::palette(&table, &syntax)
            };
            let mut out = io::stdout().lock();
            render::write_highlighted(&mut out, &buffer, &palette)?;
            out.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Replay {
            file,
            at,
            delete,
            insert,
            language,
        } => {
            let set = load_syntaxes(&config, cli.syntax.as_deref())?;
            let text = read_text(&file)?;
            let syntax = pick_language(&set, language.as_deref(), &file, &text)?;
            let restyler = replay_restyler(&config, &syntax)?;

            let mut buffer = StyledBuffer::new(text);
            restyler.restyle_all(&mut buffer)?;
            let edit = buffer
                .replace(at, delete, &insert)
                .context("edit does not fit the file")?;
            let report = restyler.restyle(&mut buffer, &edit)?;

            let mut fresh = StyledBuffer::new(buffer.text());
            restyler.restyle_all(&mut fresh)?;
            let agrees = fresh.styles() == buffer.styles();

            println!("edit:       {edit:?}");
            println!("restyled:   {}..{}", report.start, report.end);
            println!("rewritten:  {:?}", report.rewritten);
            println!("passes:     {}", report.passes);
            println!("full match: {agrees}");
            Ok(if agrees {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<HighlightConfig> {
    let mut config = match path {
        Some(path) => HighlightConfig::load_from_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => HighlightConfig::default(),
    };
    config.apply_env();
    Ok(config)
}

/// Load the grammar named on the command line, else the configured one, else the bundled one.
fn load_syntaxes(config: &HighlightConfig, explicit: Option<&Path>) -> Result<SyntaxSet> {
    let mut set = config.syntax_set();
    if let Some(path) = explicit {
        set.load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?;
        return Ok(set);
    }
    match set.load_by_name(&config.syntax_file) {
        Ok(_) => {}
        Err(SyntaxError::NotFound(name)) => {
            tracing::debug!(file = %name, "not on the search path, using bundled grammar");
            set.load_from_str(BUNDLED_SYNTAX)
                .context("loading bundled grammar")?;
        }
        Err(err) => return Err(err).context(format!("loading {}", config.syntax_file)),
    }
    Ok(set)
}

fn replay_restyler<'a>(config: &HighlightConfig, syntax: &'a Syntax) -> Result<Restyler<'a>> {
    if !config.colorize {
        bail!("colorizing is disabled in the configuration, nothing to replay");
    }
    Ok(Restyler::with_options(syntax, config.restyle_options()))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn pick_language(
    set: &SyntaxSet,
    name: Option<&str>,
    path: &Path,
    text: &str,
) -> Result<Arc<Syntax>> {
    if let Some(name) = name
        && set.get(name).is_none()
    {
        bail!("unknown language '{name}'");
    }
    set.find_for_file(name, Some(path), text)
        .with_context(|| format!("no language matches {}", path.display()))
}

fn check(files: &[PathBuf]) -> ExitCode {
    let mut code = ExitCode::SUCCESS;
    for path in files {
        let result = std::fs::read_to_string(path)
            .map_err(SyntaxError::from)
            .and_then(|src| parse_grammar(&src));
        match result {
            Ok(syntaxes) => {
                for syntax in &syntaxes {
                    println!(
                        "{}: language '{}' ({} rules)",
                        path.display(),
                        syntax.language(),
                        syntax.rule_count()
                    );
                }
            }
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                code = ExitCode::FAILURE;
            }
        }
    }
    code
}

fn languages(set: &SyntaxSet, json: bool) -> Result<()> {
    if json {
        let list: Vec<_> = set
            .languages()
            .map(|s| {
                serde_json::json!({
                    "language": s.language(),
                    "filesmatch": s.extensions(),
                    "contentsmatch": s.contents(),
                    "rules": s.rule_count(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        for syntax in set.languages() {
            println!("{:<12} {}", syntax.language(), syntax.extensions());
        }
    }
    Ok(())
}

/// One line per rule, indented by depth: `style name kind`.
fn rule_tree(syntax: &Syntax) -> String {
    fn walk(syntax: &Syntax, style: u8, depth: usize, out: &mut String) {
        let Some(rule) = syntax.rule(style) else {
            return;
        };
        out.push_str(&format!(
            "{:>3} {}{} ({})\n",
            rule.style(),
            "  ".repeat(depth),
            rule.name(),
            rule.kind().label()
        ));
        for &child in rule.children() {
            walk(syntax, child, depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(syntax, 0, 0, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_replay_arguments() {
        let cli = Cli::try_parse_from([
            "adie-stx", "replay", "main.c", "--at", "10", "--insert", "/*", "-l", "C",
        ])
        .unwrap();
        match cli.command {
            Command::Replay {
                at,
                delete,
                insert,
                language,
                ..
            } => {
                assert_eq!(at, 10);
                assert_eq!(delete, 0);
                assert_eq!(insert, "/*");
                assert_eq!(language.as_deref(), Some("C"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_bundled_grammar_loads() {
        let syntaxes = parse_grammar(BUNDLED_SYNTAX).unwrap();
        assert!(syntaxes.iter().any(|s| s.language() == "Rust"));
    }

    #[test]
    fn test_rule_tree_listing() {
        let syntax = parse_grammar(
            r#"
language "T"
  rule "Block" openpattern "\{" closepattern "\}"
    rule "Word" pattern "[a-z]+" end
  end
end
"#,
        )
        .unwrap()
        .remove(0);
        assert_eq!(
            rule_tree(&syntax),
            "  0 Default (default)\n  1   Block (bracket)\n  2     Word (simple)\n"
        );
    }

    #[test]
    fn test_replay_respects_colorize() {
        let syntax = parse_grammar(BUNDLED_SYNTAX).unwrap().remove(0);
        let mut config = HighlightConfig::default();
        assert!(replay_restyler(&config, &syntax).is_ok());

        config.colorize = false;
        let err = replay_restyler(&config, &syntax).unwrap_err();
        assert!(err.to_string().contains("colorizing is disabled"));
    }

    #[test]
    fn test_pick_language_rejects_unknown_name() {
        let mut set = SyntaxSet::new();
        set.load_from_str(BUNDLED_SYNTAX).unwrap();
        let path = Path::new("x.py");
        assert!(pick_language(&set, Some("Cobol"), path, "").is_err());
        assert_eq!(
            pick_language(&set, None, path, "").unwrap().language(),
            "Python"
        );
    }
}
