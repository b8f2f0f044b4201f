//! Minimal CLI: element fixtures → (check | schema | rust)
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::generate::RunOptions;
use crate::ir::Model;
use crate::source::FixtureSource;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// verify documentation element streams against the built-in translators and
/// output the resulting object model as JSON or as Rust types
#[derive(Parser, Debug)]
#[command(name = "docs-lockstep")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// run every translator and report drift; writes nothing
    Check(CheckOut),
    /// run and print the object model as JSON
    Schema(OutputSettings),
    /// run and emit Rust type definitions
    Rust(OutputSettings),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more element fixture files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// fail when a page has elements no translator step describes
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(clap::Parser, Debug)]
struct OutputSettings {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_source(&self) -> Result<FixtureSource> {
        let paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut source = FixtureSource::new();
        for path in paths {
            source.add_file(&path)?;
        }
        Ok(source)
    }

    fn generate(&self) -> Result<Model> {
        let mut source = self.load_source()?;
        let registry = crate::translators::builtin();
        let options = RunOptions { strict: self.strict };
        Ok(crate::generate::run(&registry, &mut source, options)?)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Check(target) => {
                let model = target.input_settings.generate()?;
                eprintln!("documentation matches: {} type(s) built", model.types.len());
                Ok(())
            }
            Command::Schema(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let model = target.input_settings.generate()?;
                let schema_src = serde_json::to_string_pretty(&model)?;
                write_output(target.out.as_deref(), &schema_src)
            }
            Command::Rust(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let model = target.input_settings.generate()?;
                let mut cg = crate::codegen::Codegen::new();
                cg.emit(&model);
                write_output(target.out.as_deref(), &cg.into_string())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, src: &str) -> Result<()> {
    let Some(out) = out else {
        println!("{src}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
    log::info!("wrote {}", out.display());
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let before = out.len();
        for entry in glob::glob(pattern)? {
            out.push(entry?);
        }
        if out.len() == before {
            anyhow::bail!("glob pattern matched no files: {pattern}");
        }
    }
    // Sorted so the same inputs always load in the same order.
    out.sort();
    out.dedup();
    Ok(out)
}
