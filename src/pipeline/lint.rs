//! Script linting: parse every project script and report syntax errors
//! plus unused top-level bindings. Any finding fails the task, so `test`
//! exits non-zero on broken scripts.
//!
//! Vendored directories (configured under `[lint] exclude`) are skipped;
//! third-party bundles are not ours to fix.

use crate::{
    config::ProjectConfig,
    log,
    utils::fsx::collect_files_with_ext,
};
use anyhow::{Context, Result, bail};
use oxc_allocator::Allocator;
use oxc_ast::ast::{BindingPatternKind, Statement};
use oxc_parser::Parser;
use oxc_span::SourceType;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// One problem in one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    pub path: PathBuf,
    pub line: usize,
    pub col: usize,
    pub message: String,
}

pub fn run(config: &ProjectConfig) -> Result<()> {
    let findings = lint_tree(config)?;
    if findings.is_empty() {
        log!("lint"; "all scripts clean");
        return Ok(());
    }

    for finding in &findings {
        log!("lint"; "{}:{}:{} {}",
            finding.path.display(), finding.line, finding.col, finding.message);
    }
    bail!("{} lint finding(s)", findings.len());
}

/// Lint every non-excluded script under the source `js` directory.
pub fn lint_tree(config: &ProjectConfig) -> Result<Vec<LintFinding>> {
    let js_dir = config.build.source.join("js");
    if !js_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut findings = Vec::new();
    for path in collect_files_with_ext(&js_dir, &["js", "mjs"]) {
        if is_excluded(&path, &config.lint.exclude) {
            continue;
        }
        let source = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        findings.extend(lint_source(&path, &source));
    }
    Ok(findings)
}

fn is_excluded(path: &Path, exclude: &[PathBuf]) -> bool {
    path.components().any(|component| {
        exclude
            .iter()
            .any(|entry| entry.as_os_str() == component.as_os_str())
    })
}

/// Parse one script and collect its findings.
pub fn lint_source(path: &Path, source: &str) -> Vec<LintFinding> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_default();
    let parsed = Parser::new(&allocator, source, source_type).parse();

    if !parsed.errors.is_empty() {
        return parsed
            .errors
            .iter()
            .map(|error| {
                let offset = error
                    .labels
                    .as_ref()
                    .and_then(|labels| labels.first())
                    .map_or(0, |label| label.offset());
                let (line, col) = line_col(source, offset);
                LintFinding {
                    path: path.to_path_buf(),
                    line,
                    col,
                    message: error.message.to_string(),
                }
            })
            .collect();
    }

    let mut findings = Vec::new();
    for (name, offset) in top_level_bindings(&parsed.program.body) {
        if occurrence_count(source, &name) <= 1 {
            let (line, col) = line_col(source, offset);
            findings.push(LintFinding {
                path: path.to_path_buf(),
                line,
                col,
                message: format!("'{name}' is declared but never used"),
            });
        }
    }
    findings
}

/// Names bound at module top level, with the byte offset of each binding.
fn top_level_bindings(body: &[Statement<'_>]) -> Vec<(String, usize)> {
    let mut bindings = Vec::new();
    for statement in body {
        match statement {
            Statement::VariableDeclaration(decl) => {
                for declarator in &decl.declarations {
                    if let BindingPatternKind::BindingIdentifier(ident) = &declarator.id.kind {
                        bindings.push((ident.name.to_string(), ident.span.start as usize));
                    }
                }
            }
            Statement::FunctionDeclaration(func) => {
                if let Some(ident) = &func.id {
                    bindings.push((ident.name.to_string(), ident.span.start as usize));
                }
            }
            _ => {}
        }
    }
    bindings
}

/// Whole-word occurrences of `name` in the source, declaration included.
fn occurrence_count(source: &str, name: &str) -> usize {
    static WORD: OnceLock<Regex> = OnceLock::new();
    let word = WORD.get_or_init(|| Regex::new(r"[\w$]+").expect("identifier pattern"));
    word.find_iter(source)
        .filter(|hit| hit.as_str() == name)
        .count()
}

/// 1-based line and column of a byte offset.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let col = offset - before.rfind('\n').map_or(0, |p| p + 1) + 1;
    (line, col)
}
