//! # Módulo de Relatório
//!
//! Duas saídas:
//!
//! - **Console**: [`ConsoleObserver`] narra a execução enquanto ela acontece
//!   e [`render_summary`] fecha com as estatísticas.
//! - **JSON**: [`build_report`] + [`export_report`] gravam o relatório
//!   completo em disco.
//!
//! ## Exemplo de narração:
//!
//! ```text
//! ============================================================
//!   Starting API Tests - 2024-05-01 10:00:00
//! ============================================================
//!
//! [1] Login
//!   POST https://api.test/login
//!   ↳ Extracted token = abc
//!   ✓ PASSED (120ms)
//! ```

use std::fs;
use std::io::{self, Stdout, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use colored::{Color, Colorize};
use serde_json::Value;

use crate::context::stringify;
use crate::errors::{ErrorCode, ExecutionError};
use crate::protocol::{RunReport, Summary, TestResult};
use crate::runner::{RunObserver, RunOutcome};

const SEPARATOR_LENGTH: usize = 60;

fn separator() -> String {
    "=".repeat(SEPARATOR_LENGTH)
}

// ============================================================================
// NARRAÇÃO NO CONSOLE
// ============================================================================

/// Narra a execução em um writer (stdout por padrão).
///
/// Falhas de escrita são ignoradas: a narração não pode derrubar a execução.
pub struct ConsoleObserver<W: Write = Stdout> {
    out: W,
}

impl ConsoleObserver<Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for ConsoleObserver<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ConsoleObserver<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: impl AsRef<str>) {
        let _ = writeln!(self.out, "{}", line.as_ref());
    }
}

impl<W: Write> RunObserver for ConsoleObserver<W> {
    fn on_run_start(&mut self, _total: usize) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        self.emit(format!("\n{}", separator().bold()));
        self.emit(format!("  Starting API Tests - {}", timestamp).bold().to_string());
        self.emit(separator().bold().to_string());
    }

    fn on_test_start(&mut self, result: &TestResult) {
        self.emit(format!(
            "\n{}",
            format!("[{}] {}", result.order, result.test_case_name).bold()
        ));
        self.emit(format!("  {}", format!("{} {}", result.method, result.url).blue()));
    }

    fn on_extracted(&mut self, name: &str, value: &Value) {
        self.emit(format!(
            "  {}",
            format!("↳ Extracted {} = {}", name, stringify(value)).cyan()
        ));
    }

    fn on_test_finished(&mut self, result: &TestResult, aborted: Option<&ExecutionError>) {
        for line in render_outcome(result, aborted) {
            self.emit(line);
        }
    }

    fn on_stop(&mut self, _result: &TestResult) {
        self.emit(format!("\n{}", "⚠ Stopping execution due to failure".yellow()));
    }
}

/// Linhas de fechamento de um test case.
///
/// Erros de execução mostram só o rótulo (a causa fica no relatório JSON),
/// exceto falhas de transporte, que mostram a causa.
pub fn render_outcome(result: &TestResult, aborted: Option<&ExecutionError>) -> Vec<String> {
    if let Some(error) = aborted {
        let reason = match error {
            ExecutionError::Transport(_) => error.to_string(),
            _ => error.label().to_string(),
        };
        return vec![format!("  {}", format!("✗ FAILED - {}", reason).red())];
    }

    if result.passed() {
        return vec![format!(
            "  {}",
            format!("✓ PASSED ({:.0}ms)", result.response_time_ms).green()
        )];
    }

    let mut lines = vec![format!(
        "  {}",
        format!("✗ FAILED ({:.0}ms)", result.response_time_ms).red()
    )];
    lines.extend(
        result
            .errors
            .iter()
            .map(|error| format!("    {}", format!("• {}", error).red())),
    );
    lines
}

// ============================================================================
// RESUMO
// ============================================================================

/// Verde em 100%, amarelo a partir de 80%, vermelho abaixo.
pub fn pass_rate_color(pass_rate: f64) -> Color {
    if pass_rate >= 100.0 {
        Color::Green
    } else if pass_rate >= 80.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn render_summary(summary: &Summary) -> String {
    let mut lines = vec![
        format!("\n{}", separator().bold()),
        "  Test Summary".bold().to_string(),
        separator().bold().to_string(),
        format!("  Total:  {}", summary.total),
        format!("  {}", format!("Passed: {}", summary.passed).green()),
        format!("  {}", format!("Failed: {}", summary.failed).red()),
    ];

    if let Some(rate) = summary.pass_rate {
        lines.push(format!(
            "  {}",
            format!("Pass Rate: {:.1}%", rate).color(pass_rate_color(rate))
        ));
    }

    if let Some(avg) = summary.avg_response_time_ms {
        lines.push(format!("  Avg Response Time: {:.0}ms", avg));
    }

    lines.push(separator());
    lines.join("\n")
}

pub fn print_summary(summary: &Summary) {
    println!("{}", render_summary(summary));
}

// ============================================================================
// RELATÓRIO JSON
// ============================================================================

pub fn build_report(outcome: &RunOutcome, config_file: &str, base_url: &str) -> RunReport {
    RunReport {
        timestamp: Utc::now().to_rfc3339(),
        config_file: config_file.to_string(),
        base_url: base_url.to_string(),
        summary: outcome.summary.clone(),
        results: outcome.results.clone(),
    }
}

/// Grava o relatório como JSON indentado.
pub fn export_report<P: AsRef<Path>>(report: &RunReport, path: P) -> Result<()> {
    let path_ref = path.as_ref();

    let json = serde_json::to_string_pretty(report)
        .with_context(|| format!("[{}] Failed to serialize report", ErrorCode::REPORT_WRITE))?;

    fs::write(path_ref, json).with_context(|| {
        format!(
            "[{}] Failed to write report file {:?}",
            ErrorCode::REPORT_WRITE,
            path_ref
        )
    })?;

    tracing::info!(path = ?path_ref, "Report exported");
    Ok(())
}

// ============================================================================
// TESTES
// ============================================================================
