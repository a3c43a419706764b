//! # Orquestrador da Execução
//!
//! Executa os test cases em ordem crescente de `order`, um de cada vez,
//! compartilhando um único [`VariableStore`] entre eles (é assim que o
//! encadeamento funciona).
//!
//! ## Stop-on-failure
//!
//! Com `stop_on_failure` ativo, o primeiro test case FAILED encerra o loop.
//! Os test cases seguintes simplesmente não aparecem nos resultados (não são
//! registrados como "skipped").
//!
//! ```text
//! [1] PASSED ─► [2] FAILED ─► parou      resultados: [1, 2]
//! ```

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::context::VariableStore;
use crate::errors::ExecutionError;
use crate::executors::TestExecutor;
use crate::protocol::{Summary, TestCase, TestResult};

// ============================================================================
// OBSERVADOR
// ============================================================================

/// Recebe a narração da execução, na ordem em que as coisas acontecem.
///
/// Todos os métodos têm implementação vazia; o console implementa os que
/// precisa (ver `report::ConsoleObserver`).
pub trait RunObserver {
    fn on_run_start(&mut self, _total: usize) {}

    /// Antes do request. `result` já tem método e URL resolvidos.
    fn on_test_start(&mut self, _result: &TestResult) {}

    fn on_extracted(&mut self, _name: &str, _value: &Value) {}

    /// `aborted` é o erro que interrompeu o test case antes da validação.
    fn on_test_finished(&mut self, _result: &TestResult, _aborted: Option<&ExecutionError>) {}

    /// A execução parou por causa de `result` (stop-on-failure).
    fn on_stop(&mut self, _result: &TestResult) {}
}

/// Observador que não narra nada.
#[cfg(test)]
pub struct SilentObserver;

#[cfg(test)]
impl RunObserver for SilentObserver {}

// ============================================================================
// RESULTADO DA EXECUÇÃO
// ============================================================================

/// Tudo que uma execução produz.
#[derive(Debug)]
pub struct RunOutcome {
    pub results: Vec<TestResult>,
    pub summary: Summary,
    /// Variáveis ao final da execução.
    pub variables: VariableStore,
}

impl RunOutcome {
    /// `true` quando todos os test cases executados passaram (inclusive
    /// quando nenhum foi executado).
    pub fn all_passed(&self) -> bool {
        self.summary.passed == self.summary.total
    }
}

// ============================================================================
// RUNNER
// ============================================================================

pub struct Runner {
    executor: TestExecutor,
    stop_on_failure: bool,
}

impl Runner {
    pub fn new(executor: TestExecutor, stop_on_failure: bool) -> Self {
        Self {
            executor,
            stop_on_failure,
        }
    }

    /// Executa todos os test cases sequencialmente.
    ///
    /// A ordenação por `order` é estável: empates mantêm a ordem recebida.
    pub async fn run(&self, cases: &[TestCase], observer: &mut dyn RunObserver) -> RunOutcome {
        let mut ordered: Vec<&TestCase> = cases.iter().collect();
        ordered.sort_by_key(|case| case.order);

        info!(
            total = ordered.len(),
            base_url = %self.executor.base_url(),
            stop_on_failure = self.stop_on_failure,
            "Starting run"
        );
        observer.on_run_start(ordered.len());

        let mut store = VariableStore::new();
        let mut results = Vec::with_capacity(ordered.len());

        for case in ordered {
            let result = self.executor.execute(case, &mut store, observer).await;
            let stop = self.stop_on_failure && result.failed();
            debug!(order = result.order, status = ?result.status, variables = store.len(), "Test case recorded");

            if stop {
                warn!(order = result.order, name = %result.test_case_name, "Stopping execution due to failure");
                observer.on_stop(&result);
                results.push(result);
                break;
            }
            results.push(result);
        }

        let summary = summarize(&results);
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            "Run finished"
        );

        RunOutcome {
            results,
            summary,
            variables: store,
        }
    }
}

/// Estatísticas de uma sequência de resultados.
///
/// - `pass_rate`: `passed / total * 100`, ausente quando `total == 0`
/// - `avg_response_time_ms`: média apenas dos tempos estritamente positivos
///   (falhas imediatas sem tempo medido não puxam a média para baixo)
pub fn summarize(results: &[TestResult]) -> Summary {
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed()).count();
    let failed = total - passed;

    let pass_rate = (total > 0).then(|| passed as f64 / total as f64 * 100.0);

    let timed: Vec<f64> = results
        .iter()
        .map(|r| r.response_time_ms)
        .filter(|ms| *ms > 0.0)
        .collect();
    let avg_response_time_ms =
        (!timed.is_empty()).then(|| timed.iter().sum::<f64>() / timed.len() as f64);

    Summary {
        total,
        passed,
        failed,
        pass_rate,
        avg_response_time_ms,
    }
}

// ============================================================================
// TESTES
// ============================================================================
