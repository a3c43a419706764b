//! # Módulo de Códigos de Erro Estruturados
//!
//! Define códigos de erro padronizados e os erros que podem acontecer
//! durante a execução de um único test case.
//!
//! ## Categorias de Erro
//!
//! | Faixa  | Categoria       | Descrição                                   |
//! |--------|-----------------|---------------------------------------------|
//! | E1xxx  | Configuração    | Arquivo de test cases inválido (fatal)      |
//! | E2xxx  | Execução        | Falha isolada em um test case               |
//! | E3xxx  | Validação       | Resposta diferente do esperado              |
//! | E4xxx  | Ambiente        | Arquivos, relatório, variáveis de ambiente  |
//!
//! Erros E1xxx abortam a execução antes do primeiro request. Erros E2xxx
//! marcam apenas o test case como FAILED; a execução continua (a menos que
//! `--stop-on-failure` esteja ativo).

use std::fmt;
use thiserror::Error;

// ============================================================================
// CÓDIGO DE ERRO
// ============================================================================

/// Código de erro estruturado com categoria e número.
///
/// Primeiro dígito: categoria. Últimos 3 dígitos: erro específico.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(u16);

impl ErrorCode {
    // ========================================================================
    // E1xxx: Configuração
    // ========================================================================

    /// Método HTTP fora de GET/POST/PUT/DELETE/PATCH.
    pub const INVALID_HTTP_METHOD: Self = Self(1001);

    /// Test case sem nome.
    pub const EMPTY_TEST_NAME: Self = Self(1002);

    /// `expected_status_code` fora da faixa 100-599.
    pub const INVALID_EXPECTED_STATUS: Self = Self(1003);

    /// Extração com nome de variável ou path vazio.
    pub const INVALID_EXTRACTION: Self = Self(1004);

    /// JSON do arquivo de test cases inválido.
    pub const INVALID_SUITE_FORMAT: Self = Self(1005);

    // ========================================================================
    // E2xxx: Execução de um test case
    // ========================================================================

    /// Falha ao serializar o body.
    pub const BODY_PREPARATION: Self = Self(2001);

    /// URL, método ou header inválido.
    pub const REQUEST_CONSTRUCTION: Self = Self(2002);

    /// Erro de rede ou timeout.
    pub const TRANSPORT: Self = Self(2003);

    /// Falha lendo o body da resposta.
    pub const RESPONSE_READ: Self = Self(2004);

    // ========================================================================
    // E3xxx: Validação
    // ========================================================================

    /// Status HTTP diferente do esperado.
    pub const STATUS_MISMATCH: Self = Self(3001);

    /// Body diferente do esperado.
    pub const BODY_MISMATCH: Self = Self(3002);

    // ========================================================================
    // E4xxx: Ambiente
    // ========================================================================

    /// Arquivo de test cases não encontrado ou ilegível.
    pub const SUITE_FILE_UNREADABLE: Self = Self(4001);

    /// Falha ao escrever o relatório.
    pub const REPORT_WRITE: Self = Self(4002);

    // ========================================================================
    // MÉTODOS
    // ========================================================================

    pub fn code(&self) -> u16 {
        self.0
    }

    /// Código formatado com prefixo "E" (ex: "E2003").
    pub fn formatted(&self) -> String {
        format!("E{:04}", self.code())
    }

    pub fn category(&self) -> ErrorCategory {
        match self.0 / 1000 {
            1 => ErrorCategory::Configuration,
            2 => ErrorCategory::Execution,
            3 => ErrorCategory::Validation,
            4 => ErrorCategory::Environment,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Descrição curta do erro.
    pub fn description(&self) -> &'static str {
        match self.0 {
            1001 => "Método HTTP inválido",
            1002 => "Test case sem nome",
            1003 => "Status esperado inválido",
            1004 => "Extração inválida",
            1005 => "Formato de arquivo inválido",
            2001 => "Erro ao preparar body",
            2002 => "Erro ao construir request",
            2003 => "Erro de transporte",
            2004 => "Erro ao ler resposta",
            3001 => "Status HTTP divergente",
            3002 => "Body divergente",
            4001 => "Arquivo de test cases ilegível",
            4002 => "Erro ao escrever relatório",
            _ => "Erro desconhecido",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

// ============================================================================
// CATEGORIA DE ERRO
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// E1xxx: problema no arquivo de test cases.
    Configuration,
    /// E2xxx: falha isolada em um test case.
    Execution,
    /// E3xxx: resposta não bate com o esperado.
    Validation,
    /// E4xxx: arquivos e ambiente.
    Environment,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuração"),
            Self::Execution => write!(f, "Execução"),
            Self::Validation => write!(f, "Validação"),
            Self::Environment => write!(f, "Ambiente"),
            Self::Unknown => write!(f, "Desconhecido"),
        }
    }
}

// ============================================================================
// ERROS DE EXECUÇÃO
// ============================================================================

/// Falhas que encerram um único test case como FAILED.
///
/// Nunca passam do executor: viram uma linha em `TestResult::errors`.
/// As mensagens seguem o texto exibido no console e gravado no relatório.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("failed to marshal body: {0}")]
    BodyPreparation(String),

    #[error("failed to create request: {0}")]
    RequestConstruction(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("failed to read response: {0}")]
    ResponseRead(String),
}

impl ExecutionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::BodyPreparation(_) => ErrorCode::BODY_PREPARATION,
            Self::RequestConstruction(_) => ErrorCode::REQUEST_CONSTRUCTION,
            Self::Transport(_) => ErrorCode::TRANSPORT,
            Self::ResponseRead(_) => ErrorCode::RESPONSE_READ,
        }
    }

    /// Rótulo curto usado na narração do console.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BodyPreparation(_) => "Body preparation error",
            Self::RequestConstruction(_) => "Request creation error",
            Self::Transport(_) => "Transport error",
            Self::ResponseRead(_) => "Response read error",
        }
    }
}
