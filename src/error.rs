// ABOUTME: Error type for the macro expansion phase

use thiserror::Error;

/// The one failure in the core that is not representable as an in-language
/// value: a macro body must hand back syntax. `interp` catches this and
/// reports it as a runtime error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MacroError {
    #[error("we only support returning AST-nodes from macros")]
    NonQuoteResult,
}
