use thiserror::Error;

/// Failure of a call made through the module export table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("bad argument #{position} to '{function}' ({expected} expected, got {got})")]
    BadArgument {
        position: usize,
        function: &'static str,
        expected: &'static str,
        got: String,
    },
    #[error("module has no export '{0}'")]
    UnknownExport(String),
    #[error("export '{0}' is a namespace, not a function")]
    NotAFunction(String),
}
