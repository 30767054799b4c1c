//! Operation catalog: named, typed operations the model can invoke.

pub mod arguments;
pub mod builtin;
pub mod operation;
pub mod types;
pub mod validation;

pub use arguments::OperationArguments;
pub use operation::{
    ClosureOperation, Operation, OperationCatalog, OperationContext, SideEffect,
};
pub use types::OperationParameters;
