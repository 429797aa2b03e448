//! User-defined function dispatch

pub mod dispatcher;
pub mod invoker;
pub mod post_actions;
pub mod types;


pub use dispatcher::FunctionDispatcher;
pub use invoker::{FunctionInvoker, HttpFunctionInvoker};
pub use post_actions::{PostActionExecutor, QuotaLedger};
pub use types::{
    DispatchOutcome, FunctionInvocation, FunctionsRequest, InvocationResult, PostProcessReport,
    TimeoutPolicy,
};
