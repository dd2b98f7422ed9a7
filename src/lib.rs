pub mod config;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod files;
pub mod flow;
pub mod nodes;
pub mod providers;
pub mod registry;
pub mod template;
pub mod validation;

pub use crate::config::{HostConfig, LogLevel, ProviderCredentials, ProviderSettings};
pub use crate::error::{FlowError, FlowResult, NodeError, NodeResult};
pub use crate::executor::{
    ExecutionContext,
    ExecutionResult,
    FlowExecutor,
    FlowHooks,
    HookSignal,
    NodeEvent,
    NoopHooks,
};
pub use crate::files::{FileEntry, FlowFileStore};
pub use crate::flow::{parse_flow, BranchSchema, FlowSchema, NodeKind, NodeSchema, VariableDef};
pub use crate::nodes::{NodeExecutor, NodeExecutorRegistry};
pub use crate::providers::{
    EmbeddingModel,
    LanguageModel,
    LlmMessage,
    LlmReply,
    LlmRequest,
    PageImage,
    PdfRasterizer,
    ProviderError,
    ProviderRegistry,
    RasterOptions,
    VectorDeletion,
    VectorIndex,
    VectorMatch,
    VectorQuery,
    VectorRecord,
};
pub use crate::registry::{FlowRegistry, Registry, ScopedRegistry, VarType};
pub use crate::template::{resolve_string, resolve_value, scan_value, ReferenceToken};
pub use crate::validation::{validate_flow, ErrorCode, ValidationReport};
