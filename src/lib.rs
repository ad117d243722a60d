//! sdk-codegen
//!
//! Reads an OpenAPI 3.x (or legacy Swagger 2.0) document, resolves it into
//! an immutable graph of types, methods and tags, and renders SDK
//! declarations for several languages from that graph.
//!
//! ## Features
//!
//! - **Upgrade**: Swagger 2.0 documents are rewritten to the OpenAPI 3 shape
//! - **Resolution**: named schemas, inline objects and enums become one
//!   canonical, cycle-safe type table
//! - **Generation**: Python, TypeScript, Kotlin and Swift declarations
//! - **Diff**: method-level comparison of two API versions, exported as CSV
//!   or Markdown
//! - **Search**: regular-expression search over methods and types
//!
//! ## Architecture
//!
//! ```text
//! SpecItem ──load──> IntermediateSpec ──resolve──> ApiModel
//!                                                    │
//!                      ┌─────────────────────────────┼──────────────┐
//!                      v                             v              v
//!               CodeGenerator backends         compare_specs     search
//! ```

pub mod codegen;
pub mod config;
pub mod diff;
pub mod error;
pub mod model;
pub mod search;
pub mod spec;

pub use codegen::{CodeGenerator, GeneratorRegistry, Language, RenderProfile};
pub use config::SdkGenConfig;
pub use diff::{compare_specs, DiffRow};
pub use error::{Result, SpecError};
pub use model::{ApiModel, Method, MethodContract, Type, TypeKind};
pub use search::{search, SearchCriteria, SearchCriterion, SearchResult};
pub use spec::{IntermediateSpec, SpecItem};
