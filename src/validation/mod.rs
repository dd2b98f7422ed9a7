//! Multi-pass flow validation.
//!
//! Passes run in order — structural, reference resolution, dependency
//! graph, provider availability (when settings are supplied), semantic —
//! and their findings are aggregated into one [`ValidationReport`]. The
//! graph pass also emits the topological execution order consumed by the
//! flow executor. Validation is a pure function of its inputs: validating
//! the same flow twice yields identical reports.

mod graph;
mod providers;
mod references;
mod semantic;
mod structure;
mod types;

use crate::config::ProviderSettings;
use crate::flow::FlowSchema;

pub use types::{ErrorCode, ValidationError, ValidationReport, ValidationWarning};

pub fn validate_flow(
    schema: &FlowSchema,
    provider_settings: Option<&ProviderSettings>,
) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    structure::validate(schema, &mut errors, &mut warnings);
    references::validate(schema, &mut errors);
    let execution_order = graph::validate(schema, &mut errors);

    if let Some(settings) = provider_settings {
        if !settings.is_empty() {
            providers::validate(schema, settings, &mut errors);
        }
    }

    semantic::validate(schema, &mut warnings);

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        execution_order,
    }
}
