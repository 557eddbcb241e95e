//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use irmetrics_core::prelude::*;
//! ```

// Core types
pub use crate::error::{IrMetricsError, IrMetricsResult};
pub use crate::ir::{IrClass, IrEngine, IrMethod};

// Builder API
pub use crate::builder::{IrMetrics, Provider};

// Results
pub use crate::artifact::GenerationReport;
pub use crate::invoke::InvokeSite;
pub use crate::metrics::ClassRecord;
pub use crate::usage::UsageIndex;

// Configuration
pub use crate::config::{load_config, IrMetricsConfig};
