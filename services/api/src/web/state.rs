//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use smartdoc_core::ports::{DatabaseService, TextExtractor};
use smartdoc_core::workflow::SummaryWorkflow;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub extractor: Arc<dyn TextExtractor>,
    pub workflow: Arc<SummaryWorkflow>,
}

impl AppState {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        extractor: Arc<dyn TextExtractor>,
        workflow: Arc<SummaryWorkflow>,
    ) -> Self {
        Self {
            db,
            extractor,
            workflow,
        }
    }
}
