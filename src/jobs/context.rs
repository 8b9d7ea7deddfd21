//! Collaborators used after a scan completes

use std::path::PathBuf;
use std::sync::Arc;

use crate::bookkeeping::PaperLedger;
use crate::metrics::Metrics;
use crate::services::execution::ExecutionGateway;
use crate::services::notifier::Notifier;
use crate::services::persistence::PersistenceStore;
use crate::services::report::ReportExporter;

/// Everything `handle_scan_result` may hand signals to.
///
/// Only the notifier is required; each optional collaborator switches its
/// step on when present.
pub struct CycleContext {
    pub notifier: Arc<dyn Notifier>,
    pub store: Option<Arc<dyn PersistenceStore>>,
    pub ledger: Option<PaperLedger>,
    pub gateway: Option<Arc<dyn ExecutionGateway>>,
    pub exporters: Vec<Box<dyn ReportExporter>>,
    pub report_dir: Option<PathBuf>,
    pub metrics: Option<Arc<Metrics>>,
}

impl CycleContext {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            store: None,
            ledger: None,
            gateway: None,
            exporters: Vec::new(),
            report_dir: None,
            metrics: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn PersistenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_ledger(mut self, ledger: PaperLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn ExecutionGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_exporter(mut self, exporter: Box<dyn ReportExporter>) -> Self {
        self.exporters.push(exporter);
        self
    }

    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(dir.into());
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}
