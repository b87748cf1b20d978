//! The SmartBill client: one executor, six facades.
//!
//! # Design
//! `SmartBillClient` holds the executor behind an `Arc`, so clones are cheap
//! and can be moved across threads. Facades are borrowed views created on
//! demand; they carry no state of their own.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::executor::Executor;
use crate::http::{Transport, UreqTransport};
use crate::resources::{EstimateApi, InvoiceApi, PaymentApi, SeriesApi, StockApi, TaxApi};

/// Entry point for the SmartBill API.
#[derive(Debug, Clone)]
pub struct SmartBillClient {
    executor: Arc<Executor>,
}

impl SmartBillClient {
    /// Client using the blocking `ureq` transport.
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }

    pub fn with_transport(config: Config, transport: impl Transport + 'static) -> Self {
        Self::with_shared_transport(config, Arc::new(transport))
    }

    pub fn with_shared_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            executor: Arc::new(Executor::new(config, transport)),
        }
    }

    /// A client sharing this one's transport whose calls time out after
    /// `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let config = self.executor.config().clone().with_timeout(timeout);
        Self::with_shared_transport(config, self.executor.transport())
    }

    pub fn config(&self) -> &Config {
        self.executor.config()
    }

    /// The underlying executor, for endpoints the facades do not cover.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn invoice(&self) -> InvoiceApi<'_> {
        InvoiceApi::new(&self.executor)
    }

    pub fn estimate(&self) -> EstimateApi<'_> {
        EstimateApi::new(&self.executor)
    }

    pub fn payment(&self) -> PaymentApi<'_> {
        PaymentApi::new(&self.executor)
    }

    pub fn tax(&self) -> TaxApi<'_> {
        TaxApi::new(&self.executor)
    }

    pub fn series(&self) -> SeriesApi<'_> {
        SeriesApi::new(&self.executor)
    }

    pub fn stock(&self) -> StockApi<'_> {
        StockApi::new(&self.executor)
    }
}
