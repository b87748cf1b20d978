//! Typed client for the SmartBill invoicing API.
//!
//! # Overview
//! Every operation is one authenticated HTTP round-trip. Facades
//! (`invoice()`, `estimate()`, `payment()`, `tax()`, `series()`, `stock()`)
//! build the path, query and body, then hand off to a shared `Executor`
//! that injects Basic auth, sends the request through a `Transport`, and
//! decodes the body according to a `RequestKind`.
//!
//! # Design
//! - Operations never return `Err`: transport failures, vendor errors and
//!   malformed bodies all become `ApiResponse::Failure { message }`.
//! - The transport is a trait so tests can replace the network; the default
//!   is a blocking `ureq` agent.
//! - The library only emits `tracing` events; installing a subscriber is the
//!   caller's business.
//!
//! ```no_run
//! use smartbill_core::{Config, DocumentKey, SmartBillClient};
//!
//! let client = SmartBillClient::new(Config::new("user@example.com", "api-token"));
//! let status = client
//!     .invoice()
//!     .get_payment_status(&DocumentKey::new("RO12345678", "FCT", "0203"));
//! match status.into_result() {
//!     Ok(status) => println!("unpaid: {}", status.unpaid_amount),
//!     Err(message) => eprintln!("lookup failed: {message}"),
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod normalize;
pub mod resources;
pub mod response;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::SmartBillClient;
pub use config::{Config, DEFAULT_BASE_URL};
pub use error::{ApiError, ConfigError, SmartBillError};
pub use executor::{Executor, RequestOptions};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use normalize::{normalize, Decoded, Payload, RequestKind};
pub use resources::{
    CreateEstimate, CreateInvoice, CreateInvoiceFromEstimate, CreatePayment, DeletePayment,
    DocumentKey, EmailDocumentType, EstimateApi, EstimateReference, InvoiceApi, InvoiceReference,
    PaymentApi, ReceiptQuery, ReverseInvoice, SendToEmail, SeriesApi, SeriesQuery, StockApi,
    StockQuery, TaxApi,
};
pub use response::ApiResponse;
pub use types::{
    Customer, DiscountType, DocumentNumber, EstimateInvoices, NonReceiptPaymentType, Payment,
    PaymentStatus, PaymentType, Product, ReversedDocument, Series, SeriesType, StockProduct, Tax,
    Warehouse,
};
