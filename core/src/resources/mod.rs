//! Resource facades: one per vendor resource, each borrowing the shared
//! `Executor`.
//!
//! Facades only assemble paths, query strings and bodies. Every error path
//! belongs to the executor.

mod estimate;
mod invoice;
mod payment;
mod series;
mod stock;
mod tax;

pub use estimate::{CreateEstimate, EstimateApi};
pub use invoice::{
    CreateInvoice, CreateInvoiceFromEstimate, EmailDocumentType, EstimateReference, InvoiceApi,
    ReverseInvoice, SendToEmail,
};
pub use payment::{CreatePayment, DeletePayment, InvoiceReference, PaymentApi, ReceiptQuery};
pub use series::{SeriesApi, SeriesQuery};
pub use stock::{StockApi, StockQuery};
pub use tax::TaxApi;

use url::form_urlencoded;

/// Identifies one issued document: company VAT code, series, number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub company_vat_code: String,
    pub series_name: String,
    pub number: String,
}

impl DocumentKey {
    pub fn new(
        company_vat_code: impl Into<String>,
        series_name: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            company_vat_code: company_vat_code.into(),
            series_name: series_name.into(),
            number: number.into(),
        }
    }

    /// `cif=..&seriesname=..&number=..`
    pub(crate) fn query(&self) -> String {
        encode_query([
            ("cif", self.company_vat_code.as_str()),
            ("seriesname", self.series_name.as_str()),
            ("number", self.number.as_str()),
        ])
    }
}

/// Form-encode `pairs` in order (spaces become `+`).
pub(crate) fn encode_query<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
