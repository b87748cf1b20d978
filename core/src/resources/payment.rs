use serde::Serialize;

use super::{encode_query, DocumentKey};
use crate::executor::{Executor, RequestOptions};
use crate::http::HttpMethod;
use crate::normalize::RequestKind;
use crate::response::ApiResponse;
use crate::types::{Customer, NonReceiptPaymentType, PaymentType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceReference {
    pub series_name: String,
    pub number: String,
}

/// Body of `POST /payment`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayment {
    pub company_vat_code: String,
    pub client: Customer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    pub value: f64,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_cash: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_draft: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_invoice_details: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invoices_list: Vec<InvoiceReference>,
}

impl CreatePayment {
    pub fn new(
        company_vat_code: impl Into<String>,
        client: Customer,
        value: f64,
        payment_type: PaymentType,
    ) -> Self {
        Self {
            company_vat_code: company_vat_code.into(),
            client,
            issue_date: None,
            currency: None,
            language: None,
            exchange_rate: None,
            precision: None,
            value,
            payment_type,
            is_cash: None,
            text: None,
            translated_text: None,
            is_draft: None,
            observation: None,
            use_invoice_details: None,
            invoices_list: Vec::new(),
        }
    }
}

/// Query of `GET /payment/text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptQuery {
    pub cif: String,
    pub id: String,
}

/// Selects a non-receipt payment for `DELETE /payment/v2`.
///
/// The payment type cannot be a receipt; receipts are deleted with
/// [`PaymentApi::delete_receipt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletePayment {
    /// The payment attached to a specific invoice.
    ByInvoice {
        company_vat_code: String,
        payment_type: NonReceiptPaymentType,
        invoice_series: String,
        invoice_number: String,
    },
    /// A payment matched by its own details.
    ByDetails {
        company_vat_code: String,
        payment_type: NonReceiptPaymentType,
        payment_date: String,
        payment_value: String,
        client_name: String,
        client_cif: String,
    },
}

impl DeletePayment {
    fn query(&self) -> String {
        match self {
            DeletePayment::ByInvoice {
                company_vat_code,
                payment_type,
                invoice_series,
                invoice_number,
            } => encode_query([
                ("companyVatCode", company_vat_code.as_str()),
                ("paymentType", payment_type.as_str()),
                ("invoiceSeries", invoice_series.as_str()),
                ("invoiceNumber", invoice_number.as_str()),
            ]),
            DeletePayment::ByDetails {
                company_vat_code,
                payment_type,
                payment_date,
                payment_value,
                client_name,
                client_cif,
            } => encode_query([
                ("companyVatCode", company_vat_code.as_str()),
                ("paymentType", payment_type.as_str()),
                ("paymentDate", payment_date.as_str()),
                ("paymentValue", payment_value.as_str()),
                ("clientName", client_name.as_str()),
                ("clientCif", client_cif.as_str()),
            ]),
        }
    }
}

/// Payment operations.
#[derive(Debug, Clone, Copy)]
pub struct PaymentApi<'a> {
    executor: &'a Executor,
}

impl<'a> PaymentApi<'a> {
    pub(crate) fn new(executor: &'a Executor) -> Self {
        Self { executor }
    }

    pub fn create(&self, params: &CreatePayment) -> ApiResponse<()> {
        self.executor
            .call_json("/payment", RequestKind::Void, HttpMethod::Post, params)
    }

    /// Fetch a receipt's text. The vendor returns it base64-encoded in the
    /// envelope message.
    pub fn get_receipt(&self, query: &ReceiptQuery) -> ApiResponse<()> {
        let query = encode_query([("cif", query.cif.as_str()), ("id", query.id.as_str())]);
        self.executor.call(
            &format!("/payment/text?{query}"),
            RequestKind::Void,
            RequestOptions::default(),
        )
    }

    pub fn delete_receipt(&self, key: &DocumentKey) -> ApiResponse<()> {
        self.executor.call(
            &format!("/payment/chitanta?{}", key.query()),
            RequestKind::Void,
            RequestOptions::new(HttpMethod::Delete),
        )
    }

    pub fn delete(&self, params: &DeletePayment) -> ApiResponse<()> {
        self.executor.call(
            &format!("/payment/v2?{}", params.query()),
            RequestKind::Void,
            RequestOptions::new(HttpMethod::Delete),
        )
    }
}
