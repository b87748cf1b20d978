use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Serialize, Serializer};

use super::DocumentKey;
use crate::executor::{Executor, RequestOptions};
use crate::http::HttpMethod;
use crate::normalize::RequestKind;
use crate::response::ApiResponse;
use crate::types::{Customer, DocumentNumber, Payment, PaymentStatus, Product, ReversedDocument};

/// Body of `POST /invoice`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoice {
    pub company_vat_code: String,
    pub client: Customer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_draft: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_cnp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate_identity_card: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate_auto: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_stock: Option<bool>,
    pub products: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateReference {
    pub series_name: String,
    pub number: String,
}

/// Body of `POST /invoice` when the invoice copies an existing estimate.
/// Always sent with `useEstimateDetails: true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceFromEstimate {
    pub company_vat_code: String,
    pub is_draft: bool,
    pub series_name: String,
    #[serde(rename = "useEstimateDetails", serialize_with = "always_true")]
    use_estimate_details: (),
    pub estimate: EstimateReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

impl CreateInvoiceFromEstimate {
    pub fn new(
        company_vat_code: impl Into<String>,
        series_name: impl Into<String>,
        estimate: EstimateReference,
    ) -> Self {
        Self {
            company_vat_code: company_vat_code.into(),
            is_draft: false,
            series_name: series_name.into(),
            use_estimate_details: (),
            estimate,
            issue_date: None,
            currency: None,
            language: None,
            precision: None,
            due_date: None,
            mentions: None,
            observations: None,
        }
    }
}

fn always_true<S: Serializer>(_: &(), serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bool(true)
}

/// Body of `POST /invoice/reverse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseInvoice {
    pub company_vat_code: String,
    pub series_name: String,
    pub number: String,
    pub issue_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmailDocumentType {
    #[serde(rename = "factura")]
    Invoice,
    #[serde(rename = "proforma")]
    Estimate,
}

/// Parameters of `POST /document/send`.
///
/// `subject` and `body_text` are plain text; they are base64-encoded on the
/// way out. Unset fields fall back to the account's defaults on the vendor
/// side (template subject and body, the customer's address).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendToEmail {
    pub company_vat_code: String,
    pub series_name: String,
    pub number: String,
    pub document_type: EmailDocumentType,
    pub subject: Option<String>,
    pub to: Option<String>,
    pub cc: Option<String>,
    pub bcc: Option<String>,
    pub body_text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendToEmailBody<'a> {
    company_vat_code: &'a str,
    series_name: &'a str,
    number: &'a str,
    #[serde(rename = "type")]
    document_type: EmailDocumentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body_text: Option<String>,
}

impl<'a> From<&'a SendToEmail> for SendToEmailBody<'a> {
    fn from(params: &'a SendToEmail) -> Self {
        Self {
            company_vat_code: &params.company_vat_code,
            series_name: &params.series_name,
            number: &params.number,
            document_type: params.document_type,
            subject: present(&params.subject).map(|text| BASE64.encode(text)),
            to: present(&params.to),
            cc: present(&params.cc),
            bcc: present(&params.bcc),
            body_text: present(&params.body_text).map(|text| BASE64.encode(text)),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

/// Invoice operations.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceApi<'a> {
    executor: &'a Executor,
}

impl<'a> InvoiceApi<'a> {
    pub(crate) fn new(executor: &'a Executor) -> Self {
        Self { executor }
    }

    pub fn create(&self, params: &CreateInvoice) -> ApiResponse<DocumentNumber> {
        self.executor
            .call_json("/invoice", RequestKind::DocumentCreate, HttpMethod::Post, params)
    }

    pub fn create_from_estimate(&self, params: &CreateInvoiceFromEstimate) -> ApiResponse<DocumentNumber> {
        self.executor
            .call_json("/invoice", RequestKind::DocumentCreate, HttpMethod::Post, params)
    }

    /// Download the invoice PDF as raw bytes.
    pub fn get_pdf(&self, key: &DocumentKey) -> ApiResponse<Vec<u8>> {
        let options = RequestOptions::default().header("Accept", "application/octet-stream");
        self.executor.call(
            &format!("/invoice/pdf?{}", key.query()),
            RequestKind::BinaryDownload,
            options,
        )
    }

    pub fn get_payment_status(&self, key: &DocumentKey) -> ApiResponse<PaymentStatus> {
        self.executor.call(
            &format!("/invoice/paymentstatus?{}", key.query()),
            RequestKind::PaymentStatus,
            RequestOptions::default(),
        )
    }

    pub fn delete(&self, key: &DocumentKey) -> ApiResponse<()> {
        self.executor.call(
            &format!("/invoice?{}", key.query()),
            RequestKind::Void,
            RequestOptions::new(HttpMethod::Delete),
        )
    }

    /// Issue a storno invoice for an existing one.
    pub fn reverse(&self, params: &ReverseInvoice) -> ApiResponse<ReversedDocument> {
        self.executor.call_json(
            "/invoice/reverse",
            RequestKind::DocumentReverse,
            HttpMethod::Post,
            params,
        )
    }

    pub fn cancel(&self, key: &DocumentKey) -> ApiResponse<()> {
        self.executor.call(
            &format!("/invoice/cancel?{}", key.query()),
            RequestKind::Void,
            RequestOptions::new(HttpMethod::Put),
        )
    }

    pub fn restore(&self, key: &DocumentKey) -> ApiResponse<()> {
        self.executor.call(
            &format!("/invoice/restore?{}", key.query()),
            RequestKind::Void,
            RequestOptions::new(HttpMethod::Put),
        )
    }

    /// Email an invoice or estimate through the vendor's mailer.
    pub fn send_to_email(&self, params: &SendToEmail) -> ApiResponse<()> {
        self.executor.call_json(
            "/document/send",
            RequestKind::Void,
            HttpMethod::Post,
            &SendToEmailBody::from(params),
        )
    }
}
