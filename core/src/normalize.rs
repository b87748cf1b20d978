//! Request-kind dispatch: turns a raw 2xx body into a typed payload.
//!
//! # Design
//! The set of response shapes is closed, so `RequestKind` is a plain enum
//! matched in one place (`normalize`). Each kind produces one `Payload`
//! variant; facades recover their concrete type with `TryFrom<Payload>`.
//! Unknown fields in vendor bodies are dropped by the typed decode.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;
use crate::types::{
    DocumentNumber, EstimateInvoices, PaymentStatus, ReversedDocument, Series, Tax, Warehouse,
};

/// Selects how a successful response body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    DocumentCreate,
    DocumentReverse,
    BinaryDownload,
    TaxList,
    SeriesList,
    StockList,
    PaymentStatus,
    EstimateInvoices,
    Void,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::DocumentCreate => "document-create",
            RequestKind::DocumentReverse => "document-reverse",
            RequestKind::BinaryDownload => "binary-download",
            RequestKind::TaxList => "tax-list",
            RequestKind::SeriesList => "series-list",
            RequestKind::StockList => "stock-list",
            RequestKind::PaymentStatus => "payment-status",
            RequestKind::EstimateInvoices => "estimate-invoices",
            RequestKind::Void => "void",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded success payload, one variant per `RequestKind`.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Document(DocumentNumber),
    ReversedDocument(ReversedDocument),
    Binary(Vec<u8>),
    Taxes(Vec<Tax>),
    Series(Vec<Series>),
    Warehouses(Vec<Warehouse>),
    PaymentStatus(PaymentStatus),
    EstimateInvoices(EstimateInvoices),
    Empty,
}

impl Payload {
    pub fn variant_name(&self) -> &'static str {
        match self {
            Payload::Document(_) => "document",
            Payload::ReversedDocument(_) => "reversed document",
            Payload::Binary(_) => "binary",
            Payload::Taxes(_) => "taxes",
            Payload::Series(_) => "series",
            Payload::Warehouses(_) => "warehouses",
            Payload::PaymentStatus(_) => "payment status",
            Payload::EstimateInvoices(_) => "estimate invoices",
            Payload::Empty => "empty",
        }
    }
}

macro_rules! payload_conversions {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl TryFrom<Payload> for $ty {
                type Error = Payload;

                fn try_from(payload: Payload) -> Result<Self, Payload> {
                    match payload {
                        Payload::$variant(value) => Ok(value),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

payload_conversions! {
    Document => DocumentNumber,
    ReversedDocument => ReversedDocument,
    Binary => Vec<u8>,
    Taxes => Vec<Tax>,
    Series => Vec<Series>,
    Warehouses => Vec<Warehouse>,
    PaymentStatus => PaymentStatus,
    EstimateInvoices => EstimateInvoices,
}

impl TryFrom<Payload> for () {
    type Error = Payload;

    fn try_from(payload: Payload) -> Result<Self, Payload> {
        match payload {
            Payload::Empty => Ok(()),
            other => Err(other),
        }
    }
}

/// A normalized body: the payload plus any message passed through.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub payload: Payload,
    pub message: Option<String>,
}

impl Decoded {
    fn payload(payload: Payload) -> Self {
        Self {
            payload,
            message: None,
        }
    }
}

#[derive(Deserialize)]
struct TaxEnvelope {
    taxes: Vec<Tax>,
}

#[derive(Deserialize)]
struct ListEnvelope<T> {
    list: Vec<T>,
}

#[derive(Deserialize)]
struct MessageEnvelope {
    #[serde(default)]
    message: Option<String>,
}

/// Vendor error body sent with non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VendorError {
    #[serde(default)]
    error_text: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl VendorError {
    /// `errorText`, else `message`; empty strings count as absent.
    pub(crate) fn into_message(self) -> Option<String> {
        self.error_text
            .filter(|text| !text.is_empty())
            .or(self.message.filter(|text| !text.is_empty()))
    }
}

fn json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(body)?)
}

/// Decode a 2xx body according to `kind`.
pub fn normalize(kind: RequestKind, body: &[u8]) -> Result<Decoded, ApiError> {
    let decoded = match kind {
        RequestKind::DocumentCreate => Decoded::payload(Payload::Document(json(body)?)),
        RequestKind::DocumentReverse => Decoded::payload(Payload::ReversedDocument(json(body)?)),
        RequestKind::BinaryDownload => Decoded::payload(Payload::Binary(body.to_vec())),
        RequestKind::TaxList => {
            let envelope: TaxEnvelope = json(body)?;
            Decoded::payload(Payload::Taxes(envelope.taxes))
        }
        RequestKind::SeriesList => {
            let envelope: ListEnvelope<Series> = json(body)?;
            Decoded::payload(Payload::Series(envelope.list))
        }
        RequestKind::StockList => {
            let envelope: ListEnvelope<Warehouse> = json(body)?;
            Decoded::payload(Payload::Warehouses(envelope.list))
        }
        RequestKind::PaymentStatus => Decoded::payload(Payload::PaymentStatus(json(body)?)),
        RequestKind::EstimateInvoices => Decoded::payload(Payload::EstimateInvoices(json(body)?)),
        RequestKind::Void => {
            // Some vendor endpoints answer 2xx with no body at all.
            let message = if body.iter().all(u8::is_ascii_whitespace) {
                None
            } else {
                json::<MessageEnvelope>(body)?.message
            };
            Decoded {
                payload: Payload::Empty,
                message,
            }
        }
    };
    Ok(decoded)
}
