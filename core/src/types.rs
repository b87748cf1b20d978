//! Domain value objects shared across facades.
//!
//! # Design
//! Field names follow the vendor's camelCase JSON. Optional fields are
//! skipped when `None` so request bodies only carry what the caller set.
//! Response types ignore unknown fields; the vendor adds `errorText`, `url`
//! and similar keys that callers never see.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A customer record as embedded in invoices, estimates and payments
/// (the vendor calls it `client`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_com: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_tax_payer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_to_db: Option<bool>,
}

/// A document line. Discount lines set `is_discount` and the `discount_*`
/// fields instead of `code`, `quantity` and `price`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_measuring_unit: Option<String>,
    pub is_discount: bool,
    pub measuring_unit_name: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_tax_included: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_to_db: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_service: Option<bool>,
    /// How many preceding lines a discount applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_items: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<DiscountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
}

/// Vendor discount codes: `1` is a fixed value, `2` a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountType {
    Value,
    Percentage,
}

impl Serialize for DiscountType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            DiscountType::Value => 1,
            DiscountType::Percentage => 2,
        })
    }
}

impl<'de> Deserialize<'de> for DiscountType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(DiscountType::Value),
            2 => Ok(DiscountType::Percentage),
            other => Err(serde::de::Error::custom(format!("unknown discount type {other}"))),
        }
    }
}

/// Payment kinds accepted by the vendor, spelled as it expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    /// Receipt. Deleted through `delete_receipt`, never through `delete`.
    #[serde(rename = "Chitanta")]
    Receipt,
    #[serde(rename = "Bon")]
    FiscalReceipt,
    #[serde(rename = "Card")]
    Card,
    #[serde(rename = "CEC")]
    Cheque,
    #[serde(rename = "Bilet ordin")]
    PromissoryNote,
    #[serde(rename = "Ordin plata")]
    BankTransfer,
    #[serde(rename = "Mandat postal")]
    PostalOrder,
    #[serde(rename = "Alta incasare")]
    Other,
}

impl PaymentType {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentType::Receipt => "Chitanta",
            PaymentType::FiscalReceipt => "Bon",
            PaymentType::Card => "Card",
            PaymentType::Cheque => "CEC",
            PaymentType::PromissoryNote => "Bilet ordin",
            PaymentType::BankTransfer => "Ordin plata",
            PaymentType::PostalOrder => "Mandat postal",
            PaymentType::Other => "Alta incasare",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every `PaymentType` except `Receipt`. Receipts have their own deletion
/// endpoint, so the generic payment deletion only accepts these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonReceiptPaymentType {
    FiscalReceipt,
    Card,
    Cheque,
    PromissoryNote,
    BankTransfer,
    PostalOrder,
    Other,
}

impl NonReceiptPaymentType {
    pub fn as_str(self) -> &'static str {
        PaymentType::from(self).as_str()
    }
}

impl From<NonReceiptPaymentType> for PaymentType {
    fn from(kind: NonReceiptPaymentType) -> Self {
        match kind {
            NonReceiptPaymentType::FiscalReceipt => PaymentType::FiscalReceipt,
            NonReceiptPaymentType::Card => PaymentType::Card,
            NonReceiptPaymentType::Cheque => PaymentType::Cheque,
            NonReceiptPaymentType::PromissoryNote => PaymentType::PromissoryNote,
            NonReceiptPaymentType::BankTransfer => PaymentType::BankTransfer,
            NonReceiptPaymentType::PostalOrder => PaymentType::PostalOrder,
            NonReceiptPaymentType::Other => PaymentType::Other,
        }
    }
}

impl TryFrom<PaymentType> for NonReceiptPaymentType {
    type Error = PaymentType;

    fn try_from(kind: PaymentType) -> Result<Self, PaymentType> {
        match kind {
            PaymentType::Receipt => Err(kind),
            PaymentType::FiscalReceipt => Ok(NonReceiptPaymentType::FiscalReceipt),
            PaymentType::Card => Ok(NonReceiptPaymentType::Card),
            PaymentType::Cheque => Ok(NonReceiptPaymentType::Cheque),
            PaymentType::PromissoryNote => Ok(NonReceiptPaymentType::PromissoryNote),
            PaymentType::BankTransfer => Ok(NonReceiptPaymentType::BankTransfer),
            PaymentType::PostalOrder => Ok(NonReceiptPaymentType::PostalOrder),
            PaymentType::Other => Ok(NonReceiptPaymentType::Other),
        }
    }
}

impl fmt::Display for NonReceiptPaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment collected together with an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_series: Option<String>,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_cash: Option<bool>,
}

/// Series and number of an issued document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNumber {
    #[serde(default, deserialize_with = "nullable")]
    pub series: String,
    #[serde(default, deserialize_with = "nullable")]
    pub number: String,
}

/// The storno document issued by reversing an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReversedDocument {
    #[serde(default, deserialize_with = "nullable")]
    pub series: String,
    #[serde(default, deserialize_with = "nullable")]
    pub number: String,
    #[serde(default, deserialize_with = "nullable")]
    pub document_url: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub document_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub document_view_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    pub invoice_total_amount: f64,
    pub paid_amount: f64,
    pub unpaid_amount: f64,
    pub paid: bool,
}

/// Invoices issued from an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateInvoices {
    pub are_invoices_created: bool,
    #[serde(default)]
    pub invoices: Vec<DocumentNumber>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tax {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub percentage: f64,
}

/// Document families a series can number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesType {
    #[serde(rename = "f")]
    Invoice,
    #[serde(rename = "p")]
    Estimate,
    #[serde(rename = "c")]
    Receipt,
}

impl SeriesType {
    pub fn as_str(self) -> &'static str {
        match self {
            SeriesType::Invoice => "f",
            SeriesType::Estimate => "p",
            SeriesType::Receipt => "c",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub next_number: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub series_type: Option<SeriesType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockProduct {
    #[serde(default, deserialize_with = "nullable")]
    pub measuring_unit: String,
    #[serde(default, deserialize_with = "nullable")]
    pub product_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub product_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    #[serde(default, deserialize_with = "nullable")]
    pub warehouse_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub warehouse_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub products: Vec<StockProduct>,
}

/// Missing and `null` fields both decode to the type's default, so one
/// incomplete list element does not fail the whole response.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept identifiers the vendor sends either as strings or as numbers.
/// `null` decodes to an empty string.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) => text,
        Some(Raw::Int(n)) => n.to_string(),
        Some(Raw::Float(n)) => n.to_string(),
        None => String::new(),
    })
}
