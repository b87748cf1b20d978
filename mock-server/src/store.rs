//! In-memory bookkeeping behind the mock endpoints.
//!
//! Every operation is synchronous and returns `Rejection` with the status
//! and `errorText` the vendor would send. Handlers hold the lock only for
//! the duration of one call.

use std::collections::HashMap;

use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

/// A vendor-style refusal: HTTP status plus `errorText`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: StatusCode,
    pub error_text: String,
}

impl Rejection {
    pub fn bad_request(text: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error_text: text.into(),
        }
    }

    pub fn not_found(text: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error_text: text.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, Rejection>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Invoice,
    Estimate,
}

impl Family {
    fn label(self) -> &'static str {
        match self {
            Family::Invoice => "Factura",
            Family::Estimate => "Proforma",
        }
    }

    fn default_series(self) -> &'static str {
        match self {
            Family::Invoice => "FCT",
            Family::Estimate => "PF",
        }
    }
}

/// `(cif, series, number)`
pub type DocKey = (String, String, String);

pub fn doc_key(cif: &str, series: &str, number: &str) -> DocKey {
    (cif.to_string(), series.to_string(), number.to_string())
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub client_name: String,
    pub client_cif: String,
    pub total: f64,
    pub paid: f64,
    pub canceled: bool,
    /// Invoices issued from this document (estimates only).
    pub invoices: Vec<(String, String)>,
}

/// A document reference as the vendor returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issued {
    pub series: String,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    pub invoice_total_amount: f64,
    pub paid_amount: f64,
    pub unpaid_amount: f64,
    pub paid: bool,
}

#[derive(Debug, Clone)]
pub struct Receipt {
    pub id: String,
    pub series: String,
    pub number: String,
    pub client_name: String,
    pub value: f64,
    pub invoices: Vec<DocKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPayment {
    pub cif: String,
    pub payment_type: String,
    pub value: f64,
    pub date: String,
    pub client_name: String,
    pub client_cif: String,
    pub invoices: Vec<DocKey>,
}

/// One email accepted by `/document/send`, with subject and body decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub document: DocKey,
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body_text: Option<String>,
}

/// Input for a new invoice or estimate.
#[derive(Debug, Clone, Default)]
pub struct NewDocument {
    pub cif: String,
    pub series: Option<String>,
    pub client_name: String,
    pub client_cif: String,
    pub total: f64,
    pub line_count: usize,
    pub payment: Option<f64>,
}

/// Input for `POST /payment`.
#[derive(Debug, Clone, Default)]
pub struct NewPayment {
    pub cif: String,
    pub payment_type: String,
    pub value: f64,
    pub date: String,
    pub client_name: String,
    pub client_cif: String,
    pub invoices: Vec<(String, String)>,
}

/// What `/payment` issued: receipts get a series, number and id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Receipt { id: String, issued: Issued },
    Recorded,
}

/// Selector for `DELETE /payment/v2`.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentSelector {
    ByInvoice { series: String, number: String },
    ByDetails { date: String, value: f64, client_name: String, client_cif: String },
}

pub const RECEIPT_SERIES: &str = "CH";

#[derive(Debug, Default)]
pub struct Store {
    invoices: HashMap<DocKey, Document>,
    estimates: HashMap<DocKey, Document>,
    receipts: HashMap<DocKey, Receipt>,
    payments: Vec<RecordedPayment>,
    counters: HashMap<(String, String), u32>,
    sent_emails: Vec<SentEmail>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Store {
    fn documents(&self, family: Family) -> &HashMap<DocKey, Document> {
        match family {
            Family::Invoice => &self.invoices,
            Family::Estimate => &self.estimates,
        }
    }

    fn documents_mut(&mut self, family: Family) -> &mut HashMap<DocKey, Document> {
        match family {
            Family::Invoice => &mut self.invoices,
            Family::Estimate => &mut self.estimates,
        }
    }

    fn next_number(&mut self, cif: &str, series: &str) -> String {
        let counter = self
            .counters
            .entry((cif.to_string(), series.to_string()))
            .or_insert(0);
        *counter += 1;
        format!("{:04}", *counter)
    }

    /// The number the next document in `series` will receive.
    pub fn peek_number(&self, cif: &str, series: &str) -> String {
        let current = self
            .counters
            .get(&(cif.to_string(), series.to_string()))
            .copied()
            .unwrap_or(0);
        format!("{:04}", current + 1)
    }

    pub fn document(&self, family: Family, key: &DocKey) -> StoreResult<&Document> {
        self.documents(family)
            .get(key)
            .ok_or_else(|| Rejection::not_found(format!("{} {}{} nu exista.", family.label(), key.1, key.2)))
    }

    fn document_mut(&mut self, family: Family, key: &DocKey) -> StoreResult<&mut Document> {
        self.documents_mut(family)
            .get_mut(key)
            .ok_or_else(|| Rejection::not_found(format!("{} {}{} nu exista.", family.label(), key.1, key.2)))
    }

    pub fn create(&mut self, family: Family, input: NewDocument) -> StoreResult<Issued> {
        if input.cif.is_empty() {
            return Err(Rejection::bad_request("Campul companyVatCode este obligatoriu."));
        }
        if input.line_count == 0 {
            return Err(Rejection::bad_request("Documentul trebuie sa contina cel putin un produs."));
        }
        let series = input
            .series
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| family.default_series().to_string());
        let number = self.next_number(&input.cif, &series);
        let total = round2(input.total);
        let paid = input.payment.map(|p| round2(p.min(total))).unwrap_or(0.0);
        self.documents_mut(family).insert(
            doc_key(&input.cif, &series, &number),
            Document {
                id: Uuid::new_v4(),
                client_name: input.client_name,
                client_cif: input.client_cif,
                total,
                paid,
                canceled: false,
                invoices: Vec::new(),
            },
        );
        Ok(Issued { series, number })
    }

    /// Issue an invoice that copies an estimate's client and total.
    pub fn create_from_estimate(
        &mut self,
        cif: &str,
        series: Option<String>,
        estimate: &DocKey,
    ) -> StoreResult<Issued> {
        let source = self.document(Family::Estimate, estimate)?;
        if source.canceled {
            return Err(Rejection::bad_request("Proforma este anulata."));
        }
        let input = NewDocument {
            cif: cif.to_string(),
            series,
            client_name: source.client_name.clone(),
            client_cif: source.client_cif.clone(),
            total: source.total,
            line_count: 1,
            payment: None,
        };
        let issued = self.create(Family::Invoice, input)?;
        self.document_mut(Family::Estimate, estimate)?
            .invoices
            .push((issued.series.clone(), issued.number.clone()));
        Ok(issued)
    }

    pub fn delete(&mut self, family: Family, key: &DocKey) -> StoreResult<()> {
        self.document(family, key)?;
        self.documents_mut(family).remove(key);
        Ok(())
    }

    pub fn set_canceled(&mut self, family: Family, key: &DocKey, canceled: bool) -> StoreResult<()> {
        let label = family.label();
        let document = self.document_mut(family, key)?;
        match (document.canceled, canceled) {
            (true, true) => Err(Rejection::bad_request(format!("{label} este deja anulata."))),
            (false, false) => Err(Rejection::bad_request(format!("{label} nu este anulata."))),
            _ => {
                document.canceled = canceled;
                Ok(())
            }
        }
    }

    pub fn payment_status(&self, key: &DocKey) -> StoreResult<PaymentStatus> {
        let invoice = self.document(Family::Invoice, key)?;
        let unpaid = round2(invoice.total - invoice.paid);
        Ok(PaymentStatus {
            invoice_total_amount: invoice.total,
            paid_amount: invoice.paid,
            unpaid_amount: unpaid,
            paid: unpaid <= 0.0,
        })
    }

    /// Issue a storno invoice; returns it with the storno's id.
    pub fn reverse(&mut self, key: &DocKey) -> StoreResult<(Issued, Uuid)> {
        let source = self.document(Family::Invoice, key)?.clone();
        if source.canceled {
            return Err(Rejection::bad_request("Factura anulata nu poate fi stornata."));
        }
        let number = self.next_number(&key.0, &key.1);
        let id = Uuid::new_v4();
        self.invoices.insert(
            doc_key(&key.0, &key.1, &number),
            Document {
                id,
                total: -source.total,
                paid: 0.0,
                canceled: false,
                invoices: Vec::new(),
                ..source
            },
        );
        Ok((
            Issued {
                series: key.1.clone(),
                number,
            },
            id,
        ))
    }

    pub fn linked_invoices(&self, estimate: &DocKey) -> StoreResult<Vec<Issued>> {
        Ok(self
            .document(Family::Estimate, estimate)?
            .invoices
            .iter()
            .map(|(series, number)| Issued {
                series: series.clone(),
                number: number.clone(),
            })
            .collect())
    }

    fn apply_to_invoices(&mut self, invoices: &[DocKey], mut value: f64) {
        for key in invoices {
            if let Some(invoice) = self.invoices.get_mut(key) {
                let applied = value.min(round2(invoice.total - invoice.paid)).max(0.0);
                invoice.paid = round2(invoice.paid + applied);
                value -= applied;
            }
        }
    }

    fn revert_on_invoices(&mut self, invoices: &[DocKey], mut value: f64) {
        for key in invoices {
            if let Some(invoice) = self.invoices.get_mut(key) {
                let reverted = value.min(invoice.paid);
                invoice.paid = round2(invoice.paid - reverted);
                value -= reverted;
            }
        }
    }

    pub fn record_payment(&mut self, input: NewPayment) -> StoreResult<PaymentOutcome> {
        if input.value <= 0.0 {
            return Err(Rejection::bad_request("Valoarea incasarii trebuie sa fie pozitiva."));
        }
        let invoices: Vec<DocKey> = input
            .invoices
            .iter()
            .map(|(series, number)| doc_key(&input.cif, series, number))
            .collect();
        for key in &invoices {
            self.document(Family::Invoice, key)?;
        }
        self.apply_to_invoices(&invoices, input.value);

        if input.payment_type == "Chitanta" {
            let number = self.next_number(&input.cif, RECEIPT_SERIES);
            let id = Uuid::new_v4().simple().to_string();
            self.receipts.insert(
                doc_key(&input.cif, RECEIPT_SERIES, &number),
                Receipt {
                    id: id.clone(),
                    series: RECEIPT_SERIES.to_string(),
                    number: number.clone(),
                    client_name: input.client_name,
                    value: round2(input.value),
                    invoices,
                },
            );
            return Ok(PaymentOutcome::Receipt {
                id,
                issued: Issued {
                    series: RECEIPT_SERIES.to_string(),
                    number,
                },
            });
        }

        self.payments.push(RecordedPayment {
            cif: input.cif,
            payment_type: input.payment_type,
            value: round2(input.value),
            date: input.date,
            client_name: input.client_name,
            client_cif: input.client_cif,
            invoices,
        });
        Ok(PaymentOutcome::Recorded)
    }

    pub fn receipt_text(&self, cif: &str, id: &str) -> StoreResult<String> {
        self.receipts
            .iter()
            .find(|(key, receipt)| key.0 == cif && receipt.id == id)
            .map(|(_, receipt)| {
                format!(
                    "Chitanta {}{}: am primit de la {} suma de {:.2} RON",
                    receipt.series, receipt.number, receipt.client_name, receipt.value
                )
            })
            .ok_or_else(|| Rejection::not_found("Chitanta nu exista."))
    }

    pub fn delete_receipt(&mut self, key: &DocKey) -> StoreResult<()> {
        let receipt = self
            .receipts
            .remove(key)
            .ok_or_else(|| Rejection::not_found(format!("Chitanta {}{} nu exista.", key.1, key.2)))?;
        self.revert_on_invoices(&receipt.invoices, receipt.value);
        Ok(())
    }

    /// Remove every non-receipt payment matching the selector; returns how many.
    pub fn delete_payments(
        &mut self,
        cif: &str,
        payment_type: &str,
        selector: &PaymentSelector,
    ) -> StoreResult<usize> {
        let matches = |payment: &RecordedPayment| {
            payment.cif == cif
                && payment.payment_type == payment_type
                && match selector {
                    PaymentSelector::ByInvoice { series, number } => payment
                        .invoices
                        .iter()
                        .any(|key| &key.1 == series && &key.2 == number),
                    PaymentSelector::ByDetails {
                        date,
                        value,
                        client_name,
                        client_cif,
                    } => {
                        &payment.date == date
                            && (payment.value - value).abs() < 0.005
                            && &payment.client_name == client_name
                            && &payment.client_cif == client_cif
                    }
                }
        };

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.payments)
            .into_iter()
            .partition(|payment| matches(payment));
        self.payments = kept;
        if removed.is_empty() {
            return Err(Rejection::not_found("Nu a fost gasita nicio incasare."));
        }
        for payment in &removed {
            self.revert_on_invoices(&payment.invoices, payment.value);
        }
        Ok(removed.len())
    }

    pub fn record_email(&mut self, family: Family, email: SentEmail) -> StoreResult<()> {
        self.document(family, &email.document)?;
        self.sent_emails.push(email);
        Ok(())
    }

    pub fn sent_emails(&self) -> &[SentEmail] {
        &self.sent_emails
    }
}
