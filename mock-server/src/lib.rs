//! In-memory stand-in for the SmartBill REST API.
//!
//! Serves the endpoints the client uses, behind Basic auth, with the vendor's
//! `{errorText, message}` error bodies. State lives in a `Store` behind a
//! `RwLock`; nothing is persisted.

pub mod store;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

use store::{
    doc_key, DocKey, Family, NewDocument, NewPayment, PaymentOutcome, PaymentSelector, Rejection,
    SentEmail, Store,
};

pub const DEFAULT_USERNAME: &str = "demo";
pub const DEFAULT_TOKEN: &str = "secret";

/// Shared state: the store plus the expected `Authorization` header.
#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    authorization: Arc<str>,
}

impl AppState {
    pub fn new(username: &str, token: &str) -> Self {
        let authorization = format!("Basic {}", BASE64.encode(format!("{username}:{token}")));
        Self {
            store: Arc::new(RwLock::new(Store::default())),
            authorization: authorization.into(),
        }
    }

    /// Emails accepted so far, with subject and body already decoded.
    pub async fn sent_emails(&self) -> Vec<SentEmail> {
        self.store.read().await.sent_emails().to_vec()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_TOKEN)
    }
}

/// Router with default credentials (`demo` / `secret`).
pub fn app() -> Router {
    router(AppState::default())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/invoice", post(create_invoice).delete(delete_invoice))
        .route("/invoice/pdf", get(invoice_pdf))
        .route("/invoice/paymentstatus", get(payment_status))
        .route("/invoice/reverse", post(reverse_invoice))
        .route("/invoice/cancel", put(cancel_invoice))
        .route("/invoice/restore", put(restore_invoice))
        .route("/estimate", post(create_estimate).delete(delete_estimate))
        .route("/estimate/invoices", get(estimate_invoices))
        .route("/estimate/cancel", put(cancel_estimate))
        .route("/estimate/restore", put(restore_estimate))
        .route("/payment", post(create_payment))
        .route("/payment/text", get(receipt_text))
        .route("/payment/chitanta", delete(delete_receipt))
        .route("/payment/v2", delete(delete_payment))
        .route("/series", get(list_series))
        .route("/stocks", get(list_stocks))
        .route("/tax", get(list_taxes))
        .route("/document/send", post(send_document))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, AppState::default()).await
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

// ---------------------------------------------------------------------------
// Errors and auth
// ---------------------------------------------------------------------------

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"errorText": self.error_text, "message": ""}))).into_response()
    }
}

type ApiResult = Result<Json<Value>, Rejection>;

fn ok_message(message: impl Into<String>) -> ApiResult {
    Ok(Json(json!({"errorText": "", "message": message.into()})))
}

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let supplied = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if supplied != Some(&*state.authorization) {
        return Rejection {
            status: StatusCode::UNAUTHORIZED,
            error_text: "Autentificare esuata. Verificati utilizatorul si token-ul.".to_string(),
        }
        .into_response();
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Query and body helpers
// ---------------------------------------------------------------------------

type Params = Query<HashMap<String, String>>;

fn required<'a>(params: &'a HashMap<String, String>, name: &str) -> Result<&'a str, Rejection> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Rejection::bad_request(format!("Parametrul {name} lipseste.")))
}

fn document_key(params: &HashMap<String, String>) -> Result<DocKey, Rejection> {
    Ok(doc_key(
        required(params, "cif")?,
        required(params, "seriesname")?,
        required(params, "number")?,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    vat_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductBody {
    #[serde(default)]
    is_discount: bool,
    #[serde(default)]
    quantity: Option<f64>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    discount_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PaymentBody {
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRefBody {
    series_name: String,
    number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentBody {
    company_vat_code: String,
    #[serde(default)]
    series_name: Option<String>,
    #[serde(default)]
    client: ClientBody,
    #[serde(default)]
    products: Vec<ProductBody>,
    #[serde(default)]
    payment: Option<PaymentBody>,
    #[serde(default)]
    use_estimate_details: bool,
    #[serde(default)]
    estimate: Option<DocumentRefBody>,
}

impl CreateDocumentBody {
    fn total(&self) -> f64 {
        self.products
            .iter()
            .map(|line| {
                if line.is_discount {
                    line.discount_value.unwrap_or(0.0)
                } else {
                    line.quantity.unwrap_or(0.0) * line.price.unwrap_or(0.0)
                }
            })
            .sum()
    }

    fn into_new_document(self) -> NewDocument {
        NewDocument {
            total: self.total(),
            line_count: self.products.len(),
            payment: self.payment.map(|p| p.value),
            cif: self.company_vat_code,
            series: self.series_name,
            client_name: self.client.name,
            client_cif: self.client.vat_code.unwrap_or_default(),
        }
    }
}

fn issued_body(issued: &store::Issued) -> Json<Value> {
    Json(json!({
        "errorText": "",
        "message": "",
        "series": issued.series,
        "number": issued.number,
        "url": "",
    }))
}

// ---------------------------------------------------------------------------
// Invoices and estimates
// ---------------------------------------------------------------------------

async fn create_document(state: &AppState, family: Family, body: CreateDocumentBody) -> ApiResult {
    let mut store = state.store.write().await;
    let issued = if family == Family::Invoice && body.use_estimate_details {
        let estimate = body
            .estimate
            .as_ref()
            .ok_or_else(|| Rejection::bad_request("Campul estimate este obligatoriu."))?;
        let estimate_key = doc_key(&body.company_vat_code, &estimate.series_name, &estimate.number);
        store.create_from_estimate(&body.company_vat_code, body.series_name.clone(), &estimate_key)?
    } else {
        store.create(family, body.into_new_document())?
    };
    info!(?family, series = %issued.series, number = %issued.number, "document issued");
    Ok(issued_body(&issued))
}

async fn create_invoice(State(state): State<AppState>, Json(body): Json<CreateDocumentBody>) -> ApiResult {
    create_document(&state, Family::Invoice, body).await
}

async fn create_estimate(State(state): State<AppState>, Json(body): Json<CreateDocumentBody>) -> ApiResult {
    create_document(&state, Family::Estimate, body).await
}

async fn delete_document(state: &AppState, family: Family, params: &HashMap<String, String>) -> ApiResult {
    let key = document_key(params)?;
    state.store.write().await.delete(family, &key)?;
    info!(?family, series = %key.1, number = %key.2, "document deleted");
    ok_message(format!("Documentul {}{} a fost sters.", key.1, key.2))
}

async fn delete_invoice(State(state): State<AppState>, Query(params): Params) -> ApiResult {
    delete_document(&state, Family::Invoice, &params).await
}

async fn delete_estimate(State(state): State<AppState>, Query(params): Params) -> ApiResult {
    delete_document(&state, Family::Estimate, &params).await
}

async fn toggle_document(
    state: &AppState,
    family: Family,
    params: &HashMap<String, String>,
    canceled: bool,
) -> ApiResult {
    let key = document_key(params)?;
    state.store.write().await.set_canceled(family, &key, canceled)?;
    info!(?family, series = %key.1, number = %key.2, canceled, "document state changed");
    let verb = if canceled { "anulat" } else { "restaurat" };
    ok_message(format!("Documentul {}{} a fost {verb}.", key.1, key.2))
}

async fn cancel_invoice(State(state): State<AppState>, Query(params): Params) -> ApiResult {
    toggle_document(&state, Family::Invoice, &params, true).await
}

async fn restore_invoice(State(state): State<AppState>, Query(params): Params) -> ApiResult {
    toggle_document(&state, Family::Invoice, &params, false).await
}

async fn cancel_estimate(State(state): State<AppState>, Query(params): Params) -> ApiResult {
    toggle_document(&state, Family::Estimate, &params, true).await
}

async fn restore_estimate(State(state): State<AppState>, Query(params): Params) -> ApiResult {
    toggle_document(&state, Family::Estimate, &params, false).await
}

async fn invoice_pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Params,
) -> Result<Response, Rejection> {
    let accepts_pdf = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("application/octet-stream"));
    if !accepts_pdf {
        return Err(Rejection::bad_request("Header-ul Accept trebuie sa fie application/octet-stream."));
    }
    let key = document_key(&params)?;
    state.store.read().await.document(Family::Invoice, &key)?;
    let pdf = format!("%PDF-1.4\n% {} {}{}\n%%EOF\n", key.0, key.1, key.2).into_bytes();
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], pdf).into_response())
}

async fn payment_status(State(state): State<AppState>, Query(params): Params) -> ApiResult {
    let key = document_key(&params)?;
    let status = state.store.read().await.payment_status(&key)?;
    let mut body = serde_json::to_value(status).unwrap_or_default();
    body["errorText"] = json!("");
    body["message"] = json!("");
    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReverseBody {
    company_vat_code: String,
    series_name: String,
    number: String,
    issue_date: String,
}

async fn reverse_invoice(State(state): State<AppState>, Json(body): Json<ReverseBody>) -> ApiResult {
    if body.issue_date.is_empty() {
        return Err(Rejection::bad_request("Campul issueDate este obligatoriu."));
    }
    let key = doc_key(&body.company_vat_code, &body.series_name, &body.number);
    let (issued, id) = state.store.write().await.reverse(&key)?;
    info!(series = %issued.series, number = %issued.number, "invoice reversed");
    Ok(Json(json!({
        "errorText": "",
        "message": "",
        "series": issued.series,
        "number": issued.number,
        "documentId": id.to_string(),
        "documentUrl": format!("https://cloud.smartbill.ro/document/{id}"),
        "documentViewUrl": format!("https://cloud.smartbill.ro/document/{id}/view"),
    })))
}

async fn estimate_invoices(State(state): State<AppState>, Query(params): Params) -> ApiResult {
    let key = document_key(&params)?;
    let invoices = state.store.read().await.linked_invoices(&key)?;
    Ok(Json(json!({
        "errorText": "",
        "message": "",
        "areInvoicesCreated": !invoices.is_empty(),
        "invoices": invoices,
    })))
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentBody {
    company_vat_code: String,
    #[serde(default)]
    client: ClientBody,
    #[serde(default)]
    issue_date: Option<String>,
    value: f64,
    #[serde(rename = "type")]
    payment_type: String,
    #[serde(default)]
    use_invoice_details: bool,
    #[serde(default)]
    invoices_list: Vec<DocumentRefBody>,
}

async fn create_payment(State(state): State<AppState>, Json(body): Json<CreatePaymentBody>) -> ApiResult {
    let invoices = if body.use_invoice_details {
        body.invoices_list
            .into_iter()
            .map(|invoice| (invoice.series_name, invoice.number))
            .collect()
    } else {
        Vec::new()
    };
    let input = NewPayment {
        cif: body.company_vat_code,
        payment_type: body.payment_type,
        value: body.value,
        date: body.issue_date.unwrap_or_default(),
        client_name: body.client.name,
        client_cif: body.client.vat_code.unwrap_or_default(),
        invoices,
    };
    let outcome = state.store.write().await.record_payment(input)?;
    match outcome {
        PaymentOutcome::Receipt { id, issued } => {
            info!(series = %issued.series, number = %issued.number, "receipt issued");
            Ok(Json(json!({
                "errorText": "",
                "message": "",
                "series": issued.series,
                "number": issued.number,
                "id": id,
            })))
        }
        PaymentOutcome::Recorded => {
            info!("payment recorded");
            ok_message("Incasarea a fost inregistrata.")
        }
    }
}

async fn receipt_text(State(state): State<AppState>, Query(params): Params) -> ApiResult {
    let text = state
        .store
        .read()
        .await
        .receipt_text(required(&params, "cif")?, required(&params, "id")?)?;
    ok_message(BASE64.encode(text))
}

async fn delete_receipt(State(state): State<AppState>, Query(params): Params) -> ApiResult {
    let key = document_key(&params)?;
    state.store.write().await.delete_receipt(&key)?;
    info!(series = %key.1, number = %key.2, "receipt deleted");
    ok_message("Chitanta a fost stearsa.")
}

const INVOICE_KEYS: [&str; 2] = ["invoiceSeries", "invoiceNumber"];
const DETAIL_KEYS: [&str; 4] = ["paymentDate", "paymentValue", "clientName", "clientCif"];

fn payment_selector(params: &HashMap<String, String>) -> Result<PaymentSelector, Rejection> {
    let has_invoice = INVOICE_KEYS.iter().any(|key| params.contains_key(*key));
    let has_details = DETAIL_KEYS.iter().any(|key| params.contains_key(*key));
    match (has_invoice, has_details) {
        (true, false) => Ok(PaymentSelector::ByInvoice {
            series: required(params, "invoiceSeries")?.to_string(),
            number: required(params, "invoiceNumber")?.to_string(),
        }),
        (false, true) => Ok(PaymentSelector::ByDetails {
            date: required(params, "paymentDate")?.to_string(),
            value: required(params, "paymentValue")?
                .parse()
                .map_err(|_| Rejection::bad_request("Parametrul paymentValue nu este numeric."))?,
            client_name: required(params, "clientName")?.to_string(),
            client_cif: required(params, "clientCif")?.to_string(),
        }),
        (true, true) => Err(Rejection::bad_request(
            "Incasarea se identifica fie dupa factura, fie dupa detalii, nu ambele.",
        )),
        (false, false) => Err(Rejection::bad_request("Parametri insuficienti pentru identificarea incasarii.")),
    }
}

async fn delete_payment(State(state): State<AppState>, Query(params): Params) -> ApiResult {
    let cif = required(&params, "companyVatCode")?;
    let payment_type = required(&params, "paymentType")?;
    if payment_type == "Chitanta" {
        return Err(Rejection::bad_request("Chitantele se sterg prin /payment/chitanta."));
    }
    let selector = payment_selector(&params)?;
    let removed = state
        .store
        .write()
        .await
        .delete_payments(cif, payment_type, &selector)?;
    info!(removed, payment_type, "payments deleted");
    ok_message(format!("{removed} incasari au fost sterse."))
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

async fn list_series(State(state): State<AppState>, Query(params): Params) -> ApiResult {
    let cif = required(&params, "cif")?;
    let names: &[&str] = match params.get("type").map(String::as_str) {
        Some("f") => &["FCT", "FX"],
        Some("p") => &["PF"],
        Some("c") => &[store::RECEIPT_SERIES],
        _ => return Err(Rejection::bad_request("Tipul seriei trebuie sa fie f, p sau c.")),
    };
    let series_type = params.get("type").cloned().unwrap_or_default();
    let store = state.store.read().await;
    let list: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "nextNumber": store.peek_number(cif, name),
                "type": series_type,
            })
        })
        .collect();
    Ok(Json(json!({"errorText": "", "message": "", "list": list})))
}

fn warehouses() -> Value {
    json!([
        {
            "warehouseName": "Depozit central",
            "warehouseType": "en-gros",
            "products": [
                {"measuringUnit": "buc", "productCode": "ccd1", "productName": "Mapa A4", "quantity": 120},
                {"measuringUnit": "buc", "productCode": "ccd2", "productName": "Biblioraft Plastifiat", "quantity": 45}
            ]
        },
        {
            "warehouseName": "Magazin",
            "warehouseType": "en-detail",
            "products": [
                {"measuringUnit": "buc", "productCode": "ccd1", "productName": "Mapa A4", "quantity": 8}
            ]
        }
    ])
}

async fn list_stocks(Query(params): Params) -> ApiResult {
    required(&params, "cif")?;
    let filter = |key: &str| params.get(key).filter(|value| !value.is_empty());
    let warehouse_name = filter("warehouseName");
    let product_name = filter("productName");
    let product_code = filter("productCode");

    let list: Vec<Value> = warehouses()
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|warehouse| warehouse_name.map_or(true, |name| warehouse["warehouseName"] == name.as_str()))
        .map(|mut warehouse| {
            if let Some(products) = warehouse["products"].as_array_mut() {
                products.retain(|product| {
                    product_name.map_or(true, |name| product["productName"] == name.as_str())
                        && product_code.map_or(true, |code| product["productCode"] == code.as_str())
                });
            }
            warehouse
        })
        .collect();
    Ok(Json(json!({"errorText": "", "message": "", "list": list})))
}

async fn list_taxes(Query(params): Params) -> ApiResult {
    required(&params, "cif")?;
    Ok(Json(json!({
        "errorText": "",
        "message": "",
        "taxes": [
            {"name": "Normala", "percentage": 19},
            {"name": "Redusa", "percentage": 9},
            {"name": "Redusa", "percentage": 5},
            {"name": "SDD", "percentage": 0}
        ]
    })))
}

// ---------------------------------------------------------------------------
// Email
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendDocumentBody {
    company_vat_code: String,
    series_name: String,
    number: String,
    #[serde(rename = "type")]
    document_type: String,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    body_text: Option<String>,
}

fn decode_text(field: &str, encoded: Option<String>) -> Result<Option<String>, Rejection> {
    encoded
        .map(|value| {
            BASE64
                .decode(value.as_bytes())
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .ok_or_else(|| Rejection::bad_request(format!("Campul {field} trebuie codificat base64.")))
        })
        .transpose()
}

async fn send_document(State(state): State<AppState>, Json(body): Json<SendDocumentBody>) -> ApiResult {
    let family = match body.document_type.as_str() {
        "factura" => Family::Invoice,
        "proforma" => Family::Estimate,
        other => return Err(Rejection::bad_request(format!("Tip de document necunoscut: {other}."))),
    };
    let email = SentEmail {
        document: doc_key(&body.company_vat_code, &body.series_name, &body.number),
        to: body.to,
        subject: decode_text("subject", body.subject)?,
        body_text: decode_text("bodyText", body.body_text)?,
    };
    state.store.write().await.record_email(family, email)?;
    info!(?family, series = %body.series_name, number = %body.number, "document emailed");
    ok_message("Documentul a fost trimis.")
}
