use serde::Serialize;

use super::DocumentKey;
use crate::executor::{Executor, RequestOptions};
use crate::http::HttpMethod;
use crate::normalize::RequestKind;
use crate::response::ApiResponse;
use crate::types::{Customer, DocumentNumber, EstimateInvoices, Product};

/// Body of `POST /estimate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEstimate {
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
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    pub products: Vec<Product>,
}

/// Estimate (proforma) operations.
#[derive(Debug, Clone, Copy)]
pub struct EstimateApi<'a> {
    executor: &'a Executor,
}

impl<'a> EstimateApi<'a> {
    pub(crate) fn new(executor: &'a Executor) -> Self {
        Self { executor }
    }

    pub fn create(&self, params: &CreateEstimate) -> ApiResponse<DocumentNumber> {
        self.executor
            .call_json("/estimate", RequestKind::DocumentCreate, HttpMethod::Post, params)
    }

    /// Invoices already issued from this estimate.
    pub fn get_invoices(&self, key: &DocumentKey) -> ApiResponse<EstimateInvoices> {
        self.executor.call(
            &format!("/estimate/invoices?{}", key.query()),
            RequestKind::EstimateInvoices,
            RequestOptions::default(),
        )
    }

    pub fn delete(&self, key: &DocumentKey) -> ApiResponse<()> {
        self.executor.call(
            &format!("/estimate?{}", key.query()),
            RequestKind::Void,
            RequestOptions::new(HttpMethod::Delete),
        )
    }

    pub fn cancel(&self, key: &DocumentKey) -> ApiResponse<()> {
        self.executor.call(
            &format!("/estimate/cancel?{}", key.query()),
            RequestKind::Void,
            RequestOptions::new(HttpMethod::Put),
        )
    }

    pub fn restore(&self, key: &DocumentKey) -> ApiResponse<()> {
        self.executor.call(
            &format!("/estimate/restore?{}", key.query()),
            RequestKind::Void,
            RequestOptions::new(HttpMethod::Put),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::test_support::StubTransport;

    fn setup() -> (Arc<StubTransport>, Executor) {
        let transport = Arc::new(StubTransport::new());
        let executor = Executor::new(Config::new("u", "t").with_base_url("http://mock"), transport.clone());
        (transport, executor)
    }

    fn key() -> DocumentKey {
        DocumentKey::new("RO12345678", "PFCT", "0203")
    }

    #[test]
    fn create_posts_to_estimate() {
        let (transport, executor) = setup();
        transport.push_json(200, r#"{"series":"PFCT","number":"0204"}"#);
        let params = CreateEstimate {
            company_vat_code: "RO12345678".to_string(),
            client: Customer {
                name: "Client SRL".to_string(),
                country: "Romania".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let resp = EstimateApi::new(&executor).create(&params);
        assert_eq!(
            resp.into_data(),
            Some(DocumentNumber {
                series: "PFCT".to_string(),
                number: "0204".to_string(),
            })
        );

        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://mock/estimate");
        let sent: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["products"], serde_json::json!([]));
        assert!(sent.get("seriesName").is_none());
    }

    #[test]
    fn get_invoices_decodes_links() {
        let (transport, executor) = setup();
        transport.push_json(
            200,
            r#"{"areInvoicesCreated":true,"invoices":[{"series":"FCT","number":"0010"}],"errorText":""}"#,
        );
        let resp = EstimateApi::new(&executor).get_invoices(&key());
        let linked = resp.into_data().unwrap();
        assert!(linked.are_invoices_created);
        assert_eq!(linked.invoices.len(), 1);
        assert_eq!(
            transport.last_request().url,
            "http://mock/estimate/invoices?cif=RO12345678&seriesname=PFCT&number=0203"
        );
    }

    #[test]
    fn state_toggles_use_expected_verbs() {
        let (transport, executor) = setup();
        let api = EstimateApi::new(&executor);
        assert!(api.delete(&key()).is_success());
        assert!(api.cancel(&key()).is_success());
        assert!(api.restore(&key()).is_success());

        let calls: Vec<(HttpMethod, String)> = transport
            .requests()
            .into_iter()
            .map(|r| (r.method, r.url))
            .collect();
        let query = "cif=RO12345678&seriesname=PFCT&number=0203";
        assert_eq!(
            calls,
            vec![
                (HttpMethod::Delete, format!("http://mock/estimate?{query}")),
                (HttpMethod::Put, format!("http://mock/estimate/cancel?{query}")),
                (HttpMethod::Put, format!("http://mock/estimate/restore?{query}")),
            ]
        );
    }

    #[test]
    fn failed_cancel_reports_vendor_text() {
        let (transport, executor) = setup();
        transport.push_json(400, r#"{"errorText":"Proforma nu exista.","message":""}"#);
        let resp = EstimateApi::new(&executor).cancel(&key());
        assert_eq!(resp, ApiResponse::failure("Proforma nu exista."));
    }
}
