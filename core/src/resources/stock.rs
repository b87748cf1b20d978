use super::encode_query;
use crate::executor::{Executor, RequestOptions};
use crate::normalize::RequestKind;
use crate::response::ApiResponse;
use crate::types::Warehouse;

/// Filters of `GET /stocks`. Unset or empty filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockQuery {
    pub company_vat_code: String,
    /// `YYYY-MM-DD`; the vendor defaults to today.
    pub date: Option<String>,
    pub warehouse_name: Option<String>,
    pub product_name: Option<String>,
    pub product_code: Option<String>,
}

impl StockQuery {
    pub fn new(company_vat_code: impl Into<String>) -> Self {
        Self {
            company_vat_code: company_vat_code.into(),
            ..Default::default()
        }
    }

    fn encode(&self) -> String {
        let filters = [
            ("date", &self.date),
            ("warehouseName", &self.warehouse_name),
            ("productName", &self.product_name),
            ("productCode", &self.product_code),
        ];
        let present = filters.into_iter().filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        });
        encode_query(std::iter::once(("cif", self.company_vat_code.as_str())).chain(present))
    }
}

/// Stock lookups.
#[derive(Debug, Clone, Copy)]
pub struct StockApi<'a> {
    executor: &'a Executor,
}

impl<'a> StockApi<'a> {
    pub(crate) fn new(executor: &'a Executor) -> Self {
        Self { executor }
    }

    pub fn get_stock(&self, query: &StockQuery) -> ApiResponse<Vec<Warehouse>> {
        self.executor.call(
            &format!("/stocks?{}", query.encode()),
            RequestKind::StockList,
            RequestOptions::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::test_support::StubTransport;

    #[test]
    fn only_company_sent_without_filters() {
        assert_eq!(StockQuery::new("RO12345678").encode(), "cif=RO12345678");
    }

    #[test]
    fn set_filters_are_appended_in_order() {
        let query = StockQuery {
            company_vat_code: "RO12345678".to_string(),
            date: Some("2024-03-01".to_string()),
            warehouse_name: Some(String::new()),
            product_name: Some("Mapa A4".to_string()),
            product_code: Some("ccd1".to_string()),
        };
        assert_eq!(
            query.encode(),
            "cif=RO12345678&date=2024-03-01&productName=Mapa+A4&productCode=ccd1"
        );
    }

    #[test]
    fn get_stock_unwraps_list() {
        let transport = Arc::new(StubTransport::new());
        let executor = Executor::new(Config::new("u", "t").with_base_url("http://mock"), transport.clone());
        transport.push_json(
            200,
            r#"{"list":[{"warehouseName":"Depozit","warehouseType":"en-gros","products":[{"measuringUnit":"buc","productCode":"ccd1","productName":"Mapa A4","quantity":12}]}]}"#,
        );

        let warehouses = StockApi::new(&executor)
            .get_stock(&StockQuery::new("RO12345678"))
            .into_data()
            .unwrap();
        assert_eq!(warehouses.len(), 1);
        assert_eq!(warehouses[0].products[0].quantity, 12.0);
        assert_eq!(transport.last_request().url, "http://mock/stocks?cif=RO12345678");
    }
}
