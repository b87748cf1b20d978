//! End-to-end lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every facade through
//! the default `ureq` transport. Validates that request building, Basic auth
//! and response normalization agree with a real HTTP peer.

use std::net::SocketAddr;

use smartbill_core::{
    Config, CreateEstimate, CreateInvoice, CreateInvoiceFromEstimate, CreatePayment, Customer,
    DeletePayment, DocumentKey, EmailDocumentType, EstimateReference, InvoiceReference,
    NonReceiptPaymentType, Payment, PaymentType, Product, ReceiptQuery, ReverseInvoice,
    SendToEmail, SeriesQuery, SeriesType, SmartBillClient, StockQuery,
};

const CIF: &str = "RO12345678";

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> SmartBillClient {
    SmartBillClient::new(Config::new("demo", "secret").with_base_url(format!("http://{addr}")))
}

fn customer() -> Customer {
    Customer {
        name: "Intelligent IT".to_string(),
        vat_code: Some("RO87654321".to_string()),
        country: "Romania".to_string(),
        ..Default::default()
    }
}

fn product(name: &str, quantity: f64, price: f64) -> Product {
    Product {
        name: name.to_string(),
        measuring_unit_name: "buc".to_string(),
        currency: "RON".to_string(),
        quantity: Some(quantity),
        price: Some(price),
        is_tax_included: Some(true),
        tax_name: Some("Normala".to_string()),
        tax_percentage: Some(19.0),
        ..Default::default()
    }
}

#[test]
fn invoice_lifecycle() {
    let addr = start_server();
    let client = client(addr);
    let invoices = client.invoice();

    // Step 1: issue an invoice with a partial payment attached.
    let created = invoices.create(&CreateInvoice {
        company_vat_code: CIF.to_string(),
        client: customer(),
        series_name: Some("FCT".to_string()),
        products: vec![product("Mapa A4", 2.0, 40.0), product("Biblioraft", 1.0, 39.0)],
        payment: Some(Payment {
            value: 19.0,
            payment_series: None,
            payment_type: PaymentType::Card,
            is_cash: Some(false),
        }),
        ..Default::default()
    });
    assert!(created.is_success(), "{:?}", created.message());
    let number = created.into_data().unwrap();
    assert_eq!(number.series, "FCT");
    assert_eq!(number.number, "0001");
    let key = DocumentKey::new(CIF, "FCT", "0001");

    // Step 2: payment status reflects the attached payment.
    let status = invoices.get_payment_status(&key).into_result().unwrap();
    assert_eq!(status.invoice_total_amount, 119.0);
    assert_eq!(status.paid_amount, 19.0);
    assert_eq!(status.unpaid_amount, 100.0);
    assert!(!status.paid);

    // Step 3: the PDF comes back as raw bytes.
    let pdf = invoices.get_pdf(&key).into_result().unwrap();
    assert!(pdf.starts_with(b"%PDF-1.4"));

    // Step 4: email it; subject is base64-encoded on the wire.
    let sent = invoices.send_to_email(&SendToEmail {
        company_vat_code: CIF.to_string(),
        series_name: "FCT".to_string(),
        number: "0001".to_string(),
        document_type: EmailDocumentType::Invoice,
        subject: Some("Invoice".to_string()),
        to: Some("client@example.com".to_string()),
        cc: None,
        bcc: None,
        body_text: Some("Please find the invoice attached.".to_string()),
    });
    assert!(sent.is_success(), "{:?}", sent.message());

    // Step 5: cancel, reject a second cancel, then restore.
    assert!(invoices.cancel(&key).is_success());
    let again = invoices.cancel(&key);
    assert!(!again.is_success());
    assert_eq!(again.message(), Some("Factura este deja anulata."));
    assert!(invoices.restore(&key).is_success());

    // Step 6: reverse issues the next number in the same series.
    let storno = invoices
        .reverse(&ReverseInvoice {
            company_vat_code: CIF.to_string(),
            series_name: "FCT".to_string(),
            number: "0001".to_string(),
            issue_date: "2024-03-01".to_string(),
        })
        .into_result()
        .unwrap();
    assert_eq!(storno.series, "FCT");
    assert_eq!(storno.number, "0002");
    assert!(!storno.document_id.is_empty());

    // Step 7: delete, after which lookups fail with the vendor's text.
    assert!(invoices.delete(&key).is_success());
    let missing = invoices.get_payment_status(&key);
    assert!(!missing.is_success());
    assert_eq!(missing.message(), Some("Factura FCT0001 nu exista."));
}

#[test]
fn estimate_to_invoice() {
    let addr = start_server();
    let client = client(addr);

    let estimate = client
        .estimate()
        .create(&CreateEstimate {
            company_vat_code: CIF.to_string(),
            client: customer(),
            series_name: Some("PF".to_string()),
            products: vec![product("Consultanta", 3.0, 100.0)],
            ..Default::default()
        })
        .into_result()
        .unwrap();
    assert_eq!(estimate.series, "PF");
    let estimate_key = DocumentKey::new(CIF, "PF", estimate.number.clone());

    let before = client.estimate().get_invoices(&estimate_key).into_result().unwrap();
    assert!(!before.are_invoices_created);
    assert!(before.invoices.is_empty());

    let invoice = client
        .invoice()
        .create_from_estimate(&CreateInvoiceFromEstimate::new(
            CIF,
            "FCT",
            EstimateReference {
                series_name: "PF".to_string(),
                number: estimate.number.clone(),
            },
        ))
        .into_result()
        .unwrap();

    let after = client.estimate().get_invoices(&estimate_key).into_result().unwrap();
    assert!(after.are_invoices_created);
    assert_eq!(after.invoices, vec![invoice.clone()]);

    let status = client
        .invoice()
        .get_payment_status(&DocumentKey::new(CIF, invoice.series, invoice.number))
        .into_result()
        .unwrap();
    assert_eq!(status.invoice_total_amount, 300.0);

    assert!(client.estimate().cancel(&estimate_key).is_success());
    assert!(client.estimate().restore(&estimate_key).is_success());
    assert!(client.estimate().delete(&estimate_key).is_success());
    assert!(!client.estimate().delete(&estimate_key).is_success());
}

#[test]
fn payments_and_receipts() {
    let addr = start_server();
    let client = client(addr);

    client
        .invoice()
        .create(&CreateInvoice {
            company_vat_code: CIF.to_string(),
            client: customer(),
            products: vec![product("Mapa A4", 5.0, 20.0)],
            ..Default::default()
        })
        .into_result()
        .unwrap();
    let key = DocumentKey::new(CIF, "FCT", "0001");

    // A receipt settles the invoice.
    let mut receipt = CreatePayment::new(CIF, customer(), 100.0, PaymentType::Receipt);
    receipt.is_cash = Some(true);
    receipt.use_invoice_details = Some(true);
    receipt.invoices_list = vec![InvoiceReference {
        series_name: "FCT".to_string(),
        number: "0001".to_string(),
    }];
    assert!(client.payment().create(&receipt).is_success());
    assert!(client.invoice().get_payment_status(&key).into_result().unwrap().paid);

    // Deleting the receipt reopens it.
    assert!(client
        .payment()
        .delete_receipt(&DocumentKey::new(CIF, "CH", "0001"))
        .is_success());
    assert_eq!(
        client.invoice().get_payment_status(&key).into_result().unwrap().paid_amount,
        0.0
    );

    // A bank transfer, deleted by its own details.
    let mut transfer = CreatePayment::new(CIF, customer(), 40.0, PaymentType::BankTransfer);
    transfer.issue_date = Some("2024-03-01".to_string());
    assert!(client.payment().create(&transfer).is_success());

    let by_details = DeletePayment::ByDetails {
        company_vat_code: CIF.to_string(),
        payment_type: NonReceiptPaymentType::BankTransfer,
        payment_date: "2024-03-01".to_string(),
        payment_value: "40".to_string(),
        client_name: "Intelligent IT".to_string(),
        client_cif: "RO87654321".to_string(),
    };
    assert!(client.payment().delete(&by_details).is_success());
    let gone = client.payment().delete(&by_details);
    assert_eq!(gone.message(), Some("Nu a fost gasita nicio incasare."));

    // Unknown receipt ids surface the vendor error.
    let text = client.payment().get_receipt(&ReceiptQuery {
        cif: CIF.to_string(),
        id: "missing".to_string(),
    });
    assert_eq!(text.message(), Some("Chitanta nu exista."));
}

#[test]
fn lookups() {
    let addr = start_server();
    let client = client(addr);

    let taxes = client.tax().get_tax_types(CIF).into_result().unwrap();
    assert_eq!(taxes[0].name, "Normala");
    assert_eq!(taxes[0].percentage, 19.0);

    let series = client
        .series()
        .get_series(&SeriesQuery {
            company_vat_code: CIF.to_string(),
            series_type: SeriesType::Estimate,
        })
        .into_result()
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].name, "PF");
    assert_eq!(series[0].next_number, "0001");
    assert_eq!(series[0].series_type, Some(SeriesType::Estimate));

    let mut query = StockQuery::new(CIF);
    query.warehouse_name = Some("Magazin".to_string());
    let stock = client.stock().get_stock(&query).into_result().unwrap();
    assert_eq!(stock.len(), 1);
    assert_eq!(stock[0].products[0].product_code, "ccd1");
    assert_eq!(stock[0].products[0].quantity, 8.0);
}

#[test]
fn wrong_credentials_become_failures() {
    let addr = start_server();
    let client = SmartBillClient::new(
        Config::new("demo", "wrong").with_base_url(format!("http://{addr}")),
    );
    let resp = client.tax().get_tax_types(CIF);
    assert!(!resp.is_success());
    assert_eq!(
        resp.message(),
        Some("Autentificare esuata. Verificati utilizatorul si token-ul.")
    );
}

#[test]
fn unreachable_host_becomes_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let resp = client(addr).tax().get_tax_types(CIF);
    assert!(!resp.is_success());
    assert!(!resp.message().unwrap_or_default().is_empty());
}
