use super::{Amount, ClientInfo, ClientType, Service, now, serialize_timestamp, total_amount};
use crate::macros::setter;
use crate::request::{Request, RequestData};
use chrono::{DateTime, Duration, FixedOffset, SecondsFormat};
use reqwest::Method;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::json;
use std::borrow::Cow;

// Common

/// How the counterparty pays an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "paymentType")]
pub enum PaymentDetails {
    #[serde(rename = "PHONE", rename_all = "camelCase")]
    Phone { bank_name: String, phone: String },
    #[serde(rename = "ACCOUNT", rename_all = "camelCase")]
    Account {
        bank_name: String,
        bank_bik: String,
        corr_account: String,
        current_account: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Phone,
    Account,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Created,
    Cancelled,
    PaidWithoutReceipt,
    PaidWithReceipt,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_id: i64,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub receipt_id: Option<String>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default, rename = "transitionPageURL")]
    pub url: Option<String>,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub payment_type: Option<PaymentMethod>,
    pub total_amount: Amount,
    #[serde(default)]
    pub total_tax: Option<Amount>,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub paid_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub client_type: Option<ClientType>,
    #[serde(default)]
    pub client_inn: Option<String>,
    #[serde(default)]
    pub client_display_name: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
}

impl Invoice {
    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled_at.is_some()
    }
}

/// A saved way of receiving money for invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOption {
    pub id: i64,
    #[serde(rename = "type")]
    pub method: PaymentMethod,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bank_bik: Option<String>,
    #[serde(default)]
    pub corr_account: Option<String>,
    #[serde(default)]
    pub current_account: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub available_for_pa: bool,
}

impl PaymentOption {
    /// Payment details usable for a new invoice, if the option is complete.
    pub fn details(&self) -> Option<PaymentDetails> {
        let bank_name = self.bank_name.clone()?;
        match self.method {
            PaymentMethod::Phone => Some(PaymentDetails::Phone {
                bank_name,
                phone: self.phone.clone()?,
            }),
            PaymentMethod::Account => Some(PaymentDetails::Account {
                bank_name,
                bank_bik: self.bank_bik.clone()?,
                corr_account: self.corr_account.clone()?,
                current_account: self.current_account.clone()?,
            }),
        }
    }
}

// Requests

#[derive(Debug, Clone)]
pub struct ListInvoices {
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
    offset: u32,
    limit: u32,
    ascending: bool,
}

impl Default for ListInvoices {
    fn default() -> Self {
        Self::new()
    }
}

impl ListInvoices {
    /// Invoices created during the last seven days, newest first.
    pub fn new() -> Self {
        let now = now();
        Self {
            from: now - Duration::days(7),
            to: now,
            offset: 0,
            limit: 10,
            ascending: false,
        }
    }

    setter!(from: DateTime<FixedOffset>);
    setter!(to: DateTime<FixedOffset>);
    setter!(offset: u32);
    setter!(limit: u32);
    setter!(ascending: bool);
}

impl Serialize for ListInvoices {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let timestamp = |ts: &DateTime<FixedOffset>| ts.to_rfc3339_opts(SecondsFormat::Secs, false);

        let mut state = serializer.serialize_struct("ListInvoices", 4)?;
        state.serialize_field("limit", &self.limit)?;
        state.serialize_field("offset", &self.offset)?;
        state.serialize_field("sorted", &json!([{"id": "createdAt", "desc": !self.ascending}]))?;
        state.serialize_field(
            "filtered",
            &json!([
                {"id": "status", "value": "ALL"},
                {"id": "from", "value": timestamp(&self.from)},
                {"id": "to", "value": timestamp(&self.to)},
            ]),
        )?;
        state.end()
    }
}

impl Request for ListInvoices {
    type Data = Self;
    type Response = InvoicesResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/invoice/table".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoice {
    client_type: ClientType,
    client_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_inn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_email: Option<String>,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    payment: PaymentDetails,
    services: Vec<Service>,
    total_amount: Amount,
}

impl CreateInvoice {
    /// `client_name` is the person's full name or the company name; the
    /// service refuses invoices without it.
    pub fn new(client_name: impl Into<String>, payment: PaymentDetails, services: Vec<Service>) -> Self {
        Self {
            client_type: ClientType::default(),
            client_name: client_name.into(),
            client_inn: None,
            client_phone: None,
            client_email: None,
            kind: "MANUAL",
            payment,
            total_amount: total_amount(&services),
            services,
        }
    }

    /// Copy type and contacts from `client`; its name, if set, replaces the current one.
    pub fn client(mut self, client: ClientInfo) -> Self {
        self.client_type = client.client_type;
        if let Some(name) = client.name {
            self.client_name = name;
        }
        self.client_inn = client.inn;
        self.client_phone = client.phone;
        self.client_email = client.email;
        self
    }

    pub fn total(&self) -> Amount {
        self.total_amount
    }
}

impl Request for CreateInvoice {
    type Data = Self;
    type Response = Invoice;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/invoice".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

/// Cancel an invoice. A receipt already issued for it stays valid.
#[derive(Debug, Clone)]
pub struct CancelInvoice {
    invoice_id: i64,
}

impl CancelInvoice {
    pub fn new(invoice_id: i64) -> Self {
        Self { invoice_id }
    }
}

impl Request for CancelInvoice {
    type Data = ();
    type Response = Invoice;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/invoice/{}/cancel", self.invoice_id).into()
    }
}

/// Mark an invoice paid without issuing a receipt yet.
#[derive(Debug, Clone)]
pub struct ApproveInvoice {
    invoice_id: i64,
}

impl ApproveInvoice {
    pub fn new(invoice_id: i64) -> Self {
        Self { invoice_id }
    }
}

impl Request for ApproveInvoice {
    type Data = ();
    type Response = Invoice;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/invoice/{}/approve", self.invoice_id).into()
    }
}

/// Issue the receipt for an invoice; the invoice becomes paid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteInvoice {
    invoice_id: i64,
    #[serde(serialize_with = "serialize_timestamp")]
    request_time: DateTime<FixedOffset>,
    #[serde(serialize_with = "serialize_timestamp")]
    operation_time: DateTime<FixedOffset>,
}

impl CompleteInvoice {
    pub fn new(invoice_id: i64) -> Self {
        let now = now();
        Self {
            invoice_id,
            request_time: now,
            operation_time: now,
        }
    }

    setter!(operation_time: DateTime<FixedOffset>);
}

impl Request for CompleteInvoice {
    type Data = Self;
    type Response = Invoice;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/invoice/{}/receipt", self.invoice_id).into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoicePayment {
    invoice_id: i64,
    #[serde(flatten)]
    payment: PaymentDetails,
}

impl UpdateInvoicePayment {
    pub fn new(invoice_id: i64, payment: PaymentDetails) -> Self {
        Self {
            invoice_id,
            payment,
        }
    }
}

impl Request for UpdateInvoicePayment {
    type Data = Self;
    type Response = Invoice;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/invoice/update-payment-info".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Default, Debug, Clone, Serialize)]
pub struct ListPaymentOptions {
    #[serde(rename = "type")]
    method: Option<PaymentMethod>,
}

impl ListPaymentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(opt method: PaymentMethod);
}

impl Request for ListPaymentOptions {
    type Data = Self;
    type Response = PaymentOptionsResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/payment-type/table".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Query(self)
    }
}

// Responses

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicesResponse {
    #[serde(default)]
    pub items: Vec<Invoice>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub current_offset: u32,
    #[serde(default)]
    pub current_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOptionsResponse {
    #[serde(default)]
    pub items: Vec<PaymentOption>,
}
