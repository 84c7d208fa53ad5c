use super::{Amount, ClientInfo, ClientType, Service, now, serialize_timestamp, total_amount};
use crate::macros::setter;
use crate::request::{Request, RequestData};
use chrono::{DateTime, Duration, FixedOffset};
use reqwest::Method;
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;

// Common

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    #[default]
    Cash,
    Account,
}

/// Client block of a declared income.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeClient {
    income_type: ClientType,
    inn: Option<String>,
    display_name: Option<String>,
    contact_phone: Option<String>,
}

impl From<ClientInfo> for IncomeClient {
    fn from(client: ClientInfo) -> Self {
        Self {
            income_type: client.client_type,
            inn: client.inn,
            display_name: client.name,
            contact_phone: client.phone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeInfo {
    pub approved_receipt_uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub operation_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub request_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
    #[serde(default)]
    pub total_amount: Option<Amount>,
    #[serde(default)]
    pub client_inn: Option<String>,
    #[serde(default)]
    pub client_display_name: Option<String>,
    #[serde(default)]
    pub cancellation_info: Option<CancellationInfo>,
}

impl IncomeInfo {
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_info.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationInfo {
    #[serde(default)]
    pub operation_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Reasons the service accepts for cancelling a receipt.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    #[default]
    #[serde(rename = "Чек сформирован ошибочно")]
    IssuedByMistake,
    #[serde(rename = "Возврат средств")]
    Refund,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeSortField {
    #[default]
    OperationTime,
    TotalAmount,
}

/// `sortBy` query value, e.g. `operation_time:desc`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomeSort {
    pub field: IncomeSortField,
    pub ascending: bool,
}

impl Serialize for IncomeSort {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let field = match self.field {
            IncomeSortField::OperationTime => "operation_time",
            IncomeSortField::TotalAmount => "total_amount",
        };
        let order = if self.ascending { "asc" } else { "desc" };
        serializer.serialize_str(&format!("{}:{}", field, order))
    }
}

// Requests

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclareIncome {
    payment_type: PaymentType,
    ignore_max_total_income_restriction: bool,
    client: IncomeClient,
    #[serde(serialize_with = "serialize_timestamp")]
    request_time: DateTime<FixedOffset>,
    #[serde(serialize_with = "serialize_timestamp")]
    operation_time: DateTime<FixedOffset>,
    services: Vec<Service>,
    total_amount: Amount,
}

impl DeclareIncome {
    pub fn new(services: Vec<Service>) -> Self {
        let now = now();
        Self {
            payment_type: PaymentType::default(),
            ignore_max_total_income_restriction: false,
            client: IncomeClient::default(),
            request_time: now,
            operation_time: now,
            total_amount: total_amount(&services),
            services,
        }
    }

    pub fn service(mut self, service: Service) -> Self {
        self.services.push(service);
        self.total_amount = total_amount(&self.services);
        self
    }

    setter!(client: IncomeClient);
    setter!(payment_type: PaymentType);
    setter!(operation_time: DateTime<FixedOffset>);

    pub fn total(&self) -> Amount {
        self.total_amount
    }
}

impl Request for DeclareIncome {
    type Data = Self;
    type Response = DeclareIncomeResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/income".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelIncome {
    comment: CancelReason,
    #[serde(serialize_with = "serialize_timestamp")]
    request_time: DateTime<FixedOffset>,
    #[serde(serialize_with = "serialize_timestamp")]
    operation_time: DateTime<FixedOffset>,
    receipt_uuid: String,
}

impl CancelIncome {
    pub fn new(receipt_uuid: impl Into<String>) -> Self {
        let now = now();
        Self {
            comment: CancelReason::default(),
            request_time: now,
            operation_time: now,
            receipt_uuid: receipt_uuid.into(),
        }
    }

    setter!(comment: CancelReason);
    setter!(operation_time: DateTime<FixedOffset>);
}

impl Request for CancelIncome {
    type Data = Self;
    type Response = CancelIncomeResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/cancel".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListIncomes {
    #[serde(serialize_with = "serialize_timestamp")]
    from: DateTime<FixedOffset>,
    #[serde(serialize_with = "serialize_timestamp")]
    to: DateTime<FixedOffset>,
    offset: u32,
    #[serde(rename = "sortBy")]
    sort_by: IncomeSort,
    limit: u32,
}

impl Default for ListIncomes {
    fn default() -> Self {
        Self::new()
    }
}

impl ListIncomes {
    /// Incomes of the last seven days, newest first.
    pub fn new() -> Self {
        let now = now();
        Self {
            from: now - Duration::days(7),
            to: now,
            offset: 0,
            sort_by: IncomeSort::default(),
            limit: 10,
        }
    }

    setter!(from: DateTime<FixedOffset>);
    setter!(to: DateTime<FixedOffset>);
    setter!(offset: u32);
    setter!(limit: u32);
    setter!(sort_by: IncomeSort);
}

impl Request for ListIncomes {
    type Data = Self;
    type Response = IncomesResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/incomes".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Query(self)
    }
}

// Responses

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclareIncomeResponse {
    pub approved_receipt_uuid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelIncomeResponse {
    pub income_info: IncomeInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomesResponse {
    #[serde(default)]
    pub content: Vec<IncomeInfo>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub current_offset: u32,
    #[serde(default)]
    pub current_limit: u32,
}
