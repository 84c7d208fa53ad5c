use crate::endpoints::{
    Service,
    income::{CancelIncome, DeclareIncome, ListIncomes},
    invoice::{
        ApproveInvoice, CancelInvoice, CompleteInvoice, CreateInvoice, ListInvoices,
        ListPaymentOptions, PaymentDetails, UpdateInvoicePayment,
    },
};

#[derive(Default)]
pub struct IncomeRepository;

impl IncomeRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn list(&self) -> ListIncomes {
        ListIncomes::new()
    }

    pub fn declare(&self, services: Vec<Service>) -> DeclareIncome {
        DeclareIncome::new(services)
    }

    pub fn cancel(&self, receipt_uuid: impl Into<String>) -> CancelIncome {
        CancelIncome::new(receipt_uuid)
    }
}

#[derive(Default)]
pub struct InvoiceRepository;

impl InvoiceRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn list(&self) -> ListInvoices {
        ListInvoices::new()
    }

    pub fn create(
        &self,
        client_name: impl Into<String>,
        payment: PaymentDetails,
        services: Vec<Service>,
    ) -> CreateInvoice {
        CreateInvoice::new(client_name, payment, services)
    }

    pub fn cancel(&self, invoice_id: i64) -> CancelInvoice {
        CancelInvoice::new(invoice_id)
    }

    pub fn approve(&self, invoice_id: i64) -> ApproveInvoice {
        ApproveInvoice::new(invoice_id)
    }

    pub fn complete(&self, invoice_id: i64) -> CompleteInvoice {
        CompleteInvoice::new(invoice_id)
    }

    pub fn update_payment(&self, invoice_id: i64, payment: PaymentDetails) -> UpdateInvoicePayment {
        UpdateInvoicePayment::new(invoice_id, payment)
    }
}

#[derive(Default)]
pub struct PaymentOptionRepository;

impl PaymentOptionRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn list(&self) -> ListPaymentOptions {
        ListPaymentOptions::new()
    }
}
