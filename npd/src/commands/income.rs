use anyhow::Result;

use npd_api::endpoints::income::{CancelReason, PaymentType};
use npd_api::{Client, Request};

use super::{client_info, service};
use crate::cli::IncomeCommand;

pub async fn run(client: &Client, command: IncomeCommand) -> Result<()> {
    match command {
        IncomeCommand::Declare {
            service: service_args,
            client: client_args,
            account,
        } => {
            let payment_type = if account {
                PaymentType::Account
            } else {
                PaymentType::Cash
            };
            let request = Request::incomes()
                .declare(vec![service(service_args)])
                .client(client_info(client_args))
                .payment_type(payment_type);
            let total = request.total();

            let response = client.send(request).await?;
            tracing::info!(receipt = %response.approved_receipt_uuid, %total, "Income declared");
            println!("✓ Receipt {} for {} ₽", response.approved_receipt_uuid, total);
        }
        IncomeCommand::Cancel {
            receipt_uuid,
            refund,
        } => {
            let reason = if refund {
                CancelReason::Refund
            } else {
                CancelReason::IssuedByMistake
            };
            let response = client
                .send(Request::incomes().cancel(receipt_uuid).comment(reason))
                .await?;
            println!("✓ Receipt {} cancelled", response.income_info.approved_receipt_uuid);
        }
        IncomeCommand::List { limit, offset } => {
            let response = client
                .send(Request::incomes().list().limit(limit).offset(offset))
                .await?;

            if response.content.is_empty() {
                println!("No incomes in the last seven days");
            }
            for income in &response.content {
                println!(
                    "{}  {}  {:>12}  {}{}",
                    income.approved_receipt_uuid,
                    income
                        .operation_time
                        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default(),
                    income.total_amount.map(|a| a.to_string()).unwrap_or_default(),
                    income.name.as_deref().unwrap_or(""),
                    if income.is_cancelled() { "  [cancelled]" } else { "" },
                );
            }
            if response.has_more {
                println!("… more available, use --offset {}", offset + limit);
            }
        }
    }
    Ok(())
}
