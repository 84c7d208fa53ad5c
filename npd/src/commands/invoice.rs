use anyhow::{Context, Result};

use npd_api::endpoints::invoice::Invoice;
use npd_api::{Client, Request};

use super::{client_info, service};
use crate::cli::InvoiceCommand;

pub async fn run(client: &Client, command: InvoiceCommand) -> Result<()> {
    match command {
        InvoiceCommand::Create {
            client_name,
            payment_option,
            service: service_args,
            client: client_args,
        } => {
            let options = client.send(Request::payment_options().list()).await?;
            let payment = options
                .items
                .iter()
                .find(|option| option.id == payment_option)
                .with_context(|| format!("payment option {} not found", payment_option))?
                .details()
                .with_context(|| format!("payment option {} is incomplete", payment_option))?;

            let request = Request::invoices()
                .create(client_name, payment, vec![service(service_args)])
                .client(client_info(client_args));
            let invoice = client.send(request).await?;
            print_invoice(&invoice);
            if let Some(url) = &invoice.url {
                println!("Payment page: {}", url);
            }
        }
        InvoiceCommand::List { limit, offset } => {
            let response = client
                .send(Request::invoices().list().limit(limit).offset(offset))
                .await?;
            if response.items.is_empty() {
                println!("No invoices in the last seven days");
            }
            response.items.iter().for_each(print_invoice);
        }
        InvoiceCommand::Cancel { invoice_id } => {
            print_invoice(&client.send(Request::invoices().cancel(invoice_id)).await?);
        }
        InvoiceCommand::Approve { invoice_id } => {
            print_invoice(&client.send(Request::invoices().approve(invoice_id)).await?);
        }
        InvoiceCommand::Complete { invoice_id } => {
            let invoice = client.send(Request::invoices().complete(invoice_id)).await?;
            print_invoice(&invoice);
            if let Some(receipt_id) = &invoice.receipt_id {
                println!("Receipt: {}", receipt_id);
            }
        }
    }
    Ok(())
}

pub async fn payment_options(client: &Client) -> Result<()> {
    let options = client.send(Request::payment_options().list()).await?;
    for option in &options.items {
        println!(
            "{:>6}  {:?}  {}  {}{}",
            option.id,
            option.method,
            option.bank_name.as_deref().unwrap_or("-"),
            option
                .phone
                .as_deref()
                .or(option.current_account.as_deref())
                .unwrap_or("-"),
            if option.favorite { "  *" } else { "" },
        );
    }
    Ok(())
}

fn print_invoice(invoice: &Invoice) {
    println!(
        "#{}  {:?}  {:>12}  {}",
        invoice.invoice_id,
        invoice.status,
        invoice.total_amount,
        invoice.client_display_name.as_deref().unwrap_or("-"),
    );
}
