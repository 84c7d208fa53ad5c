use clap::{Args, Parser, Subcommand, ValueEnum};
use npd_api::endpoints::Amount;

#[derive(Debug, Parser)]
#[command(name = "npd")]
#[command(about = "Command line client for the self-employed tax service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Taxpayer INN to act as (overrides `client.default_inn`)
    #[arg(long, global = true)]
    pub inn: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with INN and password
    Login {
        /// Account password; prompted for when absent
        #[arg(long, env = "NPD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Show stored token state
    Status,

    /// Exchange the refresh token for a new access token
    Refresh,

    /// Declare, cancel and list incomes
    #[command(subcommand)]
    Income(IncomeCommand),

    /// Manage invoices
    #[command(subcommand)]
    Invoice(InvoiceCommand),

    /// List saved payment options
    PaymentOptions,
}

#[derive(Debug, Subcommand)]
pub enum IncomeCommand {
    /// Register an income and print the receipt id
    Declare {
        #[command(flatten)]
        service: ServiceArgs,

        #[command(flatten)]
        client: ClientArgs,

        /// Money was received on a bank account rather than in cash
        #[arg(long)]
        account: bool,
    },

    /// Cancel a previously declared income
    Cancel {
        receipt_uuid: String,

        /// Cancel because the money was returned
        #[arg(long)]
        refund: bool,
    },

    /// List recent incomes
    List {
        #[arg(short, long, default_value = "10")]
        limit: u32,

        #[arg(long, default_value = "0")]
        offset: u32,
    },
}

#[derive(Debug, Subcommand)]
pub enum InvoiceCommand {
    /// Create an invoice paid through a saved payment option
    Create {
        /// Counterparty name shown on the invoice
        #[arg(long)]
        client_name: String,

        /// Payment option id (from `npd payment-options`)
        #[arg(long)]
        payment_option: i64,

        #[command(flatten)]
        service: ServiceArgs,

        #[command(flatten)]
        client: ClientArgs,
    },

    /// List invoices
    List {
        #[arg(short, long, default_value = "10")]
        limit: u32,

        #[arg(long, default_value = "0")]
        offset: u32,
    },

    /// Cancel an invoice
    Cancel { invoice_id: i64 },

    /// Mark an invoice as paid
    Approve { invoice_id: i64 },

    /// Issue the receipt for a paid invoice
    Complete { invoice_id: i64 },
}

#[derive(Debug, Args)]
pub struct ServiceArgs {
    /// Service description
    #[arg(long)]
    pub name: String,

    /// Unit price in rubles, e.g. 1500 or 1500.50
    #[arg(long)]
    pub amount: Amount,

    #[arg(long, default_value = "1")]
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ClientKind {
    #[default]
    Individual,
    Legal,
    Foreign,
}

#[derive(Debug, Args)]
pub struct ClientArgs {
    #[arg(long, value_enum, default_value_t = ClientKind::Individual)]
    pub client_type: ClientKind,

    /// Counterparty INN (legal entities)
    #[arg(long)]
    pub client_inn: Option<String>,

    #[arg(long)]
    pub client_display_name: Option<String>,

    #[arg(long)]
    pub client_phone: Option<String>,

    #[arg(long)]
    pub client_email: Option<String>,
}
