pub mod auth;
pub mod income;
pub mod invoice;

use npd_api::endpoints::{ClientInfo, ClientType, Service};

use crate::cli::{ClientArgs, ClientKind, ServiceArgs};

pub(crate) fn service(args: ServiceArgs) -> Service {
    Service::new(args.name, args.amount).quantity(args.quantity)
}

pub(crate) fn client_info(args: ClientArgs) -> ClientInfo {
    ClientInfo {
        client_type: match args.client_type {
            ClientKind::Individual => ClientType::Individual,
            ClientKind::Legal => ClientType::LegalEntity,
            ClientKind::Foreign => ClientType::ForeignAgency,
        },
        inn: args.client_inn,
        name: args.client_display_name,
        phone: args.client_phone,
        email: args.client_email,
    }
}
