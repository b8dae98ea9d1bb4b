pub mod billing;
pub mod company;
pub mod event;
pub mod organisation;
pub mod pack;
pub mod partnership;
pub mod selection;
pub mod ticket;

pub use billing::{BillingContact, BillingRecord, InvoiceStatus};
pub use company::Company;
pub use event::Event;
pub use organisation::Organisation;
pub use pack::{
    OptionKind, OptionTranslation, PackCatalog, PackOption, SelectableValue, SponsoringOption,
    SponsoringPack,
};
pub use partnership::{
    Communication, Contact, DecisionStatus, PackSource, Partnership, PartnershipDocuments,
    Suggestion, ValidatedPackRef,
};
pub use selection::{OptionSelection, PartnershipOption};
pub use ticket::{Ticket, TicketHolder};
