mod api_config_repo;
mod generation_repo;
mod ledger_repo;
mod profile_repo;
mod session_repo;

pub use api_config_repo::ApiConfigRepo;
pub use generation_repo::GenerationRepo;
pub use ledger_repo::{LedgerError, LedgerRepo};
pub use profile_repo::{ProfileRepo, QuotaResource};
pub use session_repo::SessionRepo;
