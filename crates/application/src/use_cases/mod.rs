pub mod refresh_blocklists;

pub use refresh_blocklists::RefreshBlocklistsUseCase;
