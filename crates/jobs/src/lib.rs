pub mod blocklist_sync;

pub use blocklist_sync::BlocklistSyncJob;
