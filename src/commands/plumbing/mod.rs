pub mod snapshot;
pub mod write_commit;
