//! Pipeline services

pub mod batch_processor;
pub mod google_books_client;
pub mod metadata_merger;
pub mod normalize;
pub mod open_library_client;
pub mod pipeline;
pub mod rate_limiter;
pub mod sheet_updater;
pub mod snapshot;
pub mod title_matcher;

pub use batch_processor::BatchProcessor;
pub use google_books_client::GoogleBooksClient;
pub use open_library_client::OpenLibraryClient;
pub use pipeline::MetadataPipeline;
pub use rate_limiter::RateLimiter;
pub use sheet_updater::SheetUpdater;
