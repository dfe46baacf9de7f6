pub mod answer;
pub mod document_loader;
pub mod metrics;
pub mod providers;
pub mod triggers;

pub use answer::AnswerService;
pub use document_loader::{DocumentLoadError, DocumentLoader, FileDocumentLoader, StaticDocumentLoader};
pub use triggers::TriggerTable;
