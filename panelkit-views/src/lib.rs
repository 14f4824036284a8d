//! View resolution and translation
//!
//! Both halves work the same way: build a list of candidate identifiers from
//! most to least specific, then ask a collaborator which one exists. The
//! collaborators are traits ([`ViewCatalog`], [`Translations`]) so the chains
//! can be tested without templates or locale files on disk.

mod catalog;
mod error;
mod resolver;
mod translate;

pub use catalog::{DirectoryViewCatalog, MemoryViewCatalog, ViewCatalog};
pub use error::{Result, ViewsError};
pub use resolver::ViewResolver;
pub use translate::{MemoryTranslations, Translations, Translator};
