//! Backend services.

pub mod clipboard;
pub mod context_menu;
pub mod dispatcher;
pub mod formatter;
pub mod option_store;
pub mod privacy;
pub mod storage;

pub use clipboard::{Clipboard, SystemClipboard};
pub use context_menu::{register_menus, MenuRegistry};
pub use dispatcher::{DispatchOutcome, Dispatcher, Trigger};
pub use option_store::OptionStore;
pub use storage::open_backend;
