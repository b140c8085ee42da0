pub mod deploy;
pub mod export;
pub mod import;
pub mod index;
pub mod init;

pub use deploy::{deploy, DeployArgs};
pub use export::{export, ExportArgs};
pub use import::{import_content, import_tokens, ImportArgs};
pub use index::{index, IndexArgs};
pub use init::{init, InitArgs};
