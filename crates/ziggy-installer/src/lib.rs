mod artifact;
mod download;
mod layout;
mod lock;
mod pointer;
mod store;

pub use artifact::unpack_into_store;
pub use download::{ArchiveInstaller, DownloadObserver, HttpArchiveInstaller};
pub use layout::StoreLayout;
pub use lock::StoreLock;
pub use pointer::{
    link_provider_for, ActivePointer, LinkProvider, LinkState, PosixLinkProvider,
    WindowsLinkProvider,
};
pub use store::{InstallStore, RemoveOutcome};
