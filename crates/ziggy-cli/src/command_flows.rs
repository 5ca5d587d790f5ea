use anyhow::Result;
use tracing::{debug, info};
use ziggy_catalog::{load_catalog, CatalogSource};
use ziggy_core::{EntryName, VersionRequest, ZiggyConfig, ZiggyError, DEV_SENTINEL};
use ziggy_installer::{
    ActivePointer, ArchiveInstaller, InstallStore, RemoveOutcome, StoreLayout, StoreLock,
};
use ziggy_resolver::{resolve, supported_versions, ArtifactReference};

/// Everything a command needs, built once from the loaded configuration.
pub(crate) struct Session<'a> {
    pub(crate) config: &'a ZiggyConfig,
    pub(crate) layout: StoreLayout,
    pub(crate) store: InstallStore,
    pub(crate) pointer: ActivePointer,
}

impl<'a> Session<'a> {
    pub(crate) fn new(config: &'a ZiggyConfig) -> Self {
        let layout = StoreLayout::new(&config.store_root);
        let pointer = ActivePointer::new(&config.link_path, layout.clone(), config.platform);
        Self::with_pointer(config, pointer)
    }

    pub(crate) fn with_pointer(config: &'a ZiggyConfig, pointer: ActivePointer) -> Self {
        let layout = StoreLayout::new(&config.store_root);
        Self {
            config,
            store: InstallStore::new(layout.clone()),
            layout,
            pointer,
        }
    }

    fn lock(&self) -> Result<StoreLock> {
        self.layout.ensure_base_dirs()?;
        Ok(StoreLock::acquire(&self.layout)?)
    }

    fn resolve(&self, requested: &str, catalog: &dyn CatalogSource) -> Result<ArtifactReference> {
        let entries = load_catalog(catalog)?;
        let artifact =
            resolve(requested, self.config.platform, &entries).map_err(ZiggyError::from)?;
        debug!(
            requested,
            artifact = %artifact.artifact_name,
            "resolved artifact"
        );
        Ok(artifact)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InstallOutcome {
    Installed { entry: String },
    AlreadyInstalled { entry: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PrimaryOutcome {
    Activated { entry: String },
    AlreadyActive { entry: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UpgradeOutcome {
    UpToDate {
        entry: String,
    },
    Upgraded {
        entry: String,
        replaced: Vec<String>,
        activated: bool,
        deactivated: bool,
    },
}

pub(crate) fn run_install_command(
    session: &Session<'_>,
    version: &str,
    catalog: &dyn CatalogSource,
    installer: &dyn ArchiveInstaller,
) -> Result<InstallOutcome> {
    let request = VersionRequest::parse(version)?;
    let _lock = session.lock()?;
    if let Some(entry) = session.store.has(&request)? {
        return Ok(InstallOutcome::AlreadyInstalled { entry });
    }

    let artifact = session.resolve(request.as_str(), catalog)?;
    let entry = installer.fetch_and_unpack(&artifact)?;
    session.store.add(&entry)?;
    info!(entry = %entry, "installed");
    Ok(InstallOutcome::Installed { entry })
}

pub(crate) fn run_primary_command(session: &Session<'_>, version: &str) -> Result<PrimaryOutcome> {
    let request = VersionRequest::parse(version)?;
    let _lock = session.lock()?;
    let Some(entry) = session.store.has(&request)? else {
        return Err(ZiggyError::NotInstalled {
            version: request.to_string(),
        }
        .into());
    };

    if session.pointer.current()?.as_deref() == Some(entry.as_str()) {
        return Ok(PrimaryOutcome::AlreadyActive { entry });
    }
    session.pointer.set(&entry)?;
    Ok(PrimaryOutcome::Activated { entry })
}

pub(crate) fn run_show_primary_command(session: &Session<'_>) -> Result<Option<String>> {
    Ok(session.pointer.current()?)
}

pub(crate) fn run_destroy_command(session: &Session<'_>, version: &str) -> Result<RemoveOutcome> {
    let request = VersionRequest::parse(version)?;
    let _lock = session.lock()?;
    let Some(entry) = session.store.has(&request)? else {
        return Err(ZiggyError::NotInstalled {
            version: request.to_string(),
        }
        .into());
    };
    Ok(session.store.remove(&entry, &session.pointer)?)
}

/// Installs the current development build and removes the development
/// builds it supersedes. Activation is left to `primary` unless the
/// configuration opts in.
pub(crate) fn run_upgrade_command(
    session: &Session<'_>,
    catalog: &dyn CatalogSource,
    installer: &dyn ArchiveInstaller,
) -> Result<UpgradeOutcome> {
    let _lock = session.lock()?;
    let artifact = session.resolve(DEV_SENTINEL, catalog)?;
    let installed = session.store.list()?;
    if installed.contains(&artifact.entry_name) {
        return Ok(UpgradeOutcome::UpToDate {
            entry: artifact.entry_name,
        });
    }

    let superseded = installed
        .into_iter()
        .filter(|name| EntryName::parse(name).is_some_and(|parsed| parsed.is_dev()))
        .collect::<Vec<_>>();

    let entry = installer.fetch_and_unpack(&artifact)?;
    session.store.add(&entry)?;

    let mut deactivated = false;
    for old in &superseded {
        let removed = session.store.remove(old, &session.pointer)?;
        deactivated |= removed.was_active;
    }

    let activated = session.config.activate_on_upgrade;
    if activated {
        session.pointer.set(&entry)?;
    }
    info!(entry = %entry, replaced = superseded.len(), activated, "upgraded");
    Ok(UpgradeOutcome::Upgraded {
        entry,
        replaced: superseded,
        activated,
        deactivated,
    })
}

pub(crate) fn run_list_installed_command(session: &Session<'_>) -> Result<Vec<String>> {
    Ok(session.store.list()?.into_iter().collect())
}

pub(crate) fn run_list_supported_command(
    session: &Session<'_>,
    catalog: &dyn CatalogSource,
) -> Result<Vec<String>> {
    let entries = load_catalog(catalog)?;
    Ok(supported_versions(session.config.platform, &entries))
}
