use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReadDirStream;

use crate::plugin_system::catalog::PluginCatalog;
use crate::plugin_system::error::DiscoveryError;
use crate::plugin_system::manifest::{DescriptorBuilder, ENTRY_MODULE_FILE, PluginDescriptor, descriptor_file_names};

/// Result of one discovery pass
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Sorted by name, ties broken by search-root order
    pub plugins: Vec<Arc<PluginDescriptor>>,
    /// Roots and candidates that were skipped
    pub errors: Vec<DiscoveryError>,
}

/// Finds plugin directories under a list of search roots.
///
/// Discovery never constructs a plugin. Metadata comes from the sidecar
/// descriptor when there is one, otherwise from the catalog entry's embedded
/// metadata, otherwise from the directory name.
#[derive(Debug, Clone)]
pub struct PluginDiscovery {
    catalog: Arc<PluginCatalog>,
}

impl PluginDiscovery {
    pub fn new(catalog: Arc<PluginCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn discover(&self, roots: &[PathBuf]) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();
        for (index, root) in roots.iter().enumerate() {
            if let Err(e) = self.scan_root(index, root, &mut report).await {
                log::warn!("Skipping plugin search root: {}", e);
                report.errors.push(e);
            }
        }
        report.plugins.sort_by(|a, b| {
            a.name()
                .cmp(b.name())
                .then(a.search_root().cmp(&b.search_root()))
                .then_with(|| a.location().cmp(b.location()))
        });
        log::info!(
            "Discovered {} plugin(s) in {} search root(s)",
            report.plugins.len(),
            roots.len()
        );
        report
    }

    async fn scan_root(
        &self,
        index: usize,
        root: &Path,
        report: &mut DiscoveryReport,
    ) -> Result<(), DiscoveryError> {
        let metadata = fs::metadata(root)
            .await
            .map_err(|source| DiscoveryError::UnreadableRoot { path: root.to_path_buf(), source })?;
        if !metadata.is_dir() {
            return Err(DiscoveryError::NotADirectory { path: root.to_path_buf() });
        }

        let read_dir = fs::read_dir(root)
            .await
            .map_err(|source| DiscoveryError::UnreadableRoot { path: root.to_path_buf(), source })?;
        let mut entries = ReadDirStream::new(read_dir);

        while let Some(entry) = entries.next().await {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    report.errors.push(DiscoveryError::Io { path: root.to_path_buf(), source });
                    continue;
                }
            };
            let path = entry.path();
            if is_hidden_or_private(&path) {
                continue;
            }
            match fs::metadata(&path).await {
                Ok(meta) if meta.is_dir() => {}
                _ => continue,
            }
            match self.inspect_candidate(index, &path).await {
                Ok(Some(descriptor)) => {
                    log::debug!("Found plugin '{}' at {}", descriptor.name(), path.display());
                    report.plugins.push(Arc::new(descriptor));
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Skipping plugin candidate {}: {}", path.display(), e);
                    report.errors.push(e);
                }
            }
        }
        Ok(())
    }

    /// `None` when the directory has no entry module.
    async fn inspect_candidate(
        &self,
        index: usize,
        dir: &Path,
    ) -> Result<Option<PluginDescriptor>, DiscoveryError> {
        let entry_path = dir.join(ENTRY_MODULE_FILE);
        if !is_file(&entry_path).await {
            return Ok(None);
        }
        let entry_content = fs::read_to_string(&entry_path)
            .await
            .map_err(|source| DiscoveryError::Io { path: entry_path.clone(), source })?;
        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let entry = match entry_content.trim() {
            "" => dir_name,
            reference => reference.to_string(),
        };

        let builder = DescriptorBuilder::new(dir.to_path_buf(), entry.clone(), index);
        for file_name in descriptor_file_names() {
            let sidecar = dir.join(file_name);
            if !is_file(&sidecar).await {
                continue;
            }
            let content = fs::read_to_string(&sidecar)
                .await
                .map_err(|source| DiscoveryError::Io { path: sidecar.clone(), source })?;
            return Ok(Some(builder.sidecar(&sidecar, &content)?.build()));
        }

        let builder = match self.catalog.metadata(&entry) {
            Some(metadata) => builder.embedded(metadata),
            None => builder,
        };
        Ok(Some(builder.build()))
    }
}

fn is_hidden_or_private(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with('.') || name.starts_with('_'))
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}
