//! JSON file store
//!
//! Keeps all records in one JSON document, loaded at startup and
//! rewritten on every change (write to a temp file, then rename).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ticket_printer::{BusinessConfig, SaleDocument, TicketConfig};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{PosStore, StoreResult};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    business: Option<BusinessConfig>,
    #[serde(default)]
    ticket: Option<TicketConfig>,
    #[serde(default)]
    sales: BTreeMap<i64, SaleDocument>,
}

/// Store backed by a single JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl JsonFileStore {
    /// Open the store, starting empty if the file does not exist
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Store file not found, starting empty");
                StoreData::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, data: &StoreData) -> StoreResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), "Store persisted");
        Ok(())
    }

    /// Apply a change and persist it, keeping memory unchanged on failure
    async fn update<T>(&self, change: impl FnOnce(&mut StoreData) -> T) -> StoreResult<T> {
        let mut data = self.data.write().await;
        let mut next = data.clone();
        let out = change(&mut next);
        self.persist(&next).await?;
        *data = next;
        Ok(out)
    }
}

#[async_trait]
impl PosStore for JsonFileStore {
    async fn business_config(&self) -> StoreResult<Option<BusinessConfig>> {
        Ok(self.data.read().await.business.clone())
    }

    async fn save_business_config(&self, config: BusinessConfig) -> StoreResult<BusinessConfig> {
        self.update(|data| {
            data.business = Some(config.clone());
            config
        })
        .await
    }

    async fn ticket_config(&self) -> StoreResult<Option<TicketConfig>> {
        Ok(self.data.read().await.ticket.clone())
    }

    async fn save_ticket_config(&self, config: TicketConfig) -> StoreResult<TicketConfig> {
        self.update(|data| {
            data.ticket = Some(config.clone());
            config
        })
        .await
    }

    async fn set_printer_name(&self, name: &str) -> StoreResult<()> {
        self.update(|data| {
            data.ticket.get_or_insert_with(TicketConfig::default).printer_name =
                Some(name.to_string());
        })
        .await
    }

    async fn sale(&self, id: i64) -> StoreResult<Option<SaleDocument>> {
        Ok(self.data.read().await.sales.get(&id).cloned())
    }

    async fn put_sale(&self, sale: SaleDocument) -> StoreResult<()> {
        self.update(|data| {
            data.sales.insert(sale.id, sale);
        })
        .await
    }
}
