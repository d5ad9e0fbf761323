use std::path::PathBuf;
use std::rc::Rc;

use serde::Deserialize;

use crate::attendance::SubjectStore;
use crate::db;
use crate::kv::KvStore;
use crate::laundry::LaundryStore;
use crate::spending::SpendingStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// The three module stores of one workspace, all backed by the same file.
pub struct Stores {
    pub attendance: SubjectStore,
    pub laundry: LaundryStore,
    pub spending: SpendingStore,
}

impl Stores {
    pub fn load(kv: Rc<dyn KvStore>) -> Self {
        Stores {
            attendance: SubjectStore::load(kv.clone()),
            laundry: LaundryStore::load(kv.clone()),
            spending: SpendingStore::load(kv),
        }
    }
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub stores: Option<Stores>,
}

impl AppState {
    pub fn open_workspace(&mut self, path: PathBuf) -> anyhow::Result<()> {
        let conn = db::open_db(&path)?;
        self.stores = Some(Stores::load(Rc::new(conn)));
        tracing::info!(workspace = %path.to_string_lossy(), "workspace opened");
        self.workspace = Some(path);
        Ok(())
    }
}
