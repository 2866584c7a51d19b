use async_trait::async_trait;
use serde_json::Value;
use showroom_core::{Entity, SourceError};
use tokio::sync::Mutex;

use super::{Candidate, SourceAdapter, SourceKind};

/// One-shot injected value.
///
/// The first fetch takes the value whatever id it asks for, so a handoff
/// is never served twice.
pub struct PreloadedSource {
    slot: Mutex<Option<Candidate>>,
}

impl PreloadedSource {
    pub const LABEL: &'static str = "preloaded";

    pub fn raw(payload: Value) -> Self {
        Self {
            slot: Mutex::new(Some(Candidate::Raw(payload))),
        }
    }

    pub fn entity(entity: Entity) -> Self {
        Self {
            slot: Mutex::new(Some(Candidate::Entity(entity))),
        }
    }

    pub async fn is_consumed(&self) -> bool {
        self.slot.lock().await.is_none()
    }
}

#[async_trait]
impl SourceAdapter for PreloadedSource {
    fn label(&self) -> &str {
        Self::LABEL
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Preloaded
    }

    async fn fetch(&self, _id: &str) -> Result<Option<Candidate>, SourceError> {
        Ok(self.slot.lock().await.take())
    }
}
