//! "Who reacted" panel shared by the control and the summary

use std::sync::Arc;

use adda_core::{DomainResult, EngagementApi, EntityRef, Reactor};
use parking_lot::Mutex;

/// What the reactors panel shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReactorsState {
    #[default]
    Closed,
    Loading,
    Loaded(Vec<Reactor>),
    Failed(String),
}

impl ReactorsState {
    #[inline]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

#[derive(Debug, Default)]
struct PanelInner {
    state: ReactorsState,
    generation: u64,
}

/// Reactors list, fetched fresh on every open and never cached.
///
/// Each open or close bumps a generation; a fetch that completes after a
/// newer open or a close leaves the panel alone.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReactorsPanel {
    inner: Arc<Mutex<PanelInner>>,
}

impl ReactorsPanel {
    pub(crate) async fn open(
        &self,
        api: &dyn EngagementApi,
        entity: &EntityRef,
    ) -> DomainResult<Vec<Reactor>> {
        let generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.state = ReactorsState::Loading;
            inner.generation
        };

        let result = api.list_reactors(entity).await;

        let mut inner = self.inner.lock();
        if inner.generation == generation {
            inner.state = match &result {
                Ok(reactors) => ReactorsState::Loaded(reactors.clone()),
                Err(e) => ReactorsState::Failed(e.user_message()),
            };
        }
        result
    }

    pub(crate) fn close(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = ReactorsState::Closed;
    }

    pub(crate) fn state(&self) -> ReactorsState {
        self.inner.lock().state.clone()
    }
}
