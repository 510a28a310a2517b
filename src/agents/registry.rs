//! Lazily built specialists, at most one per resource.

use crate::{
    agents::{Agent, SpecialistAgent, SpecialistConfig},
    catalog::SummaryRecord,
    llm::CompletionService,
    resources::{ResourceLayout, ResourceLoader},
    types::{AppError, Result},
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Owns the specialists of one coordinator.
///
/// An agent is created the first time its resource is asked about and then
/// reused; the map is bounded by the number of resources.
pub struct AgentRegistry {
    llm: Arc<dyn CompletionService>,
    loader: Arc<dyn ResourceLoader>,
    layout: ResourceLayout,
    summaries: HashMap<u32, SummaryRecord>,
    config: SpecialistConfig,
    agents: Mutex<HashMap<u32, AgentSlot>>,
}

/// Filled by the first caller for an id; later callers wait on it.
type AgentSlot = Arc<Mutex<Option<Arc<SpecialistAgent>>>>;

impl AgentRegistry {
    pub fn new(
        llm: Arc<dyn CompletionService>,
        loader: Arc<dyn ResourceLoader>,
        layout: ResourceLayout,
        summaries: impl IntoIterator<Item = (u32, SummaryRecord)>,
        config: SpecialistConfig,
    ) -> Self {
        Self {
            llm,
            loader,
            layout,
            summaries: summaries.into_iter().collect(),
            config,
            agents: Mutex::new(HashMap::new()),
        }
    }

    pub fn layout(&self) -> &ResourceLayout {
        &self.layout
    }

    /// Catalog entries in ascending id order.
    pub fn summaries(&self) -> Vec<(u32, &SummaryRecord)> {
        let mut summaries: Vec<_> = self.summaries.iter().map(|(id, s)| (*id, s)).collect();
        summaries.sort_unstable_by_key(|(id, _)| *id);
        summaries
    }

    /// Number of agents built so far.
    pub fn len(&self) -> usize {
        let slots: Vec<AgentSlot> = self.agents.lock().values().cloned().collect();
        slots.iter().filter(|slot| slot.lock().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The agent for `id`, building it on first use.
    pub fn get_or_create(&self, id: i64) -> Result<Arc<dyn Agent>> {
        let summary = u32::try_from(id)
            .ok()
            .filter(|_| self.layout.is_valid(id))
            .and_then(|id| self.summaries.get(&id).map(|s| (id, s)));
        let Some((id, summary)) = summary else {
            return Err(AppError::InvalidInput(self.layout.invalid_id_message(id)));
        };

        // The map lock only guards slot lookup; loading holds the id's slot.
        let slot = self.agents.lock().entry(id).or_default().clone();
        let mut built = slot.lock();
        if let Some(agent) = built.as_ref() {
            return Ok(agent.clone());
        }

        let resource = self.loader.load(id)?;
        let agent = Arc::new(SpecialistAgent::new(
            resource,
            summary.title.clone(),
            summary.brief.clone(),
            self.config.clone(),
            self.llm.clone(),
        ));
        *built = Some(agent.clone());
        tracing::debug!(resource_id = id, "Created specialist agent");
        Ok(agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, InvokeOptions, Tier};
    use crate::resources::Resource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    struct Echo;

    #[async_trait]
    impl CompletionService for Echo {
        async fn invoke(&self, _: &[ChatMessage], _: &InvokeOptions) -> Result<String> {
            Ok("echo".to_string())
        }

        fn model_for(&self, _tier: Tier) -> &str {
            "echo"
        }
    }

    #[derive(Default)]
    struct CountingLoader {
        loads: AtomicUsize,
    }

    impl ResourceLoader for CountingLoader {
        fn load(&self, id: u32) -> Result<Resource> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Resource {
                id,
                category: None,
                content: format!("content {}", id),
                media_dir: None,
            })
        }
    }

    fn registry(loader: Arc<CountingLoader>) -> AgentRegistry {
        let summaries = (0..3).map(|id| {
            (
                id,
                SummaryRecord {
                    title: format!("Lecture {}", id),
                    keywords: vec!["k".to_string()],
                    brief: "b".to_string(),
                },
            )
        });
        AgentRegistry::new(
            Arc::new(Echo),
            loader,
            ResourceLayout::new(3, vec![]),
            summaries,
            SpecialistConfig::default(),
        )
    }

    #[test]
    fn test_agents_are_built_once() {
        let loader = Arc::new(CountingLoader::default());
        let registry = registry(loader.clone());

        let a = registry.get_or_create(1).unwrap();
        let b = registry.get_or_create(1).unwrap();
        assert_eq!(a.resource_id(), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    /// Blocks the load of lecture 1 until released.
    struct GatedLoader {
        entered: mpsc::SyncSender<()>,
        release: std::sync::Mutex<mpsc::Receiver<()>>,
        loads: AtomicUsize,
    }

    impl ResourceLoader for GatedLoader {
        fn load(&self, id: u32) -> Result<Resource> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if id == 1 {
                let _ = self.entered.send(());
                let release = self.release.lock().unwrap();
                release
                    .recv_timeout(Duration::from_secs(5))
                    .map_err(|_| AppError::Resource("load of lecture 1 never released".into()))?;
            }
            Ok(Resource {
                id,
                category: None,
                content: format!("content {}", id),
                media_dir: None,
            })
        }
    }

    #[test]
    fn test_slow_load_does_not_block_other_lectures() {
        let (entered_tx, entered_rx) = mpsc::sync_channel(1);
        let (release_tx, release_rx) = mpsc::channel();
        let loader = Arc::new(GatedLoader {
            entered: entered_tx,
            release: std::sync::Mutex::new(release_rx),
            loads: AtomicUsize::new(0),
        });
        let registry = AgentRegistry::new(
            Arc::new(Echo),
            loader.clone(),
            ResourceLayout::new(3, vec![]),
            (0..3).map(|id| {
                (
                    id,
                    SummaryRecord {
                        title: format!("Lecture {}", id),
                        keywords: vec!["k".to_string()],
                        brief: "b".to_string(),
                    },
                )
            }),
            SpecialistConfig::default(),
        );

        std::thread::scope(|scope| {
            let slow = scope.spawn(|| registry.get_or_create(1).map(|a| a.resource_id()));
            let waiting = scope.spawn(|| registry.get_or_create(1).map(|a| a.resource_id()));
            entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

            // Lecture 2 is built while lecture 1 is still loading
            assert_eq!(registry.get_or_create(2).unwrap().resource_id(), 2);
            release_tx.send(()).unwrap();

            assert_eq!(slow.join().unwrap().unwrap(), 1);
            assert_eq!(waiting.join().unwrap().unwrap(), 1);
        });

        // One load per lecture even with two concurrent callers for lecture 1
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalid_ids_never_touch_the_loader() {
        let loader = Arc::new(CountingLoader::default());
        let registry = registry(loader.clone());

        for id in [-1, 3, 999] {
            let err = match registry.get_or_create(id) {
                Ok(_) => panic!("Expected error for {}", id),
                Err(e) => e.to_string(),
            };
            assert!(err.contains("Valid numbers are 0-2"));
        }
        assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
        assert!(registry.is_empty());
    }
}
