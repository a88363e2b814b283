use crate::models::DisplayRecord;

/// Whether the catalog has completed at least one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingState {
    NotLoaded,
    Loaded,
}

type Subscriber = Box<dyn Fn(&[DisplayRecord]) + Send + Sync>;

/// In-memory view state: the current display sequence and the loading
/// flag. The sequence is replaced wholesale on every publish, never edited
/// in place.
pub struct View {
    records: Vec<DisplayRecord>,
    loading_state: LoadingState,
    subscribers: Vec<Subscriber>,
}

impl View {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            loading_state: LoadingState::NotLoaded,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: Fn(&[DisplayRecord]) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Replaces the display sequence and marks the view loaded. An empty
    /// sequence still counts as loaded.
    pub fn publish(&mut self, records: Vec<DisplayRecord>) {
        self.records = records;
        self.loading_state = LoadingState::Loaded;

        for subscriber in &self.subscribers {
            subscriber(&self.records);
        }
    }

    pub fn records(&self) -> &[DisplayRecord] {
        &self.records
    }

    pub fn loading_state(&self) -> LoadingState {
        self.loading_state
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}
