use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::dictionary::{DictionaryError, DictionaryPort, WordListDictionary};
use crate::ladder::Difficulty;

/// Dictionary double with a fixed word set, a queue of random words, a
/// switchable outage and an optional validation delay.
#[derive(Default)]
pub(crate) struct ScriptedDictionary {
    words: WordListDictionary,
    random: Mutex<VecDeque<String>>,
    offline: AtomicBool,
    delay: Mutex<Option<Duration>>,
    validations: AtomicUsize,
}

impl ScriptedDictionary {
    pub(crate) fn new(words: &[&str]) -> Self {
        Self {
            words: WordListDictionary::from_words(words.iter().copied(), Difficulty::Medium),
            ..Self::default()
        }
    }

    pub(crate) fn queue_random(&self, words: &[&str]) {
        let mut queue = self.random.lock().unwrap();
        queue.extend(words.iter().map(|w| w.to_uppercase()));
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub(crate) fn validations(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check_online(&self) -> Result<(), DictionaryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(DictionaryError::Unavailable("scripted outage".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DictionaryPort for ScriptedDictionary {
    async fn is_valid_word(&self, word: &str) -> Result<bool, DictionaryError> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        self.check_online()?;
        Ok(self.words.contains(word))
    }

    async fn random_word(
        &self,
        _length: usize,
        _difficulty: Difficulty,
    ) -> Result<Option<String>, DictionaryError> {
        self.wait().await;
        self.check_online()?;
        Ok(self.random.lock().unwrap().pop_front())
    }

    async fn neighbor_words(
        &self,
        word: &str,
        limit: usize,
    ) -> Result<Vec<String>, DictionaryError> {
        self.check_online()?;
        let mut found = self.words.neighbors(word);
        found.truncate(limit);
        Ok(found)
    }
}
