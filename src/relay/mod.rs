//! Streaming answer relay with response caching.
//!
//! A query is answered from the cache when possible. Otherwise the relay
//! retrieves context, starts a streamed completion and hands the caller a
//! stream of segments, while a per-request session accumulates the full
//! text and caches it once the completion finishes cleanly.

mod session;

use crate::cache::{MemoryResponseCache, ResponseCache};
use crate::config::Settings;
use crate::embedding::create_embedder;
use crate::error::{RelayError, Result};
use crate::generation::{Generator, OpenAIGenerator};
use crate::rag::{build_augmented_prompt, Retriever};
use crate::vector_store::create_index;
use futures::TryStreamExt;
use session::StreamSession;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, instrument};

/// Segments in flight between the session task and the consumer.
const RELAY_BUFFER: usize = 16;

/// Stream of answer segments handed to the caller.
pub type RelayStream = ReceiverStream<Result<String>>;

/// Outcome of a relay request.
pub enum RelayReply {
    /// The full answer, served from the cache without any upstream calls.
    Cached(String),
    /// Answer segments in arrival order. An `Err` item aborts the answer.
    Streaming(RelayStream),
}

/// Answers queries by relaying streamed completions and caching them.
pub struct RagRelay {
    cache: Arc<dyn ResponseCache>,
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    system_prompt: String,
    ttl: Duration,
}

impl RagRelay {
    /// Create a relay from already-constructed collaborators.
    pub fn new(
        cache: Arc<dyn ResponseCache>,
        retriever: Retriever,
        generator: Arc<dyn Generator>,
        system_prompt: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            retriever,
            generator,
            system_prompt: system_prompt.into(),
            ttl,
        }
    }

    /// Build every collaborator named in `settings`.
    ///
    /// Secrets are read and remote handles resolved here, so a bad
    /// configuration fails at startup rather than on the first query.
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let generator: Arc<dyn Generator> = Arc::new(OpenAIGenerator::from_settings(&settings.generation)?);
        let embedder = create_embedder(&settings.embedding)?;
        let index = create_index(settings).await?;

        let retriever = Retriever::new(embedder, index)
            .with_namespace(settings.vector_store.namespace.clone())
            .with_top_k(settings.vector_store.top_k);

        let cache: Arc<dyn ResponseCache> = Arc::new(MemoryResponseCache::from_settings(&settings.cache));

        info!(
            embedding = %settings.embedding.provider,
            vector_store = %settings.vector_store.provider,
            model = %settings.generation.model,
            "Relay initialized"
        );

        Ok(Self::new(
            cache,
            retriever,
            generator,
            settings.prompts.system.clone(),
            settings.cache.ttl(),
        ))
    }

    /// Answer `query`, from the cache or as a stream of segments.
    ///
    /// Errors returned here happen before any segment exists and leave the
    /// cache untouched.
    #[instrument(skip(self))]
    pub async fn respond(&self, query: &str) -> Result<RelayReply> {
        if query.trim().is_empty() {
            return Err(RelayError::InvalidInput("query must not be empty".to_string()));
        }

        if let Some(cached) = self.cache.get(query).await? {
            info!("Cache hit ({} chars)", cached.len());
            return Ok(RelayReply::Cached(cached));
        }

        let contexts = self.retriever.retrieve(query).await?;
        let prompt = build_augmented_prompt(&contexts, query);
        debug!("Augmented prompt is {} chars", prompt.len());

        let segments = self
            .generator
            .complete_stream(&self.system_prompt, &prompt)
            .await?;

        let (tx, rx) = mpsc::channel(RELAY_BUFFER);
        let session = StreamSession::new(query, Arc::clone(&self.cache), self.ttl);
        tokio::spawn(session.run(segments, tx));

        Ok(RelayReply::Streaming(ReceiverStream::new(rx)))
    }

    /// Answer `query` as one string.
    ///
    /// A streamed answer is collected in full, which also caches it.
    pub async fn answer(&self, query: &str) -> Result<String> {
        match self.respond(query).await? {
            RelayReply::Cached(text) => Ok(text),
            RelayReply::Streaming(stream) => {
                stream
                    .try_fold(String::new(), |mut full, segment| async move {
                        full.push_str(&segment);
                        Ok(full)
                    })
                    .await
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted collaborators shared by the relay and server tests.

    use crate::embedding::Embedder;
    use crate::error::{RelayError, Result};
    use crate::generation::{Generator, TextStream};
    use crate::vector_store::{Match, Record, VectorIndex};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// One step of a scripted completion.
    #[derive(Clone)]
    pub enum Step {
        Text(&'static str),
        Fail,
    }

    #[derive(Default)]
    pub struct CountingEmbedder {
        pub calls: AtomicUsize,
        pub fail: bool,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RelayError::Embedding("embedding service down".to_string()));
            }
            Ok(vec![1.0, 0.0])
        }

        fn model(&self) -> &str {
            "counting"
        }
    }

    #[derive(Default)]
    pub struct CountingIndex {
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl VectorIndex for CountingIndex {
        async fn query(&self, _vector: &[f32], top_k: usize, _namespace: &str) -> Result<Vec<Match>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let records = [
                Record::with_text("1", vec![], "Prof. Ada: 5/5"),
                Record::with_text("2", vec![], "Prof. Bo: 4/5"),
            ];
            Ok(records
                .into_iter()
                .take(top_k)
                .map(|r| Match {
                    id: r.id,
                    score: 1.0,
                    metadata: r.metadata,
                })
                .collect())
        }
    }

    /// Plays back a fixed script on every call.
    pub struct ScriptedGenerator {
        pub script: Vec<Step>,
        pub calls: AtomicUsize,
        pub last_user_prompt: std::sync::Mutex<Option<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(script: Vec<Step>) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
                last_user_prompt: std::sync::Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn complete_stream(&self, _system_prompt: &str, user_prompt: &str) -> Result<TextStream> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_user_prompt.lock().unwrap() = Some(user_prompt.to_string());
            let items: Vec<Result<String>> = self
                .script
                .iter()
                .map(|step| match step {
                    Step::Text(t) => Ok(t.to_string()),
                    Step::Fail => Err(RelayError::Generation("upstream reset".to_string())),
                })
                .collect();
            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    pub struct Fixture {
        pub embedder: Arc<CountingEmbedder>,
        pub index: Arc<CountingIndex>,
        pub generator: Arc<ScriptedGenerator>,
        pub cache: Arc<crate::cache::MemoryResponseCache>,
    }

    impl Fixture {
        pub fn new(script: Vec<Step>) -> Self {
            Self {
                embedder: Arc::new(CountingEmbedder::default()),
                index: Arc::new(CountingIndex::default()),
                generator: Arc::new(ScriptedGenerator::new(script)),
                cache: Arc::new(crate::cache::MemoryResponseCache::default()),
            }
        }

        pub fn failing_retrieval(mut self) -> Self {
            self.embedder = Arc::new(CountingEmbedder {
                calls: AtomicUsize::new(0),
                fail: true,
            });
            self
        }

        pub fn relay(&self) -> super::RagRelay {
            let retriever = crate::rag::Retriever::new(self.embedder.clone(), self.index.clone())
                .with_namespace("json-documents")
                .with_top_k(2);
            super::RagRelay::new(
                self.cache.clone(),
                retriever,
                self.generator.clone(),
                "system",
                std::time::Duration::from_secs(3600),
            )
        }

        pub fn upstream_calls(&self) -> usize {
            self.embedder.calls.load(Ordering::SeqCst)
                + self.index.calls.load(Ordering::SeqCst)
                + self.generator.calls.load(Ordering::SeqCst)
        }
    }
}
