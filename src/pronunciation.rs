// WHY: word lookup for the pronunciation popover of a solved sentence
// Providers are tried in a fixed order; each one failing falls through to the next.
// Network access belongs to the embedding application behind `DictionaryTransport`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{PronunciationError, ProviderError};

/// Cached lookups older than this are fetched again
pub const CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Pause between words when warming the cache
pub const PRELOAD_DELAY: Duration = Duration::from_millis(100);

const LOOKUP_STRIP: &[char] = &['.', ',', '!', '?', ';', ':', '\'', '"', '(', ')', '[', ']', '{', '}'];

const MERRIAM_WEBSTER_AUDIO: &str = "https://media.merriam-webster.com/audio/prons/en/us/mp3";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phonetic {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronunciationData {
    pub word: String,
    #[serde(default)]
    pub phonetics: Vec<Phonetic>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    MerriamWebster,
    WordsApi,
    FreeDictionary,
}

impl Provider {
    pub const DEFAULT_ORDER: [Provider; 3] =
        [Provider::MerriamWebster, Provider::WordsApi, Provider::FreeDictionary];

    pub fn name(self) -> &'static str {
        match self {
            Provider::MerriamWebster => "Merriam-Webster",
            Provider::WordsApi => "WordsAPI",
            Provider::FreeDictionary => "Free Dictionary",
        }
    }

    /// Map a raw provider response onto `PronunciationData`
    pub fn parse(self, response: &Value, word: &str) -> Result<PronunciationData, ProviderError> {
        match self {
            Provider::MerriamWebster => parse_merriam_webster(response, word),
            Provider::WordsApi => parse_words_api(response, word),
            Provider::FreeDictionary => parse_free_dictionary(response),
        }
    }
}

fn parse_merriam_webster(response: &Value, word: &str) -> Result<PronunciationData, ProviderError> {
    let entries = response
        .as_array()
        .ok_or_else(|| ProviderError::Malformed("expected an array of entries".to_string()))?;
    // A list of strings is the spelling-suggestion response
    let entry = match entries.first() {
        Some(entry) if entry.is_object() => entry,
        _ => return Err(ProviderError::NotFound),
    };

    let headword = entry
        .pointer("/meta/id")
        .and_then(Value::as_str)
        .and_then(|id| id.split(':').next())
        .filter(|id| !id.is_empty())
        .unwrap_or(word)
        .to_string();

    let phonetics = entry
        .pointer("/hwi/prs")
        .and_then(Value::as_array)
        .map(|prs| prs.iter().map(merriam_webster_phonetic).collect())
        .unwrap_or_default();

    let meanings = match entry.get("def") {
        Some(def) => {
            let part_of_speech = entry
                .get("fl")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let definitions = def
                .pointer("/0/sseq")
                .and_then(Value::as_array)
                .map(|sseq| merriam_webster_senses(sseq))
                .unwrap_or_default();
            vec![Meaning { part_of_speech, definitions }]
        }
        None => Vec::new(),
    };

    Ok(PronunciationData { word: headword, phonetics, meanings })
}

fn merriam_webster_phonetic(pr: &Value) -> Phonetic {
    let text = pr
        .get("mw")
        .and_then(Value::as_str)
        .map(|mw| format!("/{mw}/"))
        .unwrap_or_default();
    let audio = pr
        .pointer("/sound/audio")
        .and_then(Value::as_str)
        .and_then(|audio| {
            let subdirectory = audio.chars().next()?;
            Some(format!("{MERRIAM_WEBSTER_AUDIO}/{subdirectory}/{audio}.mp3"))
        });
    Phonetic { text, audio }
}

/// First two non-empty senses of a sense sequence
fn merriam_webster_senses(sseq: &[Value]) -> Vec<Definition> {
    sseq.iter()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(Value::as_array)
        .filter(|item| item.first().and_then(Value::as_str) == Some("sense"))
        .filter_map(|item| item.get(1))
        .filter_map(|sense| {
            let dt = sense.get("dt").and_then(Value::as_array)?;
            let definition = dt
                .first()
                .and_then(|text| text.get(1))
                .and_then(Value::as_str)
                .map(strip_markup)
                .unwrap_or_default();
            if definition.is_empty() {
                return None;
            }
            let example = dt
                .iter()
                .find(|part| part.get(0).and_then(Value::as_str) == Some("vis"))
                .and_then(|vis| vis.pointer("/1/0/t"))
                .and_then(Value::as_str)
                .map(strip_markup);
            Some(Definition { definition, example })
        })
        .take(2)
        .collect()
}

/// Remove `{tag}` formatting tokens
fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for ch in text.chars() {
        match ch {
            '{' => depth += 1,
            '}' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out.trim().to_string()
}

fn parse_words_api(response: &Value, word: &str) -> Result<PronunciationData, ProviderError> {
    let object = response
        .as_object()
        .ok_or_else(|| ProviderError::Malformed("expected an object".to_string()))?;
    if object.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ProviderError::NotFound);
    }

    let phonetic_text = match object.get("pronunciation") {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Object(variants)) => Some(
            variants
                .get("all")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        _ => None,
    };
    let phonetics = phonetic_text
        .map(|text| vec![Phonetic { text: format!("/{text}/"), audio: None }])
        .unwrap_or_default();

    let meanings = object
        .get("results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .take(2)
                .map(|result| Meaning {
                    part_of_speech: result
                        .get("partOfSpeech")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                        .to_string(),
                    definitions: vec![Definition {
                        definition: result
                            .get("definition")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        example: result
                            .pointer("/examples/0")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    }],
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(PronunciationData {
        word: object
            .get("word")
            .and_then(Value::as_str)
            .unwrap_or(word)
            .to_string(),
        phonetics,
        meanings,
    })
}

fn parse_free_dictionary(response: &Value) -> Result<PronunciationData, ProviderError> {
    // Unknown words come back as a single `{title, message}` object
    let entry = match response {
        Value::Array(entries) => entries.first().ok_or(ProviderError::NotFound)?,
        Value::Object(_) => return Err(ProviderError::NotFound),
        _ => return Err(ProviderError::Malformed("expected an array of entries".to_string())),
    };
    serde_json::from_value(entry.clone()).map_err(|e| ProviderError::Malformed(e.to_string()))
}

/// Network access to dictionary providers, owned by the embedding application
///
/// Implementations report missing API keys as [`ProviderError::NotConfigured`].
pub trait DictionaryTransport: Send + Sync {
    fn fetch(
        &self,
        provider: Provider,
        word: &str,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: PronunciationData,
    fetched_at: Instant,
}

/// Lower-case the word and drop surrounding punctuation; `None` when nothing is left
pub fn normalize_lookup_word(word: &str) -> Option<String> {
    let normalized: String = word
        .to_lowercase()
        .chars()
        .filter(|c| !LOOKUP_STRIP.contains(c))
        .collect();
    let normalized = normalized.trim();
    (!normalized.is_empty()).then(|| normalized.to_string())
}

/// Ordered provider fallthrough with a time-limited cache
pub struct PronunciationResolver<T: DictionaryTransport> {
    transport: T,
    providers: Vec<Provider>,
    ttl: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl<T: DictionaryTransport> PronunciationResolver<T> {
    pub fn new(transport: T) -> Self {
        Self::with_providers(transport, Provider::DEFAULT_ORDER.to_vec())
    }

    pub fn with_providers(transport: T, providers: Vec<Provider>) -> Self {
        Self {
            transport,
            providers,
            ttl: CACHE_TTL,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn cached(&self, word: &str) -> Option<PronunciationData> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        match cache.get(word) {
            Some(entry) if entry.fetched_at.elapsed() < self.ttl => Some(entry.data.clone()),
            Some(_) => {
                cache.remove(word);
                None
            }
            None => None,
        }
    }

    fn store(&self, word: String, data: PronunciationData) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(word, CacheEntry { data, fetched_at: Instant::now() });
    }

    pub async fn lookup(&self, word: &str) -> Result<PronunciationData, PronunciationError> {
        let normalized =
            normalize_lookup_word(word).ok_or_else(|| PronunciationError::InvalidWord(word.to_string()))?;

        if let Some(data) = self.cached(&normalized) {
            debug!(word = %normalized, "Pronunciation served from cache");
            return Ok(data);
        }

        let mut last_error = ProviderError::NotFound;
        for &provider in &self.providers {
            debug!(word = %normalized, provider = provider.name(), "Trying pronunciation provider");
            let parsed = match self.transport.fetch(provider, &normalized).await {
                Ok(response) => provider.parse(&response, &normalized),
                Err(e) => Err(e),
            };
            match parsed {
                Ok(data) => {
                    info!(word = %normalized, provider = provider.name(), "Pronunciation resolved");
                    self.store(normalized, data.clone());
                    return Ok(data);
                }
                Err(e) => {
                    warn!(word = %normalized, provider = provider.name(), error = %e, "Provider failed");
                    last_error = e;
                }
            }
        }

        Err(PronunciationError::AllProvidersFailed(last_error))
    }

    /// Warm the cache for `words`; returns how many resolved
    pub async fn preload<I, S>(&self, words: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved = 0;
        for word in words {
            match self.lookup(word.as_ref()).await {
                Ok(_) => resolved += 1,
                Err(e) => debug!(word = word.as_ref(), error = %e, "Preload skipped word"),
            }
            tokio::time::sleep(PRELOAD_DELAY).await;
        }
        resolved
    }
}

/// One piece of a sentence split for per-word lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentencePart<'a> {
    Word(&'a str),
    Space(&'a str),
}

/// Split `sentence` into alternating word and whitespace runs, preserving spacing
pub fn split_for_pronunciation(sentence: &str) -> Vec<SentencePart<'_>> {
    let mut parts = Vec::new();
    let mut run_start = 0;
    let mut in_space: Option<bool> = None;

    for (i, ch) in sentence.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(current) if current != space => {
                parts.push(make_part(&sentence[run_start..i], current));
                run_start = i;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if let Some(space) = in_space {
        parts.push(make_part(&sentence[run_start..], space));
    }
    parts
}

fn make_part(text: &str, space: bool) -> SentencePart<'_> {
    if space {
        SentencePart::Space(text)
    } else {
        SentencePart::Word(text)
    }
}
