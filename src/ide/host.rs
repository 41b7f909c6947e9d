//! `EngineHost`: buffers, compiled rule sets and session settings in one place.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::{debug, warn};

use super::session::{SessionConfig, SolverCommand};
use super::styled_tokens::{StyledToken, styled_tokens};
use crate::EngineError;
use crate::base::{BufferId, TextRange, snap_to_chars};
use crate::config::EngineConfig;
use crate::highlight::{FeatureSet, Highlighter, StyleRange};
use crate::indent::IndentRules;
use crate::syntax;
use crate::tree::{GrammarError, GrammarProvider, GrammarRegistry, TextEdit, Tree};

/// Highlight results kept per buffer.
pub const CACHED_REGIONS: usize = 16;

/// The rule sets of one language.
#[derive(Clone)]
struct LanguageEngine {
    provider: Arc<dyn GrammarProvider>,
    highlighter: Highlighter,
    indent: IndentRules,
}

#[derive(Debug)]
enum BufferState {
    Ready {
        tree: Tree,
        /// Resolved ranges by region, least recently used first; cleared by
        /// edits and feature changes.
        cache: IndexMap<TextRange, Vec<StyleRange>>,
    },
    /// The buffer's grammar is unavailable; nothing runs for it.
    Disabled(GrammarError),
}

#[derive(Debug)]
struct Buffer {
    language: SmolStr,
    text: String,
    state: BufferState,
}

/// Entry point for an editor adapter.
///
/// ```ignore
/// let mut host = EngineHost::new()?;
/// let buffer = host.open("minizinc", "int: n = 3;");
/// let ranges = host.highlight(buffer, None)?;
/// let column = host.indent_line(buffer, 0)?;
/// ```
pub struct EngineHost {
    languages: IndexMap<SmolStr, LanguageEngine>,
    buffers: IndexMap<BufferId, Buffer>,
    session: SessionConfig,
    next_buffer: BufferId,
}

impl EngineHost {
    /// A host with the built-in MiniZinc configuration.
    pub fn new() -> Result<Self, EngineError> {
        Self::from_config(&EngineConfig::default())
    }

    /// Build the host for `config`, compiling its rule tables.
    ///
    /// The configured language must be known to the built-in registry.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut registry = GrammarRegistry::new();
        syntax::register(&mut registry);

        let mut host = Self {
            languages: IndexMap::new(),
            buffers: IndexMap::new(),
            session: config.session.clone(),
            next_buffer: BufferId::default(),
        };
        let provider = registry.get(&config.language)?;
        let grammar = provider.grammar();
        let highlighter = Highlighter::new(
            &grammar,
            &config.highlight,
            config.features.to_feature_set(),
        )?;
        let indent = IndentRules::compile(&grammar, &config.indent.rules, config.indent.unit)?;
        host.add_language(config.language.clone(), provider, highlighter, indent);
        Ok(host)
    }

    /// Register (or replace) the rule sets of a language.
    pub fn add_language(
        &mut self,
        name: impl Into<SmolStr>,
        provider: Arc<dyn GrammarProvider>,
        highlighter: Highlighter,
        indent: IndentRules,
    ) {
        let name = name.into();
        debug!(language = %name, "registered language");
        self.languages.insert(
            name,
            LanguageEngine {
                provider,
                highlighter,
                indent,
            },
        );
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(SmolStr::as_str)
    }

    // ===== Buffers =====

    /// Open a buffer. Buffers of unknown languages are kept but disabled.
    pub fn open(&mut self, language: &str, text: impl Into<String>) -> BufferId {
        let id = self.next_buffer;
        self.next_buffer = id.successor();
        let text = text.into();
        let state = self.parse_state(language, &text);
        if let BufferState::Disabled(err) = &state {
            warn!(
                buffer = %id,
                language,
                error = %err,
                "highlighting and indentation disabled"
            );
        }
        self.buffers.insert(
            id,
            Buffer {
                language: SmolStr::new(language),
                text,
                state,
            },
        );
        id
    }

    pub fn close(&mut self, id: BufferId) -> bool {
        self.buffers.shift_remove(&id).is_some()
    }

    fn parse_state(&self, language: &str, text: &str) -> BufferState {
        match self.languages.get(language) {
            Some(engine) => BufferState::Ready {
                tree: engine.provider.parse(text),
                cache: IndexMap::new(),
            },
            None => BufferState::Disabled(GrammarError::Unavailable(SmolStr::new(language))),
        }
    }

    fn buffer(&self, id: BufferId) -> Result<&Buffer, EngineError> {
        self.buffers.get(&id).ok_or(EngineError::UnknownBuffer(id))
    }

    /// Replace the whole text of a buffer.
    pub fn set_text(&mut self, id: BufferId, text: impl Into<String>) -> Result<(), EngineError> {
        let text = text.into();
        let language = self.buffer(id)?.language.clone();
        let state = self.parse_state(&language, &text);
        if let Some(buffer) = self.buffers.get_mut(&id) {
            buffer.text = text;
            buffer.state = state;
        }
        Ok(())
    }

    /// Apply an edit, producing a new snapshot of the buffer.
    pub fn apply_edit(&mut self, id: BufferId, edit: &TextEdit) -> Result<(), EngineError> {
        let buffer = self.buffer(id)?;
        let text = edit.apply(&buffer.text);
        let state = match (&buffer.state, self.languages.get(&buffer.language)) {
            (BufferState::Ready { tree, .. }, Some(engine)) => BufferState::Ready {
                tree: engine.provider.reparse(tree, edit),
                cache: IndexMap::new(),
            },
            _ => self.parse_state(&buffer.language, &text),
        };
        if let Some(buffer) = self.buffers.get_mut(&id) {
            buffer.text = text;
            buffer.state = state;
        }
        Ok(())
    }

    pub fn text(&self, id: BufferId) -> Result<&str, EngineError> {
        Ok(&self.buffer(id)?.text)
    }

    /// The current snapshot, or `None` for a disabled buffer.
    pub fn tree(&self, id: BufferId) -> Result<Option<&Tree>, EngineError> {
        Ok(match &self.buffer(id)?.state {
            BufferState::Ready { tree, .. } => Some(tree),
            BufferState::Disabled(_) => None,
        })
    }

    pub fn is_enabled(&self, id: BufferId) -> Result<bool, EngineError> {
        Ok(self.tree(id)?.is_some())
    }

    fn ready(&self, id: BufferId) -> Result<(&Tree, &LanguageEngine), EngineError> {
        let buffer = self.buffer(id)?;
        match (&buffer.state, self.languages.get(&buffer.language)) {
            (BufferState::Ready { tree, .. }, Some(engine)) => Ok((tree, engine)),
            (BufferState::Disabled(err), _) => Err(err.clone().into()),
            (_, None) => Err(GrammarError::Unavailable(buffer.language.clone()).into()),
        }
    }

    // ===== Highlighting =====

    /// Style ranges partitioning `region` (the whole buffer when `None`).
    ///
    /// The region is clamped to the text and widened to char boundaries.
    /// Results of the last [`CACHED_REGIONS`] regions are kept until the
    /// buffer or the feature set changes.
    pub fn highlight(
        &mut self,
        id: BufferId,
        region: Option<TextRange>,
    ) -> Result<Vec<StyleRange>, EngineError> {
        let (tree, _) = self.ready(id)?;
        let region = match region {
            Some(region) => snap_to_chars(tree.text(), region),
            None => tree.full_range(),
        };

        if let Some(cache) = self.cache_mut(id) {
            if let Some(ranges) = cache.shift_remove(&region) {
                cache.insert(region, ranges.clone());
                return Ok(ranges);
            }
        }

        let (tree, engine) = self.ready(id)?;
        let ranges = engine.highlighter.highlight(tree, region);
        if let Some(cache) = self.cache_mut(id) {
            if cache.len() >= CACHED_REGIONS {
                cache.shift_remove_index(0);
            }
            cache.insert(region, ranges.clone());
        }
        Ok(ranges)
    }

    fn cache_mut(&mut self, id: BufferId) -> Option<&mut IndexMap<TextRange, Vec<StyleRange>>> {
        match self.buffers.get_mut(&id).map(|buffer| &mut buffer.state) {
            Some(BufferState::Ready { cache, .. }) => Some(cache),
            _ => None,
        }
    }

    /// Styled runs for `region`, split per line.
    pub fn styled_tokens(
        &mut self,
        id: BufferId,
        region: Option<TextRange>,
    ) -> Result<Vec<StyledToken>, EngineError> {
        let ranges = self.highlight(id, region)?;
        let (tree, _) = self.ready(id)?;
        Ok(styled_tokens(tree, &ranges))
    }

    /// The enabled features of a language.
    pub fn features(&self, language: &str) -> Result<&FeatureSet, EngineError> {
        self.languages
            .get(language)
            .map(|engine| engine.highlighter.features())
            .ok_or_else(|| GrammarError::Unavailable(SmolStr::new(language)).into())
    }

    /// Change the enabled features of a language.
    ///
    /// Every cached result of that language's buffers is dropped, so the
    /// next request recomputes from scratch.
    pub fn set_features(
        &mut self,
        language: &str,
        features: FeatureSet,
    ) -> Result<(), EngineError> {
        let engine = self
            .languages
            .get_mut(language)
            .ok_or_else(|| GrammarError::Unavailable(SmolStr::new(language)))?;
        engine.highlighter.set_features(features);
        for buffer in self.buffers.values_mut() {
            if buffer.language != language {
                continue;
            }
            if let BufferState::Ready { cache, .. } = &mut buffer.state {
                cache.clear();
            }
        }
        Ok(())
    }

    // ===== Indentation =====

    /// Target column of `line`, or `None` past the end of the buffer.
    pub fn indent_line(&self, id: BufferId, line: u32) -> Result<Option<u32>, EngineError> {
        let (tree, engine) = self.ready(id)?;
        Ok(engine.indent.indent_for_line(tree, line))
    }

    // ===== Session =====

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    pub fn set_session(&mut self, session: SessionConfig) {
        self.session = session;
    }

    /// The solver command for `model` under the current session.
    pub fn solver_command(&self, model: impl AsRef<Path>) -> SolverCommand {
        self.session.command(model)
    }
}

impl std::fmt::Debug for EngineHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHost")
            .field("languages", &self.languages.keys().collect::<Vec<_>>())
            .field("buffers", &self.buffers.len())
            .field("session", &self.session)
            .finish()
    }
}
