//! The Shader Code Dictionary
//!
//! Process-lifetime interner mapping paint keys to dense [`PaintId`]s, and
//! owner of the snippet id space: the fixed built-in table (lock-free),
//! the realize-once slots for well-known runtime effects, and the growable
//! user/runtime range. Interned entries are never evicted, so an id handed
//! out once stays resolvable for the life of the dictionary.
//!
//! All mutable state sits behind one `parking_lot::Mutex`; every critical
//! section is a map probe or a push, so contention stays short even with
//! many recording threads interning concurrently.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::builtins::{
    make_builtin_table, BuiltinId, BUILTIN_SNIPPET_COUNT, KNOWN_RUNTIME_EFFECT_END,
    KNOWN_RUNTIME_EFFECT_START, USER_DEFINED_SNIPPET_START,
};
use crate::codegen::{generate_runtime_effect_expression, generate_runtime_effect_preamble};
use crate::key::{PaintId, PaintKey};
use crate::runtime_effect::{
    RuntimeEffect, RuntimeEffectKey, RUNTIME_EFFECT_CS_TRANSFORM_UNIFORMS,
};
use crate::snippet::{ShaderSnippet, SnippetRequirements};
use crate::types::Uniform;

const KNOWN_SLOT_COUNT: usize =
    (KNOWN_RUNTIME_EFFECT_END - KNOWN_RUNTIME_EFFECT_START) as usize;

struct DictionaryState {
    key_to_id: FxHashMap<PaintKey, PaintId>,
    /// Indexed by id; slot 0 holds the invalid sentinel.
    id_to_key: Vec<PaintKey>,
    /// Realize-once slots for stable-key effects.
    known_effects: [Option<Arc<ShaderSnippet>>; KNOWN_SLOT_COUNT],
    /// Snippets in the user-defined range, indexed by
    /// `id - USER_DEFINED_SNIPPET_START`.
    user_snippets: Vec<Arc<ShaderSnippet>>,
    /// Deduplication of hash-keyed runtime effects.
    runtime_effect_ids: FxHashMap<RuntimeEffectKey, i32>,
}

pub struct ShaderCodeDictionary {
    builtins: Box<[Arc<ShaderSnippet>]>,
    state: Mutex<DictionaryState>,
}

impl Default for ShaderCodeDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderCodeDictionary {
    #[must_use]
    pub fn new() -> Self {
        Self {
            builtins: make_builtin_table(),
            state: Mutex::new(DictionaryState {
                key_to_id: FxHashMap::default(),
                id_to_key: vec![PaintKey::invalid()],
                known_effects: [const { None }; KNOWN_SLOT_COUNT],
                user_snippets: Vec::new(),
                runtime_effect_ids: FxHashMap::default(),
            }),
        }
    }

    /// Interns `key`, returning its identity. Equal keys always map to the
    /// same id; malformed keys map to [`PaintId::INVALID`].
    pub fn find_or_create(&self, key: &PaintKey) -> PaintId {
        if !key.is_valid() {
            return PaintId::INVALID;
        }
        let mut state = self.state.lock();
        if let Some(&id) = state.key_to_id.get(key) {
            debug_assert_eq!(state.id_to_key[id.as_u32() as usize], *key);
            return id;
        }
        let id = PaintId::from_index(state.id_to_key.len());
        state.id_to_key.push(key.clone());
        state.key_to_id.insert(key.clone(), id);
        log::trace!(
            "interned paint key ({} records) as id {}",
            key.records().len(),
            id.as_u32()
        );
        id
    }

    /// Returns the identity previously assigned to `key`, if any. Never
    /// interns.
    #[must_use]
    pub fn lookup(&self, key: &PaintKey) -> Option<PaintId> {
        self.state.lock().key_to_id.get(key).copied()
    }

    /// Returns the key interned under `id`; the invalid identity maps to
    /// the invalid key.
    ///
    /// **Panics** if a valid `id` was not produced by this dictionary;
    /// holding one is proof its key was interned.
    #[must_use]
    pub fn get_entry(&self, id: PaintId) -> PaintKey {
        if !id.is_valid() {
            return PaintKey::invalid();
        }
        let state = self.state.lock();
        state.id_to_key[id.as_u32() as usize].clone()
    }

    /// Number of interned keys.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.state.lock().id_to_key.len() - 1
    }

    /// Resolves any snippet id to its catalog entry.
    #[must_use]
    pub fn snippet_for_id(&self, id: i32) -> Option<Arc<ShaderSnippet>> {
        if (0..BUILTIN_SNIPPET_COUNT).contains(&id) {
            return Some(Arc::clone(&self.builtins[id as usize]));
        }
        let state = self.state.lock();
        if (KNOWN_RUNTIME_EFFECT_START..KNOWN_RUNTIME_EFFECT_END).contains(&id) {
            return state.known_effects[(id - KNOWN_RUNTIME_EFFECT_START) as usize].clone();
        }
        if id >= USER_DEFINED_SNIPPET_START {
            return state
                .user_snippets
                .get((id - USER_DEFINED_SNIPPET_START) as usize)
                .cloned();
        }
        None
    }

    /// Direct lock-free access to a built-in entry.
    #[must_use]
    pub fn builtin(&self, id: BuiltinId) -> &Arc<ShaderSnippet> {
        &self.builtins[id.id() as usize]
    }

    /// Whether `id` currently resolves to a catalog entry.
    #[must_use]
    pub fn is_valid_id(&self, id: i32) -> bool {
        self.snippet_for_id(id).is_some()
    }

    /// Registers `effect` and returns its snippet id.
    ///
    /// Stable-key effects land on their fixed id, realized on first
    /// registration. Other effects are deduplicated by content hash and
    /// uniform byte size; a repeat registration returns the existing id.
    pub fn find_or_create_runtime_effect_snippet(
        &self,
        effect: &Arc<dyn RuntimeEffect>,
    ) -> i32 {
        let mut state = self.state.lock();
        if let Some(stable) = effect.stable_key() {
            let slot = &mut state.known_effects[stable.index()];
            if slot.is_none() {
                *slot = Some(make_runtime_snippet(stable.name(), effect.as_ref()));
                log::debug!("realized known effect {}", stable.name());
            }
            return stable.snippet_id();
        }

        let cache_key = RuntimeEffectKey {
            hash: effect.content_hash(),
            uniform_size: effect.uniform_size(),
        };
        if let Some(&id) = state.runtime_effect_ids.get(&cache_key) {
            return id;
        }
        let id = USER_DEFINED_SNIPPET_START + state.user_snippets.len() as i32;
        state
            .user_snippets
            .push(make_runtime_snippet("RuntimeEffect", effect.as_ref()));
        state.runtime_effect_ids.insert(cache_key, id);
        log::debug!("registered runtime effect as snippet id {id}");
        id
    }

    /// Registers a trivial snippet in the user-defined range. Test hook;
    /// the returned id resolves but emits only a passthrough expression.
    pub fn add_user_defined_snippet(&self, name: &'static str) -> i32 {
        let mut state = self.state.lock();
        let id = USER_DEFINED_SNIPPET_START + state.user_snippets.len() as i32;
        state.user_snippets.push(Arc::new(ShaderSnippet {
            name,
            uniforms: std::borrow::Cow::Borrowed(&[]),
            requirements: SnippetRequirements::PRIOR_STAGE_OUTPUT,
            samplers: &[],
            static_fn: "px_passthrough",
            expression: crate::codegen::generate_default_expression,
            preamble: crate::codegen::generate_default_preamble,
            num_children: 0,
        }));
        id
    }
}

fn make_runtime_snippet(name: &'static str, effect: &dyn RuntimeEffect) -> Arc<ShaderSnippet> {
    let mut uniforms: SmallVec<[Uniform; 8]> = effect
        .uniforms()
        .iter()
        .map(|u| Uniform::owned(u.name.clone(), u.shader_type(), u.count))
        .collect();
    if effect.uses_color_transform() {
        uniforms.extend(RUNTIME_EFFECT_CS_TRANSFORM_UNIFORMS.iter().cloned());
    }

    let requirements = if effect.allows_blender() {
        SnippetRequirements::PRIOR_STAGE_OUTPUT | SnippetRequirements::BLENDER_DST_COLOR
    } else if effect.allows_shader() {
        SnippetRequirements::LOCAL_COORDS
    } else {
        SnippetRequirements::PRIOR_STAGE_OUTPUT
    };

    let num_children = u8::try_from(effect.child_count()).unwrap_or(u8::MAX);
    Arc::new(ShaderSnippet {
        name,
        uniforms: std::borrow::Cow::Owned(uniforms.into_vec()),
        requirements,
        samplers: &[],
        static_fn: "",
        expression: generate_runtime_effect_expression,
        preamble: generate_runtime_effect_preamble,
        num_children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyRecord;

    #[test]
    fn interning_is_idempotent() {
        let dict = ShaderCodeDictionary::new();
        let key = PaintKey::new(&[KeyRecord::leaf(BuiltinId::SolidColor.id())]);
        let a = dict.find_or_create(&key);
        let b = dict.find_or_create(&key);
        assert!(a.is_valid());
        assert_eq!(a, b);
        assert_eq!(dict.entry_count(), 1);
    }

    #[test]
    fn malformed_key_gets_invalid_id() {
        let dict = ShaderCodeDictionary::new();
        let key = PaintKey::new(&[KeyRecord::new(BuiltinId::Compose.id(), 2)]);
        assert_eq!(dict.find_or_create(&key), PaintId::INVALID);
        assert_eq!(dict.entry_count(), 0);
    }

    #[test]
    fn lookup_never_interns() {
        let dict = ShaderCodeDictionary::new();
        let key = PaintKey::new(&[KeyRecord::leaf(BuiltinId::SolidColor.id())]);
        assert_eq!(dict.lookup(&key), None);
        let id = dict.find_or_create(&key);
        assert_eq!(dict.lookup(&key), Some(id));
    }

    #[test]
    fn get_entry_round_trips() {
        let dict = ShaderCodeDictionary::new();
        let key = PaintKey::new(&[KeyRecord::leaf(BuiltinId::SolidColor.id())]);
        let id = dict.find_or_create(&key);
        assert_eq!(dict.get_entry(id), key);
    }

    #[test]
    fn user_defined_snippets_resolve() {
        let dict = ShaderCodeDictionary::new();
        let id = dict.add_user_defined_snippet("UserSnippet");
        assert!(id >= USER_DEFINED_SNIPPET_START);
        assert!(dict.is_valid_id(id));
        assert!(!dict.is_valid_id(BUILTIN_SNIPPET_COUNT));
    }
}
