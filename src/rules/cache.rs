//! Thread-local cache of compiled ast-grep patterns.
//!
//! Capped at 256 entries; the whole cache is dropped when full.

use ast_grep_core::Pattern;
use ast_grep_language::SupportLang;
use std::cell::RefCell;
use std::collections::HashMap;

const MAX_CACHE_ENTRIES: usize = 256;

thread_local! {
    // Keyed by "<lang_debug>:<pattern_str>" so one pattern string compiled for
    // two languages never collides.
    static PATTERN_CACHE: RefCell<HashMap<String, Pattern>> =
        RefCell::new(HashMap::new());
}

/// Compiled pattern for `pattern_str`, compiling on first use. Compilation
/// errors are returned as text and not cached.
pub fn get_or_compile_pattern(pattern_str: &str, lang: SupportLang) -> Result<Pattern, String> {
    let cache_key = format!("{lang:?}:{pattern_str}");

    PATTERN_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if let Some(pattern) = cache.get(&cache_key) {
            return Ok(pattern.clone());
        }

        let compiled = Pattern::try_new(pattern_str, lang).map_err(|e| e.to_string())?;
        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.clear();
        }
        cache.insert(cache_key, compiled.clone());
        Ok(compiled)
    })
}

pub fn cache_size() -> usize {
    PATTERN_CACHE.with(|cache| cache.borrow().len())
}
