//! Runtime configuration for bdd-outline.
//!
//! Each flag reads an environment variable unless the process has set an
//! override. Overrides exist for tests and embedding runners.
//!
//! | flag | variable | default |
//! |---|---|---|
//! | [`cache_features`] | `BDD_OUTLINE_CACHE_FEATURES` | `true` |
//! | [`validate_on_bind`] | `BDD_OUTLINE_VALIDATE_ON_BIND` | `true` |

use std::sync::atomic::{AtomicU8, Ordering};

const OVERRIDE_UNSET: u8 = 0;
const OVERRIDE_FALSE: u8 = 1;
const OVERRIDE_TRUE: u8 = 2;

/// Environment variable controlling [`cache_features`].
pub const CACHE_FEATURES_ENV: &str = "BDD_OUTLINE_CACHE_FEATURES";
/// Environment variable controlling [`validate_on_bind`].
pub const VALIDATE_ON_BIND_ENV: &str = "BDD_OUTLINE_VALIDATE_ON_BIND";

struct Flag {
    state: AtomicU8,
    env: &'static str,
    default: bool,
}

impl Flag {
    const fn new(env: &'static str, default: bool) -> Self {
        Self {
            state: AtomicU8::new(OVERRIDE_UNSET),
            env,
            default,
        }
    }

    fn override_state(&self) -> Option<bool> {
        match self.state.load(Ordering::Relaxed) {
            OVERRIDE_FALSE => Some(false),
            OVERRIDE_TRUE => Some(true),
            _ => None,
        }
    }

    fn from_env(&self) -> Option<bool> {
        std::env::var(self.env)
            .ok()
            .as_deref()
            .and_then(parse_env_bool)
    }

    fn get(&self) -> bool {
        self.override_state()
            .or_else(|| self.from_env())
            .unwrap_or(self.default)
    }

    fn set(&self, enabled: bool) {
        let value = if enabled {
            OVERRIDE_TRUE
        } else {
            OVERRIDE_FALSE
        };
        self.state.store(value, Ordering::Relaxed);
    }

    fn clear(&self) {
        self.state.store(OVERRIDE_UNSET, Ordering::Relaxed);
    }
}

static CACHE_FEATURES: Flag = Flag::new(CACHE_FEATURES_ENV, true);
static VALIDATE_ON_BIND: Flag = Flag::new(VALIDATE_ON_BIND_ENV, true);

/// Parse the boolean spellings accepted in environment variables.
#[must_use]
pub fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "Yes" | "on" | "ON" | "On" => Some(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" | "No" | "off" | "OFF" | "Off" => {
            Some(false)
        }
        _ => None,
    }
}

/// Whether [`FeatureCache`](crate::FeatureCache) reuses parsed documents.
#[must_use]
pub fn cache_features() -> bool {
    CACHE_FEATURES.get()
}

/// Override [`cache_features`] for the current process.
pub fn set_cache_features(enabled: bool) {
    CACHE_FEATURES.set(enabled);
}

/// Remove any in-process override for [`cache_features`].
pub fn clear_cache_features_override() {
    CACHE_FEATURES.clear();
}

/// Whether the scenario runner validates a scenario before running it.
#[must_use]
pub fn validate_on_bind() -> bool {
    VALIDATE_ON_BIND.get()
}

/// Override [`validate_on_bind`] for the current process.
pub fn set_validate_on_bind(enabled: bool) {
    VALIDATE_ON_BIND.set(enabled);
}

/// Remove any in-process override for [`validate_on_bind`].
pub fn clear_validate_on_bind_override() {
    VALIDATE_ON_BIND.clear();
}
