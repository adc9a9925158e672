//! Environment variables observed by the interpreter: `TZ` (timezone
//! override), `LANG`/`LC_*` (locale), a diagnostics toggle. Writable at
//! runtime via `$SYS.env!`, which is why the snapshot here is held behind
//! `RefCell`-free plain fields owned by a single runner thread rather than
//! re-reading `std::env` on every lookup.

use std::collections::HashMap;
use std::env;

#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    vars: HashMap<String, String>,
}

impl EnvOverrides {
    pub fn from_process_env() -> Self {
        let mut vars = HashMap::new();
        for key in ["TZ", "LANG", "HVML_TEST"] {
            if let Ok(val) = env::var(key) {
                vars.insert(key.to_string(), val);
            }
        }
        for (key, val) in env::vars() {
            if key.starts_with("LC_") {
                vars.insert(key, val);
            }
        }
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }

    pub fn tz(&self) -> Option<&str> {
        self.get("TZ")
    }

    pub fn diagnostics_enabled(&self) -> bool {
        self.get("HVML_TEST").map(|v| v != "0" && !v.is_empty()).unwrap_or(false)
    }

    /// `$SYS.env!` write path: sets both the in-process snapshot (read by the
    /// interpreter) and the OS environment (read by anything the coroutine
    /// spawns).
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        env::set_var(&key, &value);
        self.vars.insert(key, value);
    }

    pub fn unset(&mut self, key: &str) {
        env::remove_var(key);
        self.vars.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let mut env = EnvOverrides::default();
        env.set("HVML_TEST", "1");
        assert!(env.diagnostics_enabled());
        env.unset("HVML_TEST");
        assert!(!env.diagnostics_enabled());
    }
}
