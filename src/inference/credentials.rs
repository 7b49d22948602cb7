//! Provider credential slots.

use std::collections::BTreeMap;

/// One stored API key. The storage key is fixed per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CredentialSlot {
    OpenAi,
    Gemini,
    Meta,
    Nova,
    O1,
    Titan,
    Aws,
}

impl CredentialSlot {
    pub const ALL: [CredentialSlot; 7] = [
        Self::OpenAi,
        Self::Gemini,
        Self::Meta,
        Self::Nova,
        Self::O1,
        Self::Titan,
        Self::Aws,
    ];

    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Meta => "META_API_KEY",
            Self::Nova => "NOVA_API_KEY",
            Self::O1 => "O1_API_KEY",
            Self::Titan => "TITAN_API_KEY",
            Self::Aws => "AWS_API_KEY",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Meta => "meta",
            Self::Nova => "nova",
            Self::O1 => "o1",
            Self::Titan => "titan",
            Self::Aws => "aws",
        }
    }
}

impl std::fmt::Display for CredentialSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CredentialSlot {
    type Err = String;

    /// Accepts the short name (`openai`) or the storage key (`OPENAI_API_KEY`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s) || slot.storage_key() == s)
            .ok_or_else(|| format!("unknown credential slot: {s}"))
    }
}

/// Snapshot of the configured credentials. Blank values are never held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    keys: BTreeMap<CredentialSlot, String>,
}

impl Credentials {
    pub fn get(&self, slot: CredentialSlot) -> Option<&str> {
        self.keys.get(&slot).map(String::as_str)
    }

    pub fn set(&mut self, slot: CredentialSlot, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.keys.remove(&slot);
        } else {
            self.keys.insert(slot, value.trim().to_string());
        }
    }

    pub fn with(mut self, slot: CredentialSlot, value: impl Into<String>) -> Self {
        self.set(slot, value);
        self
    }

    /// No credential at all: dispatch runs in mock mode.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn configured(&self) -> impl Iterator<Item = CredentialSlot> + '_ {
        self.keys.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_absent() {
        let creds = Credentials::default().with(CredentialSlot::Gemini, "   ");
        assert!(creds.is_empty());
        assert_eq!(creds.get(CredentialSlot::Gemini), None);
    }

    #[test]
    fn slot_parses_from_name_or_key() {
        assert_eq!("OpenAI".parse::<CredentialSlot>().unwrap(), CredentialSlot::OpenAi);
        assert_eq!("TITAN_API_KEY".parse::<CredentialSlot>().unwrap(), CredentialSlot::Titan);
        assert!("groq".parse::<CredentialSlot>().is_err());
    }
}
