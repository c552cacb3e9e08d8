use serde::{Deserialize, Serialize};

/// Scripted-action descriptor handed over by the world loader. The engine
/// only reads identity and placement from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptedAction {
    pub object_id: u32,
    #[serde(default)]
    pub object_name: String,
    /// Script the action was loaded from; doubles as the owner id for
    /// name lookups inside a world.
    #[serde(default)]
    pub atom_id: String,
    #[serde(default)]
    pub location: Option<[f32; 3]>,
    #[serde(default)]
    pub direction: Option<[f32; 3]>,
    #[serde(default)]
    pub up: Option<[f32; 3]>,
    /// Free-form `key:value` pairs separated by commas.
    #[serde(default)]
    pub extra: Option<String>,
}

impl ScriptedAction {
    pub fn new(object_id: u32, object_name: impl Into<String>, atom_id: impl Into<String>) -> Self {
        ScriptedAction {
            object_id,
            object_name: object_name.into(),
            atom_id: atom_id.into(),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: [f32; 3]) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// Value for `key` in the extra data, matched case-insensitively.
    pub fn extra_value(&self, key: &str) -> Option<&str> {
        self.extra
            .as_deref()?
            .split(',')
            .filter_map(|pair| pair.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(key))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_values_are_looked_up_by_key() {
        let action = ScriptedAction::new(7, "Pizza", "isle")
            .with_extra("ANIM:pz001, Companion: SkateBoard ,empty:");
        assert_eq!(action.extra_value("companion"), Some("SkateBoard"));
        assert_eq!(action.extra_value("anim"), Some("pz001"));
        assert_eq!(action.extra_value("empty"), None);
        assert_eq!(action.extra_value("missing"), None);
        assert_eq!(ScriptedAction::default().extra_value("anim"), None);
    }
}
