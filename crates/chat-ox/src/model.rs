use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::EnumString;

/// Chat models with a known wire identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString)]
#[serde(from = "String", into = "String")]
pub enum Model {
    #[default]
    #[strum(serialize = "gpt-5.2")]
    Gpt5_2,

    #[strum(serialize = "gpt-5.1")]
    Gpt5_1,

    #[strum(serialize = "gpt-5")]
    Gpt5,

    #[strum(serialize = "gpt-5-mini")]
    Gpt5Mini,

    #[strum(serialize = "gpt-4.1")]
    Gpt4_1,

    #[strum(serialize = "gpt-4o")]
    Gpt4o,

    #[strum(serialize = "gpt-4o-mini")]
    Gpt4oMini,

    /// Custom model (for models not in this enum)
    #[strum(default)]
    Custom(String),
}

impl Model {
    /// Get the string representation of the model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt5_2 => "gpt-5.2",
            Model::Gpt5_1 => "gpt-5.1",
            Model::Gpt5 => "gpt-5",
            Model::Gpt5Mini => "gpt-5-mini",
            Model::Gpt4_1 => "gpt-4.1",
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Custom(s) => s,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Model {
    fn from(s: String) -> Self {
        Model::from_str(&s).unwrap_or(Model::Custom(s))
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        match model {
            Model::Custom(s) => s,
            other => other.as_str().to_string(),
        }
    }
}
