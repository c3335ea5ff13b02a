/// Keyword-based intent classification for chat messages
use enumset::{EnumSet, EnumSetType, enum_set};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
use mockall::automock;

#[derive(EnumSetType, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    RequestRecipe,
    RequestPrice,
    ChildAdaptation,
    RequestSteps,
    Gratitude,
    Unknown,
}

impl Intent {
    /// Checked in this order; the first intent with a matching trigger wins.
    pub const PRIORITY: [Intent; 5] = [
        Intent::RequestRecipe,
        Intent::RequestPrice,
        Intent::ChildAdaptation,
        Intent::RequestSteps,
        Intent::Gratitude,
    ];

    /// Intents answered without touching the pipeline state
    pub const SIDE_CONVERSATIONS: EnumSet<Intent> = enum_set!(
        Intent::ChildAdaptation | Intent::RequestSteps | Intent::Gratitude | Intent::Unknown
    );

    pub const fn triggers(&self) -> &'static [&'static str] {
        match self {
            Intent::RequestRecipe => &["lanche", "receita", "cozinhar", "sugest"],
            Intent::RequestPrice => &[
                "preço",
                "preco",
                "custo",
                "custa",
                "quanto",
                "orçamento",
                "orcamento",
            ],
            Intent::ChildAdaptation => &["maju", "criança", "crianca", "infantil", "filha"],
            Intent::RequestSteps => &["passo", "preparo", "como faz", "modo de fazer", "instru"],
            Intent::Gratitude => &["obrigad", "valeu", "agradeço", "agradeco"],
            Intent::Unknown => &[],
        }
    }

    pub fn is_side_conversation(&self) -> bool {
        Self::SIDE_CONVERSATIONS.contains(*self)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::RequestRecipe => "request_recipe",
            Intent::RequestPrice => "request_price",
            Intent::ChildAdaptation => "child_adaptation",
            Intent::RequestSteps => "request_steps",
            Intent::Gratitude => "gratitude",
            Intent::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

impl FromStr for Intent {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.to_ascii_lowercase().replace(['_', '-', ' '], "");
        match norm.as_str() {
            "requestrecipe" | "recipe" => Ok(Intent::RequestRecipe),
            "requestprice" | "price" => Ok(Intent::RequestPrice),
            "childadaptation" | "child" => Ok(Intent::ChildAdaptation),
            "requeststeps" | "steps" => Ok(Intent::RequestSteps),
            "gratitude" | "thanks" => Ok(Intent::Gratitude),
            "unknown" => Ok(Intent::Unknown),
            _ => Err(format!("unknown intent: {s}")),
        }
    }
}

#[cfg_attr(test, automock)]
pub trait IntentClassifier: Send + Sync {
    /// Total: every input, including the empty string, maps to one intent
    fn classify(&self, text: &str) -> Intent;
}

/// Substring rules over lowercased text, see [`Intent::PRIORITY`]
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Intent {
        let normalized = text.to_lowercase();
        let intent = Intent::PRIORITY
            .into_iter()
            .find(|intent| intent.triggers().iter().any(|t| normalized.contains(t)))
            .unwrap_or(Intent::Unknown);
        tracing::debug!("Classified {:?} as {}", text, intent);
        intent
    }
}
