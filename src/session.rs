use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{ConversationTurn, PriceAnalysis, Recipe};

/// Position in the inventory → recipe → pricing pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueStep {
    AwaitingIngredients,
    Ready,
    Suggested,
    PriceAnalyzed,
}

impl DialogueStep {
    pub fn initial(has_ingredients: bool) -> Self {
        if has_ingredients {
            DialogueStep::Ready
        } else {
            DialogueStep::AwaitingIngredients
        }
    }

    /// What the user should do next, shown under the pipeline
    pub const fn hint(&self) -> &'static str {
        match self {
            DialogueStep::AwaitingIngredients => "Adicione ingredientes disponíveis",
            DialogueStep::Ready => "Aguardando sugestão de receita",
            DialogueStep::Suggested => "Verifique quanto vai custar",
            DialogueStep::PriceAnalyzed => "Mãos à obra! Peça o passo a passo",
        }
    }
}

impl fmt::Display for DialogueStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DialogueStep::AwaitingIngredients => "awaiting_ingredients",
            DialogueStep::Ready => "ready",
            DialogueStep::Suggested => "suggested",
            DialogueStep::PriceAnalyzed => "price_analyzed",
        };
        f.write_str(s)
    }
}

/// Conversation state owned by a single orchestrator.
///
/// Turns are append-only: nothing here hands out mutable access to history.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    turns: Vec<ConversationTurn>,
    last_recipe: Option<Recipe>,
    last_price_analysis: Option<PriceAnalysis>,
    step: DialogueStep,
    busy: bool,
}

impl Session {
    pub fn new(step: DialogueStep) -> Self {
        Self {
            turns: Vec::new(),
            last_recipe: None,
            last_price_analysis: None,
            step,
            busy: false,
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last_recipe(&self) -> Option<&Recipe> {
        self.last_recipe.as_ref()
    }

    pub fn last_price_analysis(&self) -> Option<&PriceAnalysis> {
        self.last_price_analysis.as_ref()
    }

    pub fn step(&self) -> DialogueStep {
        self.step
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub(crate) fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub(crate) fn set_step(&mut self, step: DialogueStep) {
        self.step = step;
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub(crate) fn store_recipe(&mut self, recipe: Recipe) {
        self.last_recipe = Some(recipe);
    }

    pub(crate) fn store_price_analysis(&mut self, analysis: PriceAnalysis) {
        self.last_price_analysis = Some(analysis);
    }
}
