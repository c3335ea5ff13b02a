pub mod catalog;
pub mod composer;
pub mod config;
pub mod error;
pub mod intent;
pub mod matcher;
pub mod models;
pub mod orchestrator;
pub mod pricing;
pub mod session;
pub mod visual;

pub use crate::catalog::RecipeCatalog;
pub use crate::composer::{ComposedReply, Payload, ResponseComposer};
pub use crate::config::Config;
pub use crate::error::{ChefError, Result};
pub use crate::intent::{Intent, IntentClassifier, KeywordClassifier};
pub use crate::matcher::RecipeMatcher;
pub use crate::models::{
    Budget, ChefEvent, ConversationTurn, Difficulty, IngredientSet, Persona, PriceAnalysis,
    PriceItem, Recipe, Speaker,
};
pub use crate::orchestrator::DialogueOrchestrator;
pub use crate::pricing::PriceEstimator;
pub use crate::session::{DialogueStep, Session};

/// JSON schema of the events pushed to the ingredient and budget panels
pub fn event_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(ChefEvent)).unwrap_or_default()
}
