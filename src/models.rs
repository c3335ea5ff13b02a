use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{ChefError, Result};

/// How hard a recipe is to prepare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Trivial,
    Easy,
    Moderate,
}

impl Difficulty {
    pub const fn label(&self) -> &'static str {
        match self {
            Difficulty::Trivial => "Muito fácil",
            Difficulty::Easy => "Fácil",
            Difficulty::Moderate => "Médio",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Catalog recipe record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub estimated_cost: f64,
    pub prep_minutes: u32,
    pub difficulty: Difficulty,
}

impl Recipe {
    pub fn prep_time(&self) -> Duration {
        Duration::from_secs(u64::from(self.prep_minutes) * 60)
    }

    /// Check the record invariants: named, at least one ingredient, non-negative cost
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ChefError::validation(
                "recipe.name",
                format!("recipe '{}' has an empty name", self.id),
            ));
        }
        if self.ingredients.is_empty() {
            return Err(ChefError::validation(
                "recipe.ingredients",
                format!("recipe '{}' has no ingredients", self.id),
            ));
        }
        if !self.estimated_cost.is_finite() || self.estimated_cost < 0.0 {
            return Err(ChefError::validation(
                "recipe.estimated_cost",
                format!(
                    "recipe '{}' has invalid cost {}",
                    self.id, self.estimated_cost
                ),
            ));
        }
        Ok(())
    }
}

/// Ingredients the user has at hand.
///
/// Keeps insertion order for display; comparisons are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IngredientSet(Vec<String>);

impl IngredientSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trims and adds the ingredient. Returns false for blanks and duplicates.
    pub fn insert(&mut self, ingredient: &str) -> bool {
        let trimmed = ingredient.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return false;
        }
        self.0.push(trimmed.to_string());
        true
    }

    pub fn remove(&mut self, ingredient: &str) -> bool {
        let needle = ingredient.trim().to_lowercase();
        let before = self.0.len();
        self.0.retain(|i| i.to_lowercase() != needle);
        self.0.len() != before
    }

    pub fn contains(&self, ingredient: &str) -> bool {
        let needle = ingredient.trim().to_lowercase();
        self.0.iter().any(|i| i.to_lowercase() == needle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for IngredientSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = IngredientSet::new();
        for item in iter {
            set.insert(item.as_ref());
        }
        set
    }
}

impl<'de> Deserialize<'de> for IngredientSet {
    fn deserialize<D>(de: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(de)?;
        Ok(raw.iter().collect())
    }
}

/// Non-negative amount of money the user is willing to spend
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Budget(f64);

impl Budget {
    pub fn new(amount: f64) -> Result<Self> {
        if !amount.is_finite() {
            return Err(ChefError::validation(
                "budget",
                format!("budget must be a finite amount, got {amount}"),
            ));
        }
        if amount < 0.0 {
            return Err(ChefError::validation(
                "budget",
                format!("budget must not be negative, got {amount:.2}"),
            ));
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Budget {
    type Error = ChefError;

    fn try_from(amount: f64) -> Result<Self> {
        Budget::new(amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PriceItem {
    pub item: String,
    pub price: f64,
}

impl PriceItem {
    pub fn new(item: &str, price: f64) -> Self {
        Self {
            item: item.to_string(),
            price,
        }
    }
}

/// Cost estimate produced for a budget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAnalysis {
    pub budget: Budget,
    pub total_cost: f64,
    pub breakdown: Vec<PriceItem>,
    pub savings: f64,
    pub vendors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Agent,
}

/// Agent role a reply is attributed to.
///
/// Labels are part of the display contract and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    Recipe,
    Pricing,
    ChildAdaptation,
    Execution,
    Chef,
    Triage,
}

impl Persona {
    pub const ALL: [Persona; 6] = [
        Persona::Recipe,
        Persona::Pricing,
        Persona::ChildAdaptation,
        Persona::Execution,
        Persona::Chef,
        Persona::Triage,
    ];

    pub const fn label(&self) -> &'static str {
        match self {
            Persona::Recipe => "Recipe Agent",
            Persona::Pricing => "Pricing Agent",
            Persona::ChildAdaptation => "Child Adaptation Agent",
            Persona::Execution => "Execution Agent",
            Persona::Chef => "Chef Agent",
            Persona::Triage => "Triage Agent",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Persona {
    fn serialize<S>(&self, s: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        s.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Persona {
    fn deserialize<D>(de: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(de)?;
        Persona::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown persona: {label}")))
    }
}

/// One entry of the conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: uuid::Uuid,
    pub speaker: Speaker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<Persona>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(text: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            speaker: Speaker::User,
            persona: None,
            text: text.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn agent(persona: Persona, text: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            speaker: Speaker::Agent,
            persona: Some(persona),
            text,
            created_at: Utc::now(),
        }
    }
}

/// Payloads pushed to the ingredient and budget panels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChefEvent {
    RecipeSuggested {
        name: String,
        ingredients: Vec<String>,
        steps: Vec<String>,
        estimated_cost: f64,
        /// Preparation time in minutes
        prep_time: u32,
        difficulty: Difficulty,
    },
    PriceAnalyzed {
        total_cost: f64,
        breakdown: Vec<PriceItem>,
        savings: f64,
    },
}

impl From<&Recipe> for ChefEvent {
    fn from(recipe: &Recipe) -> Self {
        ChefEvent::RecipeSuggested {
            name: recipe.name.clone(),
            ingredients: recipe.ingredients.clone(),
            steps: recipe.steps.clone(),
            estimated_cost: recipe.estimated_cost,
            prep_time: recipe.prep_minutes,
            difficulty: recipe.difficulty,
        }
    }
}

impl From<&PriceAnalysis> for ChefEvent {
    fn from(analysis: &PriceAnalysis) -> Self {
        ChefEvent::PriceAnalyzed {
            total_cost: analysis.total_cost,
            breakdown: analysis.breakdown.clone(),
            savings: analysis.savings,
        }
    }
}
