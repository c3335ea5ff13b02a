use rand::Rng;
use tracing::debug;

use crate::error::{ChefError, Result};
use crate::models::{IngredientSet, Recipe};

/// Overlap a recipe needs before it is picked without falling back to chance
pub const MIN_OVERLAP: usize = 2;

/// How a recipe was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// First recipe in catalog order reaching [`MIN_OVERLAP`]
    Overlap(usize),
    /// No recipe reached the threshold; picked uniformly at random
    Fallback,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeMatcher;

impl RecipeMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Number of user ingredients that match at least one recipe ingredient.
    ///
    /// Matching is case-insensitive substring containment in either direction,
    /// so "queijo" matches "Queijo branco" and "Pão de forma integral" matches "pão de forma".
    pub fn overlap_count(ingredients: &IngredientSet, recipe: &Recipe) -> usize {
        let wanted: Vec<String> = recipe.ingredients.iter().map(|i| i.to_lowercase()).collect();
        ingredients
            .iter()
            .map(str::to_lowercase)
            .filter(|have| {
                wanted
                    .iter()
                    .any(|want| want.contains(have.as_str()) || have.contains(want.as_str()))
            })
            .count()
    }

    /// Pick a recipe for the ingredient set.
    ///
    /// First match wins: catalog order takes precedence over the best overlap.
    /// The RNG is only consumed on the fallback path.
    pub fn match_recipe<'a, R: Rng + ?Sized>(
        &self,
        ingredients: &IngredientSet,
        catalog: &'a [Recipe],
        rng: &mut R,
    ) -> Result<(&'a Recipe, MatchKind)> {
        if catalog.is_empty() {
            return Err(ChefError::validation(
                "catalog",
                "cannot match ingredients against an empty catalog",
            ));
        }

        for recipe in catalog {
            let overlap = Self::overlap_count(ingredients, recipe);
            debug!("Recipe '{}' overlap {}", recipe.id, overlap);
            if overlap >= MIN_OVERLAP {
                return Ok((recipe, MatchKind::Overlap(overlap)));
            }
        }

        let idx = rng.gen_range(0..catalog.len());
        debug!(
            "No recipe reached overlap {}, falling back to '{}'",
            MIN_OVERLAP, catalog[idx].id
        );
        Ok((&catalog[idx], MatchKind::Fallback))
    }
}
