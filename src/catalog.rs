use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ChefError, Result};
use crate::models::{Difficulty, Recipe};

/// Quick-pick ingredients offered by the inventory panel
pub const COMMON_INGREDIENTS: [&str; 18] = [
    "Pão de forma",
    "Ovos",
    "Leite",
    "Queijo",
    "Presunto",
    "Tomate",
    "Alface",
    "Manteiga",
    "Banana",
    "Aveia",
    "Mel",
    "Canela",
    "Iogurte",
    "Granola",
    "Morango",
    "Abacate",
    "Limão",
    "Sal",
];

/// Read-only, ordered collection of recipes.
///
/// Order matters: the matcher walks it front to back and the first
/// sufficiently-overlapping recipe wins.
#[derive(Debug, Clone)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    /// Build a catalog, rejecting records that break the recipe invariants
    pub fn new(recipes: Vec<Recipe>) -> Result<Self> {
        for recipe in &recipes {
            recipe.validate()?;
        }
        Ok(Self { recipes })
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(contents)?;
        Self::new(file.recipes)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let catalog = Self::from_yaml_str(&contents)?;
        tracing::info!(
            "Loaded {} recipes from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Load from `path` when given, falling back to the built-in catalog on any failure
    pub fn load_or_builtin(path: Option<&str>) -> Self {
        match path {
            Some(p) => match Self::load(p) {
                Ok(catalog) if !catalog.is_empty() => catalog,
                Ok(_) => {
                    tracing::warn!("Catalog {} is empty - using built-in recipes", p);
                    Self::builtin()
                }
                Err(e) => {
                    tracing::error!("Failed to load catalog {}: {} - using built-in recipes", p, e);
                    Self::builtin()
                }
            },
            None => Self::builtin(),
        }
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn builtin() -> Self {
        Self {
            recipes: builtin_recipes(),
        }
    }
}

impl Default for RecipeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn recipe(
    id: &str,
    name: &str,
    ingredients: &[&str],
    steps: &[&str],
    estimated_cost: f64,
    prep_minutes: u32,
    difficulty: Difficulty,
) -> Recipe {
    Recipe {
        id: id.to_string(),
        name: name.to_string(),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        steps: steps.iter().map(|s| s.to_string()).collect(),
        estimated_cost,
        prep_minutes,
        difficulty,
    }
}

fn builtin_recipes() -> Vec<Recipe> {
    vec![
        recipe(
            "sanduiche-natural",
            "Sanduíche Natural",
            &["Pão de forma", "Queijo", "Tomate", "Alface"],
            &[
                "Corte o pão em fatias",
                "Adicione os ingredientes em camadas",
                "Corte em formato de coração para a Maju",
                "Sirva com amor!",
            ],
            8.50,
            10,
            Difficulty::Easy,
        ),
        recipe(
            "vitamina-banana",
            "Vitamina de Banana com Aveia",
            &["Banana", "Leite", "Aveia", "Mel"],
            &[
                "Descasque e corte a banana",
                "Bata tudo no liquidificador por 1 minuto",
                "Sirva gelado num copo colorido",
            ],
            6.00,
            5,
            Difficulty::Trivial,
        ),
        recipe(
            "omelete-queijo-presunto",
            "Omelete de Queijo e Presunto",
            &["Ovos", "Queijo", "Presunto", "Manteiga", "Sal"],
            &[
                "Bata os ovos com uma pitada de sal",
                "Derreta a manteiga na frigideira",
                "Despeje os ovos e espalhe o queijo e o presunto",
                "Dobre ao meio e deixe dourar dos dois lados",
            ],
            9.00,
            15,
            Difficulty::Moderate,
        ),
        recipe(
            "iogurte-granola",
            "Iogurte com Granola e Morango",
            &["Iogurte", "Granola", "Morango", "Mel"],
            &[
                "Lave e corte os morangos",
                "Monte camadas de iogurte, granola e morango num pote",
                "Finalize com um fio de mel",
            ],
            10.00,
            5,
            Difficulty::Trivial,
        ),
        recipe(
            "torrada-abacate",
            "Torrada de Abacate",
            &["Pão de forma", "Abacate", "Limão", "Sal"],
            &[
                "Toste as fatias de pão",
                "Amasse o abacate com limão e sal",
                "Espalhe sobre a torrada",
            ],
            7.50,
            10,
            Difficulty::Easy,
        ),
        recipe(
            "panqueca-banana",
            "Panqueca de Banana",
            &["Banana", "Ovos", "Aveia", "Canela"],
            &[
                "Amasse a banana com um garfo",
                "Misture os ovos, a aveia e a canela",
                "Doure pequenas porções na frigideira antiaderente",
                "Vire quando aparecerem bolhinhas",
            ],
            5.50,
            20,
            Difficulty::Moderate,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_is_valid_and_ordered() {
        let catalog = RecipeCatalog::builtin();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.recipes()[0].name, "Sanduíche Natural");
        for recipe in catalog.recipes() {
            recipe.validate().unwrap();
        }
        assert!(catalog.get("panqueca-banana").is_some());
        assert!(catalog.get("lasanha").is_none());
    }

    #[test]
    fn builtin_ingredients_are_offered_as_quick_picks() {
        let catalog = RecipeCatalog::builtin();
        for recipe in catalog.recipes() {
            for ingredient in &recipe.ingredients {
                assert!(
                    COMMON_INGREDIENTS.contains(&ingredient.as_str()),
                    "{ingredient} missing from quick picks"
                );
            }
        }
    }

    #[test]
    fn yaml_catalog_rejects_negative_cost() {
        let yaml = r#"
recipes:
  - id: bad
    name: Caro demais
    ingredients: [Ouro]
    steps: []
    estimated_cost: -1.0
    prep_minutes: 1
    difficulty: easy
"#;
        assert!(matches!(
            RecipeCatalog::from_yaml_str(yaml),
            Err(ChefError::Validation { .. })
        ));
    }

    #[test]
    fn load_reads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
recipes:
  - id: pipoca
    name: Pipoca
    ingredients: [Milho, Sal]
    steps: [Estoure o milho]
    estimated_cost: 3.0
    prep_minutes: 8
    difficulty: trivial
"#
        )
        .unwrap();

        let catalog = RecipeCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.recipes()[0].difficulty, Difficulty::Trivial);
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let catalog = RecipeCatalog::load_or_builtin(Some("/definitely/not/here.yaml"));
        assert_eq!(catalog.len(), RecipeCatalog::builtin().len());
    }
}
