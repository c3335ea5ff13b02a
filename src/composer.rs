use crate::intent::Intent;
use crate::models::{PriceAnalysis, Persona, Recipe};
use crate::pricing::savings_tip;

/// Shortcut prompts offered under the chat input
pub const QUICK_ACTIONS: [(&str, &str); 2] = [
    ("Sugerir receita", "Quero fazer um lanche para a Maju"),
    ("Verificar preços", "Quanto vai custar?"),
];

/// Data a reply may interpolate
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    None,
    Recipe(&'a Recipe),
    Price(&'a PriceAnalysis),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedReply {
    pub persona: Persona,
    pub text: String,
}

/// Turns an intent and its payload into a persona-attributed message. Pure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseComposer;

impl ResponseComposer {
    pub fn new() -> Self {
        Self
    }

    pub const fn persona_for(intent: Intent) -> Persona {
        match intent {
            Intent::RequestRecipe => Persona::Recipe,
            Intent::RequestPrice => Persona::Pricing,
            Intent::ChildAdaptation => Persona::ChildAdaptation,
            Intent::RequestSteps => Persona::Execution,
            Intent::Gratitude => Persona::Chef,
            Intent::Unknown => Persona::Triage,
        }
    }

    pub fn compose(&self, intent: Intent, payload: Payload<'_>) -> ComposedReply {
        let text = match (intent, payload) {
            (Intent::RequestRecipe, Payload::Recipe(recipe)) => recipe_text(recipe),
            (Intent::RequestRecipe, _) => "Primeiro, preciso saber quais ingredientes você tem \
                disponíveis. Pode me contar o que tem na geladeira?"
                .to_string(),
            (Intent::RequestPrice, Payload::Price(analysis)) => price_text(analysis),
            (Intent::RequestPrice, _) => "Me diga quanto você quer gastar e eu verifico os \
                preços nos mercados da região."
                .to_string(),
            (Intent::ChildAdaptation, _) => "Ótimo! Para a Maju, vou adaptar a receita: sem \
                temperos fortes, formato divertido (que tal um sanduíche em formato de estrela?), \
                e com ingredientes que ela já gosta. Ela tem alguma alergia ou ingrediente que \
                não gosta?"
                .to_string(),
            (Intent::RequestSteps, Payload::Recipe(recipe)) => steps_text(recipe),
            (Intent::RequestSteps, _) => "Posso te guiar passo a passo! Primeiro me peça uma \
                receita de lanche para eu saber o que vamos preparar."
                .to_string(),
            (Intent::Gratitude, _) => "Por nada! Bom lanche para vocês. Se precisar de outra \
                ideia, é só chamar."
                .to_string(),
            (Intent::Unknown, _) => "Entendi! Como posso te ajudar com o lanche? Posso sugerir \
                receitas, verificar preços, ou adaptar algo especial para a Maju."
                .to_string(),
        };

        ComposedReply {
            persona: Self::persona_for(intent),
            text,
        }
    }

    /// Opening message of every session
    pub fn greeting(&self, assistant_name: &str) -> ComposedReply {
        ComposedReply {
            persona: Persona::Triage,
            text: format!(
                "Olá! Sou o {assistant_name}. Vou te ajudar a fazer um lanche delicioso e \
                 econômico. O que você gostaria de preparar hoje?"
            ),
        }
    }
}

fn brl(amount: f64) -> String {
    format!("R$ {amount:.2}")
}

fn recipe_text(recipe: &Recipe) -> String {
    let highlights: Vec<&str> = recipe
        .ingredients
        .iter()
        .take(3)
        .map(String::as_str)
        .collect();
    format!(
        "Perfeito! Com {} posso sugerir: {} ({}, {} minutos). Custo estimado: {}. \
         Quer que eu te guie no preparo?",
        highlights.join(", "),
        recipe.name,
        recipe.difficulty,
        recipe.prep_minutes,
        brl(recipe.estimated_cost)
    )
}

fn steps_text(recipe: &Recipe) -> String {
    let mut text = format!("Vamos preparar {} juntos:", recipe.name);
    for (i, step) in recipe.steps.iter().enumerate() {
        text.push_str(&format!("\n{}. {}", i + 1, step));
    }
    text
}

fn price_text(analysis: &PriceAnalysis) -> String {
    let mut text = format!(
        "Analisei os preços nos mercados da região. O custo total seria {}, sobrando {} do \
         seu orçamento.",
        brl(analysis.total_cost),
        brl(analysis.savings)
    );
    if !analysis.breakdown.is_empty() {
        let items: Vec<String> = analysis
            .breakdown
            .iter()
            .map(|i| format!("{} ({})", i.item, brl(i.price)))
            .collect();
        text.push_str(&format!(" Referência: {}.", items.join(", ")));
    }
    if !analysis.vendors.is_empty() {
        text.push_str(&format!(
            " Melhores preços em: {}.",
            analysis.vendors.join(", ")
        ));
    }
    text.push(' ');
    text.push_str(savings_tip(&analysis.budget));
    text.push_str(" Quer que eu procure opções mais baratas?");
    text
}
