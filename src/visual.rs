/// Terminal rendering of conversation turns and panel events
use colored::*;

use crate::models::{ChefEvent, ConversationTurn, IngredientSet, Persona, Speaker};
use crate::session::DialogueStep;

pub struct ChatVisual;

impl ChatVisual {
    fn persona_icon(persona: Persona) -> &'static str {
        match persona {
            Persona::Recipe => "👨‍🍳",
            Persona::Pricing => "🔎",
            Persona::ChildAdaptation => "💖",
            Persona::Execution => "▶️",
            Persona::Chef => "🥪",
            Persona::Triage => "🤖",
        }
    }

    pub fn render_turn(turn: &ConversationTurn) -> String {
        match (turn.speaker, turn.persona) {
            (Speaker::User, _) => format!("{} {}", "Você:".bright_blue().bold(), turn.text),
            (Speaker::Agent, Some(persona)) => format!(
                "{} {}\n   {}",
                Self::persona_icon(persona),
                persona.label().bright_green().bold(),
                turn.text
            ),
            (Speaker::Agent, None) => turn.text.clone(),
        }
    }

    pub fn render_event(event: &ChefEvent) -> String {
        match event {
            ChefEvent::RecipeSuggested {
                name,
                ingredients,
                estimated_cost,
                prep_time,
                difficulty,
                ..
            } => format!(
                "   {} {} | {} | {} min | R$ {:.2} | {}",
                "📋".bright_cyan(),
                name.cyan(),
                difficulty,
                prep_time,
                estimated_cost,
                ingredients.join(", ")
            ),
            ChefEvent::PriceAnalyzed {
                total_cost,
                savings,
                ..
            } => format!(
                "   {} total R$ {:.2} | economia R$ {:.2}",
                "💰".bright_yellow(),
                total_cost,
                savings
            ),
        }
    }

    pub fn render_status(step: DialogueStep, ingredients: &IngredientSet, budget: f64) -> String {
        let list: Vec<&str> = ingredients.iter().collect();
        format!(
            "{} {} | ingredientes ({}): {} | orçamento R$ {:.2}",
            "Próximo passo:".yellow(),
            step.hint(),
            list.len(),
            if list.is_empty() { "-".to_string() } else { list.join(", ") },
            budget
        )
    }

    pub fn render_error(message: &str) -> String {
        message.bright_red().to_string()
    }
}
