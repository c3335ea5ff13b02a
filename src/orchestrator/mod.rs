/// Per-conversation dialogue pipeline: classify, match or estimate, compose, record
#[cfg(test)]
mod test_orchestrator;

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::RecipeCatalog;
use crate::composer::{ComposedReply, Payload, ResponseComposer};
use crate::config::Config;
use crate::error::{ChefError, Result};
use crate::intent::{Intent, IntentClassifier, KeywordClassifier};
use crate::matcher::RecipeMatcher;
use crate::models::{ChefEvent, ConversationTurn, IngredientSet, PriceAnalysis, Recipe};
use crate::pricing::PriceEstimator;
use crate::session::{DialogueStep, Session};

const EVENT_CAPACITY: usize = 16;

struct State {
    session: Session,
    rng: StdRng,
}

/// Everything a message will change, computed before anything is changed
struct Dispatch {
    reply: ComposedReply,
    next_step: Option<DialogueStep>,
    recipe: Option<Recipe>,
    analysis: Option<PriceAnalysis>,
    /// Fallback picker state after this message's draw
    rng: StdRng,
}

pub struct DialogueOrchestrator {
    catalog: Arc<RecipeCatalog>,
    classifier: Arc<dyn IntentClassifier>,
    matcher: RecipeMatcher,
    estimator: PriceEstimator,
    composer: ResponseComposer,
    thinking_delay: Duration,
    state: Mutex<State>,
    events: broadcast::Sender<ChefEvent>,
    cancel: CancellationToken,
}

impl DialogueOrchestrator {
    /// Start a conversation. The session opens with the assistant's greeting.
    ///
    /// Fails when the pricing section could produce an estimate above its budget.
    pub fn new(
        config: &Config,
        catalog: Arc<RecipeCatalog>,
        ingredients: &IngredientSet,
    ) -> Result<Self> {
        let estimator = PriceEstimator::new(config.pricing.clone())?;
        let rng = match config.matcher.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let composer = ResponseComposer::new();
        let mut session = Session::new(DialogueStep::initial(!ingredients.is_empty()));
        let greeting = composer.greeting(&config.assistant.name);
        session.push(ConversationTurn::agent(greeting.persona, greeting.text));

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        info!(
            "Session started in step {} with {} recipes",
            session.step(),
            catalog.len()
        );

        Ok(Self {
            catalog,
            classifier: Arc::new(KeywordClassifier::new()),
            matcher: RecipeMatcher::new(),
            estimator,
            composer,
            thinking_delay: config.thinking_delay(),
            state: Mutex::new(State { session, rng }),
            events,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the fallback picker's random source, e.g. with a seeded one in tests
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .rng = rng;
        self
    }

    pub fn with_thinking_delay(mut self, delay: Duration) -> Self {
        self.thinking_delay = delay;
        self
    }

    /// Process one user message and return the agent's reply turn.
    ///
    /// Refuses with [`ChefError::Busy`] while another message is in flight.
    /// Validation errors are returned before the session is touched, and a
    /// reply cancelled or dropped during the thinking wait leaves no trace.
    /// Both turns are recorded together once the reply is ready.
    pub async fn handle_message(
        &self,
        text: &str,
        ingredients: &IngredientSet,
        budget: f64,
    ) -> Result<ConversationTurn> {
        if self.cancel.is_cancelled() {
            return Err(ChefError::Cancelled);
        }

        let plan = {
            let mut state = self.lock_state();
            if state.session.is_busy() {
                warn!("Rejected message while a reply is pending");
                return Err(ChefError::Busy);
            }

            let intent = self.classifier.classify(text);
            info!("Dispatching {} in step {}", intent, state.session.step());
            let plan = self.dispatch(&state, intent, ingredients, budget)?;

            state.session.set_busy(true);
            plan
        };

        // Clears the busy flag on every exit, including a dropped future
        let _busy = BusyGuard { orchestrator: self };

        self.think().await?;

        let mut emitted = Vec::new();
        let turn = {
            let mut state = self.lock_state();
            state.rng = plan.rng;
            let session = &mut state.session;
            session.push(ConversationTurn::user(text));
            if let Some(step) = plan.next_step {
                session.set_step(step);
            }
            if let Some(recipe) = plan.recipe {
                emitted.push(ChefEvent::from(&recipe));
                session.store_recipe(recipe);
            }
            if let Some(analysis) = plan.analysis {
                emitted.push(ChefEvent::from(&analysis));
                session.store_price_analysis(analysis);
            }
            let turn = ConversationTurn::agent(plan.reply.persona, plan.reply.text);
            session.push(turn.clone());
            turn
        };

        for event in emitted {
            // Err only means nobody is listening
            if self.events.send(event).is_err() {
                debug!("No event subscribers");
            }
        }

        Ok(turn)
    }

    fn dispatch(
        &self,
        state: &State,
        intent: Intent,
        ingredients: &IngredientSet,
        budget: f64,
    ) -> Result<Dispatch> {
        let mut rng = state.rng.clone();
        let plan = match intent {
            Intent::RequestRecipe if ingredients.is_empty() => Dispatch {
                reply: self.composer.compose(intent, Payload::None),
                next_step: Some(DialogueStep::AwaitingIngredients),
                recipe: None,
                analysis: None,
                rng,
            },
            Intent::RequestRecipe => {
                let (recipe, kind) = self.matcher.match_recipe(
                    ingredients,
                    self.catalog.recipes(),
                    &mut rng,
                )?;
                info!("Suggesting '{}' ({:?})", recipe.name, kind);
                Dispatch {
                    reply: self.composer.compose(intent, Payload::Recipe(recipe)),
                    next_step: Some(DialogueStep::Suggested),
                    recipe: Some(recipe.clone()),
                    analysis: None,
                    rng,
                }
            }
            Intent::RequestPrice => {
                let analysis = self.estimator.estimate(budget)?;
                Dispatch {
                    reply: self.composer.compose(intent, Payload::Price(&analysis)),
                    next_step: Some(DialogueStep::PriceAnalyzed),
                    recipe: None,
                    analysis: Some(analysis),
                    rng,
                }
            }
            Intent::RequestSteps => {
                let payload = match state.session.last_recipe() {
                    Some(recipe) => Payload::Recipe(recipe),
                    None => Payload::None,
                };
                Dispatch {
                    reply: self.composer.compose(intent, payload),
                    next_step: None,
                    recipe: None,
                    analysis: None,
                    rng,
                }
            }
            Intent::ChildAdaptation | Intent::Gratitude | Intent::Unknown => Dispatch {
                reply: self.composer.compose(intent, Payload::None),
                next_step: None,
                recipe: None,
                analysis: None,
                rng,
            },
        };
        Ok(plan)
    }

    /// The deliberate pause before replying; ends early only on shutdown
    async fn think(&self) -> Result<()> {
        if self.thinking_delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = self.cancel.cancelled() => {
                info!("Thinking wait cancelled by shutdown");
                Err(ChefError::Cancelled)
            }
            _ = tokio::time::sleep(self.thinking_delay) => Ok(()),
        }
    }

    /// Cancel any pending reply and refuse further messages
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChefEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the conversation so far
    pub fn session(&self) -> Session {
        self.lock_state().session.clone()
    }

    pub fn step(&self) -> DialogueStep {
        self.lock_state().session.step()
    }

    pub fn is_busy(&self) -> bool {
        self.lock_state().session.is_busy()
    }

    pub fn next_step_hint(&self) -> &'static str {
        self.step().hint()
    }

    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct BusyGuard<'a> {
    orchestrator: &'a DialogueOrchestrator,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.lock_state().session.set_busy(false);
    }
}
