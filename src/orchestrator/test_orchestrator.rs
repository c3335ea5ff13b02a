use super::*;
use crate::intent::MockIntentClassifier;
use crate::models::{Persona, Speaker};
use tokio::sync::broadcast::error::TryRecvError;

fn quiet_config() -> Config {
    let mut config = Config::default();
    config.assistant.thinking_delay_ms = 0;
    config.matcher.seed = Some(7);
    config
}

fn orchestrator(ingredients: &IngredientSet) -> DialogueOrchestrator {
    DialogueOrchestrator::new(
        &quiet_config(),
        Arc::new(RecipeCatalog::builtin()),
        ingredients,
    )
    .unwrap()
}

fn set(items: &[&str]) -> IngredientSet {
    items.iter().collect()
}

#[tokio::test]
async fn session_opens_with_greeting() {
    let orch = orchestrator(&IngredientSet::new());
    let session = orch.session();
    assert_eq!(session.turns().len(), 1);
    assert_eq!(session.turns()[0].persona, Some(Persona::Triage));
    assert_eq!(session.step(), DialogueStep::AwaitingIngredients);
    assert_eq!(orch.next_step_hint(), "Adicione ingredientes disponíveis");
}

#[tokio::test]
async fn recipe_request_with_sandwich_ingredients() {
    let ingredients = set(&["Pão de forma", "Queijo"]);
    let orch = orchestrator(&ingredients);
    assert_eq!(orch.step(), DialogueStep::Ready);
    let mut events = orch.subscribe();

    let turn = orch
        .handle_message("quero um lanche", &ingredients, 50.0)
        .await
        .unwrap();

    assert_eq!(turn.speaker, Speaker::Agent);
    assert_eq!(turn.persona, Some(Persona::Recipe));
    assert!(turn.text.contains("Sanduíche Natural"));
    assert_eq!(orch.step(), DialogueStep::Suggested);

    let session = orch.session();
    assert_eq!(session.last_recipe().unwrap().id, "sanduiche-natural");
    assert_eq!(session.turns().len(), 3);
    assert_eq!(session.turns()[1].speaker, Speaker::User);
    assert_eq!(session.turns()[1].text, "quero um lanche");

    match events.try_recv().unwrap() {
        ChefEvent::RecipeSuggested { name, steps, .. } => {
            assert_eq!(name, "Sanduíche Natural");
            assert_eq!(steps.len(), 4);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn recipe_request_without_ingredients_asks_for_them() {
    let empty = IngredientSet::new();
    let orch = orchestrator(&empty);
    let mut events = orch.subscribe();

    let turn = orch
        .handle_message("quero um lanche", &empty, 50.0)
        .await
        .unwrap();

    assert!(turn.text.contains("ingredientes"));
    assert_eq!(orch.step(), DialogueStep::AwaitingIngredients);
    assert!(orch.session().last_recipe().is_none());
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn price_request_with_ten_reais() {
    let orch = orchestrator(&IngredientSet::new());
    let mut events = orch.subscribe();

    let turn = orch
        .handle_message("quanto vai custar?", &IngredientSet::new(), 10.0)
        .await
        .unwrap();

    assert_eq!(turn.persona, Some(Persona::Pricing));
    assert_eq!(orch.step(), DialogueStep::PriceAnalyzed);
    let session = orch.session();
    let analysis = session.last_price_analysis().unwrap();
    assert!((analysis.total_cost - 6.0).abs() < 1e-9);
    assert!((analysis.savings - 4.0).abs() < 1e-9);

    match events.try_recv().unwrap() {
        ChefEvent::PriceAnalyzed { total_cost, savings, breakdown } => {
            assert!((total_cost - 6.0).abs() < 1e-9);
            assert!((savings - 4.0).abs() < 1e-9);
            assert_eq!(breakdown.len(), 3);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn negative_budget_leaves_session_untouched() {
    let ingredients = set(&["Ovos"]);
    let orch = orchestrator(&ingredients);
    let mut events = orch.subscribe();
    let before = orch.session();

    let err = orch
        .handle_message("quanto custa?", &ingredients, -5.0)
        .await
        .unwrap_err();

    assert!(matches!(err, ChefError::Validation { ref field, .. } if field == "budget"));
    assert!(!err.user_message().is_empty());
    let after = orch.session();
    assert_eq!(after.turns(), before.turns());
    assert_eq!(after.step(), before.step());
    assert!(after.last_price_analysis().is_none());
    assert!(!orch.is_busy());
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    // The conversation carries on after the error
    let turn = orch
        .handle_message("quanto custa?", &ingredients, 20.0)
        .await
        .unwrap();
    assert_eq!(turn.persona, Some(Persona::Pricing));
}

#[tokio::test]
async fn empty_text_gets_triage_reply_without_transition() {
    let ingredients = set(&["Banana"]);
    let orch = orchestrator(&ingredients);

    let turn = orch.handle_message("", &ingredients, 30.0).await.unwrap();

    assert_eq!(turn.persona, Some(Persona::Triage));
    assert_eq!(orch.step(), DialogueStep::Ready);
}

#[tokio::test]
async fn side_conversations_keep_pipeline_step() {
    let ingredients = set(&["Banana", "Leite"]);
    let orch = orchestrator(&ingredients);
    orch.handle_message("receita", &ingredients, 30.0)
        .await
        .unwrap();
    assert_eq!(orch.step(), DialogueStep::Suggested);

    for (text, persona) in [
        ("adapta pra maju", Persona::ChildAdaptation),
        ("obrigado!", Persona::Chef),
        ("hmm", Persona::Triage),
    ] {
        let turn = orch.handle_message(text, &ingredients, 30.0).await.unwrap();
        assert_eq!(turn.persona, Some(persona));
        assert_eq!(orch.step(), DialogueStep::Suggested);
    }
}

#[tokio::test]
async fn steps_follow_the_suggested_recipe() {
    let ingredients = set(&["Banana", "Leite"]);
    let orch = orchestrator(&ingredients);

    let before = orch
        .handle_message("me ensina o passo a passo", &ingredients, 30.0)
        .await
        .unwrap();
    assert_eq!(before.persona, Some(Persona::Execution));
    assert!(!before.text.contains("1."));

    orch.handle_message("quero uma receita", &ingredients, 30.0)
        .await
        .unwrap();
    let after = orch
        .handle_message("me ensina o passo a passo", &ingredients, 30.0)
        .await
        .unwrap();
    assert!(after.text.contains("Vitamina de Banana com Aveia"));
    assert!(after.text.contains("\n1. "));
    assert_eq!(orch.step(), DialogueStep::Suggested);
}

#[tokio::test]
async fn fallback_is_reproducible_with_same_seed() {
    let ingredients = set(&["Chocolate"]);
    let pick = |seed: u64| {
        let ingredients = ingredients.clone();
        async move {
            let orch = orchestrator(&ingredients).with_rng(StdRng::seed_from_u64(seed));
            orch.handle_message("lanche", &ingredients, 10.0)
                .await
                .unwrap();
            orch.session().last_recipe().unwrap().id.clone()
        }
    };

    let first = pick(99).await;
    let second = pick(99).await;
    assert_eq!(first, second);
    assert!(RecipeCatalog::builtin().get(&first).is_some());
}

#[tokio::test]
async fn second_message_is_refused_while_thinking() {
    let ingredients = set(&["Ovos"]);
    let orch = orchestrator(&ingredients).with_thinking_delay(Duration::from_millis(50));

    let (first, second) = tokio::join!(
        orch.handle_message("oi", &ingredients, 10.0),
        orch.handle_message("de novo", &ingredients, 10.0),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(ChefError::Busy)))
            .count(),
        1
    );
    assert!(!orch.is_busy());
    // greeting + one user turn + one agent turn
    assert_eq!(orch.session().turns().len(), 3);
}

#[tokio::test]
async fn shutdown_cancels_pending_reply() {
    let ingredients = set(&["Ovos"]);
    let orch = orchestrator(&ingredients).with_thinking_delay(Duration::from_secs(30));

    let (result, _) = tokio::join!(orch.handle_message("lanche", &ingredients, 10.0), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        orch.shutdown();
    });

    assert!(matches!(result, Err(ChefError::Cancelled)));
    assert!(!orch.is_busy());
    assert_eq!(orch.step(), DialogueStep::Ready);
    // Only the greeting: a cancelled reply records neither turn
    assert_eq!(orch.session().turns().len(), 1);
    assert!(matches!(
        orch.handle_message("oi", &ingredients, 10.0).await,
        Err(ChefError::Cancelled)
    ));
}

#[tokio::test]
async fn dropped_reply_releases_busy_flag() {
    let ingredients = set(&["Ovos"]);
    let orch = orchestrator(&ingredients).with_thinking_delay(Duration::from_secs(30));

    let timed_out = tokio::time::timeout(
        Duration::from_millis(10),
        orch.handle_message("oi", &ingredients, 10.0),
    )
    .await;

    assert!(timed_out.is_err());
    assert!(!orch.is_busy());
    assert_eq!(orch.session().turns().len(), 1);
}

#[tokio::test]
async fn dropped_reply_does_not_consume_fallback_draw() {
    let ingredients = set(&["Chocolate"]);
    let reference = orchestrator(&ingredients).with_rng(StdRng::seed_from_u64(3));
    reference
        .handle_message("lanche", &ingredients, 10.0)
        .await
        .unwrap();
    let expected = reference.session().last_recipe().unwrap().id.clone();

    let orch = orchestrator(&ingredients)
        .with_rng(StdRng::seed_from_u64(3))
        .with_thinking_delay(Duration::from_millis(100));
    let timed_out = tokio::time::timeout(
        Duration::from_millis(10),
        orch.handle_message("lanche", &ingredients, 10.0),
    )
    .await;
    assert!(timed_out.is_err());
    assert!(orch.session().last_recipe().is_none());

    orch.handle_message("lanche", &ingredients, 10.0)
        .await
        .unwrap();
    assert_eq!(orch.session().last_recipe().unwrap().id, expected);
    assert_eq!(orch.session().turns().len(), 3);
}

#[tokio::test]
async fn pricing_that_could_exceed_budget_is_refused() {
    let config = Config::from_yaml_str(
        r#"
assistant:
  thinking_delay_ms: 0
pricing:
  fraction: 1.5
  ceiling: 100.0
"#,
    )
    .unwrap();

    let result = DialogueOrchestrator::new(
        &config,
        Arc::new(RecipeCatalog::builtin()),
        &IngredientSet::new(),
    );

    assert!(matches!(result, Err(ChefError::Config(ref msg)) if msg.contains("fraction")));
}

#[tokio::test]
async fn price_never_exceeds_budget_with_full_fraction() {
    let mut config = quiet_config();
    config.pricing.fraction = 1.0;
    config.pricing.ceiling = 100.0;
    let orch = DialogueOrchestrator::new(
        &config,
        Arc::new(RecipeCatalog::builtin()),
        &IngredientSet::new(),
    )
    .unwrap();

    orch.handle_message("quanto custa?", &IngredientSet::new(), 10.0)
        .await
        .unwrap();

    let session = orch.session();
    let analysis = session.last_price_analysis().unwrap();
    assert!(analysis.total_cost <= analysis.budget.amount());
    assert!(analysis.savings >= 0.0);
}

#[tokio::test]
async fn classifier_is_injectable() {
    let mut classifier = MockIntentClassifier::new();
    classifier
        .expect_classify()
        .times(1)
        .returning(|_| Intent::Gratitude);

    let ingredients = IngredientSet::new();
    let orch = orchestrator(&ingredients).with_classifier(Arc::new(classifier));
    let turn = orch
        .handle_message("quero um lanche", &ingredients, 10.0)
        .await
        .unwrap();

    assert_eq!(turn.persona, Some(Persona::Chef));
}

#[tokio::test]
async fn empty_catalog_is_reported_not_panicked() {
    let ingredients = set(&["Ovos", "Queijo"]);
    let orch = DialogueOrchestrator::new(
        &quiet_config(),
        Arc::new(RecipeCatalog::new(vec![]).unwrap()),
        &ingredients,
    )
    .unwrap();

    let err = orch
        .handle_message("receita", &ingredients, 10.0)
        .await
        .unwrap_err();

    assert!(matches!(err, ChefError::Validation { ref field, .. } if field == "catalog"));
    assert_eq!(orch.session().turns().len(), 1);
}
