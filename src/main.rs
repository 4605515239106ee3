use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use car_quiz::{
    BackAction, FlowConfig, FlowStep, HttpMatchingBackend, LeadDraft, MemoryStore, PathChoice,
    ResultsView, Wizard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let api_url =
        std::env::var("CAR_QUIZ_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let path_hint = match std::env::var("CAR_QUIZ_PATH").as_deref() {
        Ok("direct-search") => Some(PathChoice::DirectSearch),
        Ok("quiz") => Some(PathChoice::Quiz),
        _ => None,
    };

    eprintln!("🚗 Car Quiz v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", api_url);
    eprintln!("   Answer prompts with the option number; 'b' goes back.\n");

    let config = FlowConfig::default();
    let backend = Arc::new(
        HttpMatchingBackend::new(api_url, config.request_timeout)
            .context("failed to build backend client")?,
    );
    let store = Arc::new(MemoryStore::new());
    let wizard = Wizard::new(backend, store, config);

    if let Ok(broker) = std::env::var("CAR_QUIZ_BROKER") {
        wizard.attach_broker(&broker).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match wizard.current_step().await {
            FlowStep::Start => {
                let choice = prompt(
                    &mut lines,
                    "Do you know what you're looking for? [y = pick make/model, n = take the quiz]",
                )
                .await?;
                let path = if choice.eq_ignore_ascii_case("y") {
                    PathChoice::DirectSearch
                } else {
                    PathChoice::Quiz
                };
                wizard.choose_path(path).await?;
                wizard.begin(path_hint).await?;
            }
            FlowStep::Question(_) => {
                let question = wizard
                    .current_question()
                    .await
                    .expect("question step always has a question");
                println!("\n{}", question.prompt);
                for (i, option) in question.options.iter().enumerate() {
                    println!("  {}. {}", i + 1, option.label);
                }
                let input = prompt(&mut lines, "> ").await?;
                if input.eq_ignore_ascii_case("b") {
                    if let BackAction::Navigate(_) = wizard.back().await? {
                        break;
                    }
                    continue;
                }
                let Some(option) = input
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| question.options.get(n.wrapping_sub(1)))
                else {
                    println!("Pick an option number between 1 and {}.", question.options.len());
                    continue;
                };
                wizard.select_answer(question.id, option.value).await?;
                wizard.advance().await?;
            }
            FlowStep::DirectSearchInput => {
                let makes = wizard.load_makes().await?;
                println!("\nMakes: {}", makes.join(", "));
                let make = prompt(&mut lines, "Make> ").await?;
                wizard.select_make(&make).await;
                match wizard.load_models().await {
                    Ok(models) if !models.is_empty() => {
                        println!("Models: {}", models.join(", "))
                    }
                    Ok(_) => println!("No models listed for {make}; type one anyway."),
                    Err(e) => println!("Could not load models ({e}); type one anyway."),
                }
                let model = prompt(&mut lines, "Model> ").await?;
                wizard.select_model(&model).await;
                let comments = prompt(&mut lines, "Comments (optional)> ").await?;
                wizard.set_search_comments(&comments).await;
                if let Err(e) = wizard.submit_search().await {
                    println!("Search failed: {e}. Try again.");
                }
            }
            FlowStep::BlurredResults => {
                if let ResultsView::Pending = wizard.visible_results().await {
                    // Quiz path: matches are fetched on entry to this step.
                    if let Err(e) = wizard.load_quiz_matches().await {
                        println!("Could not load matches: {e}.");
                        prompt(&mut lines, "Press Enter to retry").await?;
                        continue;
                    }
                }
                if let ResultsView::Blurred(teasers) = wizard.visible_results().await {
                    println!("\nYour matches (locked):");
                    for teaser in &teasers {
                        println!(
                            "  🔒 {} {} — {}% match",
                            teaser.brand, teaser.name, teaser.match_percentage
                        );
                    }
                }
                prompt(&mut lines, "Press Enter to unlock your matches").await?;
                wizard.request_reveal().await?;
            }
            FlowStep::LeadCapture => {
                let draft = LeadDraft {
                    name: prompt(&mut lines, "Full name> ").await?,
                    email: prompt(&mut lines, "Email> ").await?,
                    phone: prompt(&mut lines, "Phone> ").await?,
                    ..LeadDraft::default()
                };
                wizard.set_draft(draft).await;
                match wizard.submit_lead().await {
                    Ok(record) => {
                        println!("Thanks {}! Unlocking your results.", record.customer_name)
                    }
                    Err(e) => println!("Submission failed ({e}); your details are kept — try again."),
                }
            }
            FlowStep::FinalResults => {
                if let ResultsView::Full(envelope) = wizard.visible_results().await {
                    println!("\nYour matches ({} found):", envelope.total_matches);
                    for car in &envelope.matches {
                        println!(
                            "  🚗 {} {} — {}% match, {}, {} seats, {} ({}/wk)",
                            car.brand,
                            car.name,
                            car.match_percentage,
                            car.price_range,
                            car.seats,
                            car.fuel_type,
                            car.weekly_repayment
                        );
                    }
                    println!("\nWhy these cars? {}", envelope.explanation);
                }
                let again = prompt(&mut lines, "\nStart over? [y/N] ").await?;
                if again.eq_ignore_ascii_case("y") {
                    wizard.retake().await;
                } else {
                    break;
                }
            }
        }
    }

    Ok(())
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, text: &str) -> anyhow::Result<String> {
    println!("{text}");
    let line = lines
        .next_line()
        .await?
        .context("stdin closed")?;
    Ok(line.trim().to_string())
}
