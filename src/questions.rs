//! The quiz question catalog — immutable, ordered, externally configured
//! in spirit but shipped as a static table the way the product defines it.

use std::sync::LazyLock;

use serde::Serialize;

/// One selectable option for a question.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuestionOption {
    /// The value stored in the answer set and sent to the backend.
    pub value: &'static str,
    /// Longer label for display.
    pub label: &'static str,
}

/// A single quiz question.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuestionDefinition {
    /// Question id. Ids are 1-based and order-significant.
    pub id: u8,
    pub prompt: &'static str,
    pub options: Vec<QuestionOption>,
}

impl QuestionDefinition {
    /// Whether `value` matches one of this question's options.
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

fn opt(value: &'static str, label: &'static str) -> QuestionOption {
    QuestionOption { value, label }
}

static QUESTIONS: LazyLock<Vec<QuestionDefinition>> = LazyLock::new(|| {
    vec![
        QuestionDefinition {
            id: 1,
            prompt: "What type of car are you leaning towards?",
            options: vec![
                opt("Sedan", "Sedan"),
                opt("SUV", "SUV"),
                opt("Hatchback", "Hatchback"),
                opt("Sports", "Sports"),
                opt("Ute", "Ute"),
                opt("People Mover", "People Mover"),
                opt("Wagon", "Wagon"),
                opt("Van", "Van"),
                opt("Convertible", "Convertible"),
            ],
        },
        QuestionDefinition {
            id: 2,
            prompt: "What's your budget range?",
            options: vec![
                opt("Under $25k", "Under $25k – Entry-level or first car"),
                opt("$25k-$35k", "$25k-$35k – Value small car or compact SUV"),
                opt("$35k-$50k", "$35k-$50k – Budget-friendly family vehicle"),
                opt("$50k-$70k", "$50k-$70k – High-spec SUV or trade-ready ute"),
                opt("$70k-$100k", "$70k-$100k – Entry-level luxury or premium family"),
                opt("$100k+", "$100k+ – Top-end, performance or prestige"),
            ],
        },
        QuestionDefinition {
            id: 3,
            prompt: "How many seats do you need?",
            options: vec![
                opt(
                    "Up to 5 is fine",
                    "Up to 5 is fine – Perfect for couples, small families, or commuting",
                ),
                opt(
                    "6+ seats",
                    "6+ seats – Large family, regular passengers, or extra cargo space",
                ),
            ],
        },
        QuestionDefinition {
            id: 4,
            prompt: "What level of vehicle quality or brand are you after?",
            options: vec![
                opt(
                    "Everyday",
                    "Everyday – Reliable, practical, great value (Toyota, Mazda, Hyundai)",
                ),
                opt(
                    "Premium",
                    "Premium – Higher-spec features, better materials (Subaru, Volkswagen)",
                ),
                opt(
                    "Luxury",
                    "Luxury – Top-tier brands, premium experience (BMW, Mercedes, Audi)",
                ),
            ],
        },
        QuestionDefinition {
            id: 5,
            prompt: "What type of fuel or powertrain do you prefer?",
            options: vec![
                opt(
                    "Petrol, Diesel, or Hybrid (no plug-in)",
                    "Petrol, Diesel, or Hybrid (no plug-in) – Traditional fueling, proven reliability",
                ),
                opt(
                    "Electric (EV) or Plug-in Hybrid (PHEV)",
                    "Electric (EV) or Plug-in Hybrid (PHEV) – Eco-friendly, lower running costs",
                ),
            ],
        },
        QuestionDefinition {
            id: 6,
            prompt: "When are you looking to purchase?",
            options: vec![
                opt("Ready now", "Ready now – I want to buy within 2 weeks"),
                opt(
                    "Within 1 month",
                    "Within 1 month – Actively shopping, ready to decide soon",
                ),
                opt(
                    "Within 3 months",
                    "Within 3 months – Planning ahead, comparing options",
                ),
                opt(
                    "Just researching",
                    "Just researching – Exploring what's available, no rush",
                ),
            ],
        },
    ]
});

/// The full ordered question catalog.
pub fn quiz_questions() -> &'static [QuestionDefinition] {
    &QUESTIONS
}

/// Number of questions in the catalog.
pub fn question_count() -> usize {
    QUESTIONS.len()
}

/// Look up a question by id.
pub fn question_by_id(id: u8) -> Option<&'static QuestionDefinition> {
    QUESTIONS.iter().find(|q| q.id == id)
}

/// The question at a 0-based position in the ordered sequence.
pub fn question_at(index: usize) -> Option<&'static QuestionDefinition> {
    QUESTIONS.get(index)
}
