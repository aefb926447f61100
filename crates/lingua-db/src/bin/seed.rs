//! # Seed Data Generator
//!
//! Populates the database with demo lesson modules for development.
//!
//! ## Usage
//! ```bash
//! # Generate one module per topic (default)
//! cargo run -p lingua-db --bin seed
//!
//! # Generate custom amount (topics repeat)
//! cargo run -p lingua-db --bin seed -- --count 20
//!
//! # Specify database path
//! cargo run -p lingua-db --bin seed -- --db ./data/lingua.db
//! ```
//!
//! ## Generated Modules
//! Every module goes through the same path an editor save does: create,
//! then synchronize a full document with all eleven blocks populated.

use lingua_core::validation::validate_value;
use lingua_core::{ModuleLevel, NewModule};
use lingua_db::{Database, DbConfig};
use serde_json::{json, Value};
use std::env;
use tracing_subscriber::EnvFilter;

/// Lesson topics: (English title, Russian title, vocabulary (word, translation))
const TOPICS: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "Greetings",
        "Приветствия",
        &[
            ("привет", "hi"),
            ("здравствуйте", "hello"),
            ("пока", "bye"),
            ("спасибо", "thank you"),
        ],
    ),
    (
        "At the Café",
        "В кафе",
        &[
            ("кофе", "coffee"),
            ("чай", "tea"),
            ("счёт", "bill"),
            ("меню", "menu"),
            ("официант", "waiter"),
        ],
    ),
    (
        "Family",
        "Семья",
        &[
            ("мама", "mother"),
            ("папа", "father"),
            ("брат", "brother"),
            ("сестра", "sister"),
        ],
    ),
    (
        "In the City",
        "В городе",
        &[
            ("улица", "street"),
            ("метро", "metro"),
            ("площадь", "square"),
            ("музей", "museum"),
        ],
    ),
    (
        "Shopping",
        "Покупки",
        &[
            ("магазин", "shop"),
            ("рынок", "market"),
            ("цена", "price"),
            ("дёшево", "cheap"),
            ("дорого", "expensive"),
        ],
    ),
    (
        "Travel",
        "Путешествия",
        &[
            ("поезд", "train"),
            ("билет", "ticket"),
            ("вокзал", "station"),
            ("паспорт", "passport"),
        ],
    ),
];

const LEVELS: &[ModuleLevel] = &[
    ModuleLevel::A1,
    ModuleLevel::A1,
    ModuleLevel::A2,
    ModuleLevel::A2,
    ModuleLevel::B1,
    ModuleLevel::B2,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = TOPICS.len();
    let mut db_path = String::from("./lingua_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(TOPICS.len());
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Lingua Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of modules to generate (default: {})", TOPICS.len());
                println!("  -d, --db <PATH>    Database file path (default: ./lingua_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    // RUST_LOG=lingua_db=debug shows every reconcile step
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("🌱 Lingua Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Modules:  {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.modules().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} modules", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating modules...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for index in 0..count {
        let (title, title_ru, words) = TOPICS[index % TOPICS.len()];
        let round = index / TOPICS.len();
        let title = if round == 0 {
            title.to_string()
        } else {
            format!("{title} {}", round + 1)
        };

        let new_module = NewModule {
            title: title.clone(),
            level: LEVELS[index % LEVELS.len()],
            map_x: Some(80.0 + (index % 4) as f64 * 160.0),
            map_y: Some(60.0 + (index / 4) as f64 * 120.0),
            ..Default::default()
        };

        let module = match db.modules().create(&new_module).await {
            Ok(module) => module,
            Err(e) => {
                eprintln!("Failed to create {}: {}", title, e);
                continue;
            }
        };

        let document = validate_value(demo_document(title_ru, words))?;
        if let Err(e) = db.modules().synchronize(module.id, &document).await {
            eprintln!("Failed to synchronize {}: {}", title, e);
            continue;
        }

        generated += 1;
        println!("  ✓ #{} {} ({})", module.id, title, title_ru);
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} modules in {:?}", generated, elapsed);

    // Read one back through the document path
    println!();
    println!("Verifying documents...");
    if let Some(first) = db.modules().list().await?.first() {
        if let Some(view) = db.modules().get_document(first.id).await? {
            let vocabulary = view.content.vocabulary.map(|v| v.len()).unwrap_or(0);
            let quiz = view.content.quiz.map(|q| q.len()).unwrap_or(0);
            println!(
                "  #{}: {} vocabulary items, {} quiz questions",
                first.id, vocabulary, quiz
            );
        }
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// A document with every block populated.
fn demo_document(title_ru: &str, words: &[(&str, &str)]) -> Value {
    let vocabulary: Vec<Value> = words
        .iter()
        .map(|(word, translation)| json!({ "word": word, "translation": translation }))
        .collect();

    let quiz: Vec<Value> = words
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, (word, translation))| {
            let wrong = words[(i + 1) % words.len()].1;
            json!({
                "question": format!("What does «{word}» mean?"),
                "options": [
                    { "text": translation, "isCorrect": true },
                    { "text": wrong, "isCorrect": false }
                ]
            })
        })
        .collect();

    let question = |prompt: &str| {
        json!({
            "question": prompt,
            "options": [
                { "text": "Да", "isCorrect": true },
                { "text": "Нет" }
            ]
        })
    };

    json!({
        "titleRu": title_ru,
        "description": format!("Everyday Russian: {title_ru}"),
        "story": {
            "title": title_ru,
            "content": "Анна и Иван встречаются в центре Москвы.",
            "characters": [
                { "name": "Анна", "description": "A student from Kazan" },
                { "name": "Иван", "description": "Her friend from Moscow" }
            ]
        },
        "vocabulary": vocabulary,
        "grammar": {
            "title": "Nominative and accusative",
            "titleRu": "Именительный и винительный падежи",
            "explanation": "Direct objects take the accusative case.",
            "rules": [
                "Feminine -а becomes -у",
                { "text": "Inanimate masculine nouns do not change", "textRu": "Неодушевлённые не меняются" }
            ],
            "examples": [
                { "sentence": "Я вижу маму.", "translation": "I see mom." }
            ],
            "exercises": [
                {
                    "exerciseType": "multiple_choice",
                    "question": "Я читаю ___ (книга)",
                    "correctAnswer": "книгу",
                    "options": [
                        { "text": "книгу", "isCorrect": true },
                        { "text": "книга" },
                        { "text": "книге" }
                    ]
                },
                {
                    "exerciseType": "fill_blank",
                    "question": "Он любит ___ (музыка)",
                    "correctAnswer": "музыку"
                }
            ]
        },
        "pronunciation": {
            "title": "Hard and soft consonants",
            "minimalPairs": [
                { "firstWord": "мат", "secondWord": "мать", "hint": "soft т at the end" },
                { "firstWord": "был", "secondWord": "бил" }
            ],
            "exercises": [
                { "prompt": "Repeat: мать", "expectedTranscription": "[matʲ]" }
            ]
        },
        "listening": {
            "title": "A short dialogue",
            "transcript": "— Привет! Как дела? — Хорошо, спасибо.",
            "questions": [question("Is the speaker doing well?")]
        },
        "speaking": {
            "instructions": "Answer out loud.",
            "exercises": [
                { "prompt": "Introduce yourself", "timeLimitSecs": 60 }
            ]
        },
        "reading": {
            "title": "A postcard",
            "text": "Дорогая мама! Я в Петербурге. Здесь красиво.",
            "questions": [question("Is the writer in Saint Petersburg?")]
        },
        "writing": {
            "instructions": "Write a short note.",
            "exercises": [
                { "prompt": "Describe your street", "minWords": 30 }
            ]
        },
        "cultural": {
            "title": "Maslenitsa",
            "content": "A week of pancakes before Lent."
        },
        "quiz": quiz,
        "missionChallenge": {
            "title": "Real-world mission",
            "rewardXp": 50,
            "requirements": [
                { "description": "Use three new words in a sentence" },
                { "description": "Record yourself reading the postcard" }
            ]
        }
    })
}
