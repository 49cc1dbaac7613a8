use api_shared::{ScoreReq, ScoreService};
use chrono::Utc;
use clap::{Parser, Subcommand};
use fhir::{Observation, QuestionnaireResponse, QuestionnaireResponseData, ScoreObservationData};
use phq9::{CompletedAnswers, QuestionIndex, INSTRUCTION, OPTIONS, TITLE};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "phq9")]
#[command(about = "PHQ-9 questionnaire CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the questions and response options
    Questions,
    /// Score nine answers (each 0-3, in question order)
    Score {
        /// Answers for questions 1-9
        #[arg(num_args = 1..)]
        answers: Vec<i64>,
    },
    /// Print the QuestionnaireResponse and Observation that a submission would write
    Render {
        /// Patient id for the subject reference
        #[arg(long)]
        patient: String,
        /// Server id to use for the QuestionnaireResponse in `derivedFrom`
        #[arg(long)]
        qr_id: String,
        /// Answers for questions 1-9
        #[arg(num_args = 1..)]
        answers: Vec<i64>,
    },
    /// Re-score a QuestionnaireResponse exported from a FHIR server
    Rescore {
        /// Path to the QuestionnaireResponse JSON file
        path: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Questions) => {
            println!("{TITLE}");
            println!("{INSTRUCTION}");
            println!();
            for index in QuestionIndex::all() {
                println!("{}. {}", index.number(), index.question().text);
            }
            println!();
            for option in OPTIONS.iter() {
                println!("  {} = {}", option.value, option.label);
            }
        }
        Some(Commands::Score { answers }) => match ScoreService::score(&ScoreReq { answers }) {
            Ok(res) => println!("Score: {}\nSeverity: {}", res.score, res.severity),
            Err(e) => eprintln!("Error scoring answers: {}", e),
        },
        Some(Commands::Render {
            patient,
            qr_id,
            answers,
        }) => {
            let answers = CompletedAnswers::from_values(&answers)?;
            let now = Utc::now();

            let response = QuestionnaireResponse::render(&QuestionnaireResponseData {
                patient_id: patient.clone(),
                answers,
                authored: now,
            })?;
            let observation = Observation::render(&ScoreObservationData {
                patient_id: patient,
                score: answers.score(),
                questionnaire_response_id: qr_id,
                effective: now,
            })?;

            println!("{}", serde_json::to_string_pretty(&response)?);
            println!("{}", serde_json::to_string_pretty(&observation)?);
        }
        Some(Commands::Rescore { path }) => {
            let json = std::fs::read_to_string(&path)?;
            let answers = QuestionnaireResponse::parse_answers(&json)?;
            let score = answers.score();
            println!("Score: {}\nSeverity: {}", score, score.severity());
        }
        None => {
            println!("Use 'phq9 --help' for commands");
        }
    }

    Ok(())
}
