//! Info command

use crate::app::OutputFormat;
use anyhow::Result;
use caseqa_core::ConfigLoader;

const DEFAULT_TITLE: &str = "caseqa";

const EXAMPLE_QUESTIONS: &[&str] = &[
    "違反金控法利害關係人規定會受到什麼處罰？",
    "請問在證券因為專業投資人資格審核的裁罰有哪些？",
    "辦理共同行銷被裁罰的案例有哪些？",
    "金管會對創投公司的裁罰有哪些？",
    "證券商遭主管機關裁罰「警告」處分，有哪些業務會受限制？",
    "內線交易有罪判決所認定重大訊息成立的時點",
];

const STEPS: &[&str] = &[
    "caseqa build [dir]    upload and import the case documents once",
    "caseqa status         check that the index is ready",
    "caseqa query <text>   ask a question and read the cited sources",
];

pub fn run(loader: &ConfigLoader, format: OutputFormat) -> Result<()> {
    let title = loader
        .app_config()
        .ok()
        .and_then(|app| app.title)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "title": title,
                "usage": STEPS,
                "example_questions": EXAMPLE_QUESTIONS,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Md => {
            println!("# {}\n", title);
            println!("## Usage\n");
            for (i, step) in STEPS.iter().enumerate() {
                println!("{}. `{}`", i + 1, step);
            }
            println!("\n## Example questions\n");
            for question in EXAMPLE_QUESTIONS {
                println!("- {}", question);
            }
        }
        OutputFormat::Cli => {
            println!("{}", title);
            println!();
            println!("Usage:");
            for step in STEPS {
                println!("  {}", step);
            }
            println!();
            println!("Example questions:");
            for question in EXAMPLE_QUESTIONS {
                println!("  - {}", question);
            }
        }
    }
    Ok(())
}
