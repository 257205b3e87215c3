//! Markdown output formatter

use caseqa_core::RagResponse;

pub fn format_response(response: &RagResponse) -> String {
    let mut output = String::from("# Answer\n\n");
    output.push_str(&response.answer);
    output.push_str("\n\n");

    output.push_str(&format!("- **Engine**: {}\n", response.engine_name));
    output.push_str(&format!("- **Latency**: {:.2}s\n", response.latency));
    output.push_str(&format!("- **Cost**: ${:.6}\n", response.cost_estimate));
    output.push_str(&format!("- **Confidence**: {:.0}%\n\n", response.confidence * 100.0));

    output.push_str("## Sources\n\n");
    if response.sources.is_empty() {
        output.push_str("*No sources found*\n");
        return output;
    }

    for (i, source) in response.sources.iter().enumerate() {
        output.push_str(&format!(
            "### {}. {} (Score: {:.2})\n\n",
            i + 1,
            source.filename,
            source.score
        ));
        for line in source.snippet.lines() {
            output.push_str(&format!("> {}\n", line));
        }
        output.push_str("\n---\n\n");
    }

    output
}
