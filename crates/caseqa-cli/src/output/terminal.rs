//! Terminal output formatter

use caseqa_core::RagResponse;

pub fn format_response(response: &RagResponse) -> String {
    let mut output = String::new();

    output.push_str(&response.answer);
    output.push_str("\n\n");
    output.push_str(&format!(
        "Latency: {:.2}s | Cost: ${:.6} | Confidence: {:.0}% | Sources: {}\n",
        response.latency,
        response.cost_estimate,
        response.confidence * 100.0,
        response.sources.len()
    ));

    if response.sources.is_empty() {
        output.push_str("\nNo sources found\n");
        return output;
    }

    output.push('\n');
    for (i, source) in response.sources.iter().enumerate() {
        let score_pct = (source.score * 100.0) as u32;
        output.push_str(&format!(
            "Source {}: {} ({}%)\n",
            i + 1,
            source.filename,
            score_pct
        ));
        for line in source.snippet.lines() {
            output.push_str(&format!("  > {}\n", line));
        }
        output.push('\n');
    }

    output
}
