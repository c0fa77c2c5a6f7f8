//! Ask command - answers one question and prints the evidence

use clap::Args;

use crate::domain::PipelineState;
use crate::infrastructure::logging::init_logging;

const CONTEXT_PREVIEW_CHARS: usize = 500;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to answer
    pub question: String,
}

/// Run the pipeline once and print context preview, similarity and answer
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;
    init_logging(&config.logging);

    let (pipeline, _index) = crate::build_pipeline(&config).await?;
    let state = pipeline.run(&args.question).await?;

    print!("{}", render(&state, config.pipeline.relevance_threshold));

    Ok(())
}

fn render(state: &PipelineState, relevance_threshold: f32) -> String {
    let relevance = if state.is_relevant(relevance_threshold) {
        "relevant"
    } else {
        "below threshold"
    };

    format!(
        "Question: {question}\n\
         \n--- Retrieved context (first {limit} chars) ---\n\
         {context}\n\
         \nSimilarity: {score:.4} ({passages} passages, {relevance})\n\
         \n--- Answer ---\n\
         {answer}\n",
        question = state.question(),
        limit = CONTEXT_PREVIEW_CHARS,
        context = preview(state.context(), CONTEXT_PREVIEW_CHARS),
        score = state.score(),
        passages = state.passages_used(),
        answer = state.answer().unwrap_or_default(),
    )
}

/// First `max_chars` characters, with an ellipsis when cut
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Generation, Question, Retrieval, RetrievedPassage};

    #[test]
    fn test_preview_cuts_on_char_boundary() {
        assert_eq!(preview("short", 500), "short");
        assert_eq!(preview("ééééé", 3), "ééé...");
    }

    #[test]
    fn test_render_includes_score_and_answer() {
        let retrieval = Retrieval::from_passages(
            vec![RetrievedPassage::new("doc_chunk_0", "Agents act.", 0.8123)],
            3,
            "\n\n",
        );
        let state = PipelineState::new(Question::parse("What do agents do?").unwrap())
            .with_retrieval(retrieval)
            .unwrap()
            .with_generation(Generation::new("They act."))
            .unwrap();

        let output = render(&state, 0.5);

        assert!(output.contains("Agents act."));
        assert!(output.contains("Similarity: 0.8123 (1 passages, relevant)"));
        assert!(output.starts_with("Question: What do agents do?\n\n--- Retrieved context"));
        assert!(output.ends_with("\n--- Answer ---\nThey act.\n"));
    }

    #[test]
    fn test_render_flags_weak_retrieval() {
        let state = PipelineState::new(Question::parse("Who won in 2022?").unwrap())
            .with_retrieval(Retrieval::empty())
            .unwrap()
            .with_generation(Generation::new("I don't know."))
            .unwrap();

        let output = render(&state, 0.5);

        assert!(output.contains("Similarity: 0.0000 (0 passages, below threshold)"));
    }
}
