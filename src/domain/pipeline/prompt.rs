//! Grounding prompt template

/// Opening instruction restricting the model to the supplied context
pub const GROUNDING_INSTRUCTION: &str = "Answer based ONLY on the context:";

/// Instruction covering questions the context cannot answer
pub const REFUSAL_INSTRUCTION: &str = "If the context does not contain the answer, \
reply that the information is not available in the provided context. \
Do not use outside knowledge and do not guess.";

/// Build the single prompt sent to the completion provider.
///
/// Context and question are embedded verbatim. An empty context still yields
/// a prompt; the refusal instruction covers that case.
pub fn grounded_prompt(question: &str, context: &str) -> String {
    format!(
        "{}\n{}\nContext: {}\nQuestion: {}",
        GROUNDING_INSTRUCTION, REFUSAL_INSTRUCTION, context, question
    )
}
