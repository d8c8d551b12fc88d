use analyst_data_services::ScoredChunk;

/// Formatter for generation prompts and extractive answers
pub struct AnalystPromptFormatter;

impl AnalystPromptFormatter {
    /// Join matched chunk texts, best match first, one per line
    pub fn assemble_context(matches: &[ScoredChunk]) -> String {
        matches
            .iter()
            .map(|m| m.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the generation prompt around the retrieved context and the literal question
    pub fn format_generative(query: &str, context: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str(
            "You are a business analyst. Use the given context to answer clearly and concisely.\n\n",
        );
        prompt.push_str("Context:\n");
        prompt.push_str(context);
        prompt.push_str("\n\n");
        prompt.push_str(&format!("Question: {}\n\n", query));
        prompt.push_str("Answer:");

        prompt
    }

    /// Deterministic answer listing the matched records and their similarity
    pub fn format_extractive(query: &str, matches: &[ScoredChunk]) -> String {
        let mut answer = String::new();

        if matches.is_empty() {
            answer.push_str(&format!("No matching records for \"{}\".", query));
            return answer;
        }

        answer.push_str(&format!(
            "Top {} matching records for \"{}\":",
            matches.len(),
            query
        ));

        for (i, m) in matches.iter().enumerate() {
            answer.push_str(&format!(
                "\n{}. [similarity {:.3}] {}",
                i + 1,
                m.similarity,
                m.chunk.text
            ));
        }

        answer
    }

    /// Isolate the model's continuation from raw output that may echo the prompt
    pub fn strip_prompt_echo(raw: &str, prompt: &str) -> String {
        let continuation = match raw.strip_prefix(prompt) {
            Some(rest) => rest.to_string(),
            None => raw.replace(prompt, ""),
        };
        continuation.trim().to_string()
    }
}
