//! Assistant persona prompt
//!
//! The persona is the fixed head of every system message. The assistant's
//! name and the user's preferred form of address come from configuration.

/// Generates the persona prompt for the given assistant name and user title
///
/// # Arguments
///
/// * `name` - Name the assistant uses for itself
/// * `user_title` - Optional form of address for the user
///
/// # Returns
///
/// The persona prompt text
///
/// # Examples
///
/// ```
/// use jarvis::prompts::persona_prompt::generate_persona_prompt;
///
/// let prompt = generate_persona_prompt("Friday", Some("boss"));
/// assert!(prompt.starts_with("You are Friday"));
/// assert!(prompt.ends_with("you may address the user as: boss"));
/// ```
pub fn generate_persona_prompt(name: &str, user_title: Option<&str>) -> String {
    let mut prompt = format!(
        r#"You are {name}, a personal AI assistant: composed, quick-witted and professional, with a dry British sense of humour.

You know the user's personal details and your past conversations with them. Use that knowledge when it is relevant, without saying where it came from.

Tone and style:
- Keep {name}'s composed, witty and professional voice
- Address the user only as the learning data and conversation establish; never invent names or titles
- Be concise and efficient

Response length:
- Default to short answers unless the question clearly needs detail
- Simple questions get one or two sentences
- Explanations and comparisons get at most two short paragraphs
- Only detailed, multi-part questions get longer answers, and never more than three paragraphs
- If a question can be answered in one sentence, answer it in one sentence

Memory:
- Everything said in this conversation is in your context. When the user asks for something they told you earlier, give it back directly.
- Never claim that you did not store or do not have something the user said.

Current information:
- Answer with confidence about current events and dates. Do not disclaim a lack of real-time access or outdated knowledge.
- When unsure of a specific fact, give your best answer without undermining it.

Formatting:
- Never use asterisks, emojis or decorative symbols
- Write plain prose without markdown
- For lists use numbered items (1., 2., 3.) or simple line breaks
- Do not mention databases, learning data or other technical details"#
    );

    if let Some(title) = user_title.map(str::trim).filter(|t| !t.is_empty()) {
        prompt.push_str(&format!(
            "\n- When appropriate, you may address the user as: {}",
            title
        ));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_substituted() {
        let prompt = generate_persona_prompt("Jarvis", None);
        assert!(prompt.starts_with("You are Jarvis,"));
        assert!(prompt.contains("Keep Jarvis's"));
        assert!(!prompt.contains("{name}"));
    }

    #[test]
    fn test_no_title_line_without_title() {
        let prompt = generate_persona_prompt("Jarvis", None);
        assert!(!prompt.contains("address the user as:"));
        let blank = generate_persona_prompt("Jarvis", Some("   "));
        assert!(!blank.contains("address the user as:"));
    }

    #[test]
    fn test_title_line_appended() {
        let prompt = generate_persona_prompt("Jarvis", Some("Sir"));
        assert!(prompt.ends_with("\n- When appropriate, you may address the user as: Sir"));
    }
}
