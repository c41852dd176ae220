// Instruction text sent to the upstream generator.

/// Pair generation instruction. Replace `{count}` and `{category}` before sending.
pub const PAIR_PROMPT_TEMPLATE: &str = "I am constructing a card matching game. \
Generate {count} pairs of related words in the format 'WORD - WORD' for the category: {category}. \
Return plain text, exactly one pair per line, {count} lines in total. \
Both words MUST be in CAPITAL LETTERS and may only contain letters A-Z, digits and spaces, \
separated by a single hyphen. \
Do not include numbering, bullet points, headings, explanations or any other text. \
Any responses you give MUST be family friendly, as the game may be played by children.";

pub fn build_pair_prompt(category: &str, count: usize) -> String {
    PAIR_PROMPT_TEMPLATE
        .replace("{count}", &count.to_string())
        .replace("{category}", category)
}
