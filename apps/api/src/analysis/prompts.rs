/// Resume vs. job description comparison prompt.
/// Placeholders: `{jd_text}`, `{resume_text}`.
pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"
You're a smart AI resume analyzer.

Compare the following resume and job description.

Return:
1. Match percentage (0–100)
2. List of strong/covered skills
3. List of missing skills
4. Suggestions for improving the resume

--- Job Description ---
{jd_text}

--- Resume ---
{resume_text}
"#;

/// Fills the template in a single pass so placeholder-like text inside either
/// input is left untouched.
pub fn build_analyze_prompt(resume_text: &str, jd_text: &str) -> String {
    let (head, rest) = ANALYZE_PROMPT_TEMPLATE
        .split_once("{jd_text}")
        .unwrap_or((ANALYZE_PROMPT_TEMPLATE, ""));
    let (middle, tail) = rest.split_once("{resume_text}").unwrap_or((rest, ""));

    let mut prompt =
        String::with_capacity(ANALYZE_PROMPT_TEMPLATE.len() + resume_text.len() + jd_text.len());
    prompt.push_str(head);
    prompt.push_str(jd_text);
    prompt.push_str(middle);
    prompt.push_str(resume_text);
    prompt.push_str(tail);
    prompt
}
