// Narrative summarizer prompt templates.

pub const NARRATIVE_SYSTEM: &str = "\
You are an HR assistant. \
Provide a professional, detailed résumé analysis written for a recruiter.";

pub const NARRATIVE_PROMPT: &str = r#"Analyze the résumé below and provide a detailed evaluation organized in sections.
The goal is a recruiter's assessment that covers the following points:
1. Profile Summary: one paragraph evaluating the candidate's profile.
2. Strengths: list the candidate's strong points and differentiators (experience, skills).
3. Growth Areas: list areas where the candidate could develop or acquire new skills.
4. Role Fit: a comment on how well the profile aligns with a technology role at a large tech company such as Google, Amazon or Meta.

Résumé:
{resume_text}
"#;
