// Critique prompt templates. Placeholders are `{resume_text}` and `{job_description}`;
// the JSON schema braces in the templates are literal and left untouched by rendering.

/// Prefix the model must use for every required tool absent from the resume.
pub const MISSING_MARKER: &str = "MISSING:";

pub const CRITIQUE_SYSTEM: &str = "\
You are a Senior Technical Recruiter reviewing resumes. \
Be specific and honest: judge only what the resume actually states. \
When a job description is given, verify the candidate against its MANDATORY requirements \
and never award credit for skills the resume does not mention.";

pub const IMAGE_RESUME_TEXT: &str = "[The resume is attached as an image. Read it from the image.]";

pub const RESUME_PROMPT_TEMPLATE: &str = r#"TASK: Critique this resume.

RESUME:
{resume_text}

INSTRUCTIONS:
1. "overall_score": an integer from 0 to 100 for overall resume quality.
2. "strengths" and "weaknesses": short, concrete observations.
3. "improvements": rewrite weak lines. Quote the original line, give a better version, explain why.

JSON SCHEMA:
{
  "candidate_name": "Name",
  "is_match": true,
  "overall_score": 50,
  "summary": "Two or three sentence assessment.",
  "strengths": ["..."],
  "weaknesses": ["..."],
  "improvements": [{"original": "...", "better": "...", "why": "..."}]
}"#;

pub const JOB_MATCH_PROMPT_TEMPLATE: &str = r#"TASK: Check this resume against the job description for a critical skills mismatch.

RESUME:
{resume_text}

JOB DESCRIPTION (JD):
{job_description}

INSTRUCTIONS:
1. Compare the hard skills in the JD with the resume.
2. "is_match": false if the resume is missing any core tool or technology the JD requires.
3. "weaknesses": MUST list every missing core tool. Format each exactly like this: "MISSING: <tool name>".
   Example: ["MISSING: Kubernetes", "MISSING: Terraform"]
4. "strengths": the JD skills the resume does demonstrate.
5. "improvements": rewrite weak lines. Quote the original line, give a better version, explain why.

JSON SCHEMA:
{
  "candidate_name": "Name",
  "is_match": true,
  "overall_score": 0,
  "summary": "Briefly explain the fit or the gap.",
  "strengths": ["Matching skills"],
  "weaknesses": ["MISSING: Tool1", "MISSING: Tool2"],
  "improvements": [{"original": "...", "better": "...", "why": "..."}]
}"#;

/// Fills `{key}` placeholders in one pass. Values are inserted verbatim, so a
/// resume containing `{job_description}` is never expanded a second time.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = values.iter().find_map(|(key, value)| {
            after
                .strip_prefix(key)
                .and_then(|tail| tail.strip_prefix('}'))
                .map(|tail| (*value, tail))
        });
        match substituted {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
