// Brief generation prompt templates.

pub const BRIEF_WRITER_SYSTEM: &str = "\
You are a strategic creative brief writer. Generate compelling, actionable section \
commentary from the captures and insights provided.";

pub const GENERATE_BRIEF_PROMPT: &str = r#"Write the sections of a strategic brief titled "{title}".

CONTEXT:
{description}

CAPTURES AND INSIGHTS:
{captures}

SECTIONS TO WRITE (key: purpose):
{section_guide}

CURRENT SECTION DRAFTS:
{sections}

{evidence_instruction}

Enhance and complete each section with strategic insight drawn from the captures.
Keep any draft text that is still accurate.

OUTPUT SCHEMA (one entry per section key):
{
  "<section-key>": {"content": "markdown text"}
}"#;
