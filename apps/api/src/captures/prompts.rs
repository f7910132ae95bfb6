// Capture LLM prompt templates: truth analysis and DSD tag suggestion.

pub const TRUTH_ANALYSIS_SYSTEM: &str = "\
You are a strategic intelligence analyst for a brand strategy team. \
You read captured social and web content and explain it in four layers: \
fact, observation, insight and human truth.";

pub const TRUTH_ANALYSIS_PROMPT: &str = r#"Analyze the captured content below with the Truth Analysis framework.

CAPTURE:
Title: {title}
Platform: {platform}
Content:
{content}

Layers:
1. FACT: verifiable claims and any numeric metrics stated in the content.
2. OBSERVATION: patterns and behaviors visible in the content, plus its context.
3. INSIGHT: strategic implications, opportunities and risks for a brand.
4. HUMAN TRUTH: the core human truth, and its emotional, cultural and psychological drivers.

OUTPUT SCHEMA (return exactly this structure):
{
  "truthAnalysis": {
    "fact": {"claims": ["string"], "metrics": {"name": number}, "timestamp": "string or null"},
    "observation": {"patterns": ["string"], "behaviors": ["string"], "context": "string"},
    "insight": {"implications": ["string"], "opportunities": ["string"], "risks": ["string"]},
    "humanTruth": {"core": "string", "emotional": "string", "cultural": "string", "psychological": "string"}
  },
  "summary": "one sentence",
  "viralScore": 0-100,
  "culturalRelevance": 0-10,
  "suggestedSection": "define" | "shift" | "deliver"
}"#;

pub const TAG_SUGGESTION_SYSTEM: &str = "\
You classify captured content into the Define / Shift / Deliver strategy framework. \
Only mark a tag true when the content clearly supports it.";

pub const TAG_SUGGESTION_PROMPT: &str = r#"{framework}

CAPTURE:
Title: {title}
Platform: {platform}
Content:
{content}
Analyst note: {note}

Return a JSON object whose keys are tag names from the framework and whose values are
true or false. Include only the tags you have an opinion on, for example:
{"rawBehavior": true, "humanTruth": true, "executionIdea": false}"#;
