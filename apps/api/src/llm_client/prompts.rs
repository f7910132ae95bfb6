// Prompt fragments shared by every feature that calls the model.
// Feature-specific prompts live in a prompts.rs beside the feature.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps generated strategy anchored in the supplied captures.
pub const EVIDENCE_INSTRUCTION: &str = "\
    CRITICAL: Base every statement on the captured content provided. \
    Do NOT invent statistics, brands, quotes or platforms that do not appear in it. \
    If the captures do not support a point, leave it out.";

/// The DSD vocabulary, used by tag suggestion and section inference.
pub const DSD_FRAMEWORK: &str = "\
    The Define / Shift / Deliver (DSD) framework has nine tags: \
    DEFINE = lifeLens (how people see their lives), rawBehavior (what people actually do), \
    channelVibes (the feel of a platform or channel); \
    SHIFT = strategicIntelligence (competitive or market intelligence), \
    humanTruth (an underlying human motivation), culturalMoment (a timely cultural event); \
    DELIVER = creativeTerritory (a space for creative work), executionIdea (a concrete execution), \
    attentionValue (why it will earn attention).";
