//! The seven-pillar audience taxonomy. Fixed reference data.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pillar {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub examples: &'static [&'static str],
}

pub const DEFAULT_PILLAR: &str = "1p-data";

pub static PILLARS: [Pillar; 7] = [
    Pillar {
        id: "1p-data",
        name: "Raw Behavior",
        description: "Data directly tied to your audience's real-world actions, purchases, \
                      interactions, and digital engagement patterns",
        examples: &["Previous buyers of X", "High-value customers", "Repeat purchasers"],
    },
    Pillar {
        id: "competitive",
        name: "Rival Landscape",
        description: "Analysis of competitors' content, tone, positioning, and market gaps \
                      for strategic differentiation",
        examples: &["Brand Y loyalists", "Competitor switchers", "Price-sensitive shoppers"],
    },
    Pillar {
        id: "regional",
        name: "Local Pulse",
        description: "Localized trends and cultural conversations emerging from specific \
                      geographies or communities",
        examples: &["Texas millennials", "Urban northeast", "Emerging markets"],
    },
    Pillar {
        id: "lifestage",
        name: "Life Lens",
        description: "Audience psychology and mindset shaped by their life stage, values, \
                      and aspirations",
        examples: &["New parents", "Career climbers", "Health-conscious adults"],
    },
    Pillar {
        id: "category",
        name: "Market Moves",
        description: "Industry norms and consumer behavior patterns specific to your \
                      product category and vertical",
        examples: &["Fitness enthusiasts", "Eco-conscious consumers", "Tech early adopters"],
    },
    Pillar {
        id: "platforms",
        name: "Channel Vibes",
        description: "Platform-specific behavior, language, format norms, and native \
                      communication styles",
        examples: &["TikTok creators", "LinkedIn professionals", "YouTube learners"],
    },
    Pillar {
        id: "wildcard",
        name: "Surprise Signals",
        description: "Emerging, fringe, or unpredictable content and subculture signals \
                      not fitting conventional categories",
        examples: &["Meme culture participants", "Viral trend followers", "Cultural rebels"],
    },
];

pub fn find_pillar(id: &str) -> Option<&'static Pillar> {
    PILLARS.iter().find(|p| p.id == id)
}
